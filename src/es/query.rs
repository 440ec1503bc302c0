use chrono::NaiveDate;
use serde_json::{json, Map, Value};

/// Static field/boost list for the trade-shipment index. Baked in per
/// deployment rather than configurable at runtime.
const KEYWORD_FIELDS: [(&str, u32); 5] = [
    ("product_description", 3),
    ("exporter_name", 2),
    ("importer_name", 2),
    ("hs_code", 1),
    ("registration_id", 1),
];

const TIE_BREAKER: f64 = 0.3;
const DATE_FIELD: &str = "shipment_date";
const SEMANTIC_FIELD: &str = "content_embedding";

pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 10;
pub const SEMANTIC_TOP_K: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
    None,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub gte: String,
    pub lte: String,
}

/// A fully-built backend request. Immutable once constructed; consumed by
/// [`super::EsClient::search`] exactly once.
#[derive(Debug, Clone)]
pub enum SearchRequest {
    Keyword(KeywordRequest),
    Semantic(SemanticRequest),
}

#[derive(Debug, Clone)]
pub struct KeywordRequest {
    pub query: String,
    pub fields: Vec<(String, u32)>,
    pub fuzziness: Fuzziness,
    pub size: u32,
    pub sort: Vec<(String, SortDirection)>,
    pub date_filter: Option<DateRange>,
}

#[derive(Debug, Clone)]
pub struct SemanticRequest {
    pub query: String,
    pub k: u32,
}

impl SearchRequest {
    /// Multi-field fuzzy keyword request over the trade-shipment schema.
    /// `size` is clamped to 1..=MAX_PAGE_SIZE so no caller can request an
    /// unbounded result set. An empty query is passed through unmodified;
    /// the backend's own empty-query semantics apply.
    pub fn keyword(query: &str, dates: Option<&str>, size: Option<u32>) -> Self {
        let size = size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        SearchRequest::Keyword(KeywordRequest {
            query: query.to_string(),
            fields: KEYWORD_FIELDS
                .iter()
                .map(|(name, boost)| (name.to_string(), *boost))
                .collect(),
            fuzziness: Fuzziness::Auto,
            size,
            sort: vec![
                ("_score".to_string(), SortDirection::Desc),
                (DATE_FIELD.to_string(), SortDirection::Desc),
            ],
            date_filter: dates.and_then(parse_date_filter),
        })
    }

    /// Embedding-similarity request with a fixed top-k. The raw query text is
    /// passed through unmodified; embedding generation happens in the
    /// backend's inference pipeline, not here.
    pub fn semantic(query: &str) -> Self {
        SearchRequest::Semantic(SemanticRequest {
            query: query.to_string(),
            k: SEMANTIC_TOP_K,
        })
    }

    pub fn size(&self) -> u32 {
        match self {
            SearchRequest::Keyword(req) => req.size,
            SearchRequest::Semantic(req) => req.k,
        }
    }

    /// Serializes into the backend's query DSL.
    pub fn to_body(&self) -> Value {
        match self {
            SearchRequest::Keyword(req) => req.to_body(),
            SearchRequest::Semantic(req) => json!({
                "query": {
                    "semantic": {
                        "field": SEMANTIC_FIELD,
                        "query": req.query,
                    }
                },
                "size": req.k,
            }),
        }
    }
}

impl KeywordRequest {
    fn to_body(&self) -> Value {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, boost)| {
                if *boost > 1 {
                    format!("{}^{}", name, boost)
                } else {
                    name.clone()
                }
            })
            .collect();

        let mut multi_match = json!({
            "query": self.query,
            "fields": fields,
            "type": "best_fields",
            "tie_breaker": TIE_BREAKER,
        });
        if self.fuzziness == Fuzziness::Auto {
            multi_match["fuzziness"] = json!("AUTO");
        }

        let query = match &self.date_filter {
            Some(filter) => {
                let mut range = Map::new();
                range.insert(
                    DATE_FIELD.to_string(),
                    json!({ "gte": filter.gte, "lte": filter.lte }),
                );
                json!({
                    "bool": {
                        "must": [{ "multi_match": multi_match }],
                        "filter": [{ "range": range }],
                    }
                })
            }
            None => json!({ "multi_match": multi_match }),
        };

        let sort: Vec<Value> = self
            .sort
            .iter()
            .map(|(key, dir)| {
                let mut clause = Map::new();
                clause.insert(key.clone(), json!({ "order": dir.as_str() }));
                Value::Object(clause)
            })
            .collect();

        json!({
            "query": query,
            "size": self.size,
            "sort": sort,
        })
    }
}

/// Accepts `"2020"`, a single ISO date, or `"<from> to <to>"`. Anything
/// unparseable is dropped rather than failing the search.
pub fn parse_date_filter(raw: &str) -> Option<DateRange> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some((from, to)) = raw.split_once(" to ") {
        let (from, to) = (from.trim(), to.trim());
        if iso_date(from) && iso_date(to) {
            return Some(DateRange {
                gte: from.to_string(),
                lte: to.to_string(),
            });
        }
        return None;
    }

    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return Some(DateRange {
            gte: format!("{}-01-01", raw),
            lte: format!("{}-12-31", raw),
        });
    }

    if iso_date(raw) {
        return Some(DateRange {
            gte: raw.to_string(),
            lte: raw.to_string(),
        });
    }

    None
}

fn iso_date(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_body_shape() {
        let req = SearchRequest::keyword("copper wire", None, None);
        let body = req.to_body();

        assert_eq!(body["size"], 5);
        let mm = &body["query"]["multi_match"];
        assert_eq!(mm["query"], "copper wire");
        assert_eq!(mm["fuzziness"], "AUTO");
        assert_eq!(mm["type"], "best_fields");
        let fields = mm["fields"].as_array().unwrap();
        assert_eq!(fields[0], "product_description^3");
        assert_eq!(fields[1], "exporter_name^2");

        let sort = body["sort"].as_array().unwrap();
        assert_eq!(sort[0]["_score"]["order"], "desc");
        assert_eq!(sort[1]["shipment_date"]["order"], "desc");
    }

    #[test]
    fn keyword_size_is_clamped() {
        assert_eq!(SearchRequest::keyword("q", None, Some(50)).size(), 10);
        assert_eq!(SearchRequest::keyword("q", None, Some(0)).size(), 1);
        assert_eq!(SearchRequest::keyword("q", None, Some(7)).size(), 7);
    }

    #[test]
    fn keyword_empty_query_passes_through() {
        let body = SearchRequest::keyword("", None, None).to_body();
        assert_eq!(body["query"]["multi_match"]["query"], "");
    }

    #[test]
    fn keyword_with_year_filter() {
        let req = SearchRequest::keyword("steel", Some("2020"), None);
        let body = req.to_body();
        let range = &body["query"]["bool"]["filter"][0]["range"]["shipment_date"];
        assert_eq!(range["gte"], "2020-01-01");
        assert_eq!(range["lte"], "2020-12-31");
        assert_eq!(body["query"]["bool"]["must"][0]["multi_match"]["query"], "steel");
    }

    #[test]
    fn semantic_body_fixes_k() {
        let body = SearchRequest::semantic("rare earth exports").to_body();
        assert_eq!(body["size"], 5);
        assert_eq!(body["query"]["semantic"]["query"], "rare earth exports");
        assert_eq!(body["query"]["semantic"]["field"], "content_embedding");
    }

    #[test]
    fn date_filter_parsing() {
        assert_eq!(
            parse_date_filter("2020-01-01 to 2020-06-30"),
            Some(DateRange {
                gte: "2020-01-01".to_string(),
                lte: "2020-06-30".to_string(),
            })
        );
        assert_eq!(
            parse_date_filter("2021-03-15"),
            Some(DateRange {
                gte: "2021-03-15".to_string(),
                lte: "2021-03-15".to_string(),
            })
        );
        assert_eq!(parse_date_filter(""), None);
        assert_eq!(parse_date_filter("last tuesday"), None);
    }
}
