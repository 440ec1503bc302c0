use serde_json::Value;

use super::SearchHit;

pub const NO_RECORDS: &str = "No matching shipment records found.";
pub const NO_CONTENT: &str = "No matching content found.";

/// Output of a formatter. `truncated` is set when the "more results" notice
/// was appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedResult {
    pub text: String,
    pub truncated: bool,
}

impl FormattedResult {
    fn plain(text: String) -> Self {
        FormattedResult {
            text,
            truncated: false,
        }
    }
}

/// Renders keyword hits as a numbered list of shipment lines. Clauses whose
/// source field is absent are omitted entirely rather than shown as N/A.
///
/// The "more results" notice fires when the hit count equals the requested
/// page size. That is a heuristic (an exact-count match also triggers it);
/// the backend gives no true has-more flag at this API level.
pub fn format_keyword_hits(hits: &[SearchHit], requested_size: u32) -> FormattedResult {
    if hits.is_empty() {
        return FormattedResult::plain(NO_RECORDS.to_string());
    }

    let mut lines = Vec::with_capacity(hits.len());
    for (idx, hit) in hits.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, shipment_line(hit)));
    }

    let mut text = lines.join("\n");
    let truncated = hits.len() as u32 == requested_size;
    if truncated {
        text.push_str(&format!(
            "\n\nShowing top {} results. Ask again with a larger size if you want more.",
            hits.len()
        ));
    }

    FormattedResult { text, truncated }
}

/// Renders semantic hits by joining their raw content fields. No numbering,
/// no truncation notice; the top-k is fixed upstream.
pub fn format_semantic_hits(hits: &[SearchHit]) -> FormattedResult {
    let docs: Vec<&str> = hits
        .iter()
        .filter_map(|hit| hit.field_str("content"))
        .collect();

    if docs.is_empty() {
        return FormattedResult::plain(NO_CONTENT.to_string());
    }

    FormattedResult::plain(docs.join("\n\n"))
}

fn shipment_line(hit: &SearchHit) -> String {
    let mut clauses = Vec::new();

    clauses.push(
        hit.field_str("product_description")
            .unwrap_or("(no description)")
            .to_string(),
    );

    if let (Some(exporter), Some(importer)) =
        (hit.field_str("exporter_name"), hit.field_str("importer_name"))
    {
        clauses.push(format!("Trade: {} → {}", exporter, importer));
    }

    if let Some(date) = hit.field_str("shipment_date") {
        clauses.push(format!("Date: {}", date));
    }

    if let Some(value) = scalar(hit.field("value_usd")) {
        clauses.push(format!("Value: ${} USD", value));
    }

    if let Some(qty) = scalar(hit.field("quantity")) {
        match hit.field_str("quantity_unit") {
            Some(unit) => clauses.push(format!("Qty: {} {}", qty, unit)),
            None => clauses.push(format!("Qty: {}", qty)),
        }
    }

    if let Some(code) = hit.field_str("hs_code") {
        clauses.push(format!("HS: {}", code));
    }

    if let Some(reg) = hit.field_str("registration_id") {
        clauses.push(format!("Reg: {}", reg));
    }

    clauses.join(" | ")
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
