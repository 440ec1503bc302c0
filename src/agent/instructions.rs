/// System prompt for the shipment assistant. Tool semantics are spelled out
/// here the same way they appear in the tool descriptions so the model gets
/// a consistent picture.
pub fn build_system_prompt(tool_names: &[&str]) -> String {
    let tools = if tool_names.is_empty() {
        "none".to_string()
    } else {
        tool_names.join(", ")
    };

    format!(
        "You are an assistant for a trade-shipment knowledge base, with tools \
         to search it and to access conversation memory.\n\
         Available tools: {tools}.\n\
         Use RAG_Search for keyword questions about shipments; provide 'query' \
         and optionally 'dates' and 'size'. Use Semantic_Search when the \
         question is about meaning rather than exact terms. You can return \
         previous user messages with get_user_message: n=1 for the last \
         message, 2 for two messages ago, etc.\n\
         When a tool reports an error, relay it briefly and keep helping."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_the_tools() {
        let prompt = build_system_prompt(&["es_status", "RAG_Search"]);
        assert!(prompt.contains("es_status, RAG_Search"));
    }
}
