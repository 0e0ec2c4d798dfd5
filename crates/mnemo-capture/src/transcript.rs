use mnemo_core::model::TranscriptRecord;

/// The non-blank lines of a raw transcript file.
///
/// This is the offset unit shared by the extractor and the cursor store:
/// an offset is an index into this sequence. Both the consumed slice and
/// the persisted new offset must come from this one function.
pub fn non_blank_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Parse one transcript line. Unparseable lines are skipped, never fatal.
pub fn parse_record(line: &str) -> Option<TranscriptRecord> {
    match serde_json::from_str(line) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!("Skipping unparseable transcript line: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::model::Role;

    #[test]
    fn test_non_blank_lines() {
        let content = "a\n\n  \nb\nc\n\n";
        assert_eq!(non_blank_lines(content), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_record_skips_garbage() {
        assert!(parse_record("{not json").is_none());
        assert!(parse_record(r#"{"role":"tool","content":"x"}"#).is_none());
        let record = parse_record(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(record.role, Role::User);
    }
}
