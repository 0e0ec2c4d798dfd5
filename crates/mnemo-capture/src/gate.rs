use crate::extract::NormalizedExchange;

/// Below this length, pure conversation is not worth a classifier call.
const MIN_CLASSIFY_LEN: usize = 100;

/// Cheap heuristic deciding whether an exchange goes to the classifier.
/// Tool usage always qualifies; otherwise the text must be substantial.
pub fn worth_classifying(exchange: &NormalizedExchange) -> bool {
    exchange.has_state_change || exchange.text.trim().len() >= MIN_CLASSIFY_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(text: &str, has_state_change: bool) -> NormalizedExchange {
        NormalizedExchange {
            text: text.to_string(),
            has_state_change,
            new_offset: 0,
        }
    }

    #[test]
    fn test_short_chat_is_skipped() {
        assert!(!worth_classifying(&exchange("USER: thanks", false)));
    }

    #[test]
    fn test_tool_usage_always_qualifies() {
        assert!(worth_classifying(&exchange("[Edit: a.rs]", true)));
    }

    #[test]
    fn test_long_conversation_qualifies() {
        let long = "a".repeat(150);
        assert!(worth_classifying(&exchange(&long, false)));
    }

    #[test]
    fn test_empty_exchange_is_skipped() {
        assert!(!worth_classifying(&exchange("", false)));
    }
}
