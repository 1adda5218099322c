#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow(String),
    Deny { reason_code: &'static str },
}

/// Output policy applied to model text before it is cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub max_chars: usize,
    pub strip_wrapping_quotes: bool,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { max_chars: 800, strip_wrapping_quotes: true }
    }
}

impl GuardrailPolicy {
    pub fn evaluate(&self, raw: &str) -> GuardrailDecision {
        let mut text = raw.trim();
        if self.strip_wrapping_quotes {
            text = text.trim_matches(|c: char| c == '"' || c == '\u{201c}' || c == '\u{201d}').trim();
        }

        if text.is_empty() {
            return GuardrailDecision::Deny { reason_code: "empty_completion" };
        }
        if text.starts_with("```") {
            return GuardrailDecision::Deny { reason_code: "non_prose_completion" };
        }

        GuardrailDecision::Allow(truncate_at_sentence(text, self.max_chars))
    }
}

/// Cuts at the last sentence end within `max_chars`, else at the last word.
fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    if let Some(end) = cut.rfind(['.', '!', '?']).filter(|end| *end > 0) {
        return cut[..=end].to_string();
    }
    match cut.rfind(char::is_whitespace) {
        Some(space) if space > 0 => cut[..space].trim_end().to_string(),
        _ => cut,
    }
}

#[cfg(test)]
mod tests {
    use super::{GuardrailDecision, GuardrailPolicy};

    #[test]
    fn trims_and_unquotes_prose() {
        let decision = GuardrailPolicy::default().evaluate("  \"Reliable under crosses.\"\n");
        assert_eq!(decision, GuardrailDecision::Allow("Reliable under crosses.".to_string()));
    }

    #[test]
    fn blank_and_quote_only_output_is_denied() {
        let policy = GuardrailPolicy::default();
        assert_eq!(policy.evaluate("   \n"), GuardrailDecision::Deny { reason_code: "empty_completion" });
        assert_eq!(policy.evaluate("\"\""), GuardrailDecision::Deny { reason_code: "empty_completion" });
    }

    #[test]
    fn code_fences_are_denied() {
        let decision = GuardrailPolicy::default().evaluate("```json\n{}\n```");
        assert_eq!(decision, GuardrailDecision::Deny { reason_code: "non_prose_completion" });
    }

    #[test]
    fn long_output_is_cut_at_a_sentence_boundary() {
        let policy = GuardrailPolicy { max_chars: 30, strip_wrapping_quotes: true };
        let decision = policy.evaluate("Strong in the air. Reads the game well and wins duels.");
        assert_eq!(decision, GuardrailDecision::Allow("Strong in the air.".to_string()));

        let decision = policy.evaluate("A very long sentence without any stop at all here");
        assert_eq!(decision, GuardrailDecision::Allow("A very long sentence without".to_string()));
    }
}
