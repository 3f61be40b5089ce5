//! Prompt assembly for scenario and slogan requests.

/// Instruction sent with the product image when asking for a slogan.
pub const SLOGAN_PROMPT: &str = "Based on this product image, generate a short, catchy marketing slogan. The slogan should be 5-10 words long. Only return the slogan text, without any quotes or extra formatting.";

/// Returns the slogan when it has visible content, `None` for absent or blank input.
pub fn normalize_slogan(slogan: Option<&str>) -> Option<&str> {
    slogan.filter(|s| !s.trim().is_empty())
}

/// Merge a scenario template with an optional slogan.
///
/// A blank slogan leaves the template untouched. Otherwise exactly one clause
/// is appended, quoting the slogan as the caller supplied it.
pub fn effective_prompt(template: &str, slogan: Option<&str>) -> String {
    match normalize_slogan(slogan) {
        Some(slogan) => format!(
            "{template} The ad must visibly include the marketing slogan text: \"{slogan}\""
        ),
        None => template.to_string(),
    }
}

/// Clean a model-written slogan: trim it and drop one pair of wrapping quotes.
///
/// A reply made only of quote characters cleans to an empty string.
pub fn clean_slogan(raw: &str) -> String {
    const QUOTES: [char; 4] = ['"', '\'', '“', '”'];

    let trimmed = raw.trim();
    if trimmed.chars().all(|c| QUOTES.contains(&c)) {
        return String::new();
    }
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "Place this product on a billboard.";

    #[test]
    fn test_blank_slogan_is_same_as_none() {
        for slogan in [None, Some(""), Some("   "), Some("\n\t")] {
            assert_eq!(effective_prompt(TEMPLATE, slogan), TEMPLATE);
        }
    }

    #[test]
    fn test_slogan_clause_appended_once_verbatim() {
        let prompt = effective_prompt(TEMPLATE, Some("Just Do It"));
        assert!(prompt.starts_with(TEMPLATE));
        assert_eq!(prompt.matches("Just Do It").count(), 1);
        assert_eq!(
            prompt,
            "Place this product on a billboard. The ad must visibly include the marketing slogan text: \"Just Do It\""
        );
    }

    #[test]
    fn test_clean_slogan_strips_wrapping_quotes() {
        assert_eq!(clean_slogan("  \"Fresh Every Morning\"\n"), "Fresh Every Morning");
        assert_eq!(clean_slogan("'Built to Last'"), "Built to Last");
        assert_eq!(clean_slogan("“Taste the Future”"), "Taste the Future");
        assert_eq!(clean_slogan("Say \"hi\" more"), "Say \"hi\" more");
    }

    #[test]
    fn test_quotes_only_reply_cleans_to_empty() {
        for raw in ["\"", " ' ", "\"\"", "“”", "”"] {
            assert_eq!(clean_slogan(raw), "", "raw {raw:?}");
        }
    }
}
