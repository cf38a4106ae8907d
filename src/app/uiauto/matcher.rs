use regex::{Regex, RegexBuilder};

use crate::app::error::AppError;

/// Case-insensitive literal substring search.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    pattern: String,
    regex: Regex,
}

impl TextMatcher {
    pub fn new(pattern: &str, trace_id: &str) -> Result<Self, AppError> {
        if pattern.is_empty() {
            return Err(AppError::validation("pattern is required", trace_id));
        }
        let regex = RegexBuilder::new(&regex::escape(pattern))
            .case_insensitive(true)
            .build()
            .map_err(|err| AppError::validation(format!("Invalid pattern: {err}"), trace_id))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}
