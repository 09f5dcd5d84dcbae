//! Prompt validation.
//!
//! A [`Prompt`] can only be built through [`Prompt::parse`], so holding one
//! means the text is trimmed, non-empty and within [`MAX_PROMPT_CHARS`].

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Maximum prompt length in Unicode scalar values.
pub const MAX_PROMPT_CHARS: usize = 400;

/// Message returned when the prompt is missing or blank.
pub const PROMPT_REQUIRED: &str = "Prompt is required.";

/// A validated, trimmed image prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    /// Trim and validate raw user input.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(PROMPT_REQUIRED.to_string()));
        }

        let chars = trimmed.chars().count();
        if chars > MAX_PROMPT_CHARS {
            return Err(CoreError::Validation(format!(
                "Prompt exceeds maximum length of {MAX_PROMPT_CHARS} characters (got {chars})"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Like [`Prompt::parse`], treating `None` as a missing prompt.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, CoreError> {
        Self::parse(raw.unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
