//! Rendering configuration.
//!
//! Configuration is resolved once by the caller (typically at process startup) and passed into
//! the builders by reference. Nothing in this crate reads environment variables itself.

use crate::constants::{DEFAULT_DATE_FORMAT, DEFAULT_FILLER_TEXT};
use crate::{NarrativeError, NarrativeResult};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write;

/// Narrative rendering configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrativeConfig {
    filler_text: String,
    date_format: String,
    strict_sentinels: bool,
}

impl NarrativeConfig {
    /// Create a new `NarrativeConfig`.
    ///
    /// # Errors
    ///
    /// - [`NarrativeError::InvalidInput`] if `filler_text` is blank.
    /// - [`NarrativeError::InvalidDateFormat`] if `date_format` is not a valid `chrono`
    ///   strftime pattern.
    pub fn new(
        filler_text: impl Into<String>,
        date_format: impl Into<String>,
        strict_sentinels: bool,
    ) -> NarrativeResult<Self> {
        let filler_text = filler_text.into();
        if filler_text.trim().is_empty() {
            return Err(NarrativeError::InvalidInput(
                "filler_text cannot be empty".into(),
            ));
        }

        let date_format = date_format.into();
        validate_date_format(&date_format)?;

        Ok(Self {
            filler_text,
            date_format,
            strict_sentinels,
        })
    }

    pub fn filler_text(&self) -> &str {
        &self.filler_text
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Whether unclosed sentinel markers fail the build instead of staying in the text.
    pub fn strict_sentinels(&self) -> bool {
        self.strict_sentinels
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            filler_text: DEFAULT_FILLER_TEXT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            strict_sentinels: false,
        }
    }
}

fn validate_date_format(format: &str) -> NarrativeResult<()> {
    if format.trim().is_empty() {
        return Err(NarrativeError::InvalidDateFormat(
            "date format cannot be empty".into(),
        ));
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(NarrativeError::InvalidDateFormat(format.to_string()));
    }

    // Time and offset specifiers parse, but a bare date cannot render them.
    let sample = NaiveDate::default();
    write!(&mut String::new(), "{}", sample.format(format)).map_err(|_| {
        NarrativeError::InvalidDateFormat(format!("{format} needs more than a calendar date"))
    })?;

    Ok(())
}

/// Build a [`NarrativeConfig`] from optional raw values, such as environment variables.
///
/// `None` or blank values fall back to the defaults. `strict` accepts `true`/`false`,
/// `1`/`0`, and `yes`/`no` (case-insensitive).
pub fn config_from_env_values(
    filler_text: Option<String>,
    date_format: Option<String>,
    strict: Option<String>,
) -> NarrativeResult<NarrativeConfig> {
    fn non_blank(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.trim().is_empty())
    }

    let strict = match non_blank(strict) {
        None => false,
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(NarrativeError::InvalidInput(format!(
                    "strict sentinel flag must be true or false, got '{other}'"
                )))
            }
        },
    };

    NarrativeConfig::new(
        non_blank(filler_text).unwrap_or_else(|| DEFAULT_FILLER_TEXT.to_string()),
        non_blank(date_format).unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
        strict,
    )
}
