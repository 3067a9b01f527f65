//! Narrative table assembly.
//!
//! A [`TableBuilder`] takes column headers and rows of [`RawCell`] values and produces an
//! immutable [`NarrativeTable`]. String cells are decoded through [`crate::cell`]; multimedia
//! and hyperlink cells are embedded as-is.

use crate::cell::{decode_cell, decode_cell_strict, RichText};
use crate::config::NarrativeConfig;
use crate::media::{Hyperlink, MultimediaReference};
use crate::NarrativeResult;
use serde::Serialize;

/// A cell value as supplied by a section mapper, before decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawCell {
    /// No value.
    Null,

    /// Text, possibly containing legacy sentinel tokens.
    Text(String),

    Multimedia(MultimediaReference),

    MultimediaList(Vec<MultimediaReference>),

    Hyperlink(Hyperlink),
}

impl RawCell {
    /// Whether this cell counts as content when deciding which columns to keep.
    ///
    /// Non-text values always count, even an empty multimedia list.
    pub fn has_content(&self) -> bool {
        match self {
            RawCell::Null => false,
            RawCell::Text(text) => !text.is_empty(),
            RawCell::Multimedia(_) | RawCell::MultimediaList(_) | RawCell::Hyperlink(_) => true,
        }
    }

    /// Whether this cell carries multimedia, which is rendered outside the row.
    pub fn is_multimedia(&self) -> bool {
        matches!(self, RawCell::Multimedia(_) | RawCell::MultimediaList(_))
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        RawCell::Text(value)
    }
}

impl From<Option<String>> for RawCell {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawCell::Null, RawCell::Text)
    }
}

impl From<MultimediaReference> for RawCell {
    fn from(value: MultimediaReference) -> Self {
        RawCell::Multimedia(value)
    }
}

impl From<Vec<MultimediaReference>> for RawCell {
    fn from(value: Vec<MultimediaReference>) -> Self {
        RawCell::MultimediaList(value)
    }
}

impl From<Hyperlink> for RawCell {
    fn from(value: Hyperlink) -> Self {
        RawCell::Hyperlink(value)
    }
}

/// A decoded table cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NarrativeCell {
    Empty,
    Text(RichText),
    Multimedia(MultimediaReference),
    MultimediaList(Vec<MultimediaReference>),
    Hyperlink(Hyperlink),
}

impl NarrativeCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, NarrativeCell::Empty)
    }
}

/// An immutable narrative table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NarrativeTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,

    headers: Vec<String>,

    rows: Vec<Vec<NarrativeCell>>,
}

impl NarrativeTable {
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<NarrativeCell>] {
        &self.rows
    }
}

/// Builder for [`NarrativeTable`].
#[derive(Debug)]
pub struct TableBuilder<'a> {
    config: &'a NarrativeConfig,
    caption: Option<String>,
    summary: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

impl<'a> TableBuilder<'a> {
    pub fn new(config: &'a NarrativeConfig) -> Self {
        Self {
            config,
            caption: None,
            summary: None,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Append a row. Its cells must line up with the headers.
    pub fn row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<RawCell>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Decode every row and produce the table.
    ///
    /// A row with more than one cell, at least one multimedia cell, and an empty last cell gets
    /// the configured filler text in that last cell, since its multimedia is shown elsewhere.
    ///
    /// # Errors
    ///
    /// With [`NarrativeConfig::strict_sentinels`] set, returns
    /// [`crate::NarrativeError::UnclosedSentinel`] for the first text cell holding an unmatched
    /// mail marker.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if headers were given and a row's length differs from them.
    pub fn build(self) -> NarrativeResult<NarrativeTable> {
        let mut rows = Vec::with_capacity(self.rows.len());

        for raw_row in self.rows {
            debug_assert!(
                self.headers.is_empty() || raw_row.len() == self.headers.len(),
                "row has {} cells but table has {} headers",
                raw_row.len(),
                self.headers.len()
            );

            let bears_multimedia = raw_row.iter().any(RawCell::is_multimedia);
            let mut cells = raw_row
                .into_iter()
                .map(|cell| decode_raw_cell(self.config, cell))
                .collect::<NarrativeResult<Vec<_>>>()?;

            if cells.len() > 1 && bears_multimedia {
                if let Some(last) = cells.last_mut().filter(|cell| cell.is_empty()) {
                    *last = NarrativeCell::Text(RichText::plain(self.config.filler_text()));
                }
            }

            rows.push(cells);
        }

        Ok(NarrativeTable {
            caption: self.caption,
            summary: self.summary,
            headers: self.headers,
            rows,
        })
    }
}

fn decode_raw_cell(config: &NarrativeConfig, cell: RawCell) -> NarrativeResult<NarrativeCell> {
    Ok(match cell {
        RawCell::Null => NarrativeCell::Empty,
        RawCell::Text(text) if text.is_empty() => NarrativeCell::Empty,
        RawCell::Text(text) if config.strict_sentinels() => {
            NarrativeCell::Text(decode_cell_strict(&text)?)
        }
        RawCell::Text(text) => NarrativeCell::Text(decode_cell(&text)),
        RawCell::Multimedia(media) => NarrativeCell::Multimedia(media),
        RawCell::MultimediaList(media) => NarrativeCell::MultimediaList(media),
        RawCell::Hyperlink(link) => NarrativeCell::Hyperlink(link),
    })
}
