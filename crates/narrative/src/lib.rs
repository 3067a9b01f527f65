//! Clinical narrative table rendering.
//!
//! This crate turns structured clinical section data into an abstract narrative table: headers,
//! an optional caption and summary, and rows of decoded rich-text, multimedia, and hyperlink
//! cells. Serialising that table into a concrete document format belongs to the caller.
//!
//! The main pieces:
//! - [`cell`]: decodes legacy sentinel-encoded strings (`<CR>`, `<BR>`, `<B>`, `<MAIL>…</MAIL>`,
//!   `xColWidthPx170`) into [`RichText`], and encodes them back.
//! - [`table`]: the [`TableBuilder`] that assembles headers and raw rows into a [`NarrativeTable`].
//! - [`shaper`]: removes columns that carry no content under a [`ColumnPolicy`].
//! - [`chronology`]: merges diagnoses, procedures, and history items into one date-sorted table.
//! - [`wire`]: YAML input/output models for the runner.
//!
//! **No document concerns**: markup generation and per-section field selection live outside
//! this crate.

pub mod cell;
pub mod chronology;
pub mod config;
pub mod constants;
pub mod media;
pub mod shaper;
pub mod table;
pub mod wire;

pub use cell::{
    decode_cell, decode_cell_strict, encode_rich_text, MailLink, RichText, StyleHint, TextLine,
    TextStyle,
};
pub use chronology::{
    chronological_entries, history_table, ChronologicalEntry, ChronologyOptions, DateInterval,
    DateRange, DatedDiagnosis, DatedProcedure, HistoryItem,
};
pub use config::{config_from_env_values, NarrativeConfig};
pub use media::{Hyperlink, MultimediaReference};
pub use shaper::{shape_columns, ColumnPolicy};
pub use table::{NarrativeCell, NarrativeTable, RawCell, TableBuilder};
pub use wire::{history_input_parse, table_input_parse, table_render_yaml, HistoryInput, TableInput};

/// Errors returned by the `narrative` crate.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("unclosed sentinel {token} at byte {position}")]
    UnclosedSentinel {
        token: &'static str,
        position: usize,
    },

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`NarrativeError`].
pub type NarrativeResult<T> = Result<T, NarrativeError>;

/// Shape and build a table in one step.
///
/// Runs [`shape_columns`] over `headers` and `rows` under `policy`, then decodes the survivors
/// with a [`TableBuilder`]. Returns `Ok(None)` when there are no rows, since an empty table is
/// never produced.
pub fn render_table(
    config: &NarrativeConfig,
    caption: Option<String>,
    summary: Option<String>,
    mut headers: Vec<String>,
    mut rows: Vec<Vec<RawCell>>,
    policy: &ColumnPolicy,
) -> NarrativeResult<Option<NarrativeTable>> {
    if rows.is_empty() {
        return Ok(None);
    }

    shape_columns(&mut headers, &mut rows, policy);

    let mut builder = TableBuilder::new(config).headers(headers);
    if let Some(caption) = caption {
        builder = builder.caption(caption);
    }
    if let Some(summary) = summary {
        builder = builder.summary(summary);
    }
    for row in rows {
        builder = builder.row(row);
    }

    builder.build().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> RawCell {
        RawCell::Text(value.to_string())
    }

    #[test]
    fn render_table_shapes_before_building() {
        let table = render_table(
            &NarrativeConfig::default(),
            Some("Allergies".into()),
            None,
            vec!["Agent".into(), "Reaction".into(), "Comment".into()],
            vec![
                vec![text("Penicillin"), text("Rash"), RawCell::Null],
                vec![text("Latex"), text(""), RawCell::Null],
            ],
            &ColumnPolicy::removable([2]),
        )
        .expect("render")
        .expect("table");

        assert_eq!(table.caption(), Some("Allergies"));
        assert_eq!(table.headers(), ["Agent", "Reaction"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1][1], NarrativeCell::Empty);
    }

    #[test]
    fn render_table_without_rows_produces_nothing() {
        let table = render_table(
            &NarrativeConfig::default(),
            None,
            None,
            vec!["Agent".into()],
            Vec::new(),
            &ColumnPolicy::AnyEmpty,
        )
        .expect("render");
        assert!(table.is_none());
    }
}
