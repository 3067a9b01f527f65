//! YAML wire models for table and history input, and table output.
//!
//! Input files are strict: unknown keys are rejected and schema mismatches report the path of
//! the failing field (for example `rows[1][0]`). The wire structs stay private; callers get the
//! domain-level [`TableInput`] and [`HistoryInput`].
//!
//! A table input cell is either `null`, a scalar (strings may carry sentinel tokens; numbers and
//! booleans are taken as their text), or a single-key mapping:
//!
//! ```yaml
//! headers: [Study, Image, Report]
//! removable: [2]
//! rows:
//!   - - CXR
//!     - media:
//!         id: 6f1c2a7e-3d55-4f6e-9d0b-2b7f0f5c9a11
//!         media_type: image/png
//!         path: ./attachments/cxr.png
//!     - null
//!   - - Leaflet
//!     - link: { href: "https://example.org", text: Asthma leaflet }
//!     - "<B>Reviewed"
//! ```

use crate::chronology::{ChronologyOptions, DatedDiagnosis, DatedProcedure, HistoryItem};
use crate::media::{Hyperlink, MultimediaReference};
use crate::shaper::ColumnPolicy;
use crate::table::{NarrativeTable, RawCell};
use crate::{NarrativeError, NarrativeResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Domain-level table input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableInput {
    pub caption: Option<String>,
    pub summary: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,

    /// `AnyEmpty` when the file has no `removable` key.
    pub policy: ColumnPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableInputWire {
    #[serde(default)]
    caption: Option<String>,

    #[serde(default)]
    summary: Option<String>,

    headers: Vec<String>,

    #[serde(default)]
    rows: Vec<Vec<Option<CellWire>>>,

    #[serde(default)]
    removable: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellWire {
    Text(String),
    Number(serde_yaml::Number),
    Bool(bool),
    Object(CellObjectWire),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CellObjectWire {
    Media(MultimediaReference),
    MediaList(Vec<MultimediaReference>),
    Link(Hyperlink),
}

impl From<Option<CellWire>> for RawCell {
    fn from(cell: Option<CellWire>) -> Self {
        match cell {
            None => RawCell::Null,
            Some(CellWire::Text(text)) => RawCell::Text(text),
            Some(CellWire::Number(number)) => RawCell::Text(number.to_string()),
            Some(CellWire::Bool(value)) => RawCell::Text(value.to_string()),
            Some(CellWire::Object(CellObjectWire::Media(media))) => RawCell::Multimedia(media),
            Some(CellWire::Object(CellObjectWire::MediaList(media))) => {
                RawCell::MultimediaList(media)
            }
            Some(CellWire::Object(CellObjectWire::Link(link))) => RawCell::Hyperlink(link),
        }
    }
}

impl TryFrom<TableInputWire> for TableInput {
    type Error = NarrativeError;

    fn try_from(wire: TableInputWire) -> Result<Self, Self::Error> {
        let columns = wire.headers.len();

        if let Some((index, row)) = wire
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns)
        {
            return Err(NarrativeError::InvalidInput(format!(
                "row {index} has {} cells but there are {columns} headers",
                row.len()
            )));
        }

        let policy = match wire.removable {
            None => ColumnPolicy::AnyEmpty,
            Some(indices) => {
                if let Some(index) = indices.iter().find(|&&index| index >= columns) {
                    return Err(NarrativeError::InvalidInput(format!(
                        "removable column {index} is out of range for {columns} headers"
                    )));
                }
                ColumnPolicy::removable(indices)
            }
        };

        Ok(TableInput {
            caption: wire.caption,
            summary: wire.summary,
            headers: wire.headers,
            rows: wire
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(RawCell::from).collect())
                .collect(),
            policy,
        })
    }
}

/// Domain-level history input for the chronological merger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryInput {
    #[serde(default)]
    pub caption: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    /// Label, date, and comment headers; the defaults apply when absent.
    #[serde(default)]
    pub headers: Option<[String; 3]>,

    #[serde(default)]
    pub omit_open_marker: bool,

    #[serde(default)]
    pub diagnoses: Vec<DatedDiagnosis>,

    #[serde(default)]
    pub procedures: Vec<DatedProcedure>,

    #[serde(default)]
    pub history: Vec<HistoryItem>,
}

impl HistoryInput {
    pub fn options(&self) -> ChronologyOptions {
        let defaults = ChronologyOptions::default();
        ChronologyOptions {
            caption: self.caption.clone(),
            summary: self.summary.clone(),
            headers: self.headers.clone().unwrap_or(defaults.headers),
            omit_open_interval_marker: self.omit_open_marker,
        }
    }
}

/// Deserialise YAML, reporting the path of the first field that does not match `T`.
fn parse_yaml<T: DeserializeOwned>(yaml_text: &str, what: &str) -> NarrativeResult<T> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    serde_path_to_error::deserialize::<_, T>(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>"
        } else {
            path.as_str()
        };
        NarrativeError::Translation(format!("{what} schema mismatch at {path}: {source}"))
    })
}

/// Parse a table input file.
///
/// # Errors
///
/// - [`NarrativeError::Translation`] if the YAML does not match the table input schema.
/// - [`NarrativeError::InvalidInput`] if a row's length differs from the header count, or a
///   removable index has no column.
pub fn table_input_parse(yaml_text: &str) -> NarrativeResult<TableInput> {
    parse_yaml::<TableInputWire>(yaml_text, "table input")?.try_into()
}

/// Parse a history input file.
///
/// # Errors
///
/// Returns [`NarrativeError::Translation`] if the YAML does not match the history input schema.
pub fn history_input_parse(yaml_text: &str) -> NarrativeResult<HistoryInput> {
    parse_yaml(yaml_text, "history input")
}

/// Render a built table as YAML.
///
/// # Errors
///
/// Returns [`NarrativeError::InvalidYaml`] if serialisation fails.
pub fn table_render_yaml(table: &NarrativeTable) -> NarrativeResult<String> {
    Ok(serde_yaml::to_string(table)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NarrativeConfig;
    use crate::table::TableBuilder;
    use chrono::NaiveDate;
    use uuid::Uuid;

    const TABLE_YAML: &str = r#"
caption: Imaging
headers: [Study, Image, Report]
removable: [2]
rows:
  - - CXR
    - media:
        id: 6f1c2a7e-3d55-4f6e-9d0b-2b7f0f5c9a11
        media_type: image/png
        path: ./attachments/cxr.png
    - null
  - - 42
    - link: { href: "https://example.org", text: Asthma leaflet }
    - "<B>Reviewed"
  - - true
    - media_list: []
    -
"#;

    #[test]
    fn parses_mixed_cells() {
        let input = table_input_parse(TABLE_YAML).expect("parse");

        assert_eq!(input.caption.as_deref(), Some("Imaging"));
        assert_eq!(input.summary, None);
        assert_eq!(input.headers, ["Study", "Image", "Report"]);
        assert_eq!(input.policy, ColumnPolicy::removable([2]));

        assert_eq!(input.rows[0][0], RawCell::from("CXR"));
        let RawCell::Multimedia(media) = &input.rows[0][1] else {
            panic!("expected multimedia");
        };
        assert_eq!(
            media.id,
            Uuid::parse_str("6f1c2a7e-3d55-4f6e-9d0b-2b7f0f5c9a11").expect("uuid")
        );
        assert_eq!(media.caption, None);
        assert_eq!(input.rows[0][2], RawCell::Null);

        assert_eq!(input.rows[1][0], RawCell::from("42"));
        assert_eq!(
            input.rows[1][1],
            RawCell::Hyperlink(Hyperlink {
                href: "https://example.org".into(),
                text: "Asthma leaflet".into(),
            })
        );
        assert_eq!(input.rows[1][2], RawCell::from("<B>Reviewed"));

        assert_eq!(input.rows[2][0], RawCell::from("true"));
        assert_eq!(input.rows[2][1], RawCell::MultimediaList(Vec::new()));
        assert_eq!(input.rows[2][2], RawCell::Null);
    }

    #[test]
    fn missing_removable_means_any_empty_column() {
        let input = table_input_parse("headers: [A]\nrows: [[x]]\n").expect("parse");
        assert_eq!(input.policy, ColumnPolicy::AnyEmpty);
    }

    #[test]
    fn rejects_unknown_keys_with_path() {
        let err = table_input_parse("headers: [A]\ncolour: red\n").expect_err("should reject");
        assert!(
            matches!(&err, NarrativeError::Translation(msg) if msg.contains("colour")),
            "unexpected error: {err}"
        );

        let yaml = "headers: [A]\nrows:\n  - - media: { id: not-a-uuid, media_type: x, path: y }\n";
        let err = table_input_parse(yaml).expect_err("should reject");
        assert!(
            matches!(&err, NarrativeError::Translation(msg) if msg.contains("rows[0][0]")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_row_length_mismatch() {
        let err = table_input_parse("headers: [A, B]\nrows: [[x]]\n").expect_err("should reject");
        assert!(
            matches!(err, NarrativeError::InvalidInput(msg) if msg.contains("row 0 has 1 cells"))
        );
    }

    #[test]
    fn rejects_out_of_range_removable_column() {
        let err = table_input_parse("headers: [A]\nremovable: [3]\n").expect_err("should reject");
        assert!(
            matches!(err, NarrativeError::InvalidInput(msg) if msg.contains("removable column 3"))
        );
    }

    #[test]
    fn parses_history_input() {
        let yaml = r#"
caption: Past medical history
omit_open_marker: true
diagnoses:
  - label: Asthma
    onset: 2020-01-01
    ongoing: true
procedures:
  - label: Appendicectomy
    interval: { low: 2015-05-01, high: 2015-05-03 }
history:
  - label: Smoker
    duration: { start: 2001-01-01, end: 2010-06-01 }
    comment: 20 per day
"#;
        let input = history_input_parse(yaml).expect("parse");

        assert_eq!(input.diagnoses.len(), 1);
        assert_eq!(
            input.diagnoses[0].onset,
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
        assert!(input.diagnoses[0].ongoing);
        assert_eq!(
            input.procedures[0].interval.high,
            NaiveDate::from_ymd_opt(2015, 5, 3)
        );
        assert_eq!(input.history[0].comment.as_deref(), Some("20 per day"));

        let options = input.options();
        assert!(options.omit_open_interval_marker);
        assert_eq!(options.caption.as_deref(), Some("Past medical history"));
        assert_eq!(options.headers, ChronologyOptions::default().headers);
    }

    #[test]
    fn history_input_rejects_unknown_item_fields() {
        let yaml = "diagnoses:\n  - label: Asthma\n    severity: mild\n";
        let err = history_input_parse(yaml).expect_err("should reject");
        assert!(
            matches!(&err, NarrativeError::Translation(msg) if msg.contains("diagnoses[0]")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn renders_table_yaml() {
        let config = NarrativeConfig::default();
        let table = TableBuilder::new(&config)
            .caption("Contacts")
            .headers(["Name", "Email"])
            .row(["Dr Jones", "<MAIL>jones@gp.org</MAIL>"])
            .build()
            .expect("build");

        let yaml = table_render_yaml(&table).expect("render");
        assert!(yaml.contains("caption: Contacts"));
        assert!(yaml.contains("- Name"));
        assert!(yaml.contains("kind: links"));
        assert!(yaml.contains("address: mailto:jones@gp.org"));
    }
}
