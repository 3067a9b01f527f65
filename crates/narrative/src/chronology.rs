//! Chronological merging of clinical history.
//!
//! Diagnoses, procedures, and history items carry their dates in different shapes. This module
//! derives a single effective date and a display string for each, merges them into one list
//! sorted most recent first, and renders the result as a three-column table
//! (label, date, comment).
//!
//! Effective dates exist only for ordering. Two sentinels sit above every real date:
//! [`NaiveDate::MAX`] for items with no usable date at all, and the day before it for ongoing
//! items with no usable date. Sorting descending therefore puts undated items first, then
//! undated ongoing items, then everything with a real date.

use crate::config::NarrativeConfig;
use crate::constants::{
    DEFAULT_HISTORY_HEADERS, HISTORY_COMMENT_COLUMN, INTERVAL_ARROW, ONGOING_LABEL,
};
use crate::shaper::ColumnPolicy;
use crate::table::{NarrativeTable, RawCell};
use crate::{render_table, NarrativeResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A diagnosis dated by onset and resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatedDiagnosis {
    pub label: String,

    #[serde(default)]
    pub onset: Option<NaiveDate>,

    #[serde(default)]
    pub resolution: Option<NaiveDate>,

    /// The condition has not resolved.
    #[serde(default)]
    pub ongoing: bool,

    #[serde(default)]
    pub comment: Option<String>,
}

/// Interval bounds as recorded on a procedure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateInterval {
    #[serde(default)]
    pub low: Option<NaiveDate>,

    #[serde(default)]
    pub high: Option<NaiveDate>,

    #[serde(default)]
    pub center: Option<NaiveDate>,
}

/// A procedure dated by an interval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatedProcedure {
    pub label: String,

    #[serde(default)]
    pub interval: DateInterval,

    #[serde(default)]
    pub ongoing: bool,

    #[serde(default)]
    pub comment: Option<String>,
}

/// Start and end of a duration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,

    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// A past-history item dated by a duration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryItem {
    pub label: String,

    #[serde(default)]
    pub duration: DateRange,

    #[serde(default)]
    pub ongoing: bool,

    #[serde(default)]
    pub comment: Option<String>,
}

/// One merged row: effective date plus label, date display, and comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChronologicalEntry {
    pub sort_key: NaiveDate,
    pub fields: [String; 3],
}

/// Caller choices for the merged history table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChronologyOptions {
    pub caption: Option<String>,
    pub summary: Option<String>,
    pub headers: [String; 3],

    /// Show an open interval as just its start date instead of `start → `.
    pub omit_open_interval_marker: bool,
}

impl Default for ChronologyOptions {
    fn default() -> Self {
        Self {
            caption: None,
            summary: None,
            headers: DEFAULT_HISTORY_HEADERS.map(str::to_string),
            omit_open_interval_marker: false,
        }
    }
}

/// Sort key for ongoing items without a usable date.
fn ongoing_sort_key() -> NaiveDate {
    NaiveDate::MAX.pred_opt().unwrap_or(NaiveDate::MAX)
}

struct DateDisplay<'a> {
    format: &'a str,
    omit_open_marker: bool,
}

impl DateDisplay<'_> {
    fn date(&self, date: NaiveDate) -> String {
        date.format(self.format).to_string()
    }

    fn closed(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!("{}{INTERVAL_ARROW}{}", self.date(start), self.date(end))
    }

    fn open(&self, start: NaiveDate) -> String {
        if self.omit_open_marker {
            self.date(start)
        } else {
            format!("{}{INTERVAL_ARROW}", self.date(start))
        }
    }

    fn ongoing_from(&self, start: NaiveDate) -> String {
        format!("{}{INTERVAL_ARROW}{ONGOING_LABEL}", self.date(start))
    }

    /// Effective date and display for a start/end pair.
    fn span(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        ongoing: bool,
    ) -> (NaiveDate, String) {
        match (start, end) {
            (Some(start), Some(end)) => (start, self.closed(start, end)),
            (None, Some(end)) => (end, self.date(end)),
            (Some(start), None) if ongoing => (start, self.ongoing_from(start)),
            (Some(start), None) => (start, self.open(start)),
            (None, None) if ongoing => (ongoing_sort_key(), ONGOING_LABEL.to_string()),
            (None, None) => (NaiveDate::MAX, String::new()),
        }
    }

    /// Effective date and display for a procedure interval.
    fn interval(&self, interval: &DateInterval, ongoing: bool) -> (NaiveDate, String) {
        if ongoing {
            return match interval.low {
                Some(low) => (low, self.ongoing_from(low)),
                None => (ongoing_sort_key(), ONGOING_LABEL.to_string()),
            };
        }

        let sort_key = interval
            .high
            .or(interval.low)
            .or(interval.center)
            .unwrap_or(NaiveDate::MAX);

        let display = match (interval.low, interval.high, interval.center) {
            (Some(low), Some(high), _) => self.closed(low, high),
            (Some(low), None, _) => self.open(low),
            (None, Some(high), _) => self.date(high),
            (None, None, Some(center)) => self.date(center),
            (None, None, None) => String::new(),
        };

        (sort_key, display)
    }
}

fn entry(
    label: &str,
    (sort_key, when): (NaiveDate, String),
    comment: &Option<String>,
) -> ChronologicalEntry {
    ChronologicalEntry {
        sort_key,
        fields: [
            label.to_string(),
            when,
            comment.clone().unwrap_or_default(),
        ],
    }
}

/// Derive and merge entries for all three item kinds, most recent first.
///
/// The sort is stable: entries with equal effective dates keep their input order, diagnoses
/// before procedures before history items.
pub fn chronological_entries(
    config: &NarrativeConfig,
    diagnoses: &[DatedDiagnosis],
    procedures: &[DatedProcedure],
    history: &[HistoryItem],
    options: &ChronologyOptions,
) -> Vec<ChronologicalEntry> {
    let display = DateDisplay {
        format: config.date_format(),
        omit_open_marker: options.omit_open_interval_marker,
    };

    let mut entries = Vec::with_capacity(diagnoses.len() + procedures.len() + history.len());

    entries.extend(diagnoses.iter().map(|diagnosis| {
        entry(
            &diagnosis.label,
            display.span(diagnosis.onset, diagnosis.resolution, diagnosis.ongoing),
            &diagnosis.comment,
        )
    }));

    entries.extend(procedures.iter().map(|procedure| {
        entry(
            &procedure.label,
            display.interval(&procedure.interval, procedure.ongoing),
            &procedure.comment,
        )
    }));

    entries.extend(history.iter().map(|item| {
        entry(
            &item.label,
            display.span(item.duration.start, item.duration.end, item.ongoing),
            &item.comment,
        )
    }));

    entries.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));

    tracing::debug!(
        "merged {} diagnoses, {} procedures, {} history items",
        diagnoses.len(),
        procedures.len(),
        history.len()
    );

    entries
}

/// Merge all three item kinds into one history table.
///
/// The comment column is dropped when no entry has a comment; the label and date columns are
/// always kept. Returns `Ok(None)` when there is nothing to show.
///
/// # Errors
///
/// Propagates decode errors from the table builder (strict sentinel mode only).
pub fn history_table(
    config: &NarrativeConfig,
    diagnoses: &[DatedDiagnosis],
    procedures: &[DatedProcedure],
    history: &[HistoryItem],
    options: &ChronologyOptions,
) -> NarrativeResult<Option<NarrativeTable>> {
    let rows: Vec<Vec<RawCell>> =
        chronological_entries(config, diagnoses, procedures, history, options)
            .into_iter()
            .map(|entry| entry.fields.into_iter().map(RawCell::Text).collect())
            .collect();

    render_table(
        config,
        options.caption.clone(),
        options.summary.clone(),
        options.headers.to_vec(),
        rows,
        &ColumnPolicy::removable([HISTORY_COMMENT_COLUMN]),
    )
}
