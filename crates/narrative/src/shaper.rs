//! Column shaping: dropping columns that carry no content.
//!
//! Mandatory columns (for example an identifying label) stay visible even when empty for every
//! row, unless the caller marks them as droppable. Optional context columns (for example a
//! comment) collapse away when unused.

use crate::table::RawCell;
use std::collections::BTreeSet;

/// Which empty columns [`shape_columns`] may remove.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Every column without content is removed.
    #[default]
    AnyEmpty,

    /// Only the listed columns are removed when empty. Indices refer to the column positions
    /// as passed in, before any removal.
    Removable(BTreeSet<usize>),
}

impl ColumnPolicy {
    pub fn removable(indices: impl IntoIterator<Item = usize>) -> Self {
        ColumnPolicy::Removable(indices.into_iter().collect())
    }

    fn allows(&self, column: usize) -> bool {
        match self {
            ColumnPolicy::AnyEmpty => true,
            ColumnPolicy::Removable(indices) => indices.contains(&column),
        }
    }
}

/// Remove eligible columns that have no content in any row.
///
/// A column has content when any row holds a non-empty string or any non-text value there.
/// Columns are removed one at a time, leftmost first, from the headers and every row together;
/// the scan restarts after each removal until no eligible empty column remains.
///
/// Returns the original indices of the removed columns, in removal order.
///
/// Rows are expected to have one cell per header.
pub fn shape_columns(
    headers: &mut Vec<String>,
    rows: &mut [Vec<RawCell>],
    policy: &ColumnPolicy,
) -> Vec<usize> {
    // Position in the current columns -> position in the columns as passed in.
    let mut original: Vec<usize> = (0..headers.len()).collect();
    let mut removed = Vec::new();

    loop {
        let candidate = (0..headers.len()).find(|&column| {
            policy.allows(original[column])
                && !rows
                    .iter()
                    .any(|row| row.get(column).is_some_and(RawCell::has_content))
        });
        let Some(column) = candidate else {
            break;
        };

        let header = headers.remove(column);
        for row in rows.iter_mut() {
            if column < row.len() {
                row.remove(column);
            }
        }
        let original_index = original.remove(column);
        tracing::debug!(
            "removed empty column '{}' (original index {})",
            header,
            original_index
        );
        removed.push(original_index);
    }

    removed
}
