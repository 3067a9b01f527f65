//! Constants used throughout the narrative crate.
//!
//! The sentinel tokens must match the legacy producers byte for byte.

/// List/paragraph separator.
pub const LIST_SEPARATOR: &str = "<CR>";

/// Forced line break.
pub const LINE_BREAK: &str = "<BR>";

/// Bold-style prefix marker.
pub const BOLD_PREFIX: &str = "<B>";

/// Opening email span marker.
pub const MAIL_OPEN: &str = "<MAIL>";

/// Closing email span marker.
pub const MAIL_CLOSE: &str = "</MAIL>";

/// Date-column width hint prefix.
pub const DATE_COLUMN_WIDTH_HINT: &str = "xColWidthPx170";

/// Width in pixels carried by [`DATE_COLUMN_WIDTH_HINT`].
pub const DATE_COLUMN_WIDTH_PX: u32 = 170;

/// URI scheme prepended to extracted email addresses.
pub const MAILTO_SCHEME: &str = "mailto:";

/// Filler placed in the last cell of a row whose multimedia is rendered elsewhere.
pub const DEFAULT_FILLER_TEXT: &str = "See above..";

/// Default `chrono` format for dates in history tables.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Marker for items without an end date.
pub const ONGOING_LABEL: &str = "(ongoing)";

/// Separator between the start and end of a displayed interval.
pub const INTERVAL_ARROW: &str = " → ";

/// Default headers of the merged history table: label, date, comment.
pub const DEFAULT_HISTORY_HEADERS: [&str; 3] = ["Description", "Date", "Comment"];

/// Index of the comment column in the merged history table.
pub const HISTORY_COMMENT_COLUMN: usize = 2;
