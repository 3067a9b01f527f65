//! Rich-text cell values and the legacy sentinel codec.
//!
//! Section mappers historically encoded formatting inside plain strings using reserved
//! sentinel tokens. [`RichText`] is the structured replacement; [`decode_cell`] turns a legacy
//! string into it and [`encode_rich_text`] goes the other way.
//!
//! Decoding applies the sentinels in a fixed order, because tokens can sit inside each other's
//! scan ranges:
//!
//! 1. `<MAIL>address</MAIL>` pairs are extracted into mailto links and removed from the text.
//! 2. `<CR>` splits the remaining text into a bullet list.
//! 3. Otherwise `<BR>` splits it into lines.
//! 4. Otherwise a leading `<B>` makes it bold.
//! 5. Otherwise a leading `xColWidthPx170` attaches a column-width hint.
//! 6. Otherwise the text is plain.
//!
//! When step 1 found links, the result is [`RichText::Links`] and steps 2–5 classify the
//! residual text held inside it.

use crate::constants::{
    BOLD_PREFIX, DATE_COLUMN_WIDTH_HINT, DATE_COLUMN_WIDTH_PX, LINE_BREAK, LIST_SEPARATOR,
    MAILTO_SCHEME, MAIL_CLOSE, MAIL_OPEN,
};
use crate::{NarrativeError, NarrativeResult};
use serde::Serialize;

/// Structured rich text for a single table cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RichText {
    /// Unformatted text.
    Plain { text: String },

    /// Text rendered with a style.
    Styled { text: String, style: TextStyle },

    /// Ordered lines separated by explicit breaks.
    Lines { lines: Vec<TextLine> },

    /// Bullet list items.
    Bullets { items: Vec<String> },

    /// Text carrying a presentation hint.
    Hinted { text: String, hint: StyleHint },

    /// Email links extracted from the cell plus whatever text remained.
    ///
    /// `residual` is never itself a `Links` value.
    Links {
        links: Vec<MailLink>,
        residual: Box<RichText>,
    },
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        RichText::Plain { text: text.into() }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        RichText::Styled {
            text: text.into(),
            style: TextStyle::Bold,
        }
    }

    /// Build a line-broken value; the first line is unbroken, every later line follows a break.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RichText::Lines {
            lines: lines
                .into_iter()
                .enumerate()
                .map(|(index, text)| TextLine {
                    text: text.into(),
                    after_break: index > 0,
                })
                .collect(),
        }
    }

    pub fn bullets<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RichText::Bullets {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach mail links to a value. Returns `residual` unchanged when `links` is empty.
    pub fn with_links(links: Vec<MailLink>, residual: RichText) -> Self {
        if links.is_empty() {
            return residual;
        }
        match residual {
            RichText::Links {
                links: inner,
                residual,
            } => {
                let mut merged = links;
                merged.extend(inner);
                RichText::Links {
                    links: merged,
                    residual,
                }
            }
            other => RichText::Links {
                links,
                residual: Box::new(other),
            },
        }
    }

    /// The text of a `Plain` value, if this is one.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            RichText::Plain { text } => Some(text),
            _ => None,
        }
    }
}

/// One line of a [`RichText::Lines`] value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextLine {
    pub text: String,

    /// `true` for every line that follows an explicit `<BR>`.
    pub after_break: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Bold,
}

/// Presentation hints that do not change text content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    /// Fixed column width in pixels (used for date columns).
    ColumnWidthPx(u32),
}

/// A mailto link extracted from a `<MAIL>…</MAIL>` span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MailLink {
    /// Link target, including the `mailto:` scheme.
    pub address: String,

    /// The bare email address shown to the reader.
    pub display: String,
}

impl MailLink {
    pub fn new(email: impl Into<String>) -> Self {
        let display = email.into();
        Self {
            address: format!("{MAILTO_SCHEME}{display}"),
            display,
        }
    }
}

/// Result of the email-extraction pass.
struct MailScan {
    links: Vec<MailLink>,
    residual: String,
    unmatched: Option<(&'static str, usize)>,
}

/// Strip every `<MAIL>…</MAIL>` pair from `raw`, collecting the enclosed addresses.
///
/// An opening marker without a closing one stops the scan and stays in the residual text, as
/// does any stray closing marker.
fn extract_mail_links(raw: &str) -> MailScan {
    let mut working = raw.to_string();
    let mut links = Vec::new();
    let mut unmatched = None;

    while let Some(open) = working.find(MAIL_OPEN) {
        let content_start = open + MAIL_OPEN.len();
        let Some(close) = working[content_start..]
            .find(MAIL_CLOSE)
            .map(|offset| content_start + offset)
        else {
            unmatched = Some((MAIL_OPEN, open));
            break;
        };

        let email = working[content_start..close].trim();
        if !email.is_empty() {
            links.push(MailLink::new(email));
        }
        working.replace_range(open..close + MAIL_CLOSE.len(), "");
    }

    if unmatched.is_none() {
        unmatched = working.find(MAIL_CLOSE).map(|position| (MAIL_CLOSE, position));
    }

    MailScan {
        links,
        residual: working,
        unmatched,
    }
}

/// Split on `separator`, dropping the empty items a trailing separator leaves behind.
fn split_trimming_trailing(text: &str, separator: &str) -> Vec<String> {
    let mut parts: Vec<String> = text.split(separator).map(str::to_string).collect();
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    parts
}

/// Classify text that no longer contains mail spans (steps 2–6).
fn classify(text: String) -> RichText {
    if text.contains(LIST_SEPARATOR) {
        // The list separator wins: any `<BR>` inside an item is kept verbatim.
        return RichText::Bullets {
            items: split_trimming_trailing(&text, LIST_SEPARATOR),
        };
    }

    if text.contains(LINE_BREAK) {
        return RichText::lines(text.split(LINE_BREAK));
    }

    if let Some(rest) = text.strip_prefix(BOLD_PREFIX) {
        return RichText::bold(rest);
    }

    if let Some(rest) = text.strip_prefix(DATE_COLUMN_WIDTH_HINT) {
        return RichText::Hinted {
            text: rest.to_string(),
            hint: StyleHint::ColumnWidthPx(DATE_COLUMN_WIDTH_PX),
        };
    }

    RichText::Plain { text }
}

fn compose(scan: MailScan) -> RichText {
    if !scan.links.is_empty() {
        tracing::debug!("extracted {} mail link(s) from cell", scan.links.len());
    }
    RichText::with_links(scan.links, classify(scan.residual))
}

/// Decode a legacy sentinel-encoded string.
///
/// Unmatched `<MAIL>`/`</MAIL>` markers are not an error here: they stay in the text and a
/// warning is logged. Use [`decode_cell_strict`] to reject them.
pub fn decode_cell(raw: &str) -> RichText {
    let scan = extract_mail_links(raw);
    if let Some((token, position)) = scan.unmatched {
        tracing::warn!(
            "unmatched sentinel {} at byte {} left in cell text",
            token,
            position
        );
    }
    compose(scan)
}

/// Decode a legacy sentinel-encoded string, rejecting unmatched mail markers.
///
/// # Errors
///
/// Returns [`NarrativeError::UnclosedSentinel`] when a `<MAIL>` has no closing `</MAIL>`, or a
/// `</MAIL>` has no opening marker. `position` is the byte offset in the text left after
/// extracting the well-formed pairs.
pub fn decode_cell_strict(raw: &str) -> NarrativeResult<RichText> {
    let scan = extract_mail_links(raw);
    if let Some((token, position)) = scan.unmatched {
        return Err(NarrativeError::UnclosedSentinel { token, position });
    }
    Ok(compose(scan))
}

/// Encode a value back into the legacy sentinel format.
///
/// Decoding the output yields the same value, except where the legacy format cannot express
/// it: a list whose last item is empty loses that item, a single line with no break reads back
/// as plain text, and plain text that happens to start with a sentinel prefix is read back as
/// styled.
pub fn encode_rich_text(value: &RichText) -> String {
    match value {
        RichText::Plain { text } => text.clone(),
        RichText::Styled {
            text,
            style: TextStyle::Bold,
        } => format!("{BOLD_PREFIX}{text}"),
        RichText::Lines { lines } => lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join(LINE_BREAK),
        RichText::Bullets { items } => {
            let joined = items.join(LIST_SEPARATOR);
            if items.len() < 2 {
                format!("{joined}{LIST_SEPARATOR}")
            } else {
                joined
            }
        }
        RichText::Hinted {
            text,
            hint: StyleHint::ColumnWidthPx(_),
        } => format!("{DATE_COLUMN_WIDTH_HINT}{text}"),
        RichText::Links { links, residual } => {
            let mut out = String::new();
            for link in links {
                out.push_str(MAIL_OPEN);
                out.push_str(&link.display);
                out.push_str(MAIL_CLOSE);
            }
            out.push_str(&encode_rich_text(residual));
            out
        }
    }
}
