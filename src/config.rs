//! Report options shared by the library and the CLI.

use chrono::{Local, NaiveDateTime};

use crate::types::timestamp_from_f64;

/// Default number of words listed by the frequency report.
pub const DEFAULT_TOP_WORDS: usize = 50;
/// Default number of list elements whose type is shown by the structure report.
pub const DEFAULT_MAX_LIST_ITEMS: usize = 3;
/// Default number of characters previewed for string values.
pub const DEFAULT_PREVIEW_CHARS: usize = 50;

/// Time zone used to bucket and display epoch timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportZone {
    /// The machine's local time zone.
    #[default]
    Local,
    Utc,
}

impl ReportZone {
    /// Wall-clock time of `ts` in this zone, or `None` when it is out of range.
    pub fn localize(self, ts: f64) -> Option<NaiveDateTime> {
        let utc = timestamp_from_f64(ts)?;
        Some(match self {
            ReportZone::Local => utc.with_timezone(&Local).naive_local(),
            ReportZone::Utc => utc.naive_utc(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub zone: ReportZone,
    pub top_words: usize,
    pub max_list_items: usize,
    pub preview_chars: usize,
    /// Render message content as styled Markdown instead of raw text.
    pub styled: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            zone: ReportZone::Local,
            top_words: DEFAULT_TOP_WORDS,
            max_list_items: DEFAULT_MAX_LIST_ITEMS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            styled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn utc_zone_is_exact() {
        let dt = ReportZone::Utc.localize(1_700_000_000.0).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 11, 14));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (22, 13, 20));
    }

    #[test]
    fn out_of_range_timestamps_do_not_localize() {
        assert!(ReportZone::Utc.localize(f64::INFINITY).is_none());
        assert!(ReportZone::Utc.localize(1e300).is_none());
    }
}
