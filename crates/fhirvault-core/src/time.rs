//! Timestamp helpers.
//!
//! Record timestamps are `time::OffsetDateTime` values, rendered as RFC 3339
//! wherever they cross a document boundary (`meta.lastUpdated`).

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current wall-clock time in UTC.
#[must_use]
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Formats a timestamp as RFC 3339 for document metadata.
///
/// Formatting an `OffsetDateTime` as RFC 3339 cannot fail for UTC values,
/// so a failure degrades to an empty string rather than poisoning a read.
#[must_use]
pub fn format_rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_format_rfc3339() {
        let ts = datetime!(2024-05-15 14:30:00 UTC);
        assert_eq!(format_rfc3339(ts), "2024-05-15T14:30:00Z");
    }

    #[test]
    fn test_now_utc_is_utc() {
        assert_eq!(now_utc().offset(), time::UtcOffset::UTC);
    }
}
