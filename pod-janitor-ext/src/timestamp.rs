use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::*;

pub trait TimeExt {
    /// Convert a `metav1::Time` into a `time::OffsetDateTime`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pod_janitor_ext::{metav1, openapi, TimeExt as _};
    ///
    /// let ts = metav1::Time(openapi::jiff::Timestamp::from_second(1_714_557_600).unwrap());
    /// assert_eq!(ts.to_offset_date_time().unwrap().unix_timestamp(), 1_714_557_600);
    /// ```
    fn to_offset_date_time(&self) -> Option<OffsetDateTime>;
}

impl TimeExt for metav1::Time {
    fn to_offset_date_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(self.0.as_nanosecond()).ok()
    }
}

/// Parse an RFC3339 timestamp such as `2024-05-01T10:00:00Z`.
pub fn parse_rfc3339(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(text, &Rfc3339)
}
