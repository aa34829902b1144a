/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A protocol-agnostic instant in time, with parsing/formatting for the
//! three wire formats Smithy protocols negotiate between: epoch
//! seconds, ISO-8601 (used by query/EC2/XML protocols and SigV4), and
//! RFC-1123 (used by JSON/REST-JSON `Date`/`If-Modified-Since` headers).

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::OffsetDateTime;

/// A timestamp string didn't match the RFC 3339 `date-time` production.
#[derive(Debug, thiserror::Error)]
#[error("invalid RFC 3339 timestamp {0:?}: {1}")]
pub struct ParseDateTimeError(String, time::error::Parse);

/// The wire format a [`DateTime`] should be rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Seconds since the Unix epoch, e.g. `1422172800`.
    EpochSeconds,
    /// `date-time` production from RFC 3339 / ISO 8601, e.g.
    /// `2015-01-25T08:00:00Z`. SigV4 uses the `YYYYMMDD'T'HHMMSS'Z'`
    /// basic-format variant of this.
    DateTime,
    /// SigV4's compact basic-format variant: `20150125T080000Z`.
    DateTimeBasic,
    /// `YYYYMMDD` date-only, used for the SigV4 credential scope.
    Date,
    /// RFC 1123 (`http-date`), e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
    HttpDate,
}

/// An instant in time, independent of wire representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    seconds: i64,
    subsecond_nanos: u32,
}

impl DateTime {
    pub fn from_secs(seconds: i64) -> Self {
        DateTime {
            seconds,
            subsecond_nanos: 0,
        }
    }

    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        DateTime {
            seconds: since_epoch.as_secs() as i64,
            subsecond_nanos: since_epoch.subsec_nanos(),
        }
    }

    pub fn secs(&self) -> i64 {
        self.seconds
    }

    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        Some(DateTime {
            seconds: self.seconds.checked_add(duration.as_secs() as i64)?,
            subsecond_nanos: self.subsecond_nanos,
        })
    }

    fn offset_date_time(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.seconds)
            .expect("seconds since epoch in representable range")
            .replace_nanosecond(self.subsecond_nanos)
            .expect("valid nanosecond component")
    }

    /// Parses an RFC 3339 / ISO 8601 `date-time` (the format credential
    /// expirations and most structured-body timestamps arrive in),
    /// e.g. `2024-01-01T00:00:00Z` or `2024-01-01T00:00:00.125Z`.
    pub fn parse_rfc3339(value: &str) -> Result<Self, ParseDateTimeError> {
        let odt = OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|e| ParseDateTimeError(value.to_string(), e))?;
        Ok(DateTime {
            seconds: odt.unix_timestamp(),
            subsecond_nanos: odt.nanosecond(),
        })
    }

    pub fn fmt(&self, format: Format) -> String {
        let odt = self.offset_date_time();
        match format {
            Format::EpochSeconds => self.seconds.to_string(),
            Format::DateTime => odt
                .format(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
                ))
                .expect("well-known format"),
            Format::DateTimeBasic => odt
                .format(format_description!(
                    "[year][month][day]T[hour][minute][second]Z"
                ))
                .expect("well-known format"),
            Format::Date => odt
                .format(format_description!("[year][month][day]"))
                .expect("well-known format"),
            Format::HttpDate => odt.format(&Rfc2822).expect("rfc2822 formattable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sigv4_reference_timestamp() {
        // 2015-08-30T12:36:00Z, the AWS SigV4 reference-suite timestamp.
        let dt = DateTime::from_secs(1440938160);
        assert_eq!(dt.fmt(Format::DateTimeBasic), "20150830T123600Z");
        assert_eq!(dt.fmt(Format::Date), "20150830");
        assert_eq!(dt.fmt(Format::DateTime), "2015-08-30T12:36:00Z");
    }

    #[test]
    fn parses_rfc3339_round_trip() {
        let dt = DateTime::parse_rfc3339("2015-08-30T12:36:00Z").unwrap();
        assert_eq!(dt.secs(), 1440938160);
        assert_eq!(dt.fmt(Format::DateTime), "2015-08-30T12:36:00Z");
    }

    #[test]
    fn rejects_malformed_timestamp() {
        assert!(DateTime::parse_rfc3339("not-a-date").is_err());
    }

    #[test]
    fn epoch_seconds_round_trip() {
        let dt = DateTime::from_secs(1_000_000_000);
        assert_eq!(dt.fmt(Format::EpochSeconds), "1000000000");
    }
}
