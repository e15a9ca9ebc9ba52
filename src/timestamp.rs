use crate::error::N26Error;
use chrono::{DateTime, NaiveDate, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Europe::Berlin;
use chrono_tz::Tz;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// The bank reports timestamps as epoch milliseconds written in its home
/// civil calendar, not in UTC.
const HOME_ZONE: Tz = Berlin;

/// An absolute instant decoded from the bank's wire format.
///
/// The default value is the "unset" sentinel used for optional date-range
/// bounds; it is distinguishable from every decoded timestamp via
/// [`Timestamp::is_unset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp(Option<DateTime<Utc>>);

impl Timestamp {
    /// The unset sentinel.
    pub const UNSET: Timestamp = Timestamp(None);

    /// Decode a wire value: reinterpret the millisecond count as home-zone
    /// civil time and re-anchor it to the equivalent absolute instant.
    ///
    /// The offset is taken at the decoded civil moment, so values on either
    /// side of a daylight-saving transition shift by different amounts.
    pub fn from_millis(millis: i64) -> Result<Self, N26Error> {
        let unadjusted = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| N26Error::InvalidTimestamp(millis.to_string()))?;
        let offset = zone_offset_seconds(&unadjusted);
        let adjusted = unadjusted
            .checked_sub_signed(TimeDelta::seconds(offset))
            .ok_or_else(|| N26Error::InvalidTimestamp(millis.to_string()))?;
        Ok(Timestamp(Some(adjusted)))
    }

    /// Parse the textual wire form. The literal `null` and the empty string
    /// leave the value unset; a malformed numeric literal is an error.
    pub fn parse_wire(raw: &str) -> Result<Self, N26Error> {
        let trimmed = raw.trim().trim_matches('"');
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Timestamp::UNSET);
        }
        let millis: i64 = trimmed
            .parse()
            .map_err(|_| N26Error::InvalidTimestamp(raw.to_string()))?;
        Self::from_millis(millis)
    }

    /// Interpret a calendar date as midnight in the home zone. Used to build
    /// date-range bounds from user input.
    pub fn from_local_date(date: NaiveDate) -> Result<Self, N26Error> {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or(N26Error::InvalidParameter("invalid calendar date"))?;
        Self::from_millis(midnight.and_utc().timestamp_millis())
    }

    /// Encode back to the wire value. Inverse of [`Timestamp::from_millis`]
    /// for any value produced by decoding. `None` when unset.
    pub fn as_millis(&self) -> Option<i64> {
        self.0
            .map(|instant| instant.timestamp_millis() + zone_offset_seconds(&instant) * 1000)
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_none()
    }

    /// The decoded absolute instant, `None` when unset.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

fn zone_offset_seconds(instant: &DateTime<Utc>) -> i64 {
    i64::from(
        instant
            .with_timezone(&HOME_ZONE)
            .offset()
            .fix()
            .local_minus_utc(),
    )
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(instant) => write!(f, "{}", instant.format("%Y-%m-%d %H:%M:%S%.3f UTC")),
            None => f.write_str("unset"),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Value> = Option::deserialize(deserializer)?;
        match raw {
            None | Some(Value::Null) => Ok(Timestamp::UNSET),
            Some(Value::Number(number)) => {
                let millis = number
                    .as_i64()
                    .ok_or_else(|| D::Error::custom("timestamp out of range"))?;
                Timestamp::from_millis(millis).map_err(D::Error::custom)
            }
            Some(Value::String(text)) => Timestamp::parse_wire(&text).map_err(D::Error::custom),
            Some(other) => Err(D::Error::custom(format!(
                "unexpected timestamp value: {other}"
            ))),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_millis() {
            Some(millis) => serializer.serialize_i64(millis),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2018-03-17 17:43:44.123 written in CET (+01:00)
    const WINTER: i64 = 1521308624123;
    // 122 days later: 2018-07-17 17:43:44.123 written in CEST (+02:00)
    const SUMMER: i64 = WINTER + 122 * 86_400_000;

    fn utc_instant(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap() + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn decodes_winter_value_with_one_hour_offset() {
        let ts = Timestamp::from_millis(WINTER).unwrap();
        assert_eq!(ts.instant(), Some(utc_instant(2018, 3, 17, 16, 43, 44, 123)));
    }

    #[test]
    fn decodes_summer_value_with_two_hour_offset() {
        let ts = Timestamp::from_millis(SUMMER).unwrap();
        assert_eq!(ts.instant(), Some(utc_instant(2018, 7, 17, 15, 43, 44, 123)));
    }

    #[test]
    fn winter_and_summer_offsets_differ_by_one_hour() {
        let winter_shift = WINTER
            - Timestamp::from_millis(WINTER)
                .unwrap()
                .instant()
                .unwrap()
                .timestamp_millis();
        let summer_shift = SUMMER
            - Timestamp::from_millis(SUMMER)
                .unwrap()
                .instant()
                .unwrap()
                .timestamp_millis();
        assert_eq!(winter_shift, 3_600_000);
        assert_eq!(summer_shift, 7_200_000);
    }

    #[test]
    fn round_trips_wire_values() {
        for value in [WINTER, SUMMER, 0, 946_684_800_000] {
            let ts = Timestamp::from_millis(value).unwrap();
            assert_eq!(ts.as_millis(), Some(value));
        }
    }

    #[test]
    fn null_and_empty_literals_stay_unset() {
        assert!(Timestamp::parse_wire("null").unwrap().is_unset());
        assert!(Timestamp::parse_wire("").unwrap().is_unset());
        assert_eq!(Timestamp::UNSET.as_millis(), None);
    }

    #[test]
    fn malformed_literals_fail_and_leave_the_target_unset() {
        let target = Timestamp::default();
        for raw in ["1521308624123d", "1521308s624123"] {
            assert!(matches!(
                Timestamp::parse_wire(raw),
                Err(N26Error::InvalidTimestamp(_))
            ));
        }
        assert!(target.is_unset());
    }

    #[test]
    fn unset_is_distinguishable_from_any_decoded_value() {
        let decoded = Timestamp::from_millis(0).unwrap();
        assert!(!decoded.is_unset());
        assert_ne!(decoded, Timestamp::UNSET);
    }

    #[derive(Debug, Deserialize)]
    struct Envelope {
        #[serde(default)]
        time: Timestamp,
    }

    #[test]
    fn deserializes_from_number_string_and_null() {
        let numeric: Envelope = serde_json::from_str(&format!("{{\"time\": {WINTER}}}")).unwrap();
        assert_eq!(numeric.time.as_millis(), Some(WINTER));

        let text: Envelope = serde_json::from_str(&format!("{{\"time\": \"{WINTER}\"}}")).unwrap();
        assert_eq!(text.time.as_millis(), Some(WINTER));

        let null: Envelope = serde_json::from_str("{\"time\": null}").unwrap();
        assert!(null.time.is_unset());

        let missing: Envelope = serde_json::from_str("{}").unwrap();
        assert!(missing.time.is_unset());
    }

    #[test]
    fn deserialization_rejects_garbage_strings() {
        let result: Result<Envelope, _> = serde_json::from_str("{\"time\": \"soon\"}");
        assert!(result.is_err());
    }

    #[test]
    fn serializes_back_to_wire_millis() {
        let ts = Timestamp::from_millis(WINTER).unwrap();
        assert_eq!(serde_json::to_value(ts).unwrap(), serde_json::json!(WINTER));
        assert_eq!(
            serde_json::to_value(Timestamp::UNSET).unwrap(),
            serde_json::Value::Null
        );
    }

    #[test]
    fn builds_bounds_from_calendar_dates() {
        let date = NaiveDate::from_ymd_opt(2018, 3, 1).unwrap();
        let ts = Timestamp::from_local_date(date).unwrap();
        // Midnight civil time encodes as the date's own midnight on the wire.
        assert_eq!(ts.as_millis(), Some(1_519_862_400_000));
    }
}
