//! Wire date type: seconds since the Unix epoch
//!
//! The UDP wire form is a little-endian u64 of whole seconds; the LLSD-XML
//! form is an ISO 8601 UTC timestamp. The calendar conversion is done inline
//! (days-from-civil) so no clock or timezone machinery is pulled in.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult, ValueError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Date {
    secs: i64,
}

impl Date {
    pub const UNIX_EPOCH: Date = Date { secs: 0 };

    pub fn from_unix_time(secs: i64) -> Self {
        Self { secs }
    }

    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self { secs }
    }

    pub fn as_unix_time(&self) -> i64 {
        self.secs
    }

    /// Writes the wire form (8 bytes, little-endian seconds) at `pos`.
    pub fn to_bytes(&self, buf: &mut [u8], pos: usize) -> CodecResult<()> {
        ensure(buf.len(), pos, 8)?;
        LittleEndian::write_u64(&mut buf[pos..pos + 8], self.secs as u64);
        Ok(())
    }

    pub fn from_bytes(buf: &[u8], pos: usize) -> CodecResult<Self> {
        ensure(buf.len(), pos, 8)?;
        Ok(Self {
            secs: LittleEndian::read_u64(&buf[pos..pos + 8]) as i64,
        })
    }

    /// ISO 8601 UTC string, e.g. `2007-03-15T18:30:18Z`.
    pub fn iso8601(&self) -> String {
        let days = self.secs.div_euclid(86_400);
        let secs_of_day = self.secs.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        let hour = secs_of_day / 3_600;
        let minute = (secs_of_day % 3_600) / 60;
        let second = secs_of_day % 60;
        format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
    }
}

impl FromStr for Date {
    type Err = ValueError;

    /// Parses `YYYY-MM-DDTHH:MM:SS[.fff]Z`; fractional seconds are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || ValueError::ParseFailed {
            target: "Date",
            input: s.to_string(),
        };
        let trimmed = s.trim().trim_end_matches('Z');
        let (date_part, time_part) = trimmed.split_once('T').ok_or_else(fail)?;

        let mut date_fields = date_part.splitn(3, '-');
        let year: i64 = next_field(&mut date_fields).ok_or_else(fail)?;
        let month: i64 = next_field(&mut date_fields).ok_or_else(fail)?;
        let day: i64 = next_field(&mut date_fields).ok_or_else(fail)?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(fail());
        }

        let time_part = time_part.split_once('.').map_or(time_part, |(t, _)| t);
        let mut time_fields = time_part.splitn(3, ':');
        let hour: i64 = next_field(&mut time_fields).ok_or_else(fail)?;
        let minute: i64 = next_field(&mut time_fields).ok_or_else(fail)?;
        let second: i64 = next_field(&mut time_fields).ok_or_else(fail)?;
        if hour > 23 || minute > 59 || second > 60 {
            return Err(fail());
        }

        let days = days_from_civil(year, month, day);
        Ok(Self {
            secs: days * 86_400 + hour * 3_600 + minute * 60 + second,
        })
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso8601())
    }
}

fn next_field<'a>(it: &mut impl Iterator<Item = &'a str>) -> Option<i64> {
    it.next()?.parse().ok()
}

/// Howard Hinnant's days-from-civil algorithm, valid across the whole i64 range
/// this protocol can carry.
fn days_from_civil(mut y: i64, m: i64, d: i64) -> i64 {
    if m <= 2 {
        y -= 1;
    }
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = (mp + 2) % 12 + 1;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

pub(crate) fn ensure(len: usize, pos: usize, needed: usize) -> CodecResult<()> {
    let remaining = len.saturating_sub(pos);
    if remaining < needed {
        return Err(CodecError::ShortBuffer {
            needed,
            offset: pos,
            remaining,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_formats_as_iso() {
        assert_eq!(Date::UNIX_EPOCH.iso8601(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_iso_round_trip() {
        for secs in [0i64, 1, 86_399, 86_400, 1_173_983_418, 4_102_444_800] {
            let d = Date::from_unix_time(secs);
            let parsed: Date = d.iso8601().parse().unwrap();
            assert_eq!(parsed, d, "failed for {secs}");
        }
    }

    #[test]
    fn test_known_timestamp() {
        let d: Date = "2007-03-15T18:30:18Z".parse().unwrap();
        assert_eq!(d.as_unix_time(), 1_173_983_418);
    }

    #[test]
    fn test_fractional_seconds_dropped() {
        let d: Date = "2007-03-15T18:30:18.125Z".parse().unwrap();
        assert_eq!(d.as_unix_time(), 1_173_983_418);
    }

    #[test]
    fn test_malformed_rejected() {
        assert!("not a date".parse::<Date>().is_err());
        assert!("2007-13-01T00:00:00Z".parse::<Date>().is_err());
    }

    #[test]
    fn test_wire_round_trip() {
        let d = Date::from_unix_time(1_173_983_418);
        let mut buf = [0u8; 8];
        d.to_bytes(&mut buf, 0).unwrap();
        assert_eq!(Date::from_bytes(&buf, 0).unwrap(), d);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let d = Date::now();
        let mut buf = [0u8; 4];
        assert!(d.to_bytes(&mut buf, 0).is_err());
    }
}
