//! Lenient parsing of RFC-1036 / RFC-822 style header dates.
//!
//! Accepts the layouts seen in news and mail headers and in CDR exports:
//! `Tue, 28 Feb 2017 23:44:01 GMT`, the dashed `Tuesday, 28-Feb-17 23:44:01 GMT`,
//! month-first `Feb 28 2017 ...`, missing seconds, and an offset glued to
//! the time (`23:44:01+0200`). The weekday is dropped without checking it
//! against the date. Two-digit years above 68 land in the 1900s, the rest in
//! the 2000s. A missing or unrecognised zone means local time.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};

const DAY_NAMES: &[&str] = &["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

const MONTH_NAMES: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Zone names with their offsets in `±hhmm` form.
const ZONE_OFFSETS: &[(&str, i32)] = &[
    ("UT", 0),
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("AST", -400),
    ("ADT", -300),
    ("EST", -500),
    ("EDT", -400),
    ("CST", -600),
    ("CDT", -500),
    ("MST", -700),
    ("MDT", -600),
    ("PST", -800),
    ("PDT", -700),
];

/// A header date split into its wall-clock reading and zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderDate {
    pub datetime: NaiveDateTime,
    /// `None` when the header carried no zone the parser recognises.
    pub offset: Option<FixedOffset>,
}

pub fn parse_header_date(value: &str) -> Option<HeaderDate> {
    let mut tokens: Vec<String> = value.split_whitespace().map(str::to_string).collect();
    let first = tokens.first()?.clone();
    if first.ends_with(',') || DAY_NAMES.contains(&first.to_lowercase().as_str()) {
        tokens.remove(0);
    } else if let Some(idx) = first.rfind(',') {
        tokens[0] = first[idx + 1..].to_string();
    }

    if tokens.len() == 3 {
        let parts: Vec<String> = tokens[0].split('-').map(str::to_string).collect();
        if parts.len() == 3 {
            let rest = tokens.split_off(1);
            tokens = parts;
            tokens.extend(rest);
        }
    }
    if tokens.len() == 4 {
        let last = tokens[3].clone();
        match last.find('+') {
            Some(idx) if idx > 0 => {
                tokens[3] = last[..idx].to_string();
                tokens.push(last[idx + 1..].to_string());
            }
            _ => tokens.push(String::new()),
        }
    }
    if tokens.len() < 5 {
        return None;
    }
    tokens.truncate(5);
    let [mut dd, mm, mut yy, mut tm, mut tz]: [String; 5] = tokens.try_into().ok()?;

    let mm = mm.to_lowercase();
    let month_idx = match month_index(&mm) {
        Some(idx) => idx,
        None => {
            let idx = month_index(&dd.to_lowercase())?;
            dd = mm;
            idx
        }
    };
    let month = (month_idx % 12) as u32 + 1;

    strip_trailing_comma(&mut dd);
    if yy.find(':').is_some_and(|idx| idx > 0) {
        std::mem::swap(&mut yy, &mut tm);
    }
    strip_trailing_comma(&mut yy);
    if !yy.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        std::mem::swap(&mut yy, &mut tz);
    }
    strip_trailing_comma(&mut tm);

    let (hour, minute, second) = match tm.split(':').collect::<Vec<_>>().as_slice() {
        [h, m] => (h.parse().ok()?, m.parse().ok()?, 0),
        [h, m, s] => (h.parse().ok()?, m.parse().ok()?, s.parse().ok()?),
        _ => return None,
    };
    let mut year: i32 = yy.parse().ok()?;
    let day: u32 = dd.parse().ok()?;
    if year < 100 {
        year += if year > 68 { 1900 } else { 2000 };
    }

    let datetime = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let offset = match zone_hhmm(&tz.to_uppercase()) {
        Some(hhmm) => Some(hhmm_to_offset(hhmm)?),
        None => None,
    };
    Some(HeaderDate { datetime, offset })
}

fn month_index(name: &str) -> Option<usize> {
    MONTH_NAMES.iter().position(|candidate| *candidate == name)
}

fn strip_trailing_comma(token: &mut String) {
    if token.ends_with(',') {
        token.pop();
    }
}

fn zone_hhmm(zone: &str) -> Option<i32> {
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|(_, hhmm)| *hhmm)
        .or_else(|| zone.parse().ok())
}

/// `-0530` becomes an offset of five and a half hours west of UTC.
fn hhmm_to_offset(hhmm: i32) -> Option<FixedOffset> {
    let magnitude = hhmm.abs();
    let seconds = (magnitude / 100) * 3600 + (magnitude % 100) * 60;
    FixedOffset::east_opt(hhmm.signum() * seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn utc() -> Option<FixedOffset> {
        FixedOffset::east_opt(0)
    }

    #[test]
    fn standard_header_with_named_zone() {
        assert_eq!(
            parse_header_date("Tue, 28 Feb 2017 23:44:01 GMT"),
            Some(HeaderDate {
                datetime: at(2017, 2, 28, 23, 44, 1),
                offset: utc(),
            })
        );
    }

    #[test]
    fn dashed_form_with_long_weekday() {
        let parsed = parse_header_date("Tuesday, 28-Feb-17 23:44:01 GMT").unwrap();
        assert_eq!(parsed.datetime, at(2017, 2, 28, 23, 44, 1));
        assert_eq!(parsed.offset, utc());
    }

    #[test]
    fn weekday_is_not_checked() {
        let parsed = parse_header_date("Wed, 28 Feb 2017 23:44:01 GMT").unwrap();
        assert_eq!(parsed.datetime, at(2017, 2, 28, 23, 44, 1));
    }

    #[test]
    fn weekday_glued_to_day() {
        let parsed = parse_header_date("Tue,28 Feb 2017 23:44:01 GMT").unwrap();
        assert_eq!(parsed.datetime, at(2017, 2, 28, 23, 44, 1));
    }

    #[test]
    fn month_first_and_missing_seconds() {
        let parsed = parse_header_date("Feb 28 2017 23:44 EST").unwrap();
        assert_eq!(parsed.datetime, at(2017, 2, 28, 23, 44, 0));
        assert_eq!(parsed.offset, FixedOffset::west_opt(5 * 3600));
    }

    #[test]
    fn numeric_offsets_attached_or_separate() {
        let separate = parse_header_date("28 Feb 2017 23:44:01 -0530").unwrap();
        assert_eq!(separate.offset, FixedOffset::west_opt(5 * 3600 + 30 * 60));
        let glued = parse_header_date("28 Feb 2017 23:44:01+0200").unwrap();
        assert_eq!(glued.datetime, at(2017, 2, 28, 23, 44, 1));
        assert_eq!(glued.offset, FixedOffset::east_opt(2 * 3600));
    }

    #[test]
    fn missing_or_unknown_zone_is_local() {
        assert_eq!(
            parse_header_date("28 Feb 2017 23:44:01 XYZ").unwrap().offset,
            None
        );
        assert_eq!(
            parse_header_date("Tue, 28 Feb 2017 23:44:01").unwrap().offset,
            None
        );
    }

    #[test]
    fn two_digit_years_pivot_at_68() {
        assert_eq!(
            parse_header_date("28 Feb 50 23:44:01 GMT").unwrap().datetime,
            at(2050, 2, 28, 23, 44, 1)
        );
        assert_eq!(
            parse_header_date("28 Feb 68 23:44:01 GMT").unwrap().datetime,
            at(2068, 2, 28, 23, 44, 1)
        );
        assert_eq!(
            parse_header_date("28 Feb 69 23:44:01 GMT").unwrap().datetime,
            at(1969, 2, 28, 23, 44, 1)
        );
    }

    #[test]
    fn non_header_shapes_are_rejected() {
        assert_eq!(parse_header_date(""), None);
        assert_eq!(parse_header_date("2017-02-28"), None);
        assert_eq!(parse_header_date("2017-02-28 23:44:01"), None);
        assert_eq!(parse_header_date("not a date"), None);
        assert_eq!(parse_header_date("30 Feb 2017 23:44:01 GMT"), None);
        assert_eq!(parse_header_date("28 Foo 2017 23:44:01 GMT"), None);
        assert_eq!(parse_header_date("28 Feb 2017 23-44-01 GMT"), None);
    }
}
