//! Calendar-name literals and time zones.
//!
//! Each day and month name is a zero-argument term whose tag identifies it
//! (`r.monday` is `[107, []]` on the wire). They are plain `Copy` values.

use super::arg::Arg;
use super::ast::Term;
use super::datum::{format_offset, Datum};
use super::terms::TermType;
use crate::error::{Error, Result};
use chrono::{FixedOffset, Offset, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl TimeName {
    pub const ALL: [TimeName; 19] = [
        TimeName::Monday,
        TimeName::Tuesday,
        TimeName::Wednesday,
        TimeName::Thursday,
        TimeName::Friday,
        TimeName::Saturday,
        TimeName::Sunday,
        TimeName::January,
        TimeName::February,
        TimeName::March,
        TimeName::April,
        TimeName::May,
        TimeName::June,
        TimeName::July,
        TimeName::August,
        TimeName::September,
        TimeName::October,
        TimeName::November,
        TimeName::December,
    ];

    pub fn term_type(self) -> TermType {
        match self {
            TimeName::Monday => TermType::Monday,
            TimeName::Tuesday => TermType::Tuesday,
            TimeName::Wednesday => TermType::Wednesday,
            TimeName::Thursday => TermType::Thursday,
            TimeName::Friday => TermType::Friday,
            TimeName::Saturday => TermType::Saturday,
            TimeName::Sunday => TermType::Sunday,
            TimeName::January => TermType::January,
            TimeName::February => TermType::February,
            TimeName::March => TermType::March,
            TimeName::April => TermType::April,
            TimeName::May => TermType::May,
            TimeName::June => TermType::June,
            TimeName::July => TermType::July,
            TimeName::August => TermType::August,
            TimeName::September => TermType::September,
            TimeName::October => TermType::October,
            TimeName::November => TermType::November,
            TimeName::December => TermType::December,
        }
    }

    /// Lowercase name as written in queries (`r.monday`).
    pub fn name(self) -> &'static str {
        match self {
            TimeName::Monday => "monday",
            TimeName::Tuesday => "tuesday",
            TimeName::Wednesday => "wednesday",
            TimeName::Thursday => "thursday",
            TimeName::Friday => "friday",
            TimeName::Saturday => "saturday",
            TimeName::Sunday => "sunday",
            TimeName::January => "january",
            TimeName::February => "february",
            TimeName::March => "march",
            TimeName::April => "april",
            TimeName::May => "may",
            TimeName::June => "june",
            TimeName::July => "july",
            TimeName::August => "august",
            TimeName::September => "september",
            TimeName::October => "october",
            TimeName::November => "november",
            TimeName::December => "december",
        }
    }

    pub fn from_term_type(term_type: TermType) -> Option<Self> {
        TimeName::ALL.into_iter().find(|name| name.term_type() == term_type)
    }

    pub fn to_term(self) -> Term {
        Term::new(self.term_type())
    }
}

impl std::fmt::Display for TimeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r.{}", self.name())
    }
}

impl From<TimeName> for Term {
    fn from(name: TimeName) -> Self {
        name.to_term()
    }
}

impl From<TimeName> for Arg {
    fn from(name: TimeName) -> Self {
        Arg::Term(name.to_term())
    }
}

/// A fixed UTC offset, as accepted by `TIME`, `IN_TIMEZONE` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(FixedOffset);

impl Timezone {
    pub fn utc() -> Self {
        Timezone(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }
}

impl From<FixedOffset> for Timezone {
    fn from(offset: FixedOffset) -> Self {
        Timezone(offset)
    }
}

impl std::fmt::Display for Timezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_offset(&self.0))
    }
}

impl From<Timezone> for Arg {
    fn from(tz: Timezone) -> Self {
        Arg::Datum(Datum::String(tz.to_string()))
    }
}

/// Parse a time zone written as `Z`, `±HH`, `±HHMM` or `±HH:MM`.
pub fn parse_timezone(spec: &str) -> Result<Timezone> {
    parse_offset(spec)
        .map(Timezone)
        .ok_or_else(|| Error::InvalidArgumentType(format!("invalid time zone {:?}", spec)))
}

fn parse_offset(spec: &str) -> Option<FixedOffset> {
    if spec == "Z" || spec == "z" {
        return Some(Utc.fix());
    }

    let (sign, rest) = match spec.as_bytes().first()? {
        b'+' => (1, &spec[1..]),
        b'-' => (-1, &spec[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.as_bytes() {
        [h1, h2] => ([*h1, *h2], [b'0', b'0']),
        [h1, h2, m1, m2] => ([*h1, *h2], [*m1, *m2]),
        [h1, h2, b':', m1, m2] => ([*h1, *h2], [*m1, *m2]),
        _ => return None,
    };
    let hours = two_digits(hours)?;
    let minutes = two_digits(minutes)?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn two_digits(pair: [u8; 2]) -> Option<i32> {
    match pair {
        [tens @ b'0'..=b'9', ones @ b'0'..=b'9'] => {
            Some(i32::from(tens - b'0') * 10 + i32::from(ones - b'0'))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_names_map_to_their_tags() {
        assert_eq!(TimeName::Monday.term_type().to_u64(), 107);
        assert_eq!(TimeName::December.term_type().to_u64(), 125);
        for name in TimeName::ALL {
            assert!(name.term_type().is_time_name());
            assert_eq!(TimeName::from_term_type(name.term_type()), Some(name));
        }
    }

    #[test]
    fn test_time_name_term_is_bare() {
        let term = TimeName::Friday.to_term();
        assert_eq!(term.term_type(), TermType::Friday);
        assert!(term.args().is_empty());
        assert!(term.optargs().is_empty());
        assert_eq!(TimeName::Friday.to_string(), "r.friday");
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Z").unwrap(), Timezone::utc());
        assert_eq!(parse_timezone("+05:30").unwrap().to_string(), "+05:30");
        assert_eq!(parse_timezone("-0700").unwrap().to_string(), "-07:00");
        assert_eq!(parse_timezone("+09").unwrap().to_string(), "+09:00");
    }

    #[test]
    fn test_parse_timezone_rejects_garbage() {
        let bad_zones = [
            "", "UTC", "+5", "+25:00", "+05:61", "05:00", "+0a:00", "+05::00", "+:0530", "+0:530",
            "+0530:", "+05:3",
        ];
        for bad in bad_zones {
            assert!(
                matches!(parse_timezone(bad), Err(Error::InvalidArgumentType(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
