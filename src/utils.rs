use crate::error::{Result, TrackerError};
use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, used as the unit of the month filter and the
/// analytics navigator. Paging is unbounded in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_month(month)?;
        Ok(Self { year, month })
    }

    pub fn of<Tz: TimeZone>(date: &DateTime<Tz>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn contains<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Long-form label, e.g. "March 2024".
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The calendar on which timestamps are bucketed into months.
///
/// Transactions are stored in UTC, but "this month" is what the household's
/// wall clock says, so an expense logged early on the 1st belongs to the new
/// month even when it is still the previous month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthCalendar {
    /// The host's local time zone, including daylight-saving changes.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl MonthCalendar {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// A fixed offset east of UTC, e.g. `36_000` for UTC+10.
    pub fn east(seconds: i32) -> Result<Self> {
        FixedOffset::east_opt(seconds)
            .map(Self::Fixed)
            .ok_or_else(|| TrackerError::Config(format!("invalid UTC offset: {}s", seconds)))
    }

    /// Parses `local`, `UTC`/`Z` or a `±HH:MM` offset.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if raw.eq_ignore_ascii_case("utc") || raw == "Z" {
            return Ok(Self::utc());
        }

        let invalid = || TrackerError::Config(format!("invalid UTC offset '{}'", raw));
        let (sign, rest) = match raw.as_bytes().first() {
            Some(b'+') => (1, &raw[1..]),
            Some(b'-') => (-1, &raw[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        Self::east(sign * (hours * 3600 + minutes * 60)).map_err(|_| invalid())
    }

    pub fn month_of(&self, date: &DateTime<Utc>) -> YearMonth {
        match self {
            Self::Local => YearMonth::of(&date.with_timezone(&Local)),
            Self::Fixed(offset) => YearMonth::of(&date.with_timezone(offset)),
        }
    }

    pub fn current_month(&self) -> YearMonth {
        self.month_of(&Utc::now())
    }
}

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(TrackerError::InvalidMonth(month));
    }
    Ok(())
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// Rounds to whole cents for display.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
