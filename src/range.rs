//! Date-range resolution for table requests.
//!
//! Explicit dates win, a lone start or end is widened to its calendar month,
//! `period = "30days"` gives a rolling window from today, and no input at all
//! selects the current month.

use crate::error::AstroError;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const ROLLING_PERIOD: &str = "30days";
const ROLLING_DAYS: u64 = 30;
/// Longest range a single table may cover. Two full months fit.
pub const MAX_RANGE_DAYS: i64 = 62;

/// Inclusive calendar-date range, `start <= end`, at most `MAX_RANGE_DAYS` long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AstroError> {
        if end < start {
            return Err(AstroError::InvalidRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(AstroError::RangeTooLong {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
                days,
                max: MAX_RANGE_DAYS,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, both ends included.
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Raw range attributes as the caller supplied them. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub start: Option<String>,
    pub end: Option<String>,
    pub period: Option<String>,
}

impl RangeRequest {
    pub fn between(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            period: None,
        }
    }

    pub fn rolling() -> Self {
        Self {
            period: Some(ROLLING_PERIOD.to_string()),
            ..Self::default()
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AstroError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| AstroError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date ({})", raw, e)))
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.day0() as i64)
}

pub fn last_day_of_month(date: NaiveDate) -> Result<NaiveDate, AstroError> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AstroError::InvalidDate(format!("no month end for {}", date)))
}

/// Resolves the requested range against `today`.
pub fn resolve_range(request: &RangeRequest, today: NaiveDate) -> Result<DateRange, AstroError> {
    let start = present(&request.start).map(parse_date).transpose()?;
    let end = present(&request.end).map(parse_date).transpose()?;

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, last_day_of_month(start)?),
        (None, Some(end)) => (first_day_of_month(end), end),
        (None, None) => match present(&request.period) {
            Some(ROLLING_PERIOD) => {
                let end = today
                    .checked_add_days(Days::new(ROLLING_DAYS - 1))
                    .ok_or_else(|| AstroError::InvalidDate(format!("{} + 29 days overflows", today)))?;
                (today, end)
            }
            Some(other) => {
                return Err(AstroError::InvalidDate(format!(
                    "unknown period '{}', expected '{}'",
                    other, ROLLING_PERIOD
                )))
            }
            None => (first_day_of_month(today), last_day_of_month(today)?),
        },
    };

    DateRange::new(start, end)
}
