//! Calendar arithmetic for report periods
//!
//! Dates are kept as decomposed year/month/day fields. Every operation
//! returns a valid date: months carry into years and days are clamped to the
//! length of the month they land in. Arithmetic past the range chrono can
//! represent saturates at `NaiveDate::MIN` or `NaiveDate::MAX`.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Length of a report period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Sunday to Saturday
    Week,
    Month,
    Year,
}

impl Default for PeriodKind {
    fn default() -> Self {
        PeriodKind::Month
    }
}

impl std::str::FromStr for PeriodKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" => Ok(PeriodKind::Week),
            "month" => Ok(PeriodKind::Month),
            "year" => Ok(PeriodKind::Year),
            _ => Err(format!("Invalid period: {}", s)),
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodKind::Week => write!(f, "week"),
            PeriodKind::Month => write!(f, "month"),
            PeriodKind::Year => write!(f, "year"),
        }
    }
}

/// A calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Create a date, rejecting fields that do not name a real day
    pub fn new(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_naive)
            .ok_or_else(|| CoreError::InvalidDate {
                input: format!("{}/{}/{}", year, month, day),
            })
    }

    /// Today in local time
    pub fn today() -> Self {
        Self::from_naive(Local::now().date_naive())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn to_naive(&self) -> NaiveDate {
        // Every constructor yields a representable date
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).unwrap_or(NaiveDate::MIN)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Shift by `count` periods; negative counts go back in time.
    ///
    /// Results beyond the representable range stop at its first or last day.
    pub fn advance(&self, period: PeriodKind, count: i32) -> Self {
        match period {
            PeriodKind::Week => {
                let days = Days::new(u64::from(count.unsigned_abs()) * 7);
                let naive = self.to_naive();
                let shifted = if count >= 0 {
                    naive.checked_add_days(days)
                } else {
                    naive.checked_sub_days(days)
                };
                shifted
                    .map(Self::from_naive)
                    .unwrap_or_else(|| Self::saturated(count >= 0))
            }
            PeriodKind::Month => {
                let total = i64::from(self.month) - 1 + i64::from(count);
                let year = i64::from(self.year) + total.div_euclid(12);
                let month = total.rem_euclid(12) as u32 + 1;
                Self::clamped(year, month, self.day)
            }
            PeriodKind::Year => {
                Self::clamped(i64::from(self.year) + i64::from(count), self.month, self.day)
            }
        }
    }

    /// First day of the enclosing period
    pub fn span_start(&self, period: PeriodKind) -> Self {
        match period {
            PeriodKind::Week => {
                let naive = self.to_naive();
                let back = Days::new(u64::from(naive.weekday().num_days_from_sunday()));
                naive
                    .checked_sub_days(back)
                    .map(Self::from_naive)
                    .unwrap_or_else(|| Self::saturated(false))
            }
            PeriodKind::Month => Self { day: 1, ..*self },
            PeriodKind::Year => Self {
                month: 1,
                day: 1,
                ..*self
            },
        }
    }

    /// Last day of the enclosing period
    pub fn span_end(&self, period: PeriodKind) -> Self {
        match period {
            PeriodKind::Week => {
                let start = self.span_start(PeriodKind::Week).to_naive();
                start
                    .checked_add_days(Days::new(6))
                    .map(Self::from_naive)
                    .unwrap_or_else(|| Self::saturated(true))
            }
            PeriodKind::Month => Self {
                day: days_in_month(self.year, self.month),
                ..*self
            },
            PeriodKind::Year => Self {
                month: 12,
                day: 31,
                ..*self
            },
        }
    }

    /// Start of the following period, the exclusive end of `[start, next)`
    pub fn span_next(&self, period: PeriodKind) -> Self {
        self.span_start(period).advance(period, 1)
    }

    /// Start of the preceding period
    pub fn span_prev(&self, period: PeriodKind) -> Self {
        self.span_start(period).advance(period, -1)
    }

    /// `YYYY/M/D`, truncated to `YYYY/M` for months and `YYYY` for years
    pub fn format(&self, period: Option<PeriodKind>) -> String {
        match period {
            Some(PeriodKind::Month) => format!("{}/{}", self.year, self.month),
            Some(PeriodKind::Year) => format!("{}", self.year),
            Some(PeriodKind::Week) | None => format!("{}/{}/{}", self.year, self.month, self.day),
        }
    }

    fn clamped(year: i64, month: u32, day: u32) -> Self {
        let (first, last) = (NaiveDate::MIN, NaiveDate::MAX);
        match i32::try_from(year) {
            Ok(year) if (first.year()..=last.year()).contains(&year) => {
                let day = day.min(days_in_month(year, month));
                NaiveDate::from_ymd_opt(year, month, day)
                    .map(Self::from_naive)
                    .unwrap_or_else(|| Self::saturated(year > 0))
            }
            _ => Self::saturated(year > 0),
        }
    }

    fn saturated(forward: bool) -> Self {
        Self::from_naive(if forward { NaiveDate::MAX } else { NaiveDate::MIN })
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format(None))
    }
}

impl std::str::FromStr for CalendarDate {
    type Err = CoreError;

    /// Accepts `YYYY`, `YYYY/M` and `YYYY/M/D` (or `-` separated); missing
    /// fields default to 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidDate {
            input: s.to_string(),
        };

        let parts: Vec<&str> = s.trim().split(|c| c == '/' || c == '-').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }

        let year: i32 = parts[0].parse().map_err(|_| invalid())?;
        let month: u32 = match parts.get(1) {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 1,
        };
        let day: u32 = match parts.get(2) {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 1,
        };

        Self::new(year, month, day).map_err(|_| invalid())
    }
}

/// Number of days in a month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    #[test]
    fn test_month_carry_all_months() {
        for month in 1..=12u32 {
            for k in -40..=40 {
                let start = date(2024, month, 1);
                let shifted = start.advance(PeriodKind::Month, k);
                assert!((1..=12).contains(&shifted.month()));
                let before = 2024 * 12 + month as i32 - 1;
                let after = shifted.year() * 12 + shifted.month() as i32 - 1;
                assert_eq!(after - before, k, "month {} + {}", month, k);
            }
        }
    }

    #[test]
    fn test_month_overflow_into_next_year() {
        let shifted = date(2023, 11, 5).advance(PeriodKind::Month, 3);
        assert_eq!(shifted, date(2024, 2, 5));
    }

    #[test]
    fn test_month_underflow_into_previous_year() {
        assert_eq!(date(2024, 1, 1).advance(PeriodKind::Month, -1), date(2023, 12, 1));
        assert_eq!(date(2024, 2, 1).advance(PeriodKind::Month, -14), date(2022, 12, 1));
    }

    #[test]
    fn test_month_day_clamped() {
        assert_eq!(date(2024, 1, 31).advance(PeriodKind::Month, 1), date(2024, 2, 29));
        assert_eq!(date(2023, 1, 31).advance(PeriodKind::Month, 1), date(2023, 2, 28));
        assert_eq!(date(2024, 2, 29).advance(PeriodKind::Year, 1), date(2025, 2, 28));
    }

    #[test]
    fn test_week_advance_crosses_month_and_year() {
        assert_eq!(date(2024, 1, 28).advance(PeriodKind::Week, 1), date(2024, 2, 4));
        assert_eq!(date(2023, 12, 30).advance(PeriodKind::Week, 1), date(2024, 1, 6));
        assert_eq!(date(2024, 3, 3).advance(PeriodKind::Week, -1), date(2024, 2, 25));
    }

    #[test]
    fn test_span_boundaries() {
        // 2024-03-13 is a Wednesday
        let d = date(2024, 3, 13);
        assert_eq!(d.span_start(PeriodKind::Week), date(2024, 3, 10));
        assert_eq!(d.span_end(PeriodKind::Week), date(2024, 3, 16));
        assert_eq!(d.span_start(PeriodKind::Month), date(2024, 3, 1));
        assert_eq!(d.span_end(PeriodKind::Month), date(2024, 3, 31));
        assert_eq!(d.span_start(PeriodKind::Year), date(2024, 1, 1));
        assert_eq!(d.span_end(PeriodKind::Year), date(2024, 12, 31));
    }

    #[test]
    fn test_span_next_and_prev_start_from_span_start() {
        let d = date(2024, 12, 20);
        assert_eq!(d.span_next(PeriodKind::Month), date(2025, 1, 1));
        assert_eq!(d.span_prev(PeriodKind::Month), date(2024, 11, 1));
        assert_eq!(d.span_next(PeriodKind::Year), date(2025, 1, 1));
        assert_eq!(d.span_next(PeriodKind::Week), date(2024, 12, 22));
        assert_eq!(d.span_prev(PeriodKind::Week), date(2024, 12, 8));
    }

    #[test]
    fn test_format_granularity() {
        let d = date(2024, 3, 7);
        assert_eq!(d.format(None), "2024/3/7");
        assert_eq!(d.format(Some(PeriodKind::Week)), "2024/3/7");
        assert_eq!(d.format(Some(PeriodKind::Month)), "2024/3");
        assert_eq!(d.format(Some(PeriodKind::Year)), "2024");
        assert_eq!(d.to_string(), "2024/3/7");
    }

    #[test]
    fn test_format_round_trip_keeps_span() {
        let d = date(2024, 9, 17);
        for period in [PeriodKind::Month, PeriodKind::Year] {
            let parsed: CalendarDate = d.format(Some(period)).parse().unwrap();
            assert_eq!(parsed.span_start(period), d.span_start(period));
            assert_eq!(parsed.span_end(period), d.span_end(period));
        }
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("2024".parse::<CalendarDate>().unwrap(), date(2024, 1, 1));
        assert_eq!("2024/3".parse::<CalendarDate>().unwrap(), date(2024, 3, 1));
        assert_eq!("2024-03-15".parse::<CalendarDate>().unwrap(), date(2024, 3, 15));
        assert!("2024/13/1".parse::<CalendarDate>().is_err());
        assert!("2024/2/30".parse::<CalendarDate>().is_err());
        assert!("soon".parse::<CalendarDate>().is_err());
        assert!("2024/1/1/1".parse::<CalendarDate>().is_err());
    }

    #[test]
    fn test_period_kind_from_str() {
        assert_eq!("Week".parse::<PeriodKind>().unwrap(), PeriodKind::Week);
        assert_eq!("month".parse::<PeriodKind>().unwrap(), PeriodKind::Month);
        assert_eq!("YEAR".parse::<PeriodKind>().unwrap(), PeriodKind::Year);
        assert!("quarter".parse::<PeriodKind>().is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(NaiveDate::MAX.year(), 12), 31);
    }

    #[test]
    fn test_advance_saturates_at_calendar_bounds() {
        let last = CalendarDate::from_naive(NaiveDate::MAX);
        assert_eq!(last.advance(PeriodKind::Week, 1), last);
        assert_eq!(last.advance(PeriodKind::Month, 1), last);
        assert_eq!(last.advance(PeriodKind::Year, i32::MAX), last);
        assert_eq!(last.span_end(PeriodKind::Month), last);

        let first = CalendarDate::from_naive(NaiveDate::MIN);
        assert_eq!(first.advance(PeriodKind::Week, -1), first);
        assert_eq!(first.advance(PeriodKind::Month, i32::MIN), first);
        assert_eq!(first.span_start(PeriodKind::Week).to_naive(), NaiveDate::MIN);

        // The month before the last one still moves normally
        let nov = date(NaiveDate::MAX.year(), 11, 30);
        assert_eq!(nov.advance(PeriodKind::Month, 1), date(NaiveDate::MAX.year(), 12, 30));
        assert_eq!(nov.span_next(PeriodKind::Month), date(NaiveDate::MAX.year(), 12, 1));
    }
}
