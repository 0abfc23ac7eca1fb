//! Date conditions
//!
//! The form of the condition value selects what is compared:
//!
//! | value | compared against |
//! |---|---|
//! | `22:59` or `22:59:59` | UTC time of day |
//! | `Mon`, `monday`, ... | weekday |
//! | `10 years`, `3 days`, `P1Y2M` | `now` minus the period |
//! | anything else | absolute instant |
//!
//! Absolute values and field values accept RFC 3339, `YYYY-MM-DDTHH:MM:SS`,
//! `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` and epoch seconds. A date-only value
//! compares calendar days, and so does `ON` with a period.

use super::{field_values, matched, unmatched};
use crate::context::EvaluationContext;
use crate::error::Result;
use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc, Weekday,
};
use docpolicy_core::condition::{DateCondition, DateOperator};
use docpolicy_core::{Condition, ConditionEvaluationResult, DocumentId};
use std::cmp::Ordering;

/// Condition value after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    TimeOfDay { time: NaiveTime, with_seconds: bool },
    Weekday(Weekday),
    /// `now` minus a period
    Relative(DateTime<Utc>),
    Absolute { at: DateTime<Utc>, date_only: bool },
}

impl DateValue {
    pub fn parse(value: &str, now: DateTime<Utc>) -> Option<Self> {
        let value = value.trim();
        if let Some(value) = parse_time_of_day(value) {
            return Some(value);
        }
        if let Ok(weekday) = value.parse::<Weekday>() {
            return Some(DateValue::Weekday(weekday));
        }
        if let Some(period) = Period::parse(value) {
            return period.before(now).map(DateValue::Relative);
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(DateValue::Absolute {
                at: start_of_day(date)?,
                date_only: true,
            });
        }
        parse_instant(value).map(|at| DateValue::Absolute {
            at,
            date_only: false,
        })
    }

    /// Ordering of a field instant relative to this value
    pub fn compare(&self, field: DateTime<Utc>, operator: DateOperator) -> Ordering {
        match self {
            DateValue::TimeOfDay { time, with_seconds } => {
                let second = if *with_seconds { field.second() } else { 0 };
                NaiveTime::from_hms_opt(field.hour(), field.minute(), second)
                    .unwrap_or_else(|| field.time())
                    .cmp(time)
            }
            DateValue::Weekday(weekday) => field
                .weekday()
                .num_days_from_monday()
                .cmp(&weekday.num_days_from_monday()),
            DateValue::Relative(at) if operator == DateOperator::On => {
                field.date_naive().cmp(&at.date_naive())
            }
            DateValue::Relative(at) => field.cmp(at),
            DateValue::Absolute {
                at,
                date_only: true,
            } => field.date_naive().cmp(&at.date_naive()),
            DateValue::Absolute { at, .. } => field.cmp(at),
        }
    }
}

fn parse_time_of_day(value: &str) -> Option<DateValue> {
    if let Ok(time) = NaiveTime::parse_from_str(value, "%H:%M:%S") {
        return Some(DateValue::TimeOfDay {
            time,
            with_seconds: true,
        });
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .ok()
        .map(|time| DateValue::TimeOfDay {
            time,
            with_seconds: false,
        })
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse an absolute instant from a condition or field value
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return start_of_day(date);
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
}

/// Calendar period, as `N unit` or ISO 8601 `PnYnMnWnDTnHnMnS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Period {
    months: u32,
    seconds: i64,
}

impl Period {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() > 1 && (value.starts_with('P') || value.starts_with('p')) {
            return Self::parse_iso(&value[1..]);
        }

        let mut parts = value.split_whitespace();
        let amount: u32 = parts.next()?.parse().ok()?;
        let unit = parts.next()?.to_lowercase();
        if parts.next().is_some() {
            return None;
        }
        let unit = unit.strip_suffix('s').unwrap_or(&unit);
        Self::default().add(amount, unit_of(unit)?)
    }

    fn parse_iso(value: &str) -> Option<Self> {
        let mut period = Self::default();
        let mut in_time = false;
        let mut digits = String::new();
        for ch in value.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                'T' | 't' if digits.is_empty() => in_time = true,
                _ => {
                    let amount: u32 = digits.parse().ok()?;
                    digits.clear();
                    let unit = match (ch.to_ascii_uppercase(), in_time) {
                        ('Y', false) => Unit::Year,
                        ('M', false) => Unit::Month,
                        ('W', false) => Unit::Week,
                        ('D', false) => Unit::Day,
                        ('H', true) => Unit::Hour,
                        ('M', true) => Unit::Minute,
                        ('S', true) => Unit::Second,
                        _ => return None,
                    };
                    period = period.add(amount, unit)?;
                }
            }
        }
        (digits.is_empty() && period != Self::default()).then_some(period)
    }

    fn add(mut self, amount: u32, unit: Unit) -> Option<Self> {
        let seconds_per_unit: i64 = match unit {
            Unit::Year => {
                self.months = self.months.checked_add(amount.checked_mul(12)?)?;
                return Some(self);
            }
            Unit::Month => {
                self.months = self.months.checked_add(amount)?;
                return Some(self);
            }
            Unit::Week => 7 * 86_400,
            Unit::Day => 86_400,
            Unit::Hour => 3_600,
            Unit::Minute => 60,
            Unit::Second => 1,
        };
        let seconds = i64::from(amount).checked_mul(seconds_per_unit)?;
        self.seconds = self.seconds.checked_add(seconds)?;
        Some(self)
    }

    /// The instant this period before `now`, `None` when out of range
    pub fn before(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_sub_months(Months::new(self.months))?
            .checked_sub_signed(Duration::try_seconds(self.seconds)?)
    }
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

fn unit_of(name: &str) -> Option<Unit> {
    match name {
        "year" | "yr" | "y" => Some(Unit::Year),
        "month" | "mon" => Some(Unit::Month),
        "week" | "wk" | "w" => Some(Unit::Week),
        "day" | "d" => Some(Unit::Day),
        "hour" | "hr" | "h" => Some(Unit::Hour),
        "minute" | "min" => Some(Unit::Minute),
        "second" | "sec" => Some(Unit::Second),
        _ => None,
    }
}

/// Match when any field value parses to an instant accepted by the operator
pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    document: DocumentId,
    condition: &Condition,
    date: &DateCondition,
) -> Result<ConditionEvaluationResult> {
    let Some(expected) = DateValue::parse(&date.value, ctx.now()) else {
        tracing::warn!(
            "Date condition {:?} has an unparseable value '{}'",
            condition.id,
            date.value
        );
        return Ok(unmatched(ctx, document, condition));
    };

    let is_match = field_values(ctx, document, &date.field)
        .iter()
        .filter_map(|value| parse_instant(value))
        .any(|at| date.operator.accepts(expected.compare(at, date.operator)));

    if is_match {
        Ok(matched(ctx, document, condition, Vec::new()))
    } else {
        Ok(unmatched(ctx, document, condition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_modes() {
        assert!(matches!(
            DateValue::parse("22:59:59", now()),
            Some(DateValue::TimeOfDay { with_seconds: true, .. })
        ));
        assert_eq!(
            DateValue::parse("Friday", now()),
            Some(DateValue::Weekday(Weekday::Fri))
        );
        assert_eq!(
            DateValue::parse("2 days", now()),
            Some(DateValue::Relative(Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap()))
        );
        assert!(matches!(
            DateValue::parse("2024-01-01", now()),
            Some(DateValue::Absolute { date_only: true, .. })
        ));
        assert!(DateValue::parse("not a date", now()).is_none());
    }

    #[test]
    fn test_iso_period() {
        let period = Period::parse("P1Y2M3DT4H").unwrap();
        assert_eq!(
            period.before(now()),
            Some(Utc.with_ymd_and_hms(2023, 1, 12, 8, 0, 0).unwrap())
        );
        assert!(Period::parse("P").is_none());
        assert!(Period::parse("P1X").is_none());
        assert_eq!(Period::parse("10 years").unwrap().months, 120);
    }

    #[test]
    fn test_oversized_period_is_unparseable() {
        let huge = "P4294967295W4294967295W4294967295W4294967295W";
        assert!(Period::parse(huge)
            .and_then(|period| period.before(now()))
            .is_none());
        assert!(DateValue::parse(huge, now()).is_none());

        // A valid duration, but earlier than any representable date
        let period = Period::parse("P4294967295WT4294967295H").unwrap();
        assert!(period.before(now()).is_none());
    }

    #[test]
    fn test_parse_instant_forms() {
        let expected = Utc.with_ymd_and_hms(1999, 12, 31, 22, 59, 59).unwrap();
        assert_eq!(parse_instant("946681199"), Some(expected));
        assert_eq!(parse_instant("1999-12-31T22:59:59Z"), Some(expected));
        assert_eq!(parse_instant("1999-12-31T23:59:59+01:00"), Some(expected));
        assert_eq!(parse_instant("1999-12-31 22:59:59"), Some(expected));
        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn test_time_of_day_comparison() {
        let field = Utc.with_ymd_and_hms(1999, 12, 31, 22, 59, 59).unwrap();
        let exact = DateValue::parse("22:59:59", now()).unwrap();
        let earlier = DateValue::parse("22:59:58", now()).unwrap();
        let minutes = DateValue::parse("22:59", now()).unwrap();

        assert_eq!(exact.compare(field, DateOperator::On), Ordering::Equal);
        assert_eq!(earlier.compare(field, DateOperator::On), Ordering::Greater);
        assert_eq!(minutes.compare(field, DateOperator::On), Ordering::Equal);
    }

    #[test]
    fn test_weekday_and_day_comparison() {
        // 2024-03-15 is a Friday
        let field = Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap();
        let friday = DateValue::parse("fri", now()).unwrap();
        assert_eq!(friday.compare(field, DateOperator::On), Ordering::Equal);

        let day = DateValue::parse("2024-03-15", now()).unwrap();
        assert_eq!(day.compare(field, DateOperator::On), Ordering::Equal);
        assert_eq!(day.compare(field, DateOperator::After), Ordering::Equal);
    }
}
