use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Years a date filter may name.
pub const YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Half-open `[from, until)` window in UTC built from local calendar days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parse optional `YYYY-MM-DD` bounds. Both bounds are inclusive local days.
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        offset: FixedOffset,
    ) -> Result<Self, String> {
        let from = match parse_day(start)? {
            Some(day) => Some(local_midnight(day, offset).ok_or_else(|| out_of_range(day))?),
            None => None,
        };
        let until = match parse_day(end)? {
            Some(day) => Some(
                day.checked_add_days(Days::new(1))
                    .and_then(|next| local_midnight(next, offset))
                    .ok_or_else(|| out_of_range(day))?,
            ),
            None => None,
        };
        Ok(Self { from, until })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.until.is_none_or(|until| at < until)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.until.is_none()
    }
}

fn parse_day(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let day = NaiveDate::parse_from_str(v, DATE_FORMAT)
        .map_err(|_| format!("Invalid date '{v}', expected YYYY-MM-DD"))?;
    if !YEARS.contains(&day.year()) {
        return Err(out_of_range(day));
    }
    Ok(Some(day))
}

fn out_of_range(day: NaiveDate) -> String {
    format!("Date out of range: {day}")
}

/// The UTC instant at which `day` starts in the given local offset, or `None`
/// past the edge of the representable calendar.
pub fn local_midnight(day: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let local = day.and_time(NaiveTime::MIN);
    let utc = local.checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))?;
    Some(DateTime::from_naive_utc_and_offset(utc, Utc))
}

/// Calendar day of `at` as seen by the committee.
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    if !(-12..=14).contains(&hours) {
        return None;
    }
    FixedOffset::east_opt(hours * 3600)
}
