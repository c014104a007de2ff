//! Calendar windows (day, week, month, time of day) in a configured zone.
//!
//! Every window is closed: `end` is the last millisecond before the next
//! window starts, and [`Interval::contains`] is inclusive at both ends.

use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike, Utc,
    Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::config::AnalyticsConfig;
use crate::shared::constants::{COLOR_AFTERNOON, COLOR_EVENING, COLOR_MORNING, COLOR_NIGHT};

/// Closed time interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Part of the day derived from the local wall-clock hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00-11:59
    Morning,
    /// 12:00-16:59
    Afternoon,
    /// 17:00-20:59
    Evening,
    /// 21:00-05:59, wrapping midnight
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => COLOR_MORNING,
            TimeOfDay::Afternoon => COLOR_AFTERNOON,
            TimeOfDay::Evening => COLOR_EVENING,
            TimeOfDay::Night => COLOR_NIGHT,
        }
    }

    /// Human-readable hour range for option lists
    pub fn hours(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "6am-12pm",
            TimeOfDay::Afternoon => "12pm-5pm",
            TimeOfDay::Evening => "5pm-9pm",
            TimeOfDay::Night => "9pm-6am",
        }
    }
}

/// Local calendar: a time zone plus the weekday weeks start on
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    tz: Tz,
    week_start: Weekday,
}

impl Calendar {
    pub fn new(tz: Tz, week_start: Weekday) -> Self {
        Self { tz, week_start }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.timezone, config.week_start)
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn time_of_day(&self, instant: DateTime<Utc>) -> TimeOfDay {
        TimeOfDay::from_hour(instant.with_timezone(&self.tz).hour())
    }

    /// First instant of a local calendar date
    pub fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            // Midnight skipped by a DST jump: the day starts an hour later
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(midnight + TimeDelta::hours(1)))
                    .earliest()
            })
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc())
    }

    /// Closed interval covering the local dates `[first, next)`
    fn span(&self, first: NaiveDate, next: NaiveDate) -> Interval {
        Interval {
            start: self.start_of(first),
            end: self.start_of(next) - TimeDelta::milliseconds(1),
        }
    }

    pub fn day(&self, date: NaiveDate) -> Interval {
        self.span(date, date + Days::new(1))
    }

    /// First day of the week containing `date`
    pub fn week_start_date(&self, date: NaiveDate) -> NaiveDate {
        let offset = (7 + date.weekday().num_days_from_sunday()
            - self.week_start.num_days_from_sunday())
            % 7;
        date - Days::new(u64::from(offset))
    }

    pub fn week(&self, date: NaiveDate) -> Interval {
        let first = self.week_start_date(date);
        self.span(first, first + Days::new(7))
    }

    /// Month containing `date`
    pub fn month(&self, date: NaiveDate) -> Interval {
        let first = first_of_month(date);
        let next = first
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        self.span(first, next)
    }

    /// Same local wall-clock time `days` calendar days earlier
    pub fn days_before(&self, instant: DateTime<Utc>, days: u64) -> DateTime<Utc> {
        let local = instant.with_timezone(&self.tz).naive_local();
        let shifted = local - Days::new(days);
        self.tz
            .from_local_datetime(&shifted)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| instant - TimeDelta::days(days as i64))
    }

    /// Week of the year, where week 1 is the week containing January 1st
    pub fn week_number(&self, date: NaiveDate) -> u32 {
        let this_week = self.week_start_date(date);
        let week_year_start = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
            .map(|jan1| self.week_start_date(jan1))
            .filter(|next_year_week1| this_week >= *next_year_week1)
            .or_else(|| {
                NaiveDate::from_ymd_opt(date.year(), 1, 1).map(|jan1| self.week_start_date(jan1))
            })
            .unwrap_or(this_week);

        ((this_week - week_year_start).num_days() / 7 + 1) as u32
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}
