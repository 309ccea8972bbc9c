use chrono::{Datelike, NaiveDate};
use std::ops::Range;

/// The model runs on a 365-day calendar with one output per day.
pub const DAYS_PER_YEAR: usize = 365;

/// Timesteps of the `year`-th simulated year (1-based).
///
/// A ten-year run analysed on its last year uses timesteps `3285..3650`.
pub fn analysis_year_window(year: usize) -> Range<usize> {
    let year = year.max(1);
    DAYS_PER_YEAR * (year - 1)..DAYS_PER_YEAR * year
}

/// Calendar date of a 1-based day of year.
pub fn date_from_day_of_year(year: i32, day: u16) -> Option<NaiveDate> {
    NaiveDate::from_yo_opt(year, u32::from(day))
}

/// Formats a 0-based timestep of an analysis year as `Jul-16`.
pub fn format_timestep(year: i32, timestep: usize) -> String {
    u16::try_from(timestep + 1)
        .ok()
        .and_then(|day| date_from_day_of_year(year, day))
        .map(|date| date.format("%b-%d").to_string())
        .unwrap_or_else(|| format!("day {}", timestep + 1))
}

/// Sampling period of a field campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignCalendar {
    start: NaiveDate,
    end: NaiveDate,
}

impl CampaignCalendar {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Whether a 1-based day of year of the campaign year falls in the
    /// campaign. Campaigns spanning new year are not supported.
    pub fn contains_day(&self, day: u16) -> bool {
        let day = u32::from(day);
        self.start.ordinal() <= day && day <= self.end.ordinal()
    }
}
