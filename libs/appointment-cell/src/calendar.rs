use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;

use crate::availability::AvailabilityIndex;

/// Days from today that may be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingWindow {
    pub today: NaiveDate,
    pub max_date: NaiveDate,
}

impl BookingWindow {
    pub fn new(today: NaiveDate, window_days: i64) -> Self {
        Self {
            today,
            max_date: today + Duration::days(window_days),
        }
    }

    /// Window anchored on the local calendar date.
    pub fn starting_today(window_days: i64) -> Self {
        Self::new(Local::now().date_naive(), window_days)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.today <= date && date <= self.max_date
    }

    pub fn is_past(&self, date: NaiveDate) -> bool {
        date < self.today
    }

    pub fn is_beyond(&self, date: NaiveDate) -> bool {
        date > self.max_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthAnchor {
    pub year: i32,
    pub month: u32,
}

impl MonthAnchor {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.trim().split_once('-')?;
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { month: self.month + 1, ..self }
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { month: self.month - 1, ..self }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 0,
        }
    }

    pub fn label(self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_past: bool,
    pub is_beyond_window: bool,
    pub has_availability: bool,
}

impl DayCell {
    pub fn new(date: NaiveDate, window: &BookingWindow, availability: Option<&AvailabilityIndex>) -> Self {
        Self {
            date,
            is_today: date == window.today,
            is_past: window.is_past(date),
            is_beyond_window: window.is_beyond(date),
            has_availability: availability.is_some_and(|index| index.has_record(date)),
        }
    }

    pub fn is_selectable(&self) -> bool {
        !self.is_past && !self.is_beyond_window && self.has_availability
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid {
    pub anchor: MonthAnchor,
    pub label: String,
    pub can_go_back: bool,
    /// Sunday-first rows; `None` pads before the 1st and after the last day.
    pub weeks: Vec<[Option<DayCell>; 7]>,
}

impl CalendarGrid {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|week| week.iter().flatten())
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells().find(|cell| cell.date == date)
    }
}

/// Whether the user may page back from `anchor`; never before the current month.
pub fn can_go_back(anchor: MonthAnchor, window: &BookingWindow) -> bool {
    anchor > MonthAnchor::containing(window.today)
}

pub fn render_calendar_grid(
    anchor: MonthAnchor,
    window: &BookingWindow,
    availability: Option<&AvailabilityIndex>,
) -> CalendarGrid {
    let mut weeks = Vec::new();

    if let Some(first) = anchor.first_day() {
        let leading = first.weekday().num_days_from_sunday() as usize;
        let mut week: [Option<DayCell>; 7] = [None; 7];
        let mut column = leading;

        for offset in 0..anchor.days_in_month() {
            let date = first + Duration::days(offset as i64);
            week[column] = Some(DayCell::new(date, window, availability));
            column += 1;
            if column == 7 {
                weeks.push(week);
                week = [None; 7];
                column = 0;
            }
        }

        if column > 0 {
            weeks.push(week);
        }
    }

    CalendarGrid {
        anchor,
        label: anchor.label(),
        can_go_back: can_go_back(anchor, window),
        weeks,
    }
}
