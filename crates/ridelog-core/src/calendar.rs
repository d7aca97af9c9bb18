//! Fixed, ordered enumerations derived from a trip's start time.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        // num_days_from_sunday is 0..=6
        Weekday::ALL[timestamp.weekday().num_days_from_sunday() as usize]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Weekday::ALL.into_iter().find(|day| day.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
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

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Month::ALL[timestamp.month0() as usize]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Month::ALL.into_iter().find(|month| month.as_str() == name)
    }
}

/// Named part of the day a trip started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
    Late,
}

/// Half-open `[from, to)` hour ranges. Night wraps midnight, so it appears twice.
const WINDOW_BOUNDARIES: [(u32, u32, TimeWindow); 7] = [
    (0, 2, TimeWindow::Night),
    (2, 6, TimeWindow::Late),
    (6, 10, TimeWindow::Morning),
    (10, 14, TimeWindow::Midday),
    (14, 18, TimeWindow::Afternoon),
    (18, 22, TimeWindow::Evening),
    (22, 24, TimeWindow::Night),
];

impl TimeWindow {
    pub const ALL: [TimeWindow; 6] = [
        TimeWindow::Morning,
        TimeWindow::Midday,
        TimeWindow::Afternoon,
        TimeWindow::Evening,
        TimeWindow::Night,
        TimeWindow::Late,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Morning => "Morning",
            TimeWindow::Midday => "Midday",
            TimeWindow::Afternoon => "Afternoon",
            TimeWindow::Evening => "Evening",
            TimeWindow::Night => "Night",
            TimeWindow::Late => "Late",
        }
    }

    /// `None` only for hours outside 0..24.
    pub fn from_hour(hour: u32) -> Option<Self> {
        WINDOW_BOUNDARIES
            .iter()
            .find(|(from, to, _)| (*from..*to).contains(&hour))
            .map(|(_, _, window)| *window)
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        // hour() is always 0..=23, which the boundary table covers
        TimeWindow::from_hour(timestamp.hour()).unwrap_or(TimeWindow::Night)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        TimeWindow::ALL.into_iter().find(|window| window.as_str() == name)
    }
}
