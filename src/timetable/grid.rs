//! Weekday enumeration and the fixed lesson-bin grid
//!
//! The week is 7 weekdays × 12 canonical 45-minute bins starting at 08:00,
//! giving 84 addressable cells. A cell is a display and drop target only;
//! nothing is stored per cell.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::clock::TimeOfDay;

/// Number of lesson bins per day
pub const BIN_COUNT: usize = 12;

/// Spacing between consecutive bin starts, and the default lesson length
pub const BIN_MINUTES: u16 = 45;

/// Start of the first bin of the day
pub const FIRST_BIN: TimeOfDay = TimeOfDay::from_hm(8, 0);

/// Canonical lesson start times: 08:00, 08:45, ... 16:15
pub const TIME_BINS: [TimeOfDay; BIN_COUNT] = build_bins();

const fn build_bins() -> [TimeOfDay; BIN_COUNT] {
    let mut bins = [FIRST_BIN; BIN_COUNT];
    let mut i = 0;
    while i < BIN_COUNT {
        let total = FIRST_BIN.minutes_since_midnight() + (i as u16) * BIN_MINUTES;
        bins[i] = TimeOfDay::from_hm(total / 60, total % 60);
        i += 1;
    }
    bins
}

/// Grid lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid weekday '{0}'. Use 0-6 (Monday=0) or a day name")]
    InvalidWeekday(String),

    #[error("{0} is not a lesson bin start")]
    NotABin(TimeOfDay),

    #[error("Invalid cell key '{0}', expected '<weekday>-<HH:MM>'")]
    InvalidCellKey(String),
}

// ============================================================================
// Weekday
// ============================================================================

/// Day of the scheduling week; wire value 0-6 with Monday = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays, Monday first
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Numeric index (Monday = 0)
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Create from index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Full English name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Three-letter abbreviation
    pub fn short_label(&self) -> &'static str {
        &self.label()[..3]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Weekday {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Ok(index) = lower.parse::<u8>() {
            return Self::from_index(index).ok_or_else(|| GridError::InvalidWeekday(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|day| {
                let name = day.label().to_lowercase();
                lower.len() >= 3 && name.starts_with(&lower)
            })
            .ok_or_else(|| GridError::InvalidWeekday(s.to_string()))
    }
}

impl TryFrom<u8> for Weekday {
    type Error = GridError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or_else(|| GridError::InvalidWeekday(value.to_string()))
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day.index()
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        // chrono also counts from Monday = 0
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

// ============================================================================
// Bins and Cells
// ============================================================================

/// All canonical bin starts
pub fn time_bins() -> &'static [TimeOfDay] {
    &TIME_BINS
}

/// Whether `time` is exactly one of the canonical bin starts
pub fn is_bin_start(time: TimeOfDay) -> bool {
    TIME_BINS.contains(&time)
}

/// The bin whose 45-minute span contains `time`, if any
pub fn bin_containing(time: TimeOfDay) -> Option<TimeOfDay> {
    let minutes = time.minutes_since_midnight();
    TIME_BINS.iter().copied().find(|bin| {
        let start = bin.minutes_since_midnight();
        minutes >= start && minutes < start + BIN_MINUTES
    })
}

/// Address of one grid cell: a weekday and a canonical bin start.
///
/// The string form `"{weekday}-{HH:MM}"` (e.g. `"2-14:00"`) is stable and
/// used to correlate drag positions with target cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    weekday: Weekday,
    bin: TimeOfDay,
}

impl CellKey {
    /// Create a key; fails when `bin` is not a canonical start
    pub fn new(weekday: Weekday, bin: TimeOfDay) -> Result<Self, GridError> {
        if is_bin_start(bin) {
            Ok(Self { weekday, bin })
        } else {
            Err(GridError::NotABin(bin))
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn bin(&self) -> TimeOfDay {
        self.bin
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.weekday.index(), self.bin)
    }
}

impl FromStr for CellKey {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidCellKey(s.to_string());
        let (day, time) = s.split_once('-').ok_or_else(invalid)?;
        let index: u8 = day.parse().map_err(|_| invalid())?;
        let weekday = Weekday::from_index(index).ok_or_else(invalid)?;
        let bin = TimeOfDay::parse(time).map_err(|_| invalid())?;
        Self::new(weekday, bin).map_err(|_| invalid())
    }
}

/// Every cell in the week, weekday-major, bins in time order
pub fn all_cells() -> impl Iterator<Item = CellKey> {
    Weekday::ALL.into_iter().flat_map(|weekday| {
        time_bins()
            .iter()
            .map(move |&bin| CellKey { weekday, bin })
    })
}
