//! Shift model.
//!
//! This module defines the [`Shift`] struct describing one block of required
//! cover in a room on a calendar date.

use std::collections::BTreeSet;

use chrono::{Datelike, IsoWeek, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A block of time in a room that needs staffing.
///
/// Start and end are wall-clock times on `date`; a shift never crosses
/// midnight. Staff counts satisfy `min_staff <= required_staff <= max_staff`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: String,
    /// The calendar date of the shift.
    pub date: NaiveDate,
    /// The start time of the shift.
    pub start_time: NaiveTime,
    /// The end time of the shift.
    pub end_time: NaiveTime,
    /// The room being staffed.
    pub room: String,
    /// Skills every assigned employee must hold.
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    /// The number of staff the room should have.
    pub required_staff: u32,
    /// The number of staff below which the room cannot legally open.
    pub min_staff: u32,
    /// The most staff the room can take.
    pub max_staff: u32,
    /// Free-form shift category such as "regular", "morning" or "split".
    #[serde(default = "default_shift_type")]
    pub shift_type: String,
    /// Children expected in the room, used for the child-to-staff ratio.
    #[serde(default)]
    pub expected_children: u32,
}

fn default_shift_type() -> String {
    "regular".to_string()
}

impl Shift {
    /// Returns the start of the shift as a full datetime.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// Returns the end of the shift as a full datetime.
    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    /// Length of the shift in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end() - self.start()).num_minutes()
    }

    /// Length of the shift in hours.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::Shift;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let shift = Shift {
    ///     id: "shift_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
    ///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(13, 30, 0).unwrap(),
    ///     room: "Infant".to_string(),
    ///     required_skills: Default::default(),
    ///     required_staff: 1,
    ///     min_staff: 1,
    ///     max_staff: 2,
    ///     shift_type: "regular".to_string(),
    ///     expected_children: 0,
    /// };
    /// assert_eq!(shift.duration_hours(), Decimal::new(45, 1)); // 4.5 hours
    /// ```
    pub fn duration_hours(&self) -> Decimal {
        Decimal::new(self.duration_minutes(), 0) / Decimal::new(60, 0)
    }

    /// Returns the day of the week for the shift.
    pub fn day_of_week(&self) -> Weekday {
        self.date.weekday()
    }

    /// Returns the ISO week the shift falls in, used for weekly hour caps.
    pub fn week(&self) -> IsoWeek {
        self.date.iso_week()
    }

    /// Returns true if the two shifts share any instant.
    pub fn overlaps(&self, other: &Shift) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }

    /// Minutes between the end of the earlier shift and the start of the
    /// later one, or `None` if they overlap.
    ///
    /// The result does not depend on argument order.
    pub fn gap_minutes(&self, other: &Shift) -> Option<i64> {
        if self.overlaps(other) {
            return None;
        }
        let gap = if self.end() <= other.start() {
            other.start() - self.end()
        } else {
            self.start() - other.end()
        };
        Some(gap.num_minutes())
    }

    /// Staff needed to keep `expected_children` within `ratio` children per
    /// adult. A non-positive ratio imposes no requirement.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::Shift;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let mut shift = Shift {
    ///     id: "shift_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
    ///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
    ///     room: "Toddler".to_string(),
    ///     required_skills: Default::default(),
    ///     required_staff: 2,
    ///     min_staff: 1,
    ///     max_staff: 3,
    ///     shift_type: "regular".to_string(),
    ///     expected_children: 9,
    /// };
    /// assert_eq!(shift.ratio_staff_needed(Decimal::from(4)), 3);
    /// shift.expected_children = 8;
    /// assert_eq!(shift.ratio_staff_needed(Decimal::from(4)), 2);
    /// ```
    pub fn ratio_staff_needed(&self, ratio: Decimal) -> u32 {
        if ratio <= Decimal::ZERO || self.expected_children == 0 {
            return 0;
        }
        Decimal::from(self.expected_children)
            .checked_div(ratio)
            .and_then(|needed| needed.ceil().to_u32())
            .unwrap_or(u32::MAX)
    }
}
