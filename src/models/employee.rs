//! Employee model and related types.
//!
//! This module defines the [`Employee`] struct and its weekly
//! [`Availability`] windows.

use std::collections::BTreeSet;

use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recurring weekly window in which an employee can work.
///
/// Times are local wall-clock times on the same day; `start_time` must be
/// strictly before `end_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// The day of the week this window applies to.
    pub day_of_week: Weekday,
    /// Start of the window.
    pub start_time: NaiveTime,
    /// End of the window.
    pub end_time: NaiveTime,
    /// Whether the employee prefers to work in this window, as opposed to
    /// merely being available.
    #[serde(default)]
    pub preferred: bool,
}

impl Availability {
    /// Returns true if this window covers `[start, end)` on `day`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::Availability;
    /// use chrono::{NaiveTime, Weekday};
    ///
    /// let window = Availability {
    ///     day_of_week: Weekday::Mon,
    ///     start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    ///     preferred: true,
    /// };
    /// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    /// let one = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
    /// assert!(window.covers(Weekday::Mon, nine, one));
    /// assert!(!window.covers(Weekday::Tue, nine, one));
    /// ```
    pub fn covers(&self, day: Weekday, start: NaiveTime, end: NaiveTime) -> bool {
        self.day_of_week == day && self.start_time <= start && end <= self.end_time
    }

    /// Returns true if two windows on the same day share any time.
    pub fn overlaps(&self, other: &Availability) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

/// A member of staff who can be assigned to shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name, copied into assignments for reporting.
    pub name: String,
    /// Qualifications and certifications held (e.g. "lead", "first_aid").
    #[serde(default)]
    pub skills: BTreeSet<String>,
    /// Weekly availability windows. Windows must not overlap each other.
    #[serde(default)]
    pub availability: Vec<Availability>,
    /// The employee's own cap on weekly hours.
    pub max_hours_per_week: Decimal,
    /// Position or title (e.g. "Lead Teacher", "Assistant").
    #[serde(default)]
    pub position: String,
    /// Inactive employees are never scheduled.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Whether the employee is willing to work two separate shifts on one day.
    #[serde(default = "default_true")]
    pub accepts_split_shifts: bool,
}

fn default_true() -> bool {
    true
}

impl Employee {
    /// Returns true if the employee holds every skill in `required`.
    pub fn has_skills<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        required.into_iter().all(|skill| self.skills.contains(skill))
    }

    /// Returns the availability window covering a slot, if any.
    ///
    /// Windows of one employee never overlap, so at most one can cover a
    /// given slot.
    pub fn window_for(
        &self,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Option<&Availability> {
        self.availability
            .iter()
            .find(|window| window.covers(day, start, end))
    }

    /// Returns true if the employee counts as a lead for a room.
    ///
    /// A lead holds one of `lead_skills` (compared case-insensitively) or has
    /// a position title mentioning "lead".
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Ada".to_string(),
    ///     skills: ["Lead".to_string()].into_iter().collect(),
    ///     availability: vec![],
    ///     max_hours_per_week: Decimal::from(40),
    ///     position: "Teacher".to_string(),
    ///     active: true,
    ///     accepts_split_shifts: true,
    /// };
    /// assert!(employee.is_lead(&["lead".to_string()]));
    /// ```
    pub fn is_lead(&self, lead_skills: &[String]) -> bool {
        let by_skill = self.skills.iter().any(|skill| {
            lead_skills
                .iter()
                .any(|lead| lead.eq_ignore_ascii_case(skill))
        });
        by_skill || self.position.to_ascii_lowercase().contains("lead")
    }
}
