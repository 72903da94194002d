//! Global scheduling constraints for one solve.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How child-to-staff ratio shortfalls are treated by the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioEnforcement {
    /// Ratio shortfalls count towards the hard score and make a schedule
    /// infeasible.
    #[default]
    Hard,
    /// Ratio shortfalls are a heavily weighted soft penalty, permitting
    /// short-term relaxation.
    Soft,
}

/// Legal, ratio and labour rules applied to every employee in a solve.
///
/// Hour limits are per ISO calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConstraints {
    /// Regular weekly hour cap; an employee's own cap applies if lower.
    pub max_hours_per_week: Decimal,
    /// Weekly hours below which a scheduled employee is flagged.
    #[serde(default)]
    pub min_hours_per_week: Decimal,
    /// Longest run of consecutive worked days.
    pub max_consecutive_days: u32,
    /// Minimum rest between two shifts of one employee on the same or
    /// adjacent days.
    pub min_rest_hours_between_shifts: Decimal,
    /// Whether hours beyond the regular cap may be scheduled.
    #[serde(default)]
    pub allow_overtime: bool,
    /// Extra weekly hours allowed when `allow_overtime` is set.
    #[serde(default)]
    pub max_overtime_hours_per_week: Decimal,
    /// Children per adult. Zero disables the ratio rule.
    #[serde(default)]
    pub child_to_staff_ratio: Decimal,
    /// Whether each staffed room needs a lead.
    #[serde(default)]
    pub require_lead_teacher_per_room: bool,
    /// Whether an employee may work two separate shifts on one day.
    #[serde(default)]
    pub allow_split_shifts: bool,
    /// Whether ratio shortfalls are hard or soft.
    #[serde(default)]
    pub ratio_enforcement: RatioEnforcement,
}

impl SchedulingConstraints {
    /// Regular weekly cap for an employee whose own cap is `employee_max`.
    pub fn regular_cap(&self, employee_max: Decimal) -> Decimal {
        employee_max.min(self.max_hours_per_week)
    }

    /// Absolute weekly cap including any permitted overtime.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::SchedulingConstraints;
    /// use rust_decimal::Decimal;
    ///
    /// let mut constraints = SchedulingConstraints::default();
    /// assert_eq!(constraints.hard_cap(Decimal::from(30)), Decimal::from(30));
    ///
    /// constraints.allow_overtime = true;
    /// constraints.max_overtime_hours_per_week = Decimal::from(5);
    /// assert_eq!(constraints.hard_cap(Decimal::from(30)), Decimal::from(35));
    /// ```
    pub fn hard_cap(&self, employee_max: Decimal) -> Decimal {
        let regular = self.regular_cap(employee_max);
        if self.allow_overtime {
            regular
                .checked_add(self.max_overtime_hours_per_week)
                .unwrap_or(Decimal::MAX)
        } else {
            regular
        }
    }

    /// Minimum rest between shifts, in minutes. Saturates rather than
    /// overflowing.
    pub fn min_rest_minutes(&self) -> Decimal {
        self.min_rest_hours_between_shifts
            .checked_mul(Decimal::from(60))
            .unwrap_or(Decimal::MAX)
    }
}

impl Default for SchedulingConstraints {
    /// Defaults match the values the centre dashboard sends when a manager
    /// has not customised anything, and the serde defaults for optional
    /// fields: no ratio rule, no overtime, no split shifts.
    fn default() -> Self {
        Self {
            max_hours_per_week: Decimal::from(40),
            min_hours_per_week: Decimal::ZERO,
            max_consecutive_days: 5,
            min_rest_hours_between_shifts: Decimal::from(8),
            allow_overtime: false,
            max_overtime_hours_per_week: Decimal::ZERO,
            child_to_staff_ratio: Decimal::ZERO,
            require_lead_teacher_per_room: false,
            allow_split_shifts: false,
            ratio_enforcement: RatioEnforcement::Hard,
        }
    }
}
