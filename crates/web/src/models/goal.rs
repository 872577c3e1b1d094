//! Reading goal types.

use chrono::{DateTime, Utc};

use shelfwise_core::{ReadingGoalId, UserId};

/// A reader's target number of books for one calendar year.
///
/// `books_read` never drops below zero but may exceed `target_books`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingGoal {
    pub id: ReadingGoalId,
    pub user_id: UserId,
    pub year: i32,
    pub target_books: i32,
    pub books_read: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived progress figures for a goal on a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    /// `books_read / target_books * 100`; may exceed 100.
    pub percentage: f64,
    /// Books still needed, floored at zero.
    pub remaining: i32,
    /// Fraction of the goal year already elapsed, 0.0 to 1.0.
    pub year_elapsed: f64,
    /// Books a reader on a steady pace would have finished by now.
    pub expected_by_now: f64,
    pub on_pace: bool,
    /// Days left in the goal year, counting today.
    pub days_left: i64,
    /// Books per month needed to finish on time; 0 once complete.
    pub books_per_month_needed: f64,
}

impl GoalProgress {
    /// Percentage rounded for display, e.g. `"41.7%"`.
    #[must_use]
    pub fn display_percentage(&self) -> String {
        format!("{:.1}%", self.percentage)
    }

    /// Percentage clamped to 0..=100 for progress bars.
    #[must_use]
    pub fn bar_width(&self) -> u8 {
        // Clamped to 0..=100, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let width = self.percentage.clamp(0.0, 100.0).round() as u8;
        width
    }
}
