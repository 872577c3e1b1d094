//! Reading goal engine.
//!
//! Yearly targets, the running count of finished books, and the figures
//! derived from them. Storage goes through [`GoalStore`]; analytics and
//! messages are pure functions of a goal and a date.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use shelfwise_core::UserId;

use crate::db::{GoalStore, Insertion, RepositoryError};
use crate::models::{GoalProgress, ReadingGoal};

/// Errors from goal operations.
///
/// Business variants display as user-facing messages.
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("You don't have a reading goal for that year.")]
    NotFound,

    #[error("You already have a reading goal for that year.")]
    AlreadyExists,

    #[error("Your goal must be at least one book.")]
    InvalidTarget,

    #[error("Books read cannot be negative.")]
    NegativeProgress,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl GoalError {
    /// Short code carried in `?error=` redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "goal_not_found",
            Self::AlreadyExists => "goal_exists",
            Self::InvalidTarget => "invalid_target",
            Self::NegativeProgress => "negative_progress",
            Self::Repository(_) => "server_error",
        }
    }
}

/// Goal operations over any [`GoalStore`].
pub struct ReadingGoalService<S> {
    store: S,
}

impl<S: GoalStore> ReadingGoalService<S> {
    /// Create a new goal service.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Create the goal for a year.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::InvalidTarget` if `target_books` is not positive.
    /// Returns `GoalError::AlreadyExists` if the user has a goal for the year.
    pub async fn set_goal(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<ReadingGoal, GoalError> {
        validate_target(target_books)?;

        match self
            .store
            .insert_if_absent(user_id, year, target_books)
            .await?
        {
            Insertion::Created(goal) => {
                tracing::info!(user_id = %user_id, year, target_books, "Reading goal set");
                Ok(goal)
            }
            Insertion::AlreadyExists => Err(GoalError::AlreadyExists),
        }
    }

    /// Count one more finished book.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::NotFound` if there is no goal for the year.
    pub async fn increment_progress(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<ReadingGoal, GoalError> {
        self.store
            .adjust_books_read(user_id, year, 1)
            .await?
            .ok_or(GoalError::NotFound)
    }

    /// Count one fewer finished book, never going below zero.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::NotFound` if there is no goal for the year.
    pub async fn decrement_progress(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<ReadingGoal, GoalError> {
        self.store
            .adjust_books_read(user_id, year, -1)
            .await?
            .ok_or(GoalError::NotFound)
    }

    /// Set the finished-book count outright. Values above the target are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::NegativeProgress` if `books_read` is negative.
    /// Returns `GoalError::NotFound` if there is no goal for the year.
    pub async fn update_progress(
        &self,
        user_id: UserId,
        year: i32,
        books_read: i32,
    ) -> Result<ReadingGoal, GoalError> {
        if books_read < 0 {
            return Err(GoalError::NegativeProgress);
        }

        self.store
            .set_books_read(user_id, year, books_read)
            .await?
            .ok_or(GoalError::NotFound)
    }

    /// Change the target of an existing goal.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::InvalidTarget` if `target_books` is not positive.
    /// Returns `GoalError::NotFound` if there is no goal for the year.
    pub async fn update_target(
        &self,
        user_id: UserId,
        year: i32,
        target_books: i32,
    ) -> Result<ReadingGoal, GoalError> {
        validate_target(target_books)?;

        self.store
            .set_target(user_id, year, target_books)
            .await?
            .ok_or(GoalError::NotFound)
    }

    /// Delete the goal for a year.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::NotFound` if there is no goal for the year.
    pub async fn delete_goal(&self, user_id: UserId, year: i32) -> Result<(), GoalError> {
        if self.store.delete(user_id, year).await? {
            tracing::info!(user_id = %user_id, year, "Reading goal deleted");
            Ok(())
        } else {
            Err(GoalError::NotFound)
        }
    }

    /// Look up the goal for a year.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::Repository` if the lookup fails.
    pub async fn get_goal(
        &self,
        user_id: UserId,
        year: i32,
    ) -> Result<Option<ReadingGoal>, GoalError> {
        Ok(self.store.get(user_id, year).await?)
    }

    /// All of a user's goals, most recent year first.
    ///
    /// # Errors
    ///
    /// Returns `GoalError::Repository` if the lookup fails.
    pub async fn list_goals(&self, user_id: UserId) -> Result<Vec<ReadingGoal>, GoalError> {
        Ok(self.store.list_for_user(user_id).await?)
    }
}

fn validate_target(target_books: i32) -> Result<(), GoalError> {
    if target_books <= 0 {
        return Err(GoalError::InvalidTarget);
    }
    Ok(())
}

/// Number of days in `year`, 365 for years chrono cannot represent.
fn days_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31).map_or(365, |d| d.ordinal())
}

/// Progress figures for `goal` as of `today`.
#[must_use]
pub fn progress_analytics(goal: &ReadingGoal, today: NaiveDate) -> GoalProgress {
    let target = f64::from(goal.target_books);
    let read = f64::from(goal.books_read);

    let percentage = if goal.target_books > 0 {
        read / target * 100.0
    } else {
        0.0
    };
    let remaining = (goal.target_books - goal.books_read).max(0);

    let year_days = days_in_year(goal.year);
    let (year_elapsed, days_left) = match today.year().cmp(&goal.year) {
        std::cmp::Ordering::Less => (0.0, i64::from(year_days)),
        std::cmp::Ordering::Greater => (1.0, 0),
        std::cmp::Ordering::Equal => (
            f64::from(today.ordinal()) / f64::from(year_days),
            i64::from(year_days - today.ordinal() + 1),
        ),
    };

    let books_per_month_needed = if remaining == 0 {
        0.0
    } else if days_left == 0 {
        f64::from(remaining)
    } else {
        // days_left is at most 366, well within f64's exact integer range.
        #[allow(clippy::cast_precision_loss)]
        let months_left = days_left as f64 * 12.0 / f64::from(year_days);
        f64::from(remaining) / months_left
    };

    GoalProgress {
        percentage,
        remaining,
        year_elapsed,
        expected_by_now: target * year_elapsed,
        on_pace: percentage / 100.0 >= year_elapsed,
        days_left,
        books_per_month_needed,
    }
}

fn books(count: i32) -> String {
    if count == 1 {
        "1 book".to_owned()
    } else {
        format!("{count} books")
    }
}

/// Encouragement shown next to a goal, chosen by completion band.
#[must_use]
pub fn motivational_message(goal: Option<&ReadingGoal>) -> String {
    let Some(goal) = goal else {
        return "Set a reading goal to start tracking your progress!".to_owned();
    };

    let percentage = if goal.target_books > 0 {
        f64::from(goal.books_read) / f64::from(goal.target_books) * 100.0
    } else {
        0.0
    };
    let remaining = (goal.target_books - goal.books_read).max(0);

    if percentage >= 100.0 {
        format!(
            "Congratulations! You've reached your goal of {} in {}!",
            books(goal.target_books),
            goal.year
        )
    } else if percentage >= 75.0 {
        format!(
            "Almost there! Only {} left to reach your goal.",
            books(remaining)
        )
    } else if percentage >= 50.0 {
        "You're halfway there! Keep up the great reading.".to_owned()
    } else if percentage >= 25.0 {
        "Great start! You're making steady progress.".to_owned()
    } else if percentage > 0.0 {
        "Every book counts. Keep turning those pages!".to_owned()
    } else {
        format!("Time to start reading! Your first book of {} awaits.", goal.year)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::memory::MemoryGoalStore;

    const READER: UserId = UserId::new(1);

    fn service() -> ReadingGoalService<MemoryGoalStore> {
        ReadingGoalService::new(MemoryGoalStore::default())
    }

    fn goal(year: i32, target_books: i32, books_read: i32) -> ReadingGoal {
        ReadingGoal {
            id: shelfwise_core::ReadingGoalId::new(1),
            user_id: READER,
            year,
            target_books,
            books_read,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_set_goal_twice_fails() {
        let goals = service();
        goals.set_goal(READER, 2024, 12).await.unwrap();

        let err = goals.set_goal(READER, 2024, 20).await.unwrap_err();
        assert!(matches!(err, GoalError::AlreadyExists));

        // Another year, or another reader, is fine.
        goals.set_goal(READER, 2025, 20).await.unwrap();
        goals.set_goal(UserId::new(2), 2024, 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_goal_rejects_non_positive_target() {
        let goals = service();
        assert!(matches!(
            goals.set_goal(READER, 2024, 0).await,
            Err(GoalError::InvalidTarget)
        ));
        assert!(matches!(
            goals.set_goal(READER, 2024, -3).await,
            Err(GoalError::InvalidTarget)
        ));
    }

    #[tokio::test]
    async fn test_increment_five_of_twelve() {
        let goals = service();
        goals.set_goal(READER, 2024, 12).await.unwrap();
        for _ in 0..5 {
            goals.increment_progress(READER, 2024).await.unwrap();
        }

        let goal = goals.get_goal(READER, 2024).await.unwrap().unwrap();
        assert_eq!(goal.books_read, 5);

        let progress = progress_analytics(&goal, date(2024, 6, 1));
        assert!((progress.percentage - 41.666_666).abs() < 0.001);
        assert_eq!(progress.remaining, 7);
        assert_eq!(progress.display_percentage(), "41.7%");
    }

    #[tokio::test]
    async fn test_increment_then_decrement_restores_count() {
        let goals = service();
        goals.set_goal(READER, 2024, 10).await.unwrap();
        goals.update_progress(READER, 2024, 3).await.unwrap();

        goals.increment_progress(READER, 2024).await.unwrap();
        let goal = goals.decrement_progress(READER, 2024).await.unwrap();
        assert_eq!(goal.books_read, 3);
    }

    #[tokio::test]
    async fn test_decrement_at_zero_stays_zero() {
        let goals = service();
        goals.set_goal(READER, 2024, 10).await.unwrap();

        let goal = goals.decrement_progress(READER, 2024).await.unwrap();
        assert_eq!(goal.books_read, 0);

        let goal = goals.increment_progress(READER, 2024).await.unwrap();
        assert_eq!(goal.books_read, 1);
    }

    #[tokio::test]
    async fn test_progress_without_goal_is_not_found() {
        let goals = service();
        assert!(matches!(
            goals.increment_progress(READER, 2024).await,
            Err(GoalError::NotFound)
        ));
        assert!(matches!(
            goals.decrement_progress(READER, 2024).await,
            Err(GoalError::NotFound)
        ));
        assert!(matches!(
            goals.update_progress(READER, 2024, 4).await,
            Err(GoalError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_progress_rejects_negative() {
        let goals = service();
        goals.set_goal(READER, 2024, 10).await.unwrap();
        assert!(matches!(
            goals.update_progress(READER, 2024, -1).await,
            Err(GoalError::NegativeProgress)
        ));
    }

    #[tokio::test]
    async fn test_progress_may_exceed_target() {
        let goals = service();
        goals.set_goal(READER, 2024, 2).await.unwrap();
        let goal = goals.update_progress(READER, 2024, 5).await.unwrap();
        assert_eq!(goal.books_read, 5);

        let progress = progress_analytics(&goal, date(2024, 12, 31));
        assert!((progress.percentage - 250.0).abs() < f64::EPSILON);
        assert_eq!(progress.remaining, 0);
        assert_eq!(progress.bar_width(), 100);
        assert!(progress.books_per_month_needed.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_update_target_and_delete() {
        let goals = service();
        goals.set_goal(READER, 2024, 10).await.unwrap();

        let goal = goals.update_target(READER, 2024, 24).await.unwrap();
        assert_eq!(goal.target_books, 24);
        assert!(matches!(
            goals.update_target(READER, 2024, 0).await,
            Err(GoalError::InvalidTarget)
        ));

        goals.delete_goal(READER, 2024).await.unwrap();
        assert!(goals.get_goal(READER, 2024).await.unwrap().is_none());
        assert!(matches!(
            goals.delete_goal(READER, 2024).await,
            Err(GoalError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_goals_newest_year_first() {
        let goals = service();
        goals.set_goal(READER, 2022, 10).await.unwrap();
        goals.set_goal(READER, 2024, 10).await.unwrap();
        goals.set_goal(READER, 2023, 10).await.unwrap();
        goals.set_goal(UserId::new(9), 2025, 1).await.unwrap();

        let years: Vec<i32> = goals
            .list_goals(READER)
            .await
            .unwrap()
            .iter()
            .map(|g| g.year)
            .collect();
        assert_eq!(years, vec![2024, 2023, 2022]);
    }

    #[test]
    fn test_analytics_zero_target_does_not_divide_by_zero() {
        let progress = progress_analytics(&goal(2024, 0, 3), date(2024, 3, 1));
        assert!(progress.percentage.abs() < f64::EPSILON);
        assert_eq!(progress.remaining, 0);
        assert!(progress.percentage.is_finite());
    }

    #[test]
    fn test_analytics_pace_mid_year() {
        // 2023 has 365 days; July 2 is day 183.
        let today = date(2023, 7, 2);
        let behind = progress_analytics(&goal(2023, 20, 5), today);
        assert!(!behind.on_pace);
        assert!((behind.expected_by_now - 20.0 * 183.0 / 365.0).abs() < 1e-9);
        assert_eq!(behind.days_left, 183);

        let ahead = progress_analytics(&goal(2023, 20, 12), today);
        assert!(ahead.on_pace);
    }

    #[test]
    fn test_analytics_outside_goal_year() {
        let before = progress_analytics(&goal(2025, 12, 0), date(2024, 11, 1));
        assert!(before.year_elapsed.abs() < f64::EPSILON);
        assert!(before.on_pace);
        assert_eq!(before.days_left, 365);
        assert!((before.books_per_month_needed - 1.0).abs() < 1e-9);

        let after = progress_analytics(&goal(2023, 12, 6), date(2024, 2, 1));
        assert!((after.year_elapsed - 1.0).abs() < f64::EPSILON);
        assert!(!after.on_pace);
        assert_eq!(after.days_left, 0);
        assert!((after.books_per_month_needed - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_analytics_leap_year_last_day() {
        let progress = progress_analytics(&goal(2024, 12, 12), date(2024, 12, 31));
        assert!((progress.year_elapsed - 1.0).abs() < f64::EPSILON);
        assert_eq!(progress.days_left, 1);
        assert!(progress.on_pace);
    }

    #[test]
    fn test_motivational_message_bands() {
        assert!(motivational_message(None).starts_with("Set a reading goal"));
        assert!(motivational_message(Some(&goal(2024, 10, 10))).starts_with("Congratulations"));
        assert!(motivational_message(Some(&goal(2024, 10, 14))).starts_with("Congratulations"));
        assert_eq!(
            motivational_message(Some(&goal(2024, 10, 8))),
            "Almost there! Only 2 books left to reach your goal."
        );
        assert_eq!(
            motivational_message(Some(&goal(2024, 4, 3))),
            "Almost there! Only 1 book left to reach your goal."
        );
        assert!(motivational_message(Some(&goal(2024, 10, 5))).contains("halfway"));
        assert!(motivational_message(Some(&goal(2024, 10, 3))).starts_with("Great start"));
        assert!(motivational_message(Some(&goal(2024, 10, 1))).starts_with("Every book counts"));
        assert!(motivational_message(Some(&goal(2024, 10, 0))).contains("2024"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GoalError::AlreadyExists.code(), "goal_exists");
        assert_eq!(
            GoalError::NotFound.to_string(),
            "You don't have a reading goal for that year."
        );
    }
}
