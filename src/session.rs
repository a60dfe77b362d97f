use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::achievement::{AchievementError, AchievementEvaluator, Award};
use crate::services::notification::{NotificationEmitter, NotificationError};
use crate::services::points::{PointSource, PointsError, PointsLedger};
use crate::services::progress::{LearnerStats, ProgressError, ProgressTracker};
use crate::types::{Achievement, Lesson, Notification, UserAchievement};

/// What a single study action changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudyOutcome {
    /// False when the action was a no-op (word already learned, lesson already completed).
    pub changed: bool,
    pub points_awarded: u64,
    pub unlocked: Vec<Achievement>,
    pub total_points: u64,
}

/// Persisted subset of the achievement side of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementSnapshot {
    #[serde(default)]
    pub user_achievements: Vec<UserAchievement>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub total_points: u64,
}

/// Owns all learner state for one user and runs the
/// action → progress → evaluate → points → notification chain.
#[derive(Debug, Clone)]
pub struct StudySession {
    user_id: String,
    progress: ProgressTracker,
    achievements: AchievementEvaluator,
    points: PointsLedger,
    notifications: NotificationEmitter,
}

impl StudySession {
    pub fn new(user_id: impl Into<String>, lessons: Vec<Lesson>, catalog: Vec<Achievement>) -> Self {
        Self {
            user_id: user_id.into(),
            progress: ProgressTracker::new(lessons),
            achievements: AchievementEvaluator::new(catalog),
            points: PointsLedger::default(),
            notifications: NotificationEmitter::default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = user_id.into();
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressTracker {
        &mut self.progress
    }

    pub fn achievements(&self) -> &AchievementEvaluator {
        &self.achievements
    }

    pub fn achievements_mut(&mut self) -> &mut AchievementEvaluator {
        &mut self.achievements
    }

    pub fn notifications(&self) -> &NotificationEmitter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationEmitter {
        &mut self.notifications
    }

    pub fn total_points(&self) -> u64 {
        self.points.total()
    }

    pub fn stats(&self) -> LearnerStats {
        self.progress.stats()
    }

    pub fn record_study_day(&mut self, today: NaiveDate) -> u32 {
        self.progress.record_study_day(today)
    }

    pub fn learn_word(&mut self, word_id: &str) -> Result<StudyOutcome, ProgressError> {
        self.learn(word_id, None)
    }

    /// Like `learn_word`, also counting `day` towards the streak when the word is new.
    pub fn learn_word_on(&mut self, word_id: &str, day: NaiveDate) -> Result<StudyOutcome, ProgressError> {
        self.learn(word_id, Some(day))
    }

    pub fn finish_lesson(&mut self, lesson_id: &str) -> Result<StudyOutcome, ProgressError> {
        self.finish(lesson_id, None)
    }

    pub fn finish_lesson_on(
        &mut self,
        lesson_id: &str,
        day: NaiveDate,
    ) -> Result<StudyOutcome, ProgressError> {
        self.finish(lesson_id, Some(day))
    }

    /// Evaluates the catalog against caller-supplied stats.
    pub fn check_achievements(&mut self, stats: &LearnerStats) -> StudyOutcome {
        let awards = self.achievements.check_achievements(&self.user_id, stats);
        self.apply_awards(awards)
    }

    pub fn add_user_achievement(
        &mut self,
        record: UserAchievement,
    ) -> Result<StudyOutcome, AchievementError> {
        let award = self.achievements.add_user_achievement(record)?;
        Ok(self.apply_awards(award.into_iter().collect()))
    }

    pub fn update_points(&mut self, delta: i64) -> Result<u64, PointsError> {
        self.points.update_points(delta)
    }

    pub fn mark_notification_read(&mut self, notification_id: &str) -> Result<bool, NotificationError> {
        self.notifications.mark_as_read(notification_id)
    }

    pub fn achievement_snapshot(&self) -> AchievementSnapshot {
        AchievementSnapshot {
            user_achievements: self.achievements.earned().to_vec(),
            notifications: self.notifications.all().to_vec(),
            total_points: self.points.total(),
        }
    }

    pub fn restore_achievements(&mut self, snapshot: AchievementSnapshot) {
        self.achievements.restore_earned(snapshot.user_achievements);
        self.notifications.restore(snapshot.notifications);
        self.points = PointsLedger::with_total(snapshot.total_points);
    }

    fn learn(&mut self, word_id: &str, day: Option<NaiveDate>) -> Result<StudyOutcome, ProgressError> {
        let counted_on = day.unwrap_or_else(|| Utc::now().date_naive());
        let learned = self.progress.mark_word_learned_on(word_id, counted_on)?;
        if !learned.newly_learned {
            return Ok(self.unchanged());
        }
        if let Some(day) = day {
            self.progress.record_study_day(day);
        }

        self.points.credit(PointSource::Word, learned.points);
        let mut outcome = self.evaluate_current();
        outcome.points_awarded += u64::from(learned.points);
        outcome.changed = true;
        Ok(outcome)
    }

    fn finish(&mut self, lesson_id: &str, day: Option<NaiveDate>) -> Result<StudyOutcome, ProgressError> {
        let counted_on = day.unwrap_or_else(|| Utc::now().date_naive());
        let completed = self.progress.complete_lesson_on(lesson_id, counted_on)?;
        if !completed.newly_completed {
            return Ok(self.unchanged());
        }
        if let Some(day) = day {
            self.progress.record_study_day(day);
        }

        self.points.credit(PointSource::Lesson, completed.points);
        let mut outcome = self.evaluate_current();
        outcome.points_awarded += u64::from(completed.points);
        outcome.changed = true;
        Ok(outcome)
    }

    fn evaluate_current(&mut self) -> StudyOutcome {
        let stats = self.progress.stats();
        self.check_achievements(&stats)
    }

    fn apply_awards(&mut self, awards: Vec<Award>) -> StudyOutcome {
        let mut outcome = StudyOutcome {
            changed: !awards.is_empty(),
            ..Default::default()
        };
        for award in awards {
            self.points.credit(PointSource::Achievement, award.achievement.points);
            self.notifications
                .achievement_unlocked(&award.record.user_id, &award.achievement);
            outcome.points_awarded += u64::from(award.achievement.points);
            outcome.unlocked.push(award.achievement);
        }
        if !outcome.unlocked.is_empty() {
            info!(
                user_id = %self.user_id,
                unlocked = outcome.unlocked.len(),
                total_points = self.points.total(),
                "achievements awarded"
            );
        }
        outcome.total_points = self.points.total();
        outcome
    }

    fn unchanged(&self) -> StudyOutcome {
        StudyOutcome {
            total_points: self.points.total(),
            ..Default::default()
        }
    }
}
