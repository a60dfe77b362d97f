use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{calculate_progress, Lesson, Word};

pub const DEFAULT_DAILY_GOAL: u32 = 10;
pub const MAX_DAILY_GOAL: i64 = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("word not found: {0}")]
    WordNotFound(String),
    #[error("lesson not found: {0}")]
    LessonNotFound(String),
    #[error("invalid daily goal {0}: must be between 1 and {max}", max = MAX_DAILY_GOAL)]
    InvalidDailyGoal(i64),
}

/// Counters for a single calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub words_learned: u32,
    pub lessons_completed: u32,
}

impl DailyActivity {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            words_learned: 0,
            lessons_completed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLearned {
    pub word_id: String,
    pub points: u32,
    pub newly_learned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCompleted {
    pub lesson_id: String,
    pub points: u32,
    pub newly_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalProgress {
    pub learned_today: u32,
    pub goal: u32,
    pub percentage: u8,
}

/// Cumulative counters the achievement rules are evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub lessons_completed: u32,
    pub words_learned: u32,
    pub streak: u32,
    pub lessons_per_day: u32,
}

/// Persisted subset of the tracker. Lessons are catalog data and are re-fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSnapshot {
    pub learned_words: Vec<Word>,
    pub daily_goal: u32,
    pub current_streak: u32,
    #[serde(default)]
    pub last_study_day: Option<NaiveDate>,
    #[serde(default)]
    pub today: Option<DailyActivity>,
    #[serde(default)]
    pub completed_lessons: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    lessons: Vec<Lesson>,
    learned_words: Vec<Word>,
    /// Source of truth for completion, kept even for lessons not in the loaded catalog.
    completed_ids: HashSet<String>,
    current_lesson: Option<String>,
    daily_goal: u32,
    current_streak: u32,
    last_study_day: Option<NaiveDate>,
    today: DailyActivity,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ProgressTracker {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self {
            lessons,
            learned_words: Vec::new(),
            completed_ids: HashSet::new(),
            current_lesson: None,
            daily_goal: DEFAULT_DAILY_GOAL,
            current_streak: 0,
            last_study_day: None,
            today: DailyActivity::new(Utc::now().date_naive()),
        }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    pub fn find_word(&self, word_id: &str) -> Option<&Word> {
        self.lessons
            .iter()
            .flat_map(|l| l.words.iter())
            .find(|w| w.id == word_id)
    }

    pub fn learned_words(&self) -> &[Word] {
        &self.learned_words
    }

    pub fn is_learned(&self, word_id: &str) -> bool {
        self.learned_words.iter().any(|w| w.id == word_id)
    }

    pub fn daily_goal(&self) -> u32 {
        self.daily_goal
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current_lesson.as_deref().and_then(|id| self.lesson(id))
    }

    pub fn set_current_lesson(&mut self, lesson_id: &str) -> Result<(), ProgressError> {
        if self.lesson(lesson_id).is_none() {
            return Err(ProgressError::LessonNotFound(lesson_id.to_string()));
        }
        self.current_lesson = Some(lesson_id.to_string());
        Ok(())
    }

    /// Seeds the lesson catalog. Learned flags are re-applied from the learned-words list
    /// and lessons completed locally stay completed.
    pub fn replace_lessons(&mut self, lessons: Vec<Lesson>) {
        self.lessons = lessons;
        self.completed_ids.extend(
            self.lessons
                .iter()
                .filter(|l| l.completed)
                .map(|l| l.id.clone()),
        );
        self.reapply_learned();

        if let Some(current) = self.current_lesson.as_deref() {
            if self.lesson(current).is_none() {
                self.current_lesson = None;
            }
        }
    }

    pub fn mark_word_learned(&mut self, word_id: &str) -> Result<WordLearned, ProgressError> {
        self.mark_word_learned_on(word_id, Utc::now().date_naive())
    }

    /// Counts a newly learned word towards the activity of `day`.
    pub fn mark_word_learned_on(
        &mut self,
        word_id: &str,
        day: NaiveDate,
    ) -> Result<WordLearned, ProgressError> {
        let word = self
            .find_word(word_id)
            .cloned()
            .ok_or_else(|| ProgressError::WordNotFound(word_id.to_string()))?;

        if self.is_learned(word_id) {
            debug!(word_id, "word already learned");
            return Ok(WordLearned {
                word_id: word.id,
                points: word.points,
                newly_learned: false,
            });
        }

        for lesson in &mut self.lessons {
            for w in lesson.words.iter_mut().filter(|w| w.id == word_id) {
                w.learned = true;
            }
        }

        let points = word.points;
        self.learned_words.push(Word {
            learned: true,
            ..word
        });
        self.activity_on(day).words_learned += 1;

        debug!(word_id, points, total = self.learned_words.len(), "word learned");
        Ok(WordLearned {
            word_id: word_id.to_string(),
            points,
            newly_learned: true,
        })
    }

    pub fn complete_lesson(&mut self, lesson_id: &str) -> Result<LessonCompleted, ProgressError> {
        self.complete_lesson_on(lesson_id, Utc::now().date_naive())
    }

    /// Counts a newly completed lesson towards the activity of `day`.
    pub fn complete_lesson_on(
        &mut self,
        lesson_id: &str,
        day: NaiveDate,
    ) -> Result<LessonCompleted, ProgressError> {
        let lesson = self
            .lessons
            .iter_mut()
            .find(|l| l.id == lesson_id)
            .ok_or_else(|| ProgressError::LessonNotFound(lesson_id.to_string()))?;

        lesson.completed = true;
        lesson.progress = 100;
        let points = lesson.points;
        let newly_completed = self.completed_ids.insert(lesson_id.to_string());

        if newly_completed {
            self.activity_on(day).lessons_completed += 1;
            info!(lesson_id, points, "lesson completed");
        } else {
            debug!(lesson_id, "lesson already completed");
        }

        Ok(LessonCompleted {
            lesson_id: lesson_id.to_string(),
            points,
            newly_completed,
        })
    }

    /// Recomputes a lesson's percentage from its learned words. Completed lessons stay at 100.
    pub fn recompute_progress(&mut self, lesson_id: &str) -> Result<u8, ProgressError> {
        let lesson = self
            .lessons
            .iter_mut()
            .find(|l| l.id == lesson_id)
            .ok_or_else(|| ProgressError::LessonNotFound(lesson_id.to_string()))?;

        if !lesson.completed {
            lesson.progress = calculate_progress(lesson.learned_count(), lesson.words.len());
        }
        Ok(lesson.progress)
    }

    pub fn set_daily_goal(&mut self, goal: i64) -> Result<(), ProgressError> {
        if !(1..=MAX_DAILY_GOAL).contains(&goal) {
            return Err(ProgressError::InvalidDailyGoal(goal));
        }
        self.daily_goal = goal as u32;
        Ok(())
    }

    pub fn update_streak(&mut self) -> u32 {
        self.current_streak = self.current_streak.saturating_add(1);
        self.current_streak
    }

    /// Day-based streak: the same day leaves it unchanged, the next day extends it,
    /// anything else restarts it at 1.
    pub fn record_study_day(&mut self, today: NaiveDate) -> u32 {
        match self.last_study_day {
            Some(last) if last >= today => {}
            Some(last) if last.succ_opt() == Some(today) => {
                self.current_streak = self.current_streak.saturating_add(1);
            }
            _ => self.current_streak = 1,
        }

        if self.last_study_day.map_or(true, |last| today > last) {
            self.last_study_day = Some(today);
        }
        if today > self.today.date {
            self.today = DailyActivity::new(today);
        }
        self.current_streak
    }

    pub fn stats(&self) -> LearnerStats {
        let lessons_per_day = if self.today.date == Utc::now().date_naive() {
            self.today.lessons_completed
        } else {
            0
        };

        LearnerStats {
            lessons_completed: self.completed_ids.len() as u32,
            words_learned: self.learned_words.len() as u32,
            streak: self.current_streak,
            lessons_per_day,
        }
    }

    pub fn daily_goal_progress(&self) -> DailyGoalProgress {
        let learned_today = if self.today.date == Utc::now().date_naive() {
            self.today.words_learned
        } else {
            0
        };
        DailyGoalProgress {
            learned_today,
            goal: self.daily_goal,
            percentage: calculate_progress(learned_today as usize, self.daily_goal as usize),
        }
    }

    pub fn snapshot(&self) -> LearningSnapshot {
        LearningSnapshot {
            learned_words: self.learned_words.clone(),
            daily_goal: self.daily_goal,
            current_streak: self.current_streak,
            last_study_day: self.last_study_day,
            today: Some(self.today),
            completed_lessons: {
                let mut ids: Vec<String> = self.completed_ids.iter().cloned().collect();
                ids.sort_unstable();
                ids
            },
        }
    }

    pub fn restore(&mut self, snapshot: LearningSnapshot) {
        let mut seen = HashSet::new();
        self.learned_words = snapshot
            .learned_words
            .into_iter()
            .filter(|w| seen.insert(w.id.clone()))
            .map(|w| Word { learned: true, ..w })
            .collect();
        self.daily_goal = if snapshot.daily_goal == 0 {
            DEFAULT_DAILY_GOAL
        } else {
            snapshot.daily_goal
        };
        self.current_streak = snapshot.current_streak;
        self.last_study_day = snapshot.last_study_day;
        if let Some(today) = snapshot.today {
            self.today = today;
        }

        self.completed_ids = snapshot.completed_lessons.into_iter().collect();
        self.completed_ids.extend(
            self.lessons
                .iter()
                .filter(|l| l.completed)
                .map(|l| l.id.clone()),
        );
        self.reapply_learned();
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed_ids.contains(lesson_id)
    }

    /// Counters of the most recent study day.
    pub fn activity(&self) -> DailyActivity {
        self.today
    }

    fn reapply_learned(&mut self) {
        let learned: HashSet<&str> = self.learned_words.iter().map(|w| w.id.as_str()).collect();
        for lesson in &mut self.lessons {
            for word in &mut lesson.words {
                if learned.contains(word.id.as_str()) {
                    word.learned = true;
                }
            }
            if self.completed_ids.contains(&lesson.id) {
                lesson.completed = true;
                lesson.progress = 100;
            }
        }
    }

    fn activity_on(&mut self, day: NaiveDate) -> &mut DailyActivity {
        if self.today.date != day {
            self.today = DailyActivity::new(day);
        }
        &mut self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    fn word(id: &str, points: u32) -> Word {
        Word {
            id: id.to_string(),
            english: format!("en-{id}"),
            native: format!("vi-{id}"),
            pronunciation: String::new(),
            difficulty: Difficulty::Easy,
            category: "greetings".to_string(),
            example: String::new(),
            example_native: String::new(),
            learned: false,
            points,
        }
    }

    fn lesson(id: &str, words: Vec<Word>) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: format!("Lesson {id}"),
            description: String::new(),
            category: String::new(),
            difficulty: Difficulty::Easy,
            estimated_time: 10,
            words,
            completed: false,
            progress: 0,
            points: 100,
        }
    }

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(vec![
            lesson("L1", vec![word("w1", 10), word("w2", 10)]),
            lesson("L2", vec![word("w2", 10), word("w3", 20)]),
        ])
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mark_word_learned_is_idempotent() {
        let mut t = tracker();
        let first = t.mark_word_learned("w1").unwrap();
        let second = t.mark_word_learned("w1").unwrap();

        assert!(first.newly_learned);
        assert!(!second.newly_learned);
        assert_eq!(t.learned_words().len(), 1);
        assert!(t.learned_words()[0].learned);
    }

    #[test]
    fn test_mark_word_learned_flips_every_occurrence() {
        let mut t = tracker();
        t.mark_word_learned("w2").unwrap();

        let flags: Vec<bool> = t
            .lessons()
            .iter()
            .flat_map(|l| l.words.iter())
            .filter(|w| w.id == "w2")
            .map(|w| w.learned)
            .collect();
        assert_eq!(flags, vec![true, true]);
        assert_eq!(t.learned_words().len(), 1);
    }

    #[test]
    fn test_mark_unknown_word() {
        let mut t = tracker();
        assert_eq!(
            t.mark_word_learned("nope"),
            Err(ProgressError::WordNotFound("nope".to_string()))
        );
        assert!(t.learned_words().is_empty());
    }

    #[test]
    fn test_complete_lesson_ignores_word_state() {
        let mut t = tracker();
        let done = t.complete_lesson("L1").unwrap();
        assert!(done.newly_completed);
        assert_eq!(done.points, 100);

        let l1 = t.lesson("L1").unwrap();
        assert!(l1.completed);
        assert_eq!(l1.progress, 100);
        assert_eq!(l1.learned_count(), 0);

        assert!(!t.complete_lesson("L1").unwrap().newly_completed);
        assert_eq!(t.stats().lessons_completed, 1);
        assert_eq!(t.stats().lessons_per_day, 1);
    }

    #[test]
    fn test_complete_unknown_lesson() {
        let mut t = tracker();
        assert!(matches!(
            t.complete_lesson("L9"),
            Err(ProgressError::LessonNotFound(_))
        ));
    }

    #[test]
    fn test_recompute_progress() {
        let mut t = tracker();
        t.mark_word_learned("w1").unwrap();
        assert_eq!(t.recompute_progress("L1").unwrap(), 50);
        assert_eq!(t.recompute_progress("L2").unwrap(), 0);

        t.complete_lesson("L2").unwrap();
        assert_eq!(t.recompute_progress("L2").unwrap(), 100);
    }

    #[test]
    fn test_set_daily_goal_validation() {
        let mut t = tracker();
        assert_eq!(t.set_daily_goal(-5), Err(ProgressError::InvalidDailyGoal(-5)));
        assert_eq!(t.set_daily_goal(0), Err(ProgressError::InvalidDailyGoal(0)));
        assert!(t.set_daily_goal(MAX_DAILY_GOAL + 1).is_err());
        assert_eq!(t.daily_goal(), DEFAULT_DAILY_GOAL);

        t.set_daily_goal(25).unwrap();
        assert_eq!(t.daily_goal(), 25);
    }

    #[test]
    fn test_record_study_day_streak() {
        let mut t = tracker();
        assert_eq!(t.record_study_day(date(2026, 3, 1)), 1);
        assert_eq!(t.record_study_day(date(2026, 3, 1)), 1);
        assert_eq!(t.record_study_day(date(2026, 3, 2)), 2);
        assert_eq!(t.record_study_day(date(2026, 3, 3)), 3);
        // earlier dates never move the streak backwards
        assert_eq!(t.record_study_day(date(2026, 3, 2)), 3);
        assert_eq!(t.record_study_day(date(2026, 3, 5)), 1);
    }

    #[test]
    fn test_update_streak_increments() {
        let mut t = tracker();
        assert_eq!(t.update_streak(), 1);
        assert_eq!(t.update_streak(), 2);
        assert_eq!(t.stats().streak, 2);
    }

    #[test]
    fn test_daily_goal_progress() {
        let mut t = tracker();
        t.set_daily_goal(4).unwrap();
        t.mark_word_learned("w1").unwrap();
        t.mark_word_learned("w3").unwrap();

        let goal = t.daily_goal_progress();
        assert_eq!(goal.learned_today, 2);
        assert_eq!(goal.percentage, 50);
    }

    #[test]
    fn test_snapshot_restore_reapplies_flags() {
        let mut t = tracker();
        t.mark_word_learned("w2").unwrap();
        t.complete_lesson("L1").unwrap();
        t.set_daily_goal(15).unwrap();
        let snapshot = t.snapshot();

        let mut restored = tracker();
        restored.restore(snapshot);
        assert_eq!(restored.daily_goal(), 15);
        assert!(restored.is_learned("w2"));
        assert!(restored.lesson("L1").unwrap().completed);
        assert!(restored
            .lessons()
            .iter()
            .flat_map(|l| l.words.iter())
            .filter(|w| w.id == "w2")
            .all(|w| w.learned));
    }

    #[test]
    fn test_completion_survives_restore_before_catalog() {
        let mut t = tracker();
        t.complete_lesson("L1").unwrap();
        let snapshot = t.snapshot();

        let mut restored = ProgressTracker::default();
        restored.restore(snapshot);
        assert!(restored.is_completed("L1"));
        assert_eq!(restored.stats().lessons_completed, 1);

        restored.replace_lessons(tracker().lessons().to_vec());
        assert!(restored.lesson("L1").unwrap().completed);
        assert_eq!(restored.lesson("L1").unwrap().progress, 100);
        assert!(!restored.complete_lesson("L1").unwrap().newly_completed);
        assert_eq!(restored.stats().lessons_completed, 1);
        assert_eq!(restored.snapshot().completed_lessons, vec!["L1".to_string()]);
    }

    #[test]
    fn test_activity_counts_on_given_day() {
        let mut t = tracker();
        let day = date(2026, 3, 1);
        t.mark_word_learned_on("w1", day).unwrap();
        t.complete_lesson_on("L2", day).unwrap();
        t.record_study_day(day);
        t.mark_word_learned_on("w3", day).unwrap();

        let activity = t.activity();
        assert_eq!(activity.date, day);
        assert_eq!(activity.words_learned, 2);
        assert_eq!(activity.lessons_completed, 1);

        t.mark_word_learned_on("w2", date(2026, 3, 2)).unwrap();
        assert_eq!(t.activity().words_learned, 1);
    }

    #[test]
    fn test_replace_lessons_keeps_learned_state() {
        let mut t = tracker();
        t.mark_word_learned("w3").unwrap();
        t.set_current_lesson("L1").unwrap();

        t.replace_lessons(vec![lesson("L2", vec![word("w3", 20)])]);
        assert!(t.lesson("L2").unwrap().words[0].learned);
        assert!(t.current_lesson().is_none());
    }
}
