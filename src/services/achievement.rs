use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::services::progress::LearnerStats;
use crate::types::{Achievement, Requirement, RequirementKind, UserAchievement};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AchievementError {
    #[error("achievement not in catalog: {0}")]
    UnknownAchievement(String),
}

/// A newly earned achievement together with the record that was stored for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub achievement: Achievement,
    pub record: UserAchievement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub achievement_id: String,
    pub current: u32,
    pub target: u32,
    pub percentage: u8,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AchievementEvaluator {
    catalog: Vec<Achievement>,
    earned: Vec<UserAchievement>,
}

impl AchievementEvaluator {
    pub fn new(catalog: Vec<Achievement>) -> Self {
        Self {
            catalog,
            earned: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &[Achievement] {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: Vec<Achievement>) {
        self.catalog = catalog;
    }

    pub fn earned(&self) -> &[UserAchievement] {
        &self.earned
    }

    pub fn is_earned(&self, achievement_id: &str) -> bool {
        self.earned.iter().any(|ua| ua.achievement_id == achievement_id)
    }

    /// Tests every not-yet-earned catalog entry against `stats` and records each match.
    pub fn check_achievements(&mut self, user_id: &str, stats: &LearnerStats) -> Vec<Award> {
        let qualifying: Vec<String> = self
            .catalog
            .iter()
            .filter(|a| !self.is_earned(&a.id))
            .filter(|a| check_eligibility(&a.requirement, stats))
            .map(|a| a.id.clone())
            .collect();

        qualifying
            .into_iter()
            .filter_map(|id| {
                self.add_user_achievement(UserAchievement::new(user_id, id))
                    .ok()
                    .flatten()
            })
            .collect()
    }

    /// Stores `record` unless its achievement is already earned.
    pub fn add_user_achievement(
        &mut self,
        record: UserAchievement,
    ) -> Result<Option<Award>, AchievementError> {
        let achievement = self
            .catalog
            .iter()
            .find(|a| a.id == record.achievement_id)
            .cloned()
            .ok_or_else(|| AchievementError::UnknownAchievement(record.achievement_id.clone()))?;

        if self.is_earned(&achievement.id) {
            debug!(achievement_id = %achievement.id, "achievement already earned");
            return Ok(None);
        }

        info!(
            achievement_id = %achievement.id,
            user_id = %record.user_id,
            points = achievement.points,
            "achievement unlocked"
        );
        self.earned.push(record.clone());
        Ok(Some(Award {
            achievement,
            record,
        }))
    }

    /// Replaces the earned set, dropping duplicate achievement ids (first record wins).
    pub fn restore_earned(&mut self, records: Vec<UserAchievement>) {
        self.earned.clear();
        self.merge_earned(records);
    }

    /// Adds externally known records without awarding anything. Returns how many were new.
    pub fn merge_earned(&mut self, records: Vec<UserAchievement>) -> usize {
        let mut seen: HashSet<String> =
            self.earned.iter().map(|ua| ua.achievement_id.clone()).collect();
        let before = self.earned.len();
        self.earned.extend(
            records
                .into_iter()
                .filter(|ua| seen.insert(ua.achievement_id.clone())),
        );
        self.earned.len() - before
    }

    pub fn progress_report(&self, stats: &LearnerStats) -> Vec<AchievementProgress> {
        self.catalog
            .iter()
            .map(|a| {
                let unlocked = self.is_earned(&a.id);
                let current = current_value(a.requirement.kind, stats);
                let target = a.requirement.value;
                let percentage = if unlocked || target == 0 {
                    100
                } else {
                    ((current as f64 / target as f64 * 100.0).min(100.0).round()) as u8
                };
                AchievementProgress {
                    achievement_id: a.id.clone(),
                    current,
                    target,
                    percentage,
                    unlocked,
                }
            })
            .collect()
    }
}

fn check_eligibility(requirement: &Requirement, stats: &LearnerStats) -> bool {
    match requirement.kind {
        RequirementKind::Unknown => false,
        kind => current_value(kind, stats) >= requirement.value,
    }
}

fn current_value(kind: RequirementKind, stats: &LearnerStats) -> u32 {
    match kind {
        RequirementKind::LessonsCompleted => stats.lessons_completed,
        RequirementKind::WordsLearned => stats.words_learned,
        RequirementKind::Streak => stats.streak,
        RequirementKind::LessonsPerDay => stats.lessons_per_day,
        RequirementKind::Unknown => 0,
    }
}
