use chrono::Utc;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::api::{HttpLearningApi, LearningApi};
use crate::auth::{AuthState, ProfilePatch};
use crate::config::Config;
use crate::error::AppError;
use crate::services::achievement::AchievementProgress;
use crate::services::progress::{DailyGoalProgress, LearnerStats, ProgressError};
use crate::services::quiz::{QuizResult, QuizSheet};
use crate::session::{StudyOutcome, StudySession};
use crate::speech::{LogSpeaker, SpeechConfig, Speaker};
use crate::storage::{Slot, SlotStore};
use crate::types::{Notification, User};

/// Session state wired to the REST collaborator, slot storage, and speech.
///
/// Local state is mutated first; remote writes follow and their failures are logged,
/// never rolled back. Locks are released before every `.await`.
pub struct LearningApp<A, S = LogSpeaker> {
    session: Mutex<StudySession>,
    auth: Mutex<AuthState>,
    api: A,
    store: SlotStore,
    speaker: S,
    speech: SpeechConfig,
}

impl LearningApp<HttpLearningApi, LogSpeaker> {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let store = SlotStore::open(&config.storage_dir)?;
        let mut session = StudySession::new(config.user_id.clone(), Vec::new(), Vec::new());
        session
            .progress_mut()
            .set_daily_goal(i64::from(config.daily_goal))?;

        Ok(Self::new(session, HttpLearningApi::from_config(config), store, LogSpeaker)
            .with_speech(SpeechConfig::with_language(config.speech_language.clone())))
    }
}

impl<A: LearningApi, S: Speaker> LearningApp<A, S> {
    pub fn new(session: StudySession, api: A, store: SlotStore, speaker: S) -> Self {
        Self {
            session: Mutex::new(session),
            auth: Mutex::new(AuthState::default()),
            api,
            store,
            speaker,
            speech: SpeechConfig::default(),
        }
    }

    pub fn with_speech(mut self, speech: SpeechConfig) -> Self {
        self.speech = speech;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    pub fn speaker(&self) -> &S {
        &self.speaker
    }

    /// Runs `f` against the session under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&StudySession) -> R) -> R {
        f(&self.session.lock())
    }

    pub fn current_user(&self) -> Option<User> {
        self.auth.lock().user().cloned()
    }

    pub fn stats(&self) -> LearnerStats {
        self.session.lock().stats()
    }

    pub fn total_points(&self) -> u64 {
        self.session.lock().total_points()
    }

    pub fn daily_goal_progress(&self) -> DailyGoalProgress {
        self.session.lock().progress().daily_goal_progress()
    }

    pub fn progress_report(&self) -> Vec<AchievementProgress> {
        let session = self.session.lock();
        session.achievements().progress_report(&session.stats())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.session.lock().notifications().all().to_vec()
    }

    /// Loads all three slots. Missing slots leave the defaults in place.
    pub fn restore(&self) -> Result<(), AppError> {
        let auth = self.store.load_auth()?;
        let achievements = self.store.load_achievements()?;
        let learning = self.store.load_learning()?;

        let user_id = auth.map(|snapshot| {
            let mut state = self.auth.lock();
            state.restore(snapshot);
            state.user_id().map(str::to_string)
        });

        let mut session = self.session.lock();
        if let Some(Some(user_id)) = user_id {
            session.set_user_id(user_id);
        }
        if let Some(snapshot) = achievements {
            session.restore_achievements(snapshot);
        }
        if let Some(snapshot) = learning {
            session.progress_mut().restore(snapshot);
        }
        info!(
            user_id = %session.user_id(),
            total_points = session.total_points(),
            learned = session.progress().learned_words().len(),
            "session restored"
        );
        Ok(())
    }

    /// Fetches the lesson and achievement catalogs plus the user's remote records.
    pub async fn sync_catalog(&self) -> Result<(), AppError> {
        let user_id = self.session.lock().user_id().to_string();

        let lessons = self.api.fetch_lessons().await?;
        let catalog = self.api.fetch_achievements().await?;
        let earned = self.api.fetch_user_achievements(&user_id).await?;
        let notifications = self.api.fetch_notifications(&user_id).await?;

        {
            let mut session = self.session.lock();
            let lesson_count = lessons.len();
            session.progress_mut().replace_lessons(lessons);
            session.achievements_mut().set_catalog(catalog);
            let merged = session.achievements_mut().merge_earned(earned);
            let incoming = session.notifications_mut().merge(notifications);
            info!(lessons = lesson_count, merged, incoming, "catalog synced");
        }

        self.persist(Slot::Achievement);
        self.persist(Slot::Learning);
        Ok(())
    }

    pub fn sign_in(&self, user: User) {
        let user_id = user.id.clone();
        self.auth.lock().sign_in(user);
        self.session.lock().set_user_id(user_id);
        self.persist(Slot::Auth);
    }

    pub fn logout(&self) {
        self.auth.lock().logout();
        self.persist(Slot::Auth);
    }

    pub fn update_profile(&self, patch: ProfilePatch) -> bool {
        let updated = self.auth.lock().update_profile(patch);
        if updated {
            self.persist(Slot::Auth);
        }
        updated
    }

    pub async fn learn_word(&self, word_id: &str) -> Result<StudyOutcome, AppError> {
        let today = Utc::now().date_naive();
        let outcome = self.session.lock().learn_word_on(word_id, today)?;
        if !outcome.changed {
            return Ok(outcome);
        }

        self.persist(Slot::Learning);
        self.persist(Slot::Achievement);

        if let Err(err) = self.api.mark_word_learned(word_id).await {
            warn!(word_id, error = %err, "remote word-learned write failed, keeping local state");
        }
        Ok(outcome)
    }

    pub async fn finish_lesson(&self, lesson_id: &str) -> Result<StudyOutcome, AppError> {
        let today = Utc::now().date_naive();
        let outcome = self.session.lock().finish_lesson_on(lesson_id, today)?;
        if !outcome.changed {
            return Ok(outcome);
        }

        self.persist(Slot::Learning);
        self.persist(Slot::Achievement);

        if let Err(err) = self.api.complete_lesson(lesson_id).await {
            warn!(lesson_id, error = %err, "remote lesson-complete write failed, keeping local state");
        }
        Ok(outcome)
    }

    pub fn check_achievements(&self, stats: &LearnerStats) -> StudyOutcome {
        let outcome = self.session.lock().check_achievements(stats);
        if outcome.changed {
            self.persist(Slot::Achievement);
        }
        outcome
    }

    pub fn update_points(&self, delta: i64) -> Result<u64, AppError> {
        let total = self.session.lock().update_points(delta)?;
        self.persist(Slot::Achievement);
        Ok(total)
    }

    pub fn set_daily_goal(&self, goal: i64) -> Result<(), AppError> {
        self.session.lock().progress_mut().set_daily_goal(goal)?;
        self.persist(Slot::Learning);
        Ok(())
    }

    pub fn set_current_lesson(&self, lesson_id: &str) -> Result<(), AppError> {
        self.session.lock().progress_mut().set_current_lesson(lesson_id)?;
        Ok(())
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<bool, AppError> {
        let changed = self.session.lock().mark_notification_read(notification_id)?;
        if !changed {
            return Ok(false);
        }

        self.persist(Slot::Achievement);
        if let Err(err) = self.api.mark_notification_read(notification_id).await {
            warn!(notification_id, error = %err, "remote notification-read write failed");
        }
        Ok(true)
    }

    pub async fn mark_all_notifications_read(&self) -> usize {
        let ids = self.session.lock().notifications_mut().mark_all_read();
        if ids.is_empty() {
            return 0;
        }

        self.persist(Slot::Achievement);
        for id in &ids {
            if let Err(err) = self.api.mark_notification_read(id).await {
                warn!(notification_id = %id, error = %err, "remote notification-read write failed");
            }
        }
        ids.len()
    }

    pub fn submit_quiz(&self, lesson_id: &str, sheet: &mut QuizSheet) -> Result<QuizResult, AppError> {
        let session = self.session.lock();
        let lesson = session
            .progress()
            .lesson(lesson_id)
            .ok_or_else(|| ProgressError::LessonNotFound(lesson_id.to_string()))?;
        Ok(sheet.submit(lesson))
    }

    /// Fire-and-forget pronunciation of a word's English text.
    pub fn pronounce(&self, word_id: &str) -> Result<(), AppError> {
        let text = self
            .session
            .lock()
            .progress()
            .find_word(word_id)
            .map(|w| w.english.clone())
            .ok_or_else(|| ProgressError::WordNotFound(word_id.to_string()))?;
        self.speaker.speak(&text, &self.speech);
        Ok(())
    }

    fn persist(&self, slot: Slot) {
        let result = match slot {
            Slot::Auth => {
                let snapshot = self.auth.lock().snapshot();
                self.store.save_auth(&snapshot)
            }
            Slot::Achievement => {
                let snapshot = self.session.lock().achievement_snapshot();
                self.store.save_achievements(&snapshot)
            }
            Slot::Learning => {
                let snapshot = self.session.lock().progress().snapshot();
                self.store.save_learning(&snapshot)
            }
        };

        if let Err(err) = result {
            warn!(slot = slot.key(), error = %err, "failed to persist slot");
        }
    }
}
