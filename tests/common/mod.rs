#![allow(dead_code)]

use parking_lot::Mutex;

use lingua_progress::api::{ApiError, LearningApi};
use lingua_progress::types::{
    Achievement, Difficulty, Lesson, Notification, Rarity, Requirement, RequirementKind,
    UserAchievement, Word,
};

pub fn word(id: &str, english: &str, native: &str, points: u32) -> Word {
    Word {
        id: id.to_string(),
        english: english.to_string(),
        native: native.to_string(),
        pronunciation: String::new(),
        difficulty: Difficulty::Easy,
        category: "greetings".to_string(),
        example: String::new(),
        example_native: String::new(),
        learned: false,
        points,
    }
}

pub fn lesson(id: &str, words: Vec<Word>, points: u32) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: format!("Lesson {id}"),
        description: String::new(),
        category: "basics".to_string(),
        difficulty: Difficulty::Easy,
        estimated_time: 15,
        words,
        completed: false,
        progress: 0,
        points,
    }
}

pub fn sample_lessons() -> Vec<Lesson> {
    vec![
        lesson(
            "L1",
            vec![
                word("w1", "Hello", "Xin chào", 10),
                word("w2", "Goodbye", "Tạm biệt", 10),
            ],
            100,
        ),
        lesson(
            "L2",
            vec![
                word("w2", "Goodbye", "Tạm biệt", 10),
                word("w3", "Thank you", "Cảm ơn", 15),
            ],
            150,
        ),
    ]
}

pub fn achievement(id: &str, kind: RequirementKind, value: u32, points: u32) -> Achievement {
    Achievement {
        id: id.to_string(),
        title: format!("Title {id}"),
        description: String::new(),
        icon: "⭐".to_string(),
        points,
        requirement: Requirement { kind, value },
        rarity: Rarity::Common,
    }
}

pub fn sample_catalog() -> Vec<Achievement> {
    vec![
        achievement("first-word", RequirementKind::WordsLearned, 1, 50),
        achievement("three-words", RequirementKind::WordsLearned, 3, 100),
        achievement("first-lesson", RequirementKind::LessonsCompleted, 1, 200),
    ]
}

#[derive(Default)]
pub struct FakeApiState {
    pub learned: Vec<String>,
    pub completed: Vec<String>,
    pub read: Vec<String>,
}

/// In-memory stand-in for the REST collaborator.
#[derive(Default)]
pub struct FakeApi {
    pub lessons: Vec<Lesson>,
    pub catalog: Vec<Achievement>,
    pub user_achievements: Vec<UserAchievement>,
    pub notifications: Vec<Notification>,
    pub fail_writes: bool,
    pub calls: Mutex<FakeApiState>,
}

impl FakeApi {
    pub fn with_catalog(lessons: Vec<Lesson>, catalog: Vec<Achievement>) -> Self {
        Self {
            lessons,
            catalog,
            ..Default::default()
        }
    }

    fn write_result(&self) -> Result<(), ApiError> {
        if self.fail_writes {
            Err(ApiError::HttpStatus {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "down".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl LearningApi for FakeApi {
    async fn fetch_lessons(&self) -> Result<Vec<Lesson>, ApiError> {
        Ok(self.lessons.clone())
    }

    async fn fetch_achievements(&self) -> Result<Vec<Achievement>, ApiError> {
        Ok(self.catalog.clone())
    }

    async fn fetch_user_achievements(&self, user_id: &str) -> Result<Vec<UserAchievement>, ApiError> {
        Ok(self
            .user_achievements
            .iter()
            .filter(|ua| ua.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_word_learned(&self, word_id: &str) -> Result<(), ApiError> {
        self.calls.lock().learned.push(word_id.to_string());
        self.write_result()
    }

    async fn complete_lesson(&self, lesson_id: &str) -> Result<(), ApiError> {
        self.calls.lock().completed.push(lesson_id.to_string());
        self.write_result()
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.calls.lock().read.push(notification_id.to_string());
        self.write_result()
    }
}
