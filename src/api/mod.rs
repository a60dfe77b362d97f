//! REST collaborator consumed by the app facade.

mod http;

use std::future::Future;

use thiserror::Error;

use crate::types::{Achievement, Lesson, Notification, UserAchievement};

pub use http::HttpLearningApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait LearningApi: Send + Sync {
    fn fetch_lessons(&self) -> impl Future<Output = Result<Vec<Lesson>, ApiError>> + Send;

    fn fetch_achievements(&self) -> impl Future<Output = Result<Vec<Achievement>, ApiError>> + Send;

    fn fetch_user_achievements(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<UserAchievement>, ApiError>> + Send;

    fn fetch_notifications(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Notification>, ApiError>> + Send;

    fn mark_word_learned(&self, word_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn complete_lesson(&self, lesson_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn mark_notification_read(
        &self,
        notification_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
