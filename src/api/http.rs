use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{error, warn};

use super::{ApiError, LearningApi};
use crate::config::Config;
use crate::types::{Achievement, Lesson, Notification, UserAchievement};

const MAX_RETRIES: usize = 2;
const BASE_BACKOFF_MS: u64 = 200;

#[derive(Clone)]
pub struct HttpLearningApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLearningApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone(), config.api_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let resp = self
            .send_with_retry(|| self.client.get(&url).query(query))
            .await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(%url, error = %e, "failed to decode response body");
            ApiError::Json(e)
        })
    }

    async fn send_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        self.send_with_retry(|| {
            let req = self.client.request(method.clone(), &url);
            match &body {
                Some(body) => req.json(body),
                None => req,
            }
        })
        .await?;
        Ok(())
    }

    async fn send_with_retry(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        let mut retry = 0;
        loop {
            let err = match build().send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    let err = ApiError::HttpStatus { status, body };
                    if !is_retryable(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) => ApiError::Request(e),
            };

            if retry >= MAX_RETRIES {
                return Err(err);
            }
            let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
            warn!(retry, error = %err, "learning api request failed, retrying");
            sleep(backoff).await;
            retry += 1;
        }
    }
}

impl LearningApi for HttpLearningApi {
    async fn fetch_lessons(&self) -> Result<Vec<Lesson>, ApiError> {
        self.get_json("lessons", &[]).await
    }

    async fn fetch_achievements(&self) -> Result<Vec<Achievement>, ApiError> {
        self.get_json("achievements", &[]).await
    }

    async fn fetch_user_achievements(&self, user_id: &str) -> Result<Vec<UserAchievement>, ApiError> {
        self.get_json("userAchievements", &[("userId", user_id)]).await
    }

    async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        self.get_json("notifications", &[("userId", user_id)]).await
    }

    async fn mark_word_learned(&self, word_id: &str) -> Result<(), ApiError> {
        self.send_empty(Method::POST, &format!("words/{word_id}/learn"), None)
            .await
    }

    async fn complete_lesson(&self, lesson_id: &str) -> Result<(), ApiError> {
        self.send_empty(Method::POST, &format!("lessons/{lesson_id}/complete"), None)
            .await
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.send_empty(
            Method::PATCH,
            &format!("notifications/{notification_id}"),
            Some(serde_json::json!({ "read": true })),
        )
        .await
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
