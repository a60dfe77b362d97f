//! Text-to-speech seam. Pronunciation requests are fire-and-forget.

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// BCP 47 tag, e.g. "en-US"
    pub language: String,
    /// 0.5 - 2.0
    pub rate: f32,
    /// 0.5 - 2.0
    pub pitch: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            // slightly slow for learners
            rate: 0.9,
            pitch: 1.0,
        }
    }
}

impl SpeechConfig {
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }
}

pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str, config: &SpeechConfig);
}

/// Headless speaker that only records the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&self, text: &str, config: &SpeechConfig) {
        info!(text, language = %config.language, rate = config.rate, "pronounce");
    }
}
