use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    Word,
    Lesson,
    Achievement,
    Manual,
}

impl PointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Lesson => "lesson",
            Self::Achievement => "achievement",
            Self::Manual => "manual",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PointsError {
    #[error("negative point delta {0} rejected")]
    NegativeDelta(i64),
}

/// Running points total. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointsLedger {
    total: u64,
}

impl PointsLedger {
    pub fn with_total(total: u64) -> Self {
        Self { total }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn credit(&mut self, source: PointSource, points: u32) -> u64 {
        self.total = self.total.saturating_add(u64::from(points));
        debug!(source = source.as_str(), points, total = self.total, "points credited");
        self.total
    }

    pub fn update_points(&mut self, delta: i64) -> Result<u64, PointsError> {
        if delta < 0 {
            return Err(PointsError::NegativeDelta(delta));
        }
        self.total = self.total.saturating_add(delta as u64);
        debug!(source = PointSource::Manual.as_str(), delta, total = self.total, "points updated");
        Ok(self.total)
    }
}
