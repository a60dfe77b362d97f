pub mod achievement;
pub mod notification;
pub mod points;
pub mod progress;
pub mod quiz;

pub use achievement::{AchievementError, AchievementEvaluator, AchievementProgress, Award};
pub use notification::{NotificationEmitter, NotificationError};
pub use points::{PointSource, PointsError, PointsLedger};
pub use progress::{LearnerStats, LearningSnapshot, ProgressError, ProgressTracker};
pub use quiz::{QuizResult, QuizSheet};
