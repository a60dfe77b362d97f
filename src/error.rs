use crate::api::ApiError;
use crate::services::achievement::AchievementError;
use crate::services::notification::NotificationError;
use crate::services::points::PointsError;
use crate::services::progress::ProgressError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Achievement(#[from] AchievementError),
    #[error(transparent)]
    Points(#[from] PointsError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Progress(ProgressError::InvalidDailyGoal(_)) | Self::Points(_) => "VALIDATION_ERROR",
            Self::Progress(_) | Self::Achievement(_) | Self::Notification(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Api(_) => "REMOTE_ERROR",
        }
    }

    /// Operational errors come from bad input and are safe to show to the user.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::Api(_))
    }
}
