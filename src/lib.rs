pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod services;
pub mod session;
pub mod speech;
pub mod storage;
pub mod types;

pub use app::LearningApp;
pub use error::AppError;
pub use session::{StudyOutcome, StudySession};
