use thiserror::Error;

/// 通知フィードのエラー
#[derive(Debug, Error)]
pub enum NotificationApplicationError {
    #[error("Notification feed error")]
    FeedError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, NotificationApplicationError>;
