mod errors;

use crate::application::ServiceDependencies;
use crate::domain::notification::{Notification, Recipient};

pub use errors::{NotificationApplicationError, Result};

/// 宛先の通知を新しい順に取得する
pub async fn list_notifications(
    deps: &ServiceDependencies,
    recipient: Recipient,
) -> Result<Vec<Notification>> {
    deps.notification_feed
        .list_for(recipient)
        .await
        .map_err(NotificationApplicationError::FeedError)
}

/// 宛先の通知をすべて既読にする
pub async fn mark_all_read(deps: &ServiceDependencies, recipient: Recipient) -> Result<u64> {
    let marked = deps
        .notification_feed
        .mark_all_read(recipient)
        .await
        .map_err(NotificationApplicationError::FeedError)?;

    tracing::debug!(?recipient, marked, "Notifications marked as read");
    Ok(marked)
}
