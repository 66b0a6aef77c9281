use crate::domain::notification::{Notification, Recipient};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知フィードポート
///
/// 送信済みの通知を宛先ごとに参照し、既読にする。
#[async_trait]
pub trait NotificationFeed: Send + Sync {
    /// 宛先の通知を新しい順に取得する
    async fn list_for(&self, recipient: Recipient) -> Result<Vec<Notification>>;

    /// 宛先の未読通知をすべて既読にする
    ///
    /// # 戻り値
    /// 既読にした件数
    async fn mark_all_read(&self, recipient: Recipient) -> Result<u64>;
}
