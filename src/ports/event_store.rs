use crate::domain::events::DomainEvent;
use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// イベントストアポート
///
/// ドメインイベントの永続化と取得を抽象化する。
/// イベントは追記専用ログに保存される不変の事実。
/// 貸出記録と更新申請の両方の集約を同じログに保存する。
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 集約のイベントを追加する
    ///
    /// イベントの順序は保持される。
    async fn append(&self, aggregate_id: Uuid, events: Vec<DomainEvent>) -> Result<()>;

    /// 集約のすべてのイベントを追加順に読み込む
    async fn load(&self, aggregate_id: Uuid) -> Result<Vec<DomainEvent>>;

    /// すべての集約のイベントを挿入順にストリーム配信する
    ///
    /// Read Modelの再構築に使用される。
    fn stream_all(&self) -> BoxStream<'_, Result<DomainEvent>>;
}
