use crate::domain::renewal::RenewalRequest;
use crate::domain::value_objects::{MemberId, RenewalRequestId, StaffId};
use crate::domain::RenewalStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 更新申請ビュー（Read Model）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalView {
    pub request_id: RenewalRequestId,
    pub member_id: MemberId,
    pub status: RenewalStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<StaffId>,
    pub updated_at: DateTime<Utc>,
}

impl From<&RenewalRequest> for RenewalView {
    fn from(request: &RenewalRequest) -> Self {
        let core = request.core();
        let (processed_at, processed_by) = match request {
            RenewalRequest::Pending(_) => (None, None),
            RenewalRequest::Approved(a) => (Some(a.processed_at), Some(a.processed_by)),
            RenewalRequest::Rejected(r) => (Some(r.processed_at), Some(r.processed_by)),
        };

        Self {
            request_id: core.request_id,
            member_id: core.member_id,
            status: request.status(),
            requested_at: core.requested_at,
            processed_at,
            processed_by,
            updated_at: core.updated_at,
        }
    }
}

/// 更新申請Read Modelポート
#[async_trait]
pub trait RenewalReadModel: Send + Sync {
    /// 申請の現在状態を保存する（upsert）
    async fn save(&self, view: RenewalView) -> Result<()>;

    /// 承認待ちの申請を登録する
    ///
    /// 会員に承認待ち申請が既にあれば何も書き込まず`false`を返す。
    /// 確認と書き込みは不可分に行われる。
    async fn insert_pending(&self, view: RenewalView) -> Result<bool>;

    /// 申請を削除する（イベント保存に失敗した登録の取り消し用）
    async fn delete(&self, request_id: RenewalRequestId) -> Result<()>;

    /// IDで申請を取得する
    async fn get_by_id(&self, request_id: RenewalRequestId) -> Result<Option<RenewalView>>;

    /// 承認待ちの申請を申請日順に取得する
    async fn find_pending(&self) -> Result<Vec<RenewalView>>;

    /// 会員の承認待ち申請を取得する
    ///
    /// 会員ごとに承認待ちは高々1件。
    async fn find_pending_by_member(&self, member_id: MemberId) -> Result<Option<RenewalView>>;
}
