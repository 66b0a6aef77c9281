use crate::domain::borrowing_request::BorrowingRequest;
use crate::domain::value_objects::{BookId, BorrowingId, BorrowingRequestId, MemberId, StaffId};
use crate::domain::BorrowRequestStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出申請ビュー（Read Model）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingRequestView {
    pub request_id: BorrowingRequestId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub status: BorrowRequestStatus,
    pub requested_at: DateTime<Utc>,
    pub borrowing_id: Option<BorrowingId>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<StaffId>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BorrowingRequest> for BorrowingRequestView {
    fn from(request: &BorrowingRequest) -> Self {
        let core = request.core();
        let (borrowing_id, processed_at, processed_by) = match request {
            BorrowingRequest::Pending(_) => (None, None, None),
            BorrowingRequest::Accepted(a) => {
                (Some(a.borrowing_id), Some(a.processed_at), Some(a.processed_by))
            }
            BorrowingRequest::Rejected(r) => (None, Some(r.processed_at), Some(r.processed_by)),
        };

        Self {
            request_id: core.request_id,
            member_id: core.member_id,
            book_id: core.book_id,
            status: request.status(),
            requested_at: core.requested_at,
            borrowing_id,
            processed_at,
            processed_by,
            updated_at: core.updated_at,
        }
    }
}

/// 貸出申請Read Modelポート
#[async_trait]
pub trait BorrowingRequestReadModel: Send + Sync {
    /// 申請の現在状態を保存する（upsert）
    async fn save(&self, view: BorrowingRequestView) -> Result<()>;

    /// 承認待ちの申請を登録する
    ///
    /// 同じ会員・同じ書籍の承認待ち申請が既にあれば何も書き込まず`false`を返す。
    async fn insert_pending(&self, view: BorrowingRequestView) -> Result<bool>;

    /// 申請を削除する（イベント保存に失敗した登録の取り消し用）
    async fn delete(&self, request_id: BorrowingRequestId) -> Result<()>;

    /// IDで申請を取得する
    async fn get_by_id(&self, request_id: BorrowingRequestId)
    -> Result<Option<BorrowingRequestView>>;

    /// 承認待ちの申請を申請日順に取得する
    async fn find_pending(&self) -> Result<Vec<BorrowingRequestView>>;

    /// 会員の承認待ち申請を申請日順に取得する
    async fn find_pending_by_member(&self, member_id: MemberId)
    -> Result<Vec<BorrowingRequestView>>;
}
