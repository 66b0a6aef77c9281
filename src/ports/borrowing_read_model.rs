use crate::domain::borrowing::Borrowing;
use crate::domain::value_objects::{BookId, BorrowingId, Fine, MemberId, MembershipType};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出ステータス（Read Model用）
///
/// 延滞は状態として保存せず、返却予定日と基準日から都度判定する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowingStatus {
    /// 貸出中
    Active,
    /// 返却済み
    Returned,
}

impl BorrowingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowingStatus::Active => "active",
            BorrowingStatus::Returned => "returned",
        }
    }
}

impl std::str::FromStr for BorrowingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(BorrowingStatus::Active),
            "returned" => Ok(BorrowingStatus::Returned),
            _ => Err(format!("Invalid borrowing status: {}", s)),
        }
    }
}

/// 貸出ビュー（Read Model）
///
/// クエリに最適化された非正規化ビュー（CQRSパターン）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingView {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub membership_type: MembershipType,
    pub borrowed_at: DateTime<Utc>,
    pub expected_return_date: NaiveDate,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_paid: Fine,
    pub status: BorrowingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Borrowing> for BorrowingView {
    fn from(borrowing: &Borrowing) -> Self {
        let core = borrowing.core();
        let status = match borrowing {
            Borrowing::Active(_) => BorrowingStatus::Active,
            Borrowing::Returned(_) => BorrowingStatus::Returned,
        };

        Self {
            borrowing_id: core.borrowing_id,
            book_id: core.book_id,
            member_id: core.member_id,
            membership_type: core.membership_type,
            borrowed_at: core.borrowed_at,
            expected_return_date: core.expected_return_date,
            returned_at: borrowing.returned_at(),
            fine_paid: core.fine_paid,
            status,
            created_at: core.created_at,
            updated_at: core.updated_at,
        }
    }
}

/// 貸出Read Modelポート
#[async_trait]
pub trait BorrowingReadModel: Send + Sync {
    /// 貸出の現在状態を保存する（upsert）
    ///
    /// イベントから復元した集約の完全な状態を保存し、部分更新は行わない。
    async fn save(&self, view: BorrowingView) -> Result<()>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<BorrowingView>>;

    /// 会員の貸出中の記録を取得する
    ///
    /// プランごとの貸出上限の確認に使用される。
    async fn find_active_by_member(&self, member_id: MemberId) -> Result<Vec<BorrowingView>>;

    /// 会員の全貸出を取得する（貸出履歴）
    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<BorrowingView>>;

    /// 延滞候補を検索する
    ///
    /// status が active かつ expected_return_date < as_of の記録を返却予定日順に返す。
    async fn find_overdue_candidates(&self, as_of: NaiveDate) -> Result<Vec<BorrowingView>>;

    /// 指定日が返却予定日の貸出中の記録を検索する
    ///
    /// 返却期限のリマインダー送信に使用される。
    async fn find_due_on(&self, date: NaiveDate) -> Result<Vec<BorrowingView>>;
}
