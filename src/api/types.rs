use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::borrowing::{FineSummary, OverdueBorrowing};
use crate::domain::commands::BorrowBook;
use crate::domain::notification::Notification;
use crate::domain::value_objects::{BookId, MemberId, StaffId};
use crate::ports::{BorrowingRequestView, BorrowingStatus, BorrowingView, RenewalView};

// ============================================================================
// Requests
// ============================================================================

/// 貸出作成リクエスト（POST /borrowings）
#[derive(Debug, Deserialize)]
pub struct BorrowBookRequest {
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub staff_id: Uuid,
    /// 省略時は現在時刻
    pub borrowed_at: Option<DateTime<Utc>>,
}

impl BorrowBookRequest {
    pub fn to_command(&self) -> BorrowBook {
        BorrowBook {
            book_id: BookId::from_uuid(self.book_id),
            member_id: MemberId::from_uuid(self.member_id),
            borrowed_at: self.borrowed_at.unwrap_or_else(Utc::now),
            staff_id: StaffId::from_uuid(self.staff_id),
        }
    }
}

/// 延滞料金支払いリクエスト（POST /borrowings/:id/fine/payments）
#[derive(Debug, Deserialize)]
pub struct PayFineRequest {
    /// 省略時は未払い額を全額支払う
    pub amount: Option<u64>,
}

/// 更新申請リクエスト（POST /renewals）
#[derive(Debug, Deserialize)]
pub struct RenewalRequestBody {
    pub member_id: Uuid,
}

/// 更新申請処理リクエスト（POST /renewals/:id/:action）
#[derive(Debug, Deserialize)]
pub struct ProcessRenewalBody {
    pub staff_id: Uuid,
}

/// 貸出申請リクエスト（POST /borrowing-requests）
#[derive(Debug, Deserialize)]
pub struct BorrowingRequestBody {
    pub member_id: Uuid,
    pub book_id: Uuid,
}

/// 貸出申請処理リクエスト（POST /borrowing-requests/:id/:action）
#[derive(Debug, Deserialize)]
pub struct ProcessBorrowingRequestBody {
    pub staff_id: Uuid,
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBorrowingsQuery {
    /// 会員IDでフィルタリング
    pub member_id: Option<Uuid>,
    /// ステータスでフィルタリング（active, returned）
    pub status: Option<String>,
}

/// 基準日のクエリパラメータ
///
/// 省略時は当日（UTC）。
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    pub fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

// ============================================================================
// Responses
// ============================================================================

/// 貸出レスポンス（GET /borrowings/:id と GET /borrowings）
#[derive(Debug, Serialize, Deserialize)]
pub struct BorrowingResponse {
    pub borrowing_id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub membership_type: String,
    pub borrowed_at: DateTime<Utc>,
    pub expected_return_date: NaiveDate,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_paid: u64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BorrowingView> for BorrowingResponse {
    fn from(view: BorrowingView) -> Self {
        Self {
            borrowing_id: view.borrowing_id.value(),
            book_id: view.book_id.value(),
            member_id: view.member_id.value(),
            membership_type: view.membership_type.as_str().to_string(),
            borrowed_at: view.borrowed_at,
            expected_return_date: view.expected_return_date,
            returned_at: view.returned_at,
            fine_paid: view.fine_paid.value(),
            status: view.status.as_str().to_string(),
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

/// 延滞料金の内訳レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct FineResponse {
    pub borrowing_id: Uuid,
    pub membership_type: String,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub as_of: NaiveDate,
    pub overdue_days: u32,
    pub fine: u64,
    pub fine_paid: u64,
    pub outstanding: u64,
}

impl From<FineSummary> for FineResponse {
    fn from(summary: FineSummary) -> Self {
        Self {
            borrowing_id: summary.borrowing_id.value(),
            membership_type: summary.membership_type.as_str().to_string(),
            borrow_date: summary.borrow_date,
            expected_return_date: summary.expected_return_date,
            as_of: summary.as_of,
            overdue_days: summary.overdue_days,
            fine: summary.fine.value(),
            fine_paid: summary.fine_paid.value(),
            outstanding: summary.outstanding.value(),
        }
    }
}

/// 延滞料金支払いレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct FinePaymentResponse {
    pub borrowing_id: Uuid,
    pub amount_paid: u64,
    pub total_paid: u64,
    pub outstanding: u64,
}

/// 延滞一覧の1件
#[derive(Debug, Serialize, Deserialize)]
pub struct OverdueResponse {
    pub borrowing_id: Uuid,
    pub book_id: Uuid,
    pub book_title: String,
    pub member_id: Uuid,
    pub membership_type: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub overdue_days: u32,
    pub fine: u64,
    pub fine_paid: u64,
    pub payment_status: String,
}

impl From<OverdueBorrowing> for OverdueResponse {
    fn from(entry: OverdueBorrowing) -> Self {
        Self {
            borrowing_id: entry.borrowing_id.value(),
            book_id: entry.book_id.value(),
            book_title: entry.book_title,
            member_id: entry.member_id.value(),
            membership_type: entry.membership_type.as_str().to_string(),
            borrow_date: entry.borrow_date,
            due_date: entry.due_date,
            overdue_days: entry.overdue_days,
            fine: entry.fine.value(),
            fine_paid: entry.fine_paid.value(),
            payment_status: entry.payment_status.as_str().to_string(),
        }
    }
}

/// 更新申請レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct RenewalResponse {
    pub request_id: Uuid,
    pub member_id: Uuid,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
}

impl From<RenewalView> for RenewalResponse {
    fn from(view: RenewalView) -> Self {
        Self {
            request_id: view.request_id.value(),
            member_id: view.member_id.value(),
            status: view.status.as_str().to_uppercase(),
            requested_at: view.requested_at,
            processed_at: view.processed_at,
            processed_by: view.processed_by.map(|s| s.value()),
        }
    }
}

/// 貸出申請レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BorrowingRequestResponse {
    pub request_id: Uuid,
    pub member_id: Uuid,
    pub book_id: Uuid,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    /// 受理時に作成された貸出記録
    pub borrowing_id: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
}

impl From<BorrowingRequestView> for BorrowingRequestResponse {
    fn from(view: BorrowingRequestView) -> Self {
        Self {
            request_id: view.request_id.value(),
            member_id: view.member_id.value(),
            book_id: view.book_id.value(),
            status: view.status.as_str().to_uppercase(),
            requested_at: view.requested_at,
            borrowing_id: view.borrowing_id.map(|b| b.value()),
            processed_at: view.processed_at,
            processed_by: view.processed_by.map(|s| s.value()),
        }
    }
}

/// 通知レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub notification_id: Uuid,
    pub audience: String,
    pub member_id: Uuid,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            notification_id: notification.notification_id.value(),
            audience: notification.audience.as_str().to_uppercase(),
            member_id: notification.member_id.value(),
            kind: notification.kind.as_str().to_uppercase(),
            message: notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

/// 一括既読レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub marked: u64,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<BorrowingStatus, String> {
    status.parse::<BorrowingStatus>()
}

