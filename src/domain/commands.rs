use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, BorrowRequestAction, BorrowingId, BorrowingRequestId, Fine, MemberId, RenewalAction,
    RenewalRequestId, StaffId,
};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_at: DateTime<Utc>,
    pub staff_id: StaffId,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub borrowing_id: BorrowingId,
    pub returned_at: DateTime<Utc>,
}

/// コマンド：延滞料金を支払う
///
/// `amount`が`None`の場合は未払い額を全額支払う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayFine {
    pub borrowing_id: BorrowingId,
    pub amount: Option<Fine>,
    pub paid_at: DateTime<Utc>,
}

/// コマンド：会員資格の更新を申請する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRenewal {
    pub member_id: MemberId,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：更新申請を承認または却下する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRenewal {
    pub request_id: RenewalRequestId,
    pub action: RenewalAction,
    pub staff_id: StaffId,
    pub processed_at: DateTime<Utc>,
}

/// コマンド：貸出を申請する（会員から）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBorrowRequest {
    pub member_id: MemberId,
    pub book_id: BookId,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：貸出申請を受理または却下する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessBorrowRequest {
    pub request_id: BorrowingRequestId,
    pub action: BorrowRequestAction,
    pub staff_id: StaffId,
    pub processed_at: DateTime<Utc>,
}
