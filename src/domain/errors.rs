use super::{BorrowRequestStatus, RenewalStatus};

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 既に返却済み
    AlreadyReturned,
}

/// 延滞料金支払いのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayFineError {
    /// 未払いの延滞料金がない
    NoFineOutstanding,
    /// 支払額が0、または未払い額を超えている
    InvalidPaymentAmount,
}

/// 更新申請処理のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRenewalError {
    /// 申請が既に処理済み
    NotPending(RenewalStatus),
}

/// 貸出申請処理のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessBorrowRequestError {
    /// 申請が既に処理済み
    NotPending(BorrowRequestStatus),
}

/// 会員資格のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// 終了日が開始日以前
    InvalidPeriod,
}
