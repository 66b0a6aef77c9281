use thiserror::Error;

use crate::domain::{PayFineError, ReturnBookError};

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BorrowingApplicationError {
    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 会員資格の有効期間外
    #[error("Membership is not active")]
    MembershipExpired,

    /// 書籍が貸出不可
    #[error("Book is not available for loan")]
    BookNotAvailable,

    /// プランの貸出上限に達している
    #[error("Borrowing limit exceeded (max {limit} books)")]
    BorrowingLimitExceeded { limit: usize },

    /// 貸出記録が見つからない
    #[error("Borrowing record not found")]
    BorrowingNotFound,

    /// 既に返却済み
    #[error("Book has already been returned")]
    AlreadyReturned,

    /// 未払いの延滞料金がない
    #[error("No fine outstanding")]
    NoFineOutstanding,

    /// 支払額が不正
    #[error("Invalid payment amount")]
    InvalidPaymentAmount,

    /// EventStoreのエラー
    #[error("Event store error")]
    EventStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// ReadModelのエラー
    #[error("Read model error")]
    ReadModelError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// MemberServiceのエラー
    #[error("Member service error")]
    MemberServiceError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookServiceのエラー
    #[error("Book service error")]
    BookServiceError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ReturnBookError> for BorrowingApplicationError {
    fn from(err: ReturnBookError) -> Self {
        match err {
            ReturnBookError::AlreadyReturned => BorrowingApplicationError::AlreadyReturned,
        }
    }
}

impl From<PayFineError> for BorrowingApplicationError {
    fn from(err: PayFineError) -> Self {
        match err {
            PayFineError::NoFineOutstanding => BorrowingApplicationError::NoFineOutstanding,
            PayFineError::InvalidPaymentAmount => BorrowingApplicationError::InvalidPaymentAmount,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BorrowingApplicationError>;
