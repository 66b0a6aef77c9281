use thiserror::Error;

use crate::application::borrowing::BorrowingApplicationError;
use crate::domain::{BorrowRequestStatus, ProcessBorrowRequestError};

/// 貸出申請アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BorrowingRequestApplicationError {
    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 同じ会員・同じ書籍の承認待ち申請が既にある
    #[error("A pending borrowing request for this book already exists for this member")]
    RequestAlreadyPending,

    /// 申請が見つからない
    #[error("Borrowing request not found")]
    RequestNotFound,

    /// 申請が既に処理済み
    #[error("Borrowing request is not pending (status: {})", .0.as_str())]
    NotPending(BorrowRequestStatus),

    /// 受理時の貸出処理で発生したエラー（上限超過、貸出不可など）
    #[error(transparent)]
    Borrowing(#[from] BorrowingApplicationError),

    /// EventStoreのエラー
    #[error("Event store error")]
    EventStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// ReadModelのエラー
    #[error("Read model error")]
    ReadModelError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// MemberServiceのエラー
    #[error("Member service error")]
    MemberServiceError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ProcessBorrowRequestError> for BorrowingRequestApplicationError {
    fn from(err: ProcessBorrowRequestError) -> Self {
        match err {
            ProcessBorrowRequestError::NotPending(status) => {
                BorrowingRequestApplicationError::NotPending(status)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BorrowingRequestApplicationError>;
