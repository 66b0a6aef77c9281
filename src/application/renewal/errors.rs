use thiserror::Error;

use crate::domain::{ProcessRenewalError, RenewalStatus};

/// 会員資格更新アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum RenewalApplicationError {
    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 同じ会員の承認待ち申請が既にある
    #[error("A pending renewal request already exists for this member")]
    RenewalAlreadyPending,

    /// 申請が見つからない
    #[error("Renewal request not found")]
    RenewalNotFound,

    /// 申請が既に処理済み
    #[error("Renewal request is not pending (status: {})", .0.as_str())]
    NotPending(RenewalStatus),

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

impl From<ProcessRenewalError> for RenewalApplicationError {
    fn from(err: ProcessRenewalError) -> Self {
        match err {
            ProcessRenewalError::NotPending(status) => RenewalApplicationError::NotPending(status),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenewalApplicationError>;
