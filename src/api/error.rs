use crate::application::borrowing::BorrowingApplicationError;
use crate::application::borrowing_request::BorrowingRequestApplicationError;
use crate::application::notification::NotificationApplicationError;
use crate::application::renewal::RenewalApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Borrowing(BorrowingApplicationError),
    Renewal(RenewalApplicationError),
    BorrowingRequest(BorrowingRequestApplicationError),
    Notification(NotificationApplicationError),
    /// パスで指定された処理内容が不正
    InvalidAction {
        action: String,
        expected: &'static str,
    },
}

impl From<BorrowingApplicationError> for ApiError {
    fn from(err: BorrowingApplicationError) -> Self {
        ApiError::Borrowing(err)
    }
}

impl From<RenewalApplicationError> for ApiError {
    fn from(err: RenewalApplicationError) -> Self {
        ApiError::Renewal(err)
    }
}

impl From<BorrowingRequestApplicationError> for ApiError {
    fn from(err: BorrowingRequestApplicationError) -> Self {
        ApiError::BorrowingRequest(err)
    }
}

impl From<NotificationApplicationError> for ApiError {
    fn from(err: NotificationApplicationError) -> Self {
        ApiError::Notification(err)
    }
}

fn internal(
    error_type: &'static str,
    message: &'static str,
    source: &(dyn std::error::Error + Send + Sync),
) -> (StatusCode, &'static str, String) {
    // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
    tracing::error!("{}: {}", message, source);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_type,
        message.to_string(),
    )
}

fn borrowing_error(err: &BorrowingApplicationError) -> (StatusCode, &'static str, String) {
    use BorrowingApplicationError as E;

    match err {
        // 404 Not Found - リクエストされたリソースが存在しない
        E::BorrowingNotFound => (StatusCode::NOT_FOUND, "BORROWING_NOT_FOUND", err.to_string()),

        // 422 Unprocessable Entity - ビジネスルール違反
        E::MemberNotFound => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "MEMBER_NOT_FOUND",
            err.to_string(),
        ),
        E::MembershipExpired => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "MEMBERSHIP_EXPIRED",
            err.to_string(),
        ),
        E::BookNotAvailable => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "BOOK_NOT_AVAILABLE",
            err.to_string(),
        ),
        E::BorrowingLimitExceeded { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "BORROWING_LIMIT_EXCEEDED",
            err.to_string(),
        ),
        E::AlreadyReturned => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "ALREADY_RETURNED",
            err.to_string(),
        ),
        E::NoFineOutstanding => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "NO_FINE_OUTSTANDING",
            err.to_string(),
        ),
        E::InvalidPaymentAmount => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_PAYMENT_AMOUNT",
            err.to_string(),
        ),

        // 500 Internal Server Error - システム障害
        E::EventStoreError(e) => internal("EVENT_STORE_ERROR", "Failed to store event", &**e),
        E::ReadModelError(e) => internal("READ_MODEL_ERROR", "Failed to access read model", &**e),
        E::MemberServiceError(e) => internal("MEMBER_SERVICE_ERROR", "Member service error", &**e),
        E::BookServiceError(e) => internal("BOOK_SERVICE_ERROR", "Book service error", &**e),
    }
}

fn renewal_error(err: &RenewalApplicationError) -> (StatusCode, &'static str, String) {
    use RenewalApplicationError as E;

    match err {
        E::MemberNotFound => (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND", err.to_string()),
        E::RenewalNotFound => (StatusCode::NOT_FOUND, "RENEWAL_NOT_FOUND", err.to_string()),

        // 409 Conflict - 承認待ちの申請は会員ごとに1件まで
        E::RenewalAlreadyPending => (
            StatusCode::CONFLICT,
            "RENEWAL_ALREADY_PENDING",
            err.to_string(),
        ),

        E::NotPending(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "RENEWAL_NOT_PENDING",
            err.to_string(),
        ),

        E::EventStoreError(e) => internal("EVENT_STORE_ERROR", "Failed to store event", &**e),
        E::ReadModelError(e) => internal("READ_MODEL_ERROR", "Failed to access read model", &**e),
        E::MemberServiceError(e) => internal("MEMBER_SERVICE_ERROR", "Member service error", &**e),
    }
}

fn borrowing_request_error(
    err: &BorrowingRequestApplicationError,
) -> (StatusCode, &'static str, String) {
    use BorrowingRequestApplicationError as E;

    match err {
        E::MemberNotFound => (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND", err.to_string()),
        E::RequestNotFound => (
            StatusCode::NOT_FOUND,
            "BORROWING_REQUEST_NOT_FOUND",
            err.to_string(),
        ),

        // 409 Conflict - 同じ会員・同じ書籍の承認待ちは1件まで
        E::RequestAlreadyPending => (
            StatusCode::CONFLICT,
            "BORROWING_REQUEST_ALREADY_PENDING",
            err.to_string(),
        ),

        E::NotPending(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "BORROWING_REQUEST_NOT_PENDING",
            err.to_string(),
        ),

        // 受理時の貸出エラーは貸出APIと同じ対応
        E::Borrowing(inner) => borrowing_error(inner),

        E::EventStoreError(e) => internal("EVENT_STORE_ERROR", "Failed to store event", &**e),
        E::ReadModelError(e) => internal("READ_MODEL_ERROR", "Failed to access read model", &**e),
        E::MemberServiceError(e) => internal("MEMBER_SERVICE_ERROR", "Member service error", &**e),
    }
}

fn notification_error(err: &NotificationApplicationError) -> (StatusCode, &'static str, String) {
    match err {
        NotificationApplicationError::FeedError(e) => internal(
            "NOTIFICATION_FEED_ERROR",
            "Failed to access notifications",
            &**e,
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Borrowing(err) => borrowing_error(err),
            ApiError::Renewal(err) => renewal_error(err),
            ApiError::BorrowingRequest(err) => borrowing_request_error(err),
            ApiError::Notification(err) => notification_error(err),
            ApiError::InvalidAction { action, expected } => (
                StatusCode::BAD_REQUEST,
                "INVALID_ACTION",
                format!("Invalid action: {}. Use {}", action, expected),
            ),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
