use crate::application::ServiceDependencies;
use crate::application::borrowing::{
    self, BorrowingApplicationError, borrow_book as execute_borrow_book,
    return_book as execute_return_book,
};
use crate::application::borrowing_request::{
    self, BorrowingRequestApplicationError, process_request as execute_process_request,
    submit_request as execute_submit_request,
};
use crate::application::notification;
use crate::application::renewal::{
    self, RenewalApplicationError, process_renewal as execute_process_renewal,
    request_renewal as execute_request_renewal,
};
use crate::domain::commands::{
    PayFine, ProcessBorrowRequest, ProcessRenewal, RequestRenewal, ReturnBook,
    SubmitBorrowRequest,
};
use crate::domain::notification::Recipient;
use crate::domain::{BorrowRequestAction, RenewalAction};
use crate::domain::value_objects::{
    BookId, BorrowingId, BorrowingRequestId, Fine, MemberId, RenewalRequestId, StaffId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        AsOfQuery, BorrowBookRequest, BorrowingRequestBody, BorrowingRequestResponse,
        BorrowingResponse, ErrorResponse, FinePaymentResponse, FineResponse, ListBorrowingsQuery,
        MarkReadResponse, NotificationResponse, OverdueResponse, PayFineRequest,
        ProcessBorrowingRequestBody, ProcessRenewalBody, RenewalRequestBody, RenewalResponse,
        parse_status_filter,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

async fn load_borrowing_view(
    deps: &ServiceDependencies,
    borrowing_id: BorrowingId,
) -> Result<BorrowingResponse, ApiError> {
    deps.borrowing_read_model
        .get_by_id(borrowing_id)
        .await
        .map_err(BorrowingApplicationError::ReadModelError)?
        .map(BorrowingResponse::from)
        .ok_or_else(|| ApiError::from(BorrowingApplicationError::BorrowingNotFound))
}

// ============================================================================
// Borrowing command handlers (POST)
// ============================================================================

/// POST /borrowings - 新しい貸出を作成
///
/// 返却予定日は会員のプランで決まる（BASIC 15日、PREMIUM 30日）。
pub async fn create_borrowing(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowBookRequest>,
) -> Result<(StatusCode, Json<BorrowingResponse>), ApiError> {
    let borrowing_id = execute_borrow_book(&state.service_deps, req.to_command()).await?;
    let response = load_borrowing_view(&state.service_deps, borrowing_id).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /borrowings/:id/return - 書籍を返却
///
/// 延滞中でも返却できる。延滞料金は返却日で確定する。
pub async fn return_borrowing(
    State(state): State<Arc<AppState>>,
    Path(borrowing_id): Path<Uuid>,
) -> Result<Json<BorrowingResponse>, ApiError> {
    let borrowing_id = BorrowingId::from_uuid(borrowing_id);

    let cmd = ReturnBook {
        borrowing_id,
        returned_at: Utc::now(),
    };
    execute_return_book(&state.service_deps, cmd).await?;

    let response = load_borrowing_view(&state.service_deps, borrowing_id).await?;
    Ok(Json(response))
}

/// POST /borrowings/:id/fine/payments - 延滞料金を支払う
///
/// amountを省略すると未払い額を全額支払う。
pub async fn pay_fine(
    State(state): State<Arc<AppState>>,
    Path(borrowing_id): Path<Uuid>,
    Json(req): Json<PayFineRequest>,
) -> Result<Json<FinePaymentResponse>, ApiError> {
    let borrowing_id = BorrowingId::from_uuid(borrowing_id);
    let paid_at = Utc::now();

    let cmd = PayFine {
        borrowing_id,
        amount: req.amount.map(Fine::new),
        paid_at,
    };
    let amount = borrowing::pay_fine(&state.service_deps, cmd).await?;

    let summary =
        borrowing::get_fine(&state.service_deps, borrowing_id, paid_at.date_naive()).await?;

    Ok(Json(FinePaymentResponse {
        borrowing_id: borrowing_id.value(),
        amount_paid: amount.value(),
        total_paid: summary.fine_paid.value(),
        outstanding: summary.outstanding.value(),
    }))
}

// ============================================================================
// Borrowing query handlers (GET)
// ============================================================================

/// GET /borrowings/:id - 貸出詳細をIDで取得
pub async fn get_borrowing_by_id(
    State(state): State<Arc<AppState>>,
    Path(borrowing_id): Path<Uuid>,
) -> Result<Json<BorrowingResponse>, QueryError> {
    let borrowing_id = BorrowingId::from_uuid(borrowing_id);

    match state
        .service_deps
        .borrowing_read_model
        .get_by_id(borrowing_id)
        .await
    {
        Ok(Some(view)) => Ok(Json(BorrowingResponse::from(view))),
        Ok(None) => Err(QueryError::NotFound(format!(
            "Borrowing {} not found",
            borrowing_id.value()
        ))),
        Err(e) => Err(QueryError::InternalError(e.to_string())),
    }
}

/// GET /borrowings - 会員の貸出一覧取得
///
/// クエリパラメータ:
/// - member_id: 会員IDでフィルタリング（必須）
/// - status: ステータスでフィルタリング（active, returned）（オプション）
pub async fn list_borrowings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBorrowingsQuery>,
) -> Result<Json<Vec<BorrowingResponse>>, QueryError> {
    let member_id = query.member_id.ok_or_else(|| {
        QueryError::BadRequest("member_id query parameter is required".to_string())
    })?;

    let status = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(QueryError::BadRequest)?;

    let borrowings = state
        .service_deps
        .borrowing_read_model
        .find_by_member_id(MemberId::from_uuid(member_id))
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    let response = borrowings
        .into_iter()
        .filter(|view| status.is_none_or(|s| view.status == s))
        .map(BorrowingResponse::from)
        .collect();

    Ok(Json(response))
}

/// GET /borrowings/:id/fine - 基準日時点の延滞料金の内訳
pub async fn get_fine(
    State(state): State<Arc<AppState>>,
    Path(borrowing_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<FineResponse>, ApiError> {
    let summary = borrowing::get_fine(
        &state.service_deps,
        BorrowingId::from_uuid(borrowing_id),
        query.date(),
    )
    .await?;

    Ok(Json(FineResponse::from(summary)))
}

/// GET /overdue - 延滞中の貸出一覧
///
/// 延滞がなければ204 No Content。
pub async fn list_overdue(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> Result<Response, ApiError> {
    let overdue = borrowing::list_overdue(&state.service_deps, query.date()).await?;
    Ok(overdue_response(overdue))
}

/// GET /overdue/members/:member_id - 会員の延滞中の貸出一覧
pub async fn list_member_overdue(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Response, ApiError> {
    let overdue = borrowing::list_overdue_for_member(
        &state.service_deps,
        MemberId::from_uuid(member_id),
        query.date(),
    )
    .await?;
    Ok(overdue_response(overdue))
}

fn overdue_response(overdue: Vec<borrowing::OverdueBorrowing>) -> Response {
    if overdue.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let body: Vec<OverdueResponse> = overdue.into_iter().map(OverdueResponse::from).collect();
    Json(body).into_response()
}

// ============================================================================
// Renewal handlers
// ============================================================================

/// POST /renewals - 会員資格の更新を申請
///
/// 承認待ちの申請が既にある場合は409 Conflict。
pub async fn create_renewal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenewalRequestBody>,
) -> Result<(StatusCode, Json<RenewalResponse>), ApiError> {
    let member_id = MemberId::from_uuid(req.member_id);

    let cmd = RequestRenewal {
        member_id,
        requested_at: Utc::now(),
    };
    let request_id = execute_request_renewal(&state.service_deps, cmd).await?;

    let response = load_renewal_view(&state.service_deps, request_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /renewals/:id/:action - 更新申請を承認または却下
///
/// actionはAPPROVEまたはREJECT（大文字小文字を区別しない）。
pub async fn process_renewal(
    State(state): State<Arc<AppState>>,
    Path((request_id, action)): Path<(Uuid, String)>,
    Json(req): Json<ProcessRenewalBody>,
) -> Result<Json<RenewalResponse>, ApiError> {
    let action: RenewalAction = action
        .parse()
        .map_err(|_| ApiError::InvalidAction {
            action: action.clone(),
            expected: "APPROVE or REJECT",
        })?;
    let request_id = RenewalRequestId::from_uuid(request_id);

    let cmd = ProcessRenewal {
        request_id,
        action,
        staff_id: StaffId::from_uuid(req.staff_id),
        processed_at: Utc::now(),
    };
    execute_process_renewal(&state.service_deps, cmd).await?;

    let response = load_renewal_view(&state.service_deps, request_id).await?;
    Ok(Json(response))
}

/// GET /renewals/pending - 承認待ちの申請一覧
pub async fn list_pending_renewals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RenewalResponse>>, ApiError> {
    let pending = renewal::list_pending(&state.service_deps).await?;
    Ok(Json(pending.into_iter().map(RenewalResponse::from).collect()))
}

/// GET /renewals/pending/:member_id - 会員の承認待ち申請
///
/// 承認待ちがなければ204 No Content。
pub async fn get_member_pending_renewal(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pending =
        renewal::get_pending_for_member(&state.service_deps, MemberId::from_uuid(member_id))
            .await?;

    Ok(match pending {
        Some(view) => Json(RenewalResponse::from(view)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn load_renewal_view(
    deps: &ServiceDependencies,
    request_id: RenewalRequestId,
) -> Result<RenewalResponse, ApiError> {
    deps.renewal_read_model
        .get_by_id(request_id)
        .await
        .map_err(RenewalApplicationError::ReadModelError)?
        .map(RenewalResponse::from)
        .ok_or_else(|| ApiError::from(RenewalApplicationError::RenewalNotFound))
}

// ============================================================================
// Borrowing request handlers
// ============================================================================

/// POST /borrowing-requests - 会員が貸出を申請
///
/// 同じ書籍の承認待ち申請が既にある場合は409 Conflict。
pub async fn create_borrowing_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowingRequestBody>,
) -> Result<(StatusCode, Json<BorrowingRequestResponse>), ApiError> {
    let cmd = SubmitBorrowRequest {
        member_id: MemberId::from_uuid(req.member_id),
        book_id: BookId::from_uuid(req.book_id),
        requested_at: Utc::now(),
    };
    let request_id = execute_submit_request(&state.service_deps, cmd).await?;

    let response = load_borrowing_request_view(&state.service_deps, request_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /borrowing-requests/:id/:action - 貸出申請を受理または却下
///
/// actionはACCEPTまたはREJECT（大文字小文字を区別しない）。
/// 受理すると貸出記録が作成され、レスポンスのborrowing_idに入る。
pub async fn process_borrowing_request(
    State(state): State<Arc<AppState>>,
    Path((request_id, action)): Path<(Uuid, String)>,
    Json(req): Json<ProcessBorrowingRequestBody>,
) -> Result<Json<BorrowingRequestResponse>, ApiError> {
    let action: BorrowRequestAction = action
        .parse()
        .map_err(|_| ApiError::InvalidAction {
            action: action.clone(),
            expected: "ACCEPT or REJECT",
        })?;
    let request_id = BorrowingRequestId::from_uuid(request_id);

    let cmd = ProcessBorrowRequest {
        request_id,
        action,
        staff_id: StaffId::from_uuid(req.staff_id),
        processed_at: Utc::now(),
    };
    execute_process_request(&state.service_deps, cmd).await?;

    let response = load_borrowing_request_view(&state.service_deps, request_id).await?;
    Ok(Json(response))
}

/// GET /borrowing-requests/pending - 承認待ちの貸出申請一覧
pub async fn list_pending_borrowing_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BorrowingRequestResponse>>, ApiError> {
    let pending = borrowing_request::list_pending(&state.service_deps).await?;
    Ok(Json(
        pending
            .into_iter()
            .map(BorrowingRequestResponse::from)
            .collect(),
    ))
}

/// GET /borrowing-requests/pending/members/:member_id - 会員の承認待ち貸出申請
pub async fn list_member_pending_borrowing_requests(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<BorrowingRequestResponse>>, ApiError> {
    let pending = borrowing_request::list_pending_for_member(
        &state.service_deps,
        MemberId::from_uuid(member_id),
    )
    .await?;
    Ok(Json(
        pending
            .into_iter()
            .map(BorrowingRequestResponse::from)
            .collect(),
    ))
}

async fn load_borrowing_request_view(
    deps: &ServiceDependencies,
    request_id: BorrowingRequestId,
) -> Result<BorrowingRequestResponse, ApiError> {
    deps.borrowing_request_read_model
        .get_by_id(request_id)
        .await
        .map_err(BorrowingRequestApplicationError::ReadModelError)?
        .map(BorrowingRequestResponse::from)
        .ok_or_else(|| ApiError::from(BorrowingRequestApplicationError::RequestNotFound))
}

// ============================================================================
// Notification handlers
// ============================================================================

async fn notification_feed(
    deps: &ServiceDependencies,
    recipient: Recipient,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = notification::list_notifications(deps, recipient).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// GET /notifications/staff - 職員宛ての通知（新しい順）
pub async fn list_staff_notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    notification_feed(&state.service_deps, Recipient::Staff).await
}

/// GET /notifications/members/:member_id - 会員宛ての通知（新しい順）
pub async fn list_member_notifications(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    notification_feed(
        &state.service_deps,
        Recipient::Member(MemberId::from_uuid(member_id)),
    )
    .await
}

/// POST /notifications/staff/mark-all-read - 職員宛ての通知をすべて既読にする
pub async fn mark_staff_notifications_read(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let marked = notification::mark_all_read(&state.service_deps, Recipient::Staff).await?;
    Ok(Json(MarkReadResponse { marked }))
}

/// POST /notifications/members/:member_id/mark-all-read - 会員宛ての通知をすべて既読にする
pub async fn mark_member_notifications_read(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let marked = notification::mark_all_read(
        &state.service_deps,
        Recipient::Member(MemberId::from_uuid(member_id)),
    )
    .await?;
    Ok(Json(MarkReadResponse { marked }))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            QueryError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            QueryError::InternalError(msg) => {
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
