use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_borrowing, create_borrowing_request, create_renewal, get_borrowing_by_id,
    get_fine, get_member_pending_renewal, list_borrowings, list_member_notifications,
    list_member_overdue, list_member_pending_borrowing_requests, list_overdue,
    list_pending_borrowing_requests, list_pending_renewals, list_staff_notifications,
    mark_member_notifications_read, mark_staff_notifications_read, pay_fine,
    process_borrowing_request, process_renewal, return_borrowing,
};

/// Creates the API router with all circulation endpoints
///
/// Borrowings and fines:
/// - POST /borrowings, GET /borrowings, GET /borrowings/:id
/// - POST /borrowings/:id/return
/// - GET /borrowings/:id/fine, POST /borrowings/:id/fine/payments
/// - GET /overdue, GET /overdue/members/:member_id
///
/// Membership renewals:
/// - POST /renewals, GET /renewals/pending, GET /renewals/pending/:member_id
/// - POST /renewals/:id/:action
///
/// Borrowing requests:
/// - POST /borrowing-requests, GET /borrowing-requests/pending
/// - GET /borrowing-requests/pending/members/:member_id
/// - POST /borrowing-requests/:id/:action
///
/// Notifications:
/// - GET /notifications/staff, POST /notifications/staff/mark-all-read
/// - GET /notifications/members/:member_id
/// - POST /notifications/members/:member_id/mark-all-read
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/borrowings", post(create_borrowing).get(list_borrowings))
        .route("/borrowings/:id", get(get_borrowing_by_id))
        .route("/borrowings/:id/return", post(return_borrowing))
        .route("/borrowings/:id/fine", get(get_fine))
        .route("/borrowings/:id/fine/payments", post(pay_fine))
        .route("/overdue", get(list_overdue))
        .route("/overdue/members/:member_id", get(list_member_overdue))
        .route("/renewals", post(create_renewal))
        .route("/renewals/pending", get(list_pending_renewals))
        .route("/renewals/pending/:member_id", get(get_member_pending_renewal))
        .route("/renewals/:id/:action", post(process_renewal))
        .route("/borrowing-requests", post(create_borrowing_request))
        .route(
            "/borrowing-requests/pending",
            get(list_pending_borrowing_requests),
        )
        .route(
            "/borrowing-requests/pending/members/:member_id",
            get(list_member_pending_borrowing_requests),
        )
        .route(
            "/borrowing-requests/:id/:action",
            post(process_borrowing_request),
        )
        .route("/notifications/staff", get(list_staff_notifications))
        .route(
            "/notifications/staff/mark-all-read",
            post(mark_staff_notifications_read),
        )
        .route(
            "/notifications/members/:member_id",
            get(list_member_notifications),
        )
        .route(
            "/notifications/members/:member_id/mark-all-read",
            post(mark_member_notifications_read),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
