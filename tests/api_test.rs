use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use library_circulation::api::handlers::AppState;
use library_circulation::api::router::create_router;
use library_circulation::api::types::*;
use library_circulation::domain::value_objects::*;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

use common::{TestContext, jan_first};

// ============================================================================
// ヘルパー関数
// ============================================================================

fn app(ctx: &TestContext) -> Router {
    create_router(Arc::new(AppState {
        service_deps: ctx.deps.clone(),
    }))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).expect("response body should be valid JSON")
}

async fn create_borrowing(app: &Router, member_id: MemberId, book_id: BookId) -> BorrowingResponse {
    let (status, body) = send(
        app,
        "POST",
        "/borrowings",
        Some(json!({
            "book_id": book_id.value(),
            "member_id": member_id.value(),
            "staff_id": Uuid::new_v4(),
            "borrowed_at": jan_first(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    parse(&body)
}

// ============================================================================
// 貸出と延滞料金
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let (status, body) = send(&app(&ctx), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_borrow_and_query_fine() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    let book_id = ctx.book("Dune");

    let created = create_borrowing(&app, member_id, book_id).await;
    assert_eq!(created.membership_type, "BASIC");
    assert_eq!(created.expected_return_date.to_string(), "2024-01-16");
    assert_eq!(created.status, "active");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/borrowings/{}/fine?as_of=2024-01-20", created.borrowing_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fine: FineResponse = parse(&body);
    assert_eq!(fine.overdue_days, 4);
    assert_eq!(fine.fine, 40);
    assert_eq!(fine.outstanding, 40);
}

#[tokio::test]
async fn test_overdue_list_and_empty_response() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    let created = create_borrowing(&app, member_id, ctx.book("Dune")).await;

    let (status, body) = send(&app, "GET", "/overdue?as_of=2024-01-20", None).await;
    assert_eq!(status, StatusCode::OK);
    let overdue: Vec<OverdueResponse> = parse(&body);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].borrowing_id, created.borrowing_id);
    assert_eq!(overdue[0].book_title, "Dune");
    assert_eq!(overdue[0].fine, 40);
    assert_eq!(overdue[0].payment_status, "Pending");

    let (status, body) = send(&app, "GET", "/overdue?as_of=2024-01-10", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(
        &app,
        "GET",
        &format!("/overdue/members/{}?as_of=2024-01-20", member_id.value()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_pay_fine_in_full_then_return() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    let created = create_borrowing(&app, member_id, ctx.book("Dune")).await;

    // 2024年の貸出は現在時点で必ず延滞している
    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowings/{}/fine/payments", created.borrowing_id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let payment: FinePaymentResponse = parse(&body);
    assert!(payment.amount_paid > 0);
    assert_eq!(payment.amount_paid % 10, 0);
    assert_eq!(payment.total_paid, payment.amount_paid);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowings/{}/return", created.borrowing_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let returned: BorrowingResponse = parse(&body);
    assert_eq!(returned.status, "returned");
    assert!(returned.returned_at.is_some());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowings/{}/return", created.borrowing_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "ALREADY_RETURNED");
}

#[tokio::test]
async fn test_overpayment_is_unprocessable() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    let created = create_borrowing(&app, member_id, ctx.book("Dune")).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowings/{}/fine/payments", created.borrowing_id),
        Some(json!({ "amount": u32::MAX })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "INVALID_PAYMENT_AMOUNT");
}

#[tokio::test]
async fn test_borrowing_errors() {
    let ctx = TestContext::new();
    let app = app(&ctx);

    let (status, _) = send(&app, "GET", &format!("/borrowings/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/borrowings", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/borrowings?member_id={}&status=lost", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/borrowings",
        Some(json!({
            "book_id": Uuid::new_v4(),
            "member_id": Uuid::new_v4(),
            "staff_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "MEMBER_NOT_FOUND");
}

#[tokio::test]
async fn test_list_borrowings_by_member_and_status() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Premium, jan_first());
    let first = create_borrowing(&app, member_id, ctx.book("A")).await;
    create_borrowing(&app, member_id, ctx.book("B")).await;

    send(
        &app,
        "POST",
        &format!("/borrowings/{}/return", first.borrowing_id),
        None,
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/borrowings?member_id={}", member_id.value()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<BorrowingResponse> = parse(&body);
    assert_eq!(all.len(), 2);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/borrowings?member_id={}&status=returned", member_id.value()),
        None,
    )
    .await;
    let returned: Vec<BorrowingResponse> = parse(&body);
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].borrowing_id, first.borrowing_id);
}

// ============================================================================
// 会員資格の更新申請
// ============================================================================

#[tokio::test]
async fn test_renewal_workflow() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());

    let (status, body) = send(
        &app,
        "POST",
        "/renewals",
        Some(json!({ "member_id": member_id.value() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: RenewalResponse = parse(&body);
    assert_eq!(created.status, "PENDING");

    // 承認待ちがある間の再申請は409
    let (status, body) = send(
        &app,
        "POST",
        "/renewals",
        Some(json!({ "member_id": member_id.value() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "RENEWAL_ALREADY_PENDING");

    let pending_uri = format!("/renewals/pending/{}", member_id.value());
    let (status, body) = send(&app, "GET", &pending_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let pending: RenewalResponse = parse(&body);
    assert_eq!(pending.request_id, created.request_id);

    let (status, body) = send(&app, "GET", "/renewals/pending", None).await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<RenewalResponse> = parse(&body);
    assert_eq!(all.len(), 1);

    let staff = json!({ "staff_id": Uuid::new_v4() });
    let (status, body) = send(
        &app,
        "POST",
        &format!("/renewals/{}/approve", created.request_id),
        Some(staff.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let approved: RenewalResponse = parse(&body);
    assert_eq!(approved.status, "APPROVED");
    assert!(approved.processed_at.is_some());

    let (status, _) = send(&app, "GET", &pending_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/renewals/{}/REJECT", created.request_id),
        Some(staff),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "RENEWAL_NOT_PENDING");
}

#[tokio::test]
async fn test_renewal_errors() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let staff = json!({ "staff_id": Uuid::new_v4() });

    let (status, _) = send(
        &app,
        "POST",
        "/renewals",
        Some(json!({ "member_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/renewals/{}/postpone", Uuid::new_v4()),
        Some(staff.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "INVALID_ACTION");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/renewals/{}/approve", Uuid::new_v4()),
        Some(staff),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ids_of_other_aggregates_are_not_found() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    let borrowing = create_borrowing(&app, member_id, ctx.book("Dune")).await;

    let (_, body) = send(
        &app,
        "POST",
        "/renewals",
        Some(json!({ "member_id": member_id.value() })),
    )
    .await;
    let renewal: RenewalResponse = parse(&body);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/renewals/{}/approve", borrowing.borrowing_id),
        Some(json!({ "staff_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/borrowings/{}/return", renewal.request_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overdue_list_survives_catalogue_failure() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    create_borrowing(&app, member_id, ctx.book("Dune")).await;
    ctx.books.set_fail_title_lookups(true);

    let (status, body) = send(&app, "GET", "/overdue?as_of=2024-01-20", None).await;

    assert_eq!(status, StatusCode::OK);
    let overdue: Vec<OverdueResponse> = parse(&body);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].book_title, "Unknown Book");
    assert_eq!(overdue[0].fine, 40);
}

// ============================================================================
// 貸出申請
// ============================================================================

#[tokio::test]
async fn test_borrowing_request_workflow() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    // 受理時刻は現在時刻なので、今日有効な会員資格を用意する
    let member_id = ctx.member_with_plan(MembershipType::Premium, Utc::now() - Duration::days(1));
    let book_id = ctx.book("Dune");
    let submit = json!({ "member_id": member_id.value(), "book_id": book_id.value() });

    let (status, body) = send(&app, "POST", "/borrowing-requests", Some(submit.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: BorrowingRequestResponse = parse(&body);
    assert_eq!(created.status, "PENDING");
    assert!(created.borrowing_id.is_none());

    let (status, body) = send(&app, "POST", "/borrowing-requests", Some(submit)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "BORROWING_REQUEST_ALREADY_PENDING");

    let member_uri = format!("/borrowing-requests/pending/members/{}", member_id.value());
    let (status, body) = send(&app, "GET", &member_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let pending: Vec<BorrowingRequestResponse> = parse(&body);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request_id, created.request_id);

    let staff = json!({ "staff_id": Uuid::new_v4() });
    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowing-requests/{}/accept", created.request_id),
        Some(staff.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let accepted: BorrowingRequestResponse = parse(&body);
    assert_eq!(accepted.status, "ACCEPTED");
    let borrowing_id = accepted
        .borrowing_id
        .expect("accepted request should link a borrowing");

    let (status, body) = send(&app, "GET", &format!("/borrowings/{}", borrowing_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let borrowing: BorrowingResponse = parse(&body);
    assert_eq!(borrowing.book_id, book_id.value());
    assert_eq!(borrowing.membership_type, "PREMIUM");

    let (status, body) = send(&app, "GET", "/borrowing-requests/pending", None).await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<BorrowingRequestResponse> = parse(&body);
    assert!(all.is_empty());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowing-requests/{}/REJECT", created.request_id),
        Some(staff),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "BORROWING_REQUEST_NOT_PENDING");
}

#[tokio::test]
async fn test_borrowing_request_errors() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let staff = json!({ "staff_id": Uuid::new_v4() });

    let (status, _) = send(
        &app,
        "POST",
        "/borrowing-requests",
        Some(json!({ "member_id": Uuid::new_v4(), "book_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 更新申請の処理内容は貸出申請には使えない
    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowing-requests/{}/approve", Uuid::new_v4()),
        Some(staff.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "INVALID_ACTION");
    assert!(error.message.contains("ACCEPT or REJECT"));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/borrowing-requests/{}/accept", Uuid::new_v4()),
        Some(staff.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 受理時の貸出エラーは貸出APIと同じ応答
    let member_id = ctx.member_with_plan(MembershipType::Basic, Utc::now() - Duration::days(1));
    let book_id = ctx.book("Dune");
    let (_, body) = send(
        &app,
        "POST",
        "/borrowing-requests",
        Some(json!({ "member_id": member_id.value(), "book_id": book_id.value() })),
    )
    .await;
    let created: BorrowingRequestResponse = parse(&body);
    ctx.books.remove_book(book_id);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/borrowing-requests/{}/accept", created.request_id),
        Some(staff),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "BOOK_NOT_AVAILABLE");
}

// ============================================================================
// 通知
// ============================================================================

#[tokio::test]
async fn test_notification_feeds_and_mark_all_read() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    let other_member = ctx.member_with_plan(MembershipType::Basic, jan_first());

    let (_, body) = send(
        &app,
        "POST",
        "/renewals",
        Some(json!({ "member_id": member_id.value() })),
    )
    .await;
    let renewal: RenewalResponse = parse(&body);
    send(
        &app,
        "POST",
        &format!("/renewals/{}/reject", renewal.request_id),
        Some(json!({ "staff_id": Uuid::new_v4() })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/notifications/staff", None).await;
    assert_eq!(status, StatusCode::OK);
    let staff_feed: Vec<NotificationResponse> = parse(&body);
    assert_eq!(staff_feed.len(), 1);
    assert_eq!(staff_feed[0].kind, "RENEWAL_SUBMITTED");
    assert_eq!(staff_feed[0].audience, "STAFF");
    assert_eq!(staff_feed[0].member_id, member_id.value());

    let member_uri = format!("/notifications/members/{}", member_id.value());
    let (status, body) = send(&app, "GET", &member_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let member_feed: Vec<NotificationResponse> = parse(&body);
    assert_eq!(member_feed.len(), 1);
    assert_eq!(member_feed[0].kind, "RENEWAL_DECISION");
    assert!(!member_feed[0].is_read);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/notifications/members/{}", other_member.value()),
        None,
    )
    .await;
    let other_feed: Vec<NotificationResponse> = parse(&body);
    assert!(other_feed.is_empty());

    let mark_uri = format!("/notifications/members/{}/mark-all-read", member_id.value());
    let (status, body) = send(&app, "POST", &mark_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let marked: MarkReadResponse = parse(&body);
    assert_eq!(marked.marked, 1);

    // 既読の通知は数えない
    let (_, body) = send(&app, "POST", &mark_uri, None).await;
    let marked: MarkReadResponse = parse(&body);
    assert_eq!(marked.marked, 0);

    let (_, body) = send(&app, "GET", &member_uri, None).await;
    let member_feed: Vec<NotificationResponse> = parse(&body);
    assert!(member_feed[0].is_read);

    // 職員の受信箱は別に管理される
    let (_, body) = send(&app, "POST", "/notifications/staff/mark-all-read", None).await;
    let marked: MarkReadResponse = parse(&body);
    assert_eq!(marked.marked, 1);
}
