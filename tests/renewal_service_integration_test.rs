use async_trait::async_trait;
use chrono::{Duration, Utc};
use library_circulation::adapters::mock::{RenewalReadModel, SentNotification};
use library_circulation::application::renewal::*;
use library_circulation::domain::commands::{ProcessRenewal, RequestRenewal};
use library_circulation::domain::value_objects::*;
use library_circulation::domain::{RenewalAction, RenewalStatus};
use library_circulation::ports::MemberService as _;
use library_circulation::ports::RenewalView;
use library_circulation::ports::renewal_read_model::{
    RenewalReadModel as RenewalReadModelPort, Result as PortResult,
};
use std::sync::Arc;

mod common;

use common::{TestContext, jan_first};

async fn submit(ctx: &TestContext, member_id: MemberId) -> RenewalRequestId {
    request_renewal(
        &ctx.deps,
        RequestRenewal {
            member_id,
            requested_at: Utc::now(),
        },
    )
    .await
    .expect("request should succeed")
}

fn process(request_id: RenewalRequestId, action: RenewalAction) -> ProcessRenewal {
    ProcessRenewal {
        request_id,
        action,
        staff_id: StaffId::new(),
        processed_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_request_renewal_creates_pending_request() {
    let ctx = TestContext::new();
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());

    let request_id = submit(&ctx, member_id).await;

    let pending = get_pending_for_member(&ctx.deps, member_id)
        .await
        .unwrap()
        .expect("pending request should exist");
    assert_eq!(pending.request_id, request_id);
    assert_eq!(pending.status, RenewalStatus::Pending);
    assert!(pending.processed_at.is_none());

    assert_eq!(list_pending(&ctx.deps).await.unwrap().len(), 1);
    assert!(
        ctx.notifications
            .sent()
            .contains(&SentNotification::RenewalSubmitted { member_id })
    );
}

#[tokio::test]
async fn test_second_pending_request_conflicts() {
    let ctx = TestContext::new();
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());

    let first = submit(&ctx, member_id).await;

    let result = request_renewal(
        &ctx.deps,
        RequestRenewal {
            member_id,
            requested_at: Utc::now(),
        },
    )
    .await;
    assert!(matches!(
        result,
        Err(RenewalApplicationError::RenewalAlreadyPending)
    ));

    // 既存の申請はそのまま残る
    let pending = list_pending(&ctx.deps).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request_id, first);
}

#[tokio::test]
async fn test_request_for_unknown_member() {
    let ctx = TestContext::new();

    let result = request_renewal(
        &ctx.deps,
        RequestRenewal {
            member_id: MemberId::new(),
            requested_at: Utc::now(),
        },
    )
    .await;

    assert!(matches!(result, Err(RenewalApplicationError::MemberNotFound)));
}

#[tokio::test]
async fn test_approve_extends_basic_membership_by_ninety_days() {
    let ctx = TestContext::new();
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    let request_id = submit(&ctx, member_id).await;

    let cmd = process(request_id, RenewalAction::Approve);
    let processed_at = cmd.processed_at;
    process_renewal(&ctx.deps, cmd).await.unwrap();

    let membership = ctx
        .members
        .get_membership(member_id)
        .await
        .unwrap()
        .expect("membership should be set");
    assert_eq!(membership.membership_type, MembershipType::Basic);
    assert_eq!(membership.start_date, processed_at);
    assert_eq!(membership.end_date, processed_at + Duration::days(90));

    assert!(get_pending_for_member(&ctx.deps, member_id)
        .await
        .unwrap()
        .is_none());
    assert!(ctx.notifications.sent().contains(&SentNotification::RenewalDecision {
        member_id,
        approved: true,
    }));
}

#[tokio::test]
async fn test_approve_extends_premium_membership_by_one_eighty_days() {
    let ctx = TestContext::new();
    let member_id = ctx.member_with_plan(MembershipType::Premium, jan_first());
    let request_id = submit(&ctx, member_id).await;

    let cmd = process(request_id, RenewalAction::Approve);
    let processed_at = cmd.processed_at;
    process_renewal(&ctx.deps, cmd).await.unwrap();

    let membership = ctx.members.get_membership(member_id).await.unwrap().unwrap();
    assert_eq!(membership.membership_type, MembershipType::Premium);
    assert_eq!(membership.end_date, processed_at + Duration::days(180));
}

#[tokio::test]
async fn test_approve_member_without_plan_grants_basic() {
    let ctx = TestContext::new();
    let member_id = ctx.member_without_plan();
    let request_id = submit(&ctx, member_id).await;

    let cmd = process(request_id, RenewalAction::Approve);
    let processed_at = cmd.processed_at;
    process_renewal(&ctx.deps, cmd).await.unwrap();

    let membership = ctx.members.get_membership(member_id).await.unwrap().unwrap();
    assert_eq!(membership.membership_type, MembershipType::Basic);
    assert_eq!(membership.end_date, processed_at + Duration::days(90));
}

#[tokio::test]
async fn test_reject_leaves_membership_unchanged() {
    let ctx = TestContext::new();
    let member_id = ctx.member_without_plan();
    let request_id = submit(&ctx, member_id).await;

    process_renewal(&ctx.deps, process(request_id, RenewalAction::Reject))
        .await
        .unwrap();

    assert!(ctx.members.get_membership(member_id).await.unwrap().is_none());
    assert!(list_pending(&ctx.deps).await.unwrap().is_empty());
    assert!(ctx.notifications.sent().contains(&SentNotification::RenewalDecision {
        member_id,
        approved: false,
    }));
}

#[tokio::test]
async fn test_processed_request_cannot_be_processed_again() {
    let ctx = TestContext::new();
    let member_id = ctx.member_without_plan();
    let request_id = submit(&ctx, member_id).await;

    process_renewal(&ctx.deps, process(request_id, RenewalAction::Approve))
        .await
        .unwrap();

    let result = process_renewal(&ctx.deps, process(request_id, RenewalAction::Reject)).await;
    assert!(matches!(
        result,
        Err(RenewalApplicationError::NotPending(RenewalStatus::Approved))
    ));
}

#[tokio::test]
async fn test_process_unknown_request() {
    let ctx = TestContext::new();

    let result = process_renewal(
        &ctx.deps,
        process(RenewalRequestId::new(), RenewalAction::Approve),
    )
    .await;

    assert!(matches!(
        result,
        Err(RenewalApplicationError::RenewalNotFound)
    ));
}

#[tokio::test]
async fn test_new_request_allowed_after_decision() {
    let ctx = TestContext::new();
    let member_id = ctx.member_without_plan();
    let first = submit(&ctx, member_id).await;

    process_renewal(&ctx.deps, process(first, RenewalAction::Reject))
        .await
        .unwrap();

    let second = submit(&ctx, member_id).await;
    assert_ne!(first, second);
}

/// 承認待ちの確認に時間がかかるRead Model
///
/// 確認と登録の間に別の申請が割り込める状況を再現する。
struct SlowRenewalReadModel {
    inner: RenewalReadModel,
}

#[async_trait]
impl RenewalReadModelPort for SlowRenewalReadModel {
    async fn save(&self, view: RenewalView) -> PortResult<()> {
        self.inner.save(view).await
    }

    async fn insert_pending(&self, view: RenewalView) -> PortResult<bool> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.inner.insert_pending(view).await
    }

    async fn delete(&self, request_id: RenewalRequestId) -> PortResult<()> {
        self.inner.delete(request_id).await
    }

    async fn get_by_id(&self, request_id: RenewalRequestId) -> PortResult<Option<RenewalView>> {
        self.inner.get_by_id(request_id).await
    }

    async fn find_pending(&self) -> PortResult<Vec<RenewalView>> {
        self.inner.find_pending().await
    }

    async fn find_pending_by_member(&self, member_id: MemberId) -> PortResult<Option<RenewalView>> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.inner.find_pending_by_member(member_id).await
    }
}

#[tokio::test]
async fn test_concurrent_requests_for_same_member_accept_only_one() {
    let mut ctx = TestContext::new();
    ctx.deps.renewal_read_model = Arc::new(SlowRenewalReadModel {
        inner: RenewalReadModel::new(),
    });
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());

    let cmd = RequestRenewal {
        member_id,
        requested_at: Utc::now(),
    };
    let (first, second) = tokio::join!(
        request_renewal(&ctx.deps, cmd.clone()),
        request_renewal(&ctx.deps, cmd)
    );

    let accepted = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(
        [first, second]
            .into_iter()
            .any(|r| matches!(r, Err(RenewalApplicationError::RenewalAlreadyPending)))
    );

    let pending = list_pending(&ctx.deps).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].member_id, member_id);
}

#[tokio::test]
async fn test_failed_membership_update_leaves_request_pending_for_retry() {
    let ctx = TestContext::new();
    let member_id = ctx.member_without_plan();
    let request_id = submit(&ctx, member_id).await;

    ctx.members.set_fail_updates(true);
    let result = process_renewal(&ctx.deps, process(request_id, RenewalAction::Approve)).await;
    assert!(matches!(
        result,
        Err(RenewalApplicationError::MemberServiceError(_))
    ));

    // 申請は承認待ちのまま、会員資格も変わらない
    let pending = get_pending_for_member(&ctx.deps, member_id)
        .await
        .unwrap()
        .expect("request should still be pending");
    assert_eq!(pending.request_id, request_id);
    assert!(ctx.members.get_membership(member_id).await.unwrap().is_none());

    ctx.members.set_fail_updates(false);
    let cmd = process(request_id, RenewalAction::Approve);
    let processed_at = cmd.processed_at;
    process_renewal(&ctx.deps, cmd).await.unwrap();

    let membership = ctx.members.get_membership(member_id).await.unwrap().unwrap();
    assert_eq!(membership.end_date, processed_at + Duration::days(90));
    assert!(list_pending(&ctx.deps).await.unwrap().is_empty());
}
