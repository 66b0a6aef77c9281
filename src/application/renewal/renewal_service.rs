use crate::domain::{self, DomainEvent, RenewalAction, commands::*, value_objects::*};
use crate::ports::*;

use super::errors::{RenewalApplicationError, Result};
use crate::application::ServiceDependencies;

const RENEWAL_AGGREGATE: &str = "RenewalRequest";

async fn persist(
    deps: &ServiceDependencies,
    request: &domain::renewal::RenewalRequest,
    event: DomainEvent,
) -> Result<()> {
    deps.event_store
        .append(request.core().request_id.value(), vec![event])
        .await
        .map_err(RenewalApplicationError::EventStoreError)?;

    deps.renewal_read_model
        .save(RenewalView::from(request))
        .await
        .map_err(RenewalApplicationError::ReadModelError)
}

/// 会員資格の更新を申請する
///
/// ビジネスルール：
/// - 会員が存在すること
/// - 同じ会員の承認待ち申請がないこと（あれば競合として拒否し、統合しない）
///
/// 承認待ちの登録はRead Modelへの不可分な挿入で行い、成功した場合のみ
/// イベントを保存する。同時に届いた申請は一方だけが登録される。
///
/// 申請受付は職員に通知される。通知の失敗は申請を失敗させない。
pub async fn request_renewal(
    deps: &ServiceDependencies,
    cmd: RequestRenewal,
) -> Result<RenewalRequestId> {
    // 1. 会員の存在確認
    let member_exists = deps
        .member_service
        .exists(cmd.member_id)
        .await
        .map_err(RenewalApplicationError::MemberServiceError)?;

    if !member_exists {
        return Err(RenewalApplicationError::MemberNotFound);
    }

    // 2. ドメイン層の純粋関数を呼び出し
    let (request, event) = domain::renewal::request_renewal(cmd.member_id, cmd.requested_at);
    let request_id = request.request_id;
    let view = RenewalView::from(&domain::renewal::RenewalRequest::Pending(request));

    // 3. 承認待ちとして登録（重複確認を兼ねる）
    let inserted = deps
        .renewal_read_model
        .insert_pending(view)
        .await
        .map_err(RenewalApplicationError::ReadModelError)?;

    if !inserted {
        return Err(RenewalApplicationError::RenewalAlreadyPending);
    }

    // 4. イベント保存。失敗したら登録を取り消す
    if let Err(e) = deps
        .event_store
        .append(request_id.value(), vec![DomainEvent::RenewalRequested(event)])
        .await
    {
        if let Err(undo) = deps.renewal_read_model.delete(request_id).await {
            tracing::error!(
                request_id = %request_id.value(),
                "Failed to remove unsaved renewal request from read model: {}",
                undo
            );
        }
        return Err(RenewalApplicationError::EventStoreError(e));
    }

    if let Err(e) = deps
        .notification_service
        .send_renewal_submitted(cmd.member_id)
        .await
    {
        tracing::warn!("Failed to notify staff of renewal request: {}", e);
    }

    tracing::info!(
        request_id = %request_id.value(),
        member_id = %cmd.member_id.value(),
        "Renewal requested"
    );

    Ok(request_id)
}

/// 更新申請を承認または却下する
///
/// 承認時は会員の現在のプラン（未設定ならBASIC）で、承認日から
/// 新しい会員期間を開始し、会員コンテキストに反映する。
///
/// 会員資格の更新はイベント保存より先に行う。更新に失敗した申請は
/// 承認待ちのまま残り、再度承認できる。
pub async fn process_renewal(deps: &ServiceDependencies, cmd: ProcessRenewal) -> Result<()> {
    // 1. イベントストアから申請を復元
    let events = deps
        .event_store
        .load(cmd.request_id.value())
        .await
        .map_err(RenewalApplicationError::EventStoreError)?;

    if events.iter().any(|e| e.aggregate_type() != RENEWAL_AGGREGATE) {
        return Err(RenewalApplicationError::RenewalNotFound);
    }
    let request = domain::renewal::replay_events(&events)
        .ok_or(RenewalApplicationError::RenewalNotFound)?;
    let member_id = request.core().member_id;

    // 2. 処理内容に応じた状態遷移
    let approved = match cmd.action {
        RenewalAction::Approve => {
            let membership_type = deps
                .member_service
                .get_membership(member_id)
                .await
                .map_err(RenewalApplicationError::MemberServiceError)?
                .map(|m| m.membership_type)
                .unwrap_or_default();

            let (approved, event) = domain::renewal::approve_renewal(
                request,
                membership_type,
                cmd.staff_id,
                cmd.processed_at,
            )?;

            deps.member_service
                .update_membership(member_id, approved.membership)
                .await
                .map_err(RenewalApplicationError::MemberServiceError)?;

            persist(
                deps,
                &domain::renewal::RenewalRequest::Approved(approved),
                DomainEvent::RenewalApproved(event),
            )
            .await?;

            true
        }
        RenewalAction::Reject => {
            let (rejected, event) =
                domain::renewal::reject_renewal(request, cmd.staff_id, cmd.processed_at)?;

            persist(
                deps,
                &domain::renewal::RenewalRequest::Rejected(rejected),
                DomainEvent::RenewalRejected(event),
            )
            .await?;

            false
        }
    };

    if let Err(e) = deps
        .notification_service
        .send_renewal_decision(member_id, approved)
        .await
    {
        tracing::warn!("Failed to notify member of renewal decision: {}", e);
    }

    tracing::info!(
        request_id = %cmd.request_id.value(),
        approved,
        "Renewal request processed"
    );

    Ok(())
}

/// 承認待ちの申請一覧
pub async fn list_pending(deps: &ServiceDependencies) -> Result<Vec<RenewalView>> {
    deps.renewal_read_model
        .find_pending()
        .await
        .map_err(RenewalApplicationError::ReadModelError)
}

/// 会員の承認待ち申請
pub async fn get_pending_for_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Option<RenewalView>> {
    deps.renewal_read_model
        .find_pending_by_member(member_id)
        .await
        .map_err(RenewalApplicationError::ReadModelError)
}
