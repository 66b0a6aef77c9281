use crate::domain::{self, BorrowRequestAction, DomainEvent, commands::*, value_objects::*};
use crate::ports::*;

use super::errors::{BorrowingRequestApplicationError, Result};
use crate::application::ServiceDependencies;
use crate::application::borrowing::{self, UNKNOWN_BOOK_TITLE};

const BORROWING_REQUEST_AGGREGATE: &str = "BorrowingRequest";

async fn persist(
    deps: &ServiceDependencies,
    request: &domain::borrowing_request::BorrowingRequest,
    event: DomainEvent,
) -> Result<()> {
    deps.event_store
        .append(request.core().request_id.value(), vec![event])
        .await
        .map_err(BorrowingRequestApplicationError::EventStoreError)?;

    deps.borrowing_request_read_model
        .save(BorrowingRequestView::from(request))
        .await
        .map_err(BorrowingRequestApplicationError::ReadModelError)
}

async fn book_title(deps: &ServiceDependencies, book_id: BookId) -> String {
    match deps.book_service.get_book_title(book_id).await {
        Ok(title) => title,
        Err(e) => {
            tracing::warn!(book_id = %book_id.value(), "Failed to resolve book title: {}", e);
            UNKNOWN_BOOK_TITLE.to_string()
        }
    }
}

/// 会員が貸出を申請する
///
/// ビジネスルール：
/// - 会員が存在すること
/// - 同じ会員・同じ書籍の承認待ち申請がないこと
///
/// 書籍の貸出可能性と貸出上限は受理時に確認する。
pub async fn submit_request(
    deps: &ServiceDependencies,
    cmd: SubmitBorrowRequest,
) -> Result<BorrowingRequestId> {
    let member_exists = deps
        .member_service
        .exists(cmd.member_id)
        .await
        .map_err(BorrowingRequestApplicationError::MemberServiceError)?;

    if !member_exists {
        return Err(BorrowingRequestApplicationError::MemberNotFound);
    }

    let (request, event) =
        domain::borrowing_request::submit_request(cmd.member_id, cmd.book_id, cmd.requested_at);
    let request_id = request.request_id;
    let view = BorrowingRequestView::from(&domain::borrowing_request::BorrowingRequest::Pending(
        request,
    ));

    // 承認待ちの登録が重複確認を兼ねる
    let inserted = deps
        .borrowing_request_read_model
        .insert_pending(view)
        .await
        .map_err(BorrowingRequestApplicationError::ReadModelError)?;

    if !inserted {
        return Err(BorrowingRequestApplicationError::RequestAlreadyPending);
    }

    if let Err(e) = deps
        .event_store
        .append(request_id.value(), vec![DomainEvent::BorrowRequested(event)])
        .await
    {
        if let Err(undo) = deps.borrowing_request_read_model.delete(request_id).await {
            tracing::error!(
                request_id = %request_id.value(),
                "Failed to remove unsaved borrowing request from read model: {}",
                undo
            );
        }
        return Err(BorrowingRequestApplicationError::EventStoreError(e));
    }

    let title = book_title(deps, cmd.book_id).await;
    if let Err(e) = deps
        .notification_service
        .send_borrow_request_submitted(cmd.member_id, &title)
        .await
    {
        tracing::warn!("Failed to notify staff of borrowing request: {}", e);
    }

    tracing::info!(
        request_id = %request_id.value(),
        member_id = %cmd.member_id.value(),
        book_id = %cmd.book_id.value(),
        "Borrowing requested"
    );

    Ok(request_id)
}

/// 申請後に同じ書籍が既に貸し出されていれば、その貸出記録を返す
///
/// 受理処理が貸出の作成後に失敗した場合、再実行で貸出を二重に作らない。
async fn existing_borrowing(
    deps: &ServiceDependencies,
    pending: &domain::borrowing_request::PendingBorrowRequest,
) -> Result<Option<BorrowingId>> {
    let active = deps
        .borrowing_read_model
        .find_active_by_member(pending.member_id)
        .await
        .map_err(BorrowingRequestApplicationError::ReadModelError)?;

    Ok(active
        .into_iter()
        .find(|v| v.book_id == pending.book_id && v.borrowed_at >= pending.requested_at)
        .map(|v| v.borrowing_id))
}

/// 貸出申請を受理または却下する
///
/// 受理すると会員のプランに従って貸出記録を作成する。貸出のビジネスルール
/// （会員資格、貸出可能性、貸出上限）に反する場合は申請は承認待ちのまま残る。
///
/// # 戻り値
/// 受理した場合は作成された貸出記録のID
pub async fn process_request(
    deps: &ServiceDependencies,
    cmd: ProcessBorrowRequest,
) -> Result<Option<BorrowingId>> {
    let events = deps
        .event_store
        .load(cmd.request_id.value())
        .await
        .map_err(BorrowingRequestApplicationError::EventStoreError)?;

    if events
        .iter()
        .any(|e| e.aggregate_type() != BORROWING_REQUEST_AGGREGATE)
    {
        return Err(BorrowingRequestApplicationError::RequestNotFound);
    }
    let request = domain::borrowing_request::replay_events(&events)
        .ok_or(BorrowingRequestApplicationError::RequestNotFound)?;
    let member_id = request.core().member_id;
    let book_id = request.core().book_id;

    let (borrowing_id, accepted) = match cmd.action {
        BorrowRequestAction::Accept => {
            let pending = request.into_pending()?;

            let borrowing_id = match existing_borrowing(deps, &pending).await? {
                Some(borrowing_id) => borrowing_id,
                None => {
                    borrowing::borrow_book(
                        deps,
                        BorrowBook {
                            book_id,
                            member_id,
                            borrowed_at: cmd.processed_at,
                            staff_id: cmd.staff_id,
                        },
                    )
                    .await?
                }
            };

            let (accepted, event) = domain::borrowing_request::accept_request(
                pending,
                borrowing_id,
                cmd.staff_id,
                cmd.processed_at,
            );
            persist(
                deps,
                &domain::borrowing_request::BorrowingRequest::Accepted(accepted),
                DomainEvent::BorrowRequestAccepted(event),
            )
            .await?;

            (Some(borrowing_id), true)
        }
        BorrowRequestAction::Reject => {
            let (rejected, event) = domain::borrowing_request::reject_request(
                request,
                cmd.staff_id,
                cmd.processed_at,
            )?;
            persist(
                deps,
                &domain::borrowing_request::BorrowingRequest::Rejected(rejected),
                DomainEvent::BorrowRequestRejected(event),
            )
            .await?;

            (None, false)
        }
    };

    let title = book_title(deps, book_id).await;
    if let Err(e) = deps
        .notification_service
        .send_borrow_request_decision(member_id, &title, accepted)
        .await
    {
        tracing::warn!("Failed to notify member of borrowing request decision: {}", e);
    }

    tracing::info!(
        request_id = %cmd.request_id.value(),
        accepted,
        "Borrowing request processed"
    );

    Ok(borrowing_id)
}

/// 承認待ちの貸出申請一覧
pub async fn list_pending(deps: &ServiceDependencies) -> Result<Vec<BorrowingRequestView>> {
    deps.borrowing_request_read_model
        .find_pending()
        .await
        .map_err(BorrowingRequestApplicationError::ReadModelError)
}

/// 会員の承認待ち貸出申請一覧
pub async fn list_pending_for_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Vec<BorrowingRequestView>> {
    deps.borrowing_request_read_model
        .find_pending_by_member(member_id)
        .await
        .map_err(BorrowingRequestApplicationError::ReadModelError)
}
