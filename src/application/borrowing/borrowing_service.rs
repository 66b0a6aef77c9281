use crate::domain::{self, DomainEvent, commands::*, fine, value_objects::*};
use crate::ports::*;
use chrono::NaiveDate;
use std::sync::Arc;

use super::errors::{BorrowingApplicationError, Result};
use crate::application::ServiceDependencies;

const BORROWING_AGGREGATE: &str = "Borrowing";

/// 基準日時点の延滞料金の内訳
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineSummary {
    pub borrowing_id: BorrowingId,
    pub membership_type: MembershipType,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub as_of: NaiveDate,
    pub overdue_days: u32,
    pub fine: Fine,
    pub fine_paid: Fine,
    pub outstanding: Fine,
}

impl FineSummary {
    /// Read Modelのビューから内訳を計算する
    ///
    /// 返却済みの記録は返却日で料金の加算が止まる。
    pub fn from_view(view: &BorrowingView, as_of: NaiveDate) -> Self {
        let end = fine::accrual_end(view.returned_at.map(|r| r.date_naive()), as_of);
        let assessment = fine::assess(view.expected_return_date, end);

        Self {
            borrowing_id: view.borrowing_id,
            membership_type: view.membership_type,
            borrow_date: view.borrowed_at.date_naive(),
            expected_return_date: view.expected_return_date,
            as_of,
            overdue_days: assessment.overdue_days,
            fine: assessment.fine,
            fine_paid: view.fine_paid,
            outstanding: assessment.fine.saturating_sub(view.fine_paid),
        }
    }
}

/// イベントストアから貸出集約を復元するヘルパー関数
///
/// # エラー
/// - EventStoreError: イベント読み込み失敗
/// - BorrowingNotFound: イベントが存在しない、または貸出のイベントでない
async fn load_borrowing(
    event_store: &Arc<dyn EventStore>,
    borrowing_id: BorrowingId,
) -> Result<domain::borrowing::Borrowing> {
    let events = event_store
        .load(borrowing_id.value())
        .await
        .map_err(BorrowingApplicationError::EventStoreError)?;

    // 別の集約（更新申請）のIDが渡された場合も見つからない扱い
    if events.iter().any(|e| e.aggregate_type() != BORROWING_AGGREGATE) {
        return Err(BorrowingApplicationError::BorrowingNotFound);
    }

    domain::borrowing::replay_events(&events).ok_or(BorrowingApplicationError::BorrowingNotFound)
}

/// イベントを保存し、集約の完全な状態をRead Modelに反映する
async fn persist(
    deps: &ServiceDependencies,
    borrowing: &domain::borrowing::Borrowing,
    event: DomainEvent,
) -> Result<()> {
    deps.event_store
        .append(borrowing.core().borrowing_id.value(), vec![event])
        .await
        .map_err(BorrowingApplicationError::EventStoreError)?;

    deps.borrowing_read_model
        .save(BorrowingView::from(borrowing))
        .await
        .map_err(BorrowingApplicationError::ReadModelError)
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 会員が存在すること
/// - 会員資格がある場合は有効期間内であること
/// - 書籍が貸出可能であること
/// - 貸出中の冊数がプランの上限未満であること
///
/// 会員資格が未設定の会員はBASICとして扱う。
///
/// # 一貫性保証
///
/// EventStore（書き込み）とReadModel（読み取り）は独立して更新される。
/// ReadModel更新がEventStore保存後に失敗した場合は一時的に不整合となり、
/// Read Modelの再構築で修復する。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<BorrowingId> {
    // 1. 会員の存在確認
    let member_exists = deps
        .member_service
        .exists(cmd.member_id)
        .await
        .map_err(BorrowingApplicationError::MemberServiceError)?;

    if !member_exists {
        return Err(BorrowingApplicationError::MemberNotFound);
    }

    // 2. 会員資格の確認とプランの決定
    let membership = deps
        .member_service
        .get_membership(cmd.member_id)
        .await
        .map_err(BorrowingApplicationError::MemberServiceError)?;

    if membership.is_some_and(|m| !m.is_active(cmd.borrowed_at)) {
        return Err(BorrowingApplicationError::MembershipExpired);
    }
    let membership_type = membership.map(|m| m.membership_type).unwrap_or_default();

    // 3. 書籍の貸出可能性確認
    let book_available = deps
        .book_service
        .is_available_for_loan(cmd.book_id)
        .await
        .map_err(BorrowingApplicationError::BookServiceError)?;

    if !book_available {
        return Err(BorrowingApplicationError::BookNotAvailable);
    }

    // 4. 貸出上限確認
    let active = deps
        .borrowing_read_model
        .find_active_by_member(cmd.member_id)
        .await
        .map_err(BorrowingApplicationError::ReadModelError)?;

    let limit = membership_type.borrowing_limit();
    if active.len() >= limit {
        return Err(BorrowingApplicationError::BorrowingLimitExceeded { limit });
    }

    // 5. ドメイン層の純粋関数を呼び出し
    let (borrowing, event) = domain::borrowing::borrow_book(
        cmd.book_id,
        cmd.member_id,
        membership_type,
        cmd.borrowed_at,
        cmd.staff_id,
    );
    let borrowing_id = borrowing.borrowing_id;

    // 6. 保存
    persist(
        deps,
        &domain::borrowing::Borrowing::Active(borrowing),
        DomainEvent::BookBorrowed(event),
    )
    .await?;

    tracing::info!(
        borrowing_id = %borrowing_id.value(),
        member_id = %cmd.member_id.value(),
        membership_type = membership_type.as_str(),
        "Book borrowed"
    );

    Ok(borrowing_id)
}

/// 書籍を返却する
///
/// 延滞していても返却は受け付ける。延滞料金は返却日で確定し、
/// 返却後も支払い可能。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<()> {
    let borrowing = load_borrowing(&deps.event_store, cmd.borrowing_id).await?;

    let (returned, event) = domain::borrowing::return_book(borrowing, cmd.returned_at)?;

    if event.was_overdue {
        tracing::info!(
            borrowing_id = %cmd.borrowing_id.value(),
            overdue_days = event.overdue_days,
            "Overdue book returned"
        );
    }

    persist(
        deps,
        &domain::borrowing::Borrowing::Returned(returned),
        DomainEvent::BookReturned(event),
    )
    .await
}

/// 延滞料金を支払う
///
/// 金額を指定しない場合は支払時点の未払い額を全額支払う。
/// 支払い確認通知の失敗は支払い自体を失敗させない。
///
/// # 戻り値
/// 支払った金額
pub async fn pay_fine(deps: &ServiceDependencies, cmd: PayFine) -> Result<Fine> {
    let borrowing = load_borrowing(&deps.event_store, cmd.borrowing_id).await?;

    let amount = match cmd.amount {
        Some(amount) => amount,
        None => domain::borrowing::outstanding_fine(&borrowing, cmd.paid_at.date_naive()),
    };

    let (updated, event) = domain::borrowing::pay_fine(borrowing, amount, cmd.paid_at)?;
    let member_id = event.member_id;
    let book_id = updated.core().book_id;

    persist(deps, &updated, DomainEvent::FinePaid(event)).await?;

    let notified = match deps.book_service.get_book_title(book_id).await {
        Ok(title) => {
            deps.notification_service
                .send_fine_payment_confirmation(member_id, &title, amount)
                .await
        }
        Err(e) => Err(e),
    };
    if let Err(e) = notified {
        tracing::warn!("Failed to send payment confirmation: {}", e);
    }

    Ok(amount)
}

/// 基準日時点の延滞料金の内訳を取得する
pub async fn get_fine(
    deps: &ServiceDependencies,
    borrowing_id: BorrowingId,
    as_of: NaiveDate,
) -> Result<FineSummary> {
    let view = deps
        .borrowing_read_model
        .get_by_id(borrowing_id)
        .await
        .map_err(BorrowingApplicationError::ReadModelError)?
        .ok_or(BorrowingApplicationError::BorrowingNotFound)?;

    Ok(FineSummary::from_view(&view, as_of))
}
