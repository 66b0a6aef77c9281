use crate::domain::value_objects::*;
use crate::ports::BorrowingView;
use chrono::{Duration, NaiveDate};

use super::borrowing_service::FineSummary;
use super::errors::{BorrowingApplicationError, Result};
use crate::application::ServiceDependencies;

/// 返却期限の何日前にリマインダーを送るか
pub const REMINDER_DAYS_BEFORE_DUE: i64 = 2;

/// 書籍名を取得できなかったときの表示名
pub const UNKNOWN_BOOK_TITLE: &str = "Unknown Book";

/// 延滞料金の支払い状況
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// 未払い額あり
    Pending,
    /// 基準日時点の料金を支払い済み
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
        }
    }
}

/// 延滞一覧の1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueBorrowing {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub book_title: String,
    pub member_id: MemberId,
    pub membership_type: MembershipType,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub overdue_days: u32,
    pub fine: Fine,
    pub fine_paid: Fine,
    pub payment_status: PaymentStatus,
}

/// 書籍名の取得に失敗しても一覧や通知は止めず、代替名で続ける
async fn resolve_book_title(deps: &ServiceDependencies, view: &BorrowingView) -> String {
    match deps.book_service.get_book_title(view.book_id).await {
        Ok(title) => title,
        Err(e) => {
            tracing::warn!(
                borrowing_id = %view.borrowing_id.value(),
                book_id = %view.book_id.value(),
                "Failed to resolve book title: {}",
                e
            );
            UNKNOWN_BOOK_TITLE.to_string()
        }
    }
}

async fn to_overdue(deps: &ServiceDependencies, view: &BorrowingView, today: NaiveDate) -> OverdueBorrowing {
    let summary = FineSummary::from_view(view, today);
    let book_title = resolve_book_title(deps, view).await;

    let payment_status = if summary.outstanding.is_zero() {
        PaymentStatus::Completed
    } else {
        PaymentStatus::Pending
    };

    OverdueBorrowing {
        borrowing_id: view.borrowing_id,
        book_id: view.book_id,
        book_title,
        member_id: view.member_id,
        membership_type: view.membership_type,
        borrow_date: summary.borrow_date,
        due_date: summary.expected_return_date,
        overdue_days: summary.overdue_days,
        fine: summary.fine,
        fine_paid: summary.fine_paid,
        payment_status,
    }
}

/// 延滞中の貸出一覧（全会員）
///
/// 返却予定日を過ぎた未返却の記録を返却予定日の古い順に返す。
/// 書籍名が取得できない記録は`UNKNOWN_BOOK_TITLE`で返す。
pub async fn list_overdue(deps: &ServiceDependencies, today: NaiveDate) -> Result<Vec<OverdueBorrowing>> {
    let candidates = deps
        .borrowing_read_model
        .find_overdue_candidates(today)
        .await
        .map_err(BorrowingApplicationError::ReadModelError)?;

    let mut overdue = Vec::with_capacity(candidates.len());
    for view in &candidates {
        overdue.push(to_overdue(deps, view, today).await);
    }
    Ok(overdue)
}

/// 会員の延滞中の貸出一覧
pub async fn list_overdue_for_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
    today: NaiveDate,
) -> Result<Vec<OverdueBorrowing>> {
    let mut active = deps
        .borrowing_read_model
        .find_active_by_member(member_id)
        .await
        .map_err(BorrowingApplicationError::ReadModelError)?;
    active.sort_by_key(|view| view.expected_return_date);

    let mut overdue = Vec::new();
    for view in active.iter().filter(|v| today > v.expected_return_date) {
        overdue.push(to_overdue(deps, view, today).await);
    }
    Ok(overdue)
}

/// 返却期限が近い貸出のリマインダーを送る
///
/// 返却予定日がちょうど2日後の未返却の記録が対象。
/// 個別の送信失敗はログに記録して次へ進む。
///
/// # 戻り値
/// 送信に成功した件数
pub async fn send_due_date_reminders(deps: &ServiceDependencies, today: NaiveDate) -> Result<usize> {
    let due_date = today + Duration::days(REMINDER_DAYS_BEFORE_DUE);
    let due = deps
        .borrowing_read_model
        .find_due_on(due_date)
        .await
        .map_err(BorrowingApplicationError::ReadModelError)?;

    let mut sent = 0;
    for view in due {
        let title = resolve_book_title(deps, &view).await;
        let result = deps
            .notification_service
            .send_due_date_reminder(view.member_id, &title, view.expected_return_date)
            .await;

        match result {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!(
                borrowing_id = %view.borrowing_id.value(),
                "Failed to send due date reminder: {}",
                e
            ),
        }
    }

    tracing::debug!(sent, %due_date, "Due date reminders processed");
    Ok(sent)
}

/// 延滞中の会員に延滞通知を送る
///
/// # 戻り値
/// 送信に成功した件数
pub async fn send_overdue_notifications(deps: &ServiceDependencies, today: NaiveDate) -> Result<usize> {
    let overdue = list_overdue(deps, today).await?;

    let mut sent = 0;
    for entry in overdue {
        match deps
            .notification_service
            .send_overdue_notification(entry.member_id, &entry.book_title, entry.due_date, entry.fine)
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => tracing::warn!(
                borrowing_id = %entry.borrowing_id.value(),
                "Failed to send overdue notification: {}",
                e
            ),
        }
    }

    tracing::debug!(sent, "Overdue notifications processed");
    Ok(sent)
}
