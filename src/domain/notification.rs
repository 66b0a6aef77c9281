use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Fine, MemberId, NotificationId};

/// 通知の宛先区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Audience {
    /// 職員（司書）全体の受信箱
    Staff,
    /// 対象の会員本人
    Member,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Staff => "staff",
            Audience::Member => "member",
        }
    }
}

impl std::str::FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Audience::Staff),
            "member" => Ok(Audience::Member),
            _ => Err(format!("Invalid audience: {}", s)),
        }
    }
}

/// 通知フィードの参照先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Staff,
    Member(MemberId),
}

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    DueDateReminder,
    Overdue,
    RenewalSubmitted,
    RenewalDecision,
    FinePayment,
    BorrowRequestSubmitted,
    BorrowRequestDecision,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::DueDateReminder => "due_date_reminder",
            NotificationKind::Overdue => "overdue",
            NotificationKind::RenewalSubmitted => "renewal_submitted",
            NotificationKind::RenewalDecision => "renewal_decision",
            NotificationKind::FinePayment => "fine_payment",
            NotificationKind::BorrowRequestSubmitted => "borrow_request_submitted",
            NotificationKind::BorrowRequestDecision => "borrow_request_decision",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due_date_reminder" => Ok(NotificationKind::DueDateReminder),
            "overdue" => Ok(NotificationKind::Overdue),
            "renewal_submitted" => Ok(NotificationKind::RenewalSubmitted),
            "renewal_decision" => Ok(NotificationKind::RenewalDecision),
            "fine_payment" => Ok(NotificationKind::FinePayment),
            "borrow_request_submitted" => Ok(NotificationKind::BorrowRequestSubmitted),
            "borrow_request_decision" => Ok(NotificationKind::BorrowRequestDecision),
            _ => Err(format!("Invalid notification kind: {}", s)),
        }
    }
}

/// フィードに残る通知
///
/// `member_id`は通知が関係する会員。職員宛ての通知でも設定される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub audience: Audience,
    pub member_id: MemberId,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn unread(
        audience: Audience,
        member_id: MemberId,
        kind: NotificationKind,
        message: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            notification_id: NotificationId::new(),
            audience,
            member_id,
            kind,
            message,
            is_read: false,
            created_at,
        }
    }

    /// 指定の参照先のフィードに含まれるか
    pub fn is_for(&self, recipient: Recipient) -> bool {
        match recipient {
            Recipient::Staff => self.audience == Audience::Staff,
            Recipient::Member(member_id) => {
                self.audience == Audience::Member && self.member_id == member_id
            }
        }
    }
}

/// 純粋関数：返却期限リマインダー
pub fn due_date_reminder(
    member_id: MemberId,
    book_title: &str,
    due_date: NaiveDate,
    now: DateTime<Utc>,
) -> Notification {
    Notification::unread(
        Audience::Member,
        member_id,
        NotificationKind::DueDateReminder,
        format!("\"{}\" is due back on {}.", book_title, due_date),
        now,
    )
}

/// 純粋関数：延滞通知
pub fn overdue(
    member_id: MemberId,
    book_title: &str,
    due_date: NaiveDate,
    fine: Fine,
    now: DateTime<Utc>,
) -> Notification {
    Notification::unread(
        Audience::Member,
        member_id,
        NotificationKind::Overdue,
        format!(
            "\"{}\" was due on {}. Current fine: {}.",
            book_title,
            due_date,
            fine.value()
        ),
        now,
    )
}

/// 純粋関数：更新申請の受付（職員宛て）
pub fn renewal_submitted(member_id: MemberId, now: DateTime<Utc>) -> Notification {
    Notification::unread(
        Audience::Staff,
        member_id,
        NotificationKind::RenewalSubmitted,
        format!(
            "Member {} submitted a membership renewal request.",
            member_id.value()
        ),
        now,
    )
}

/// 純粋関数：更新申請の処理結果
pub fn renewal_decision(member_id: MemberId, approved: bool, now: DateTime<Utc>) -> Notification {
    let message = if approved {
        "Your membership renewal request has been approved."
    } else {
        "Your membership renewal request has been rejected."
    };
    Notification::unread(
        Audience::Member,
        member_id,
        NotificationKind::RenewalDecision,
        message.to_string(),
        now,
    )
}

/// 純粋関数：延滞料金の支払い確認
pub fn fine_payment(
    member_id: MemberId,
    book_title: &str,
    amount: Fine,
    now: DateTime<Utc>,
) -> Notification {
    Notification::unread(
        Audience::Member,
        member_id,
        NotificationKind::FinePayment,
        format!(
            "Payment of {} received for \"{}\".",
            amount.value(),
            book_title
        ),
        now,
    )
}

/// 純粋関数：貸出申請の受付（職員宛て）
pub fn borrow_request_submitted(
    member_id: MemberId,
    book_title: &str,
    now: DateTime<Utc>,
) -> Notification {
    Notification::unread(
        Audience::Staff,
        member_id,
        NotificationKind::BorrowRequestSubmitted,
        format!(
            "A new borrowing request for \"{}\" has been submitted by member {}.",
            book_title,
            member_id.value()
        ),
        now,
    )
}

/// 純粋関数：貸出申請の処理結果
pub fn borrow_request_decision(
    member_id: MemberId,
    book_title: &str,
    accepted: bool,
    now: DateTime<Utc>,
) -> Notification {
    let outcome = if accepted { "approved" } else { "rejected" };
    Notification::unread(
        Audience::Member,
        member_id,
        NotificationKind::BorrowRequestDecision,
        format!(
            "Your borrowing request for \"{}\" has been {}.",
            book_title, outcome
        ),
        now,
    )
}
