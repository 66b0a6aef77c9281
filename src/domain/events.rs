use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    BookId, BorrowingId, BorrowingRequestId, Fine, MemberId, Membership, MembershipType,
    RenewalRequestId, StaffId,
};

/// イベント：書籍が貸し出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub membership_type: MembershipType,
    pub borrowed_at: DateTime<Utc>,
    pub expected_return_date: NaiveDate,
    pub borrowed_by: StaffId,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub returned_at: DateTime<Utc>,
    pub was_overdue: bool,
    pub overdue_days: u32,
}

/// イベント：延滞料金が支払われた
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePaid {
    pub borrowing_id: BorrowingId,
    pub member_id: MemberId,
    pub amount: Fine,
    pub paid_at: DateTime<Utc>,
}

/// イベント：会員資格の更新が申請された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalRequested {
    pub request_id: RenewalRequestId,
    pub member_id: MemberId,
    pub requested_at: DateTime<Utc>,
}

/// イベント：更新申請が承認された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalApproved {
    pub request_id: RenewalRequestId,
    pub member_id: MemberId,
    pub approved_by: StaffId,
    pub processed_at: DateTime<Utc>,
    pub membership: Membership,
}

/// イベント：更新申請が却下された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalRejected {
    pub request_id: RenewalRequestId,
    pub member_id: MemberId,
    pub rejected_by: StaffId,
    pub processed_at: DateTime<Utc>,
}

/// イベント：貸出が申請された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequested {
    pub request_id: BorrowingRequestId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub requested_at: DateTime<Utc>,
}

/// イベント：貸出申請が受理された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequestAccepted {
    pub request_id: BorrowingRequestId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub borrowing_id: BorrowingId,
    pub accepted_by: StaffId,
    pub processed_at: DateTime<Utc>,
}

/// イベント：貸出申請が却下された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequestRejected {
    pub request_id: BorrowingRequestId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub rejected_by: StaffId,
    pub processed_at: DateTime<Utc>,
}

/// ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    BookBorrowed(BookBorrowed),
    BookReturned(BookReturned),
    FinePaid(FinePaid),
    RenewalRequested(RenewalRequested),
    RenewalApproved(RenewalApproved),
    RenewalRejected(RenewalRejected),
    BorrowRequested(BorrowRequested),
    BorrowRequestAccepted(BorrowRequestAccepted),
    BorrowRequestRejected(BorrowRequestRejected),
}

impl DomainEvent {
    /// イベントが属する集約のID
    pub fn aggregate_id(&self) -> Uuid {
        match self {
            DomainEvent::BookBorrowed(e) => e.borrowing_id.value(),
            DomainEvent::BookReturned(e) => e.borrowing_id.value(),
            DomainEvent::FinePaid(e) => e.borrowing_id.value(),
            DomainEvent::RenewalRequested(e) => e.request_id.value(),
            DomainEvent::RenewalApproved(e) => e.request_id.value(),
            DomainEvent::RenewalRejected(e) => e.request_id.value(),
            DomainEvent::BorrowRequested(e) => e.request_id.value(),
            DomainEvent::BorrowRequestAccepted(e) => e.request_id.value(),
            DomainEvent::BorrowRequestRejected(e) => e.request_id.value(),
        }
    }

    pub fn aggregate_type(&self) -> &'static str {
        match self {
            DomainEvent::BookBorrowed(_)
            | DomainEvent::BookReturned(_)
            | DomainEvent::FinePaid(_) => "Borrowing",
            DomainEvent::RenewalRequested(_)
            | DomainEvent::RenewalApproved(_)
            | DomainEvent::RenewalRejected(_) => "RenewalRequest",
            DomainEvent::BorrowRequested(_)
            | DomainEvent::BorrowRequestAccepted(_)
            | DomainEvent::BorrowRequestRejected(_) => "BorrowingRequest",
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::BookBorrowed(_) => "BookBorrowed",
            DomainEvent::BookReturned(_) => "BookReturned",
            DomainEvent::FinePaid(_) => "FinePaid",
            DomainEvent::RenewalRequested(_) => "RenewalRequested",
            DomainEvent::RenewalApproved(_) => "RenewalApproved",
            DomainEvent::RenewalRejected(_) => "RenewalRejected",
            DomainEvent::BorrowRequested(_) => "BorrowRequested",
            DomainEvent::BorrowRequestAccepted(_) => "BorrowRequestAccepted",
            DomainEvent::BorrowRequestRejected(_) => "BorrowRequestRejected",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::BookBorrowed(e) => e.borrowed_at,
            DomainEvent::BookReturned(e) => e.returned_at,
            DomainEvent::FinePaid(e) => e.paid_at,
            DomainEvent::RenewalRequested(e) => e.requested_at,
            DomainEvent::RenewalApproved(e) => e.processed_at,
            DomainEvent::RenewalRejected(e) => e.processed_at,
            DomainEvent::BorrowRequested(e) => e.requested_at,
            DomainEvent::BorrowRequestAccepted(e) => e.processed_at,
            DomainEvent::BorrowRequestRejected(e) => e.processed_at,
        }
    }
}
