use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, BorrowRequestAccepted, BorrowRequestRejected, BorrowRequested, BorrowingId,
    BorrowingRequestId, DomainEvent, MemberId, ProcessBorrowRequestError, StaffId,
};

/// 貸出申請のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BorrowRequestStatus {
    /// 承認待ち（初期状態）
    Pending,
    /// 受理済み（終端）。貸出記録が作成されている
    Accepted,
    /// 却下（終端）
    Rejected,
}

impl BorrowRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowRequestStatus::Pending => "pending",
            BorrowRequestStatus::Accepted => "accepted",
            BorrowRequestStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for BorrowRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BorrowRequestStatus::Pending),
            "accepted" => Ok(BorrowRequestStatus::Accepted),
            "rejected" => Ok(BorrowRequestStatus::Rejected),
            _ => Err(format!("Invalid borrowing request status: {}", s)),
        }
    }
}

/// 職員による処理内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BorrowRequestAction {
    Accept,
    Reject,
}

impl std::str::FromStr for BorrowRequestAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("accept") {
            Ok(BorrowRequestAction::Accept)
        } else if s.eq_ignore_ascii_case("reject") {
            Ok(BorrowRequestAction::Reject)
        } else {
            Err(format!("Invalid action: {} (must be ACCEPT or REJECT)", s))
        }
    }
}

/// BorrowingRequest集約の共通フィールド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequestCore {
    pub request_id: BorrowingRequestId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 承認待ち状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBorrowRequest {
    #[serde(flatten)]
    pub core: BorrowRequestCore,
}

impl std::ops::Deref for PendingBorrowRequest {
    type Target = BorrowRequestCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 受理済み状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedBorrowRequest {
    #[serde(flatten)]
    pub core: BorrowRequestCore,
    pub borrowing_id: BorrowingId,
    pub processed_by: StaffId,
    pub processed_at: DateTime<Utc>,
}

impl std::ops::Deref for AcceptedBorrowRequest {
    type Target = BorrowRequestCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 却下状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedBorrowRequest {
    #[serde(flatten)]
    pub core: BorrowRequestCore,
    pub processed_by: StaffId,
    pub processed_at: DateTime<Utc>,
}

impl std::ops::Deref for RejectedBorrowRequest {
    type Target = BorrowRequestCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// BorrowingRequest集約の統合型
///
/// 状態遷移：Pending → Accepted | Rejected（どちらも終端）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum BorrowingRequest {
    Pending(PendingBorrowRequest),
    Accepted(AcceptedBorrowRequest),
    Rejected(RejectedBorrowRequest),
}

impl BorrowingRequest {
    pub fn core(&self) -> &BorrowRequestCore {
        match self {
            BorrowingRequest::Pending(p) => &p.core,
            BorrowingRequest::Accepted(a) => &a.core,
            BorrowingRequest::Rejected(r) => &r.core,
        }
    }

    pub fn status(&self) -> BorrowRequestStatus {
        match self {
            BorrowingRequest::Pending(_) => BorrowRequestStatus::Pending,
            BorrowingRequest::Accepted(_) => BorrowRequestStatus::Accepted,
            BorrowingRequest::Rejected(_) => BorrowRequestStatus::Rejected,
        }
    }

    /// 承認待ちであれば取り出す
    pub fn into_pending(self) -> Result<PendingBorrowRequest, ProcessBorrowRequestError> {
        match self {
            BorrowingRequest::Pending(pending) => Ok(pending),
            other => Err(ProcessBorrowRequestError::NotPending(other.status())),
        }
    }
}

/// 純粋関数：貸出を申請する
///
/// 同じ会員・同じ書籍の承認待ち申請の有無はアプリケーション層で確認する。
pub fn submit_request(
    member_id: MemberId,
    book_id: BookId,
    requested_at: DateTime<Utc>,
) -> (PendingBorrowRequest, BorrowRequested) {
    let request_id = BorrowingRequestId::new();

    let pending = PendingBorrowRequest {
        core: BorrowRequestCore {
            request_id,
            member_id,
            book_id,
            requested_at,
            updated_at: requested_at,
        },
    };

    let event = BorrowRequested {
        request_id,
        member_id,
        book_id,
        requested_at,
    };

    (pending, event)
}

/// 純粋関数：貸出申請を受理する
///
/// 貸出記録はアプリケーション層で作成済みであること。
pub fn accept_request(
    pending: PendingBorrowRequest,
    borrowing_id: BorrowingId,
    staff_id: StaffId,
    processed_at: DateTime<Utc>,
) -> (AcceptedBorrowRequest, BorrowRequestAccepted) {
    let event = BorrowRequestAccepted {
        request_id: pending.request_id,
        member_id: pending.member_id,
        book_id: pending.book_id,
        borrowing_id,
        accepted_by: staff_id,
        processed_at,
    };

    let accepted = AcceptedBorrowRequest {
        core: BorrowRequestCore {
            updated_at: processed_at,
            ..pending.core
        },
        borrowing_id,
        processed_by: staff_id,
        processed_at,
    };

    (accepted, event)
}

/// 純粋関数：貸出申請を却下する
pub fn reject_request(
    request: BorrowingRequest,
    staff_id: StaffId,
    processed_at: DateTime<Utc>,
) -> Result<(RejectedBorrowRequest, BorrowRequestRejected), ProcessBorrowRequestError> {
    let pending = request.into_pending()?;

    let event = BorrowRequestRejected {
        request_id: pending.request_id,
        member_id: pending.member_id,
        book_id: pending.book_id,
        rejected_by: staff_id,
        processed_at,
    };

    let rejected = RejectedBorrowRequest {
        core: BorrowRequestCore {
            updated_at: processed_at,
            ..pending.core
        },
        processed_by: staff_id,
        processed_at,
    };

    Ok((rejected, event))
}

/// イベントを適用して新しい状態を生成する
///
/// # Panics
/// 不正な状態遷移の場合
pub fn apply_event(request: Option<BorrowingRequest>, event: &DomainEvent) -> BorrowingRequest {
    match (request, event) {
        (None, DomainEvent::BorrowRequested(e)) => BorrowingRequest::Pending(PendingBorrowRequest {
            core: BorrowRequestCore {
                request_id: e.request_id,
                member_id: e.member_id,
                book_id: e.book_id,
                requested_at: e.requested_at,
                updated_at: e.requested_at,
            },
        }),

        (Some(BorrowingRequest::Pending(pending)), DomainEvent::BorrowRequestAccepted(e)) => {
            assert_eq!(
                pending.request_id, e.request_id,
                "BorrowRequestAccepted request_id does not match current request"
            );
            BorrowingRequest::Accepted(AcceptedBorrowRequest {
                core: BorrowRequestCore {
                    updated_at: e.processed_at,
                    ..pending.core
                },
                borrowing_id: e.borrowing_id,
                processed_by: e.accepted_by,
                processed_at: e.processed_at,
            })
        }

        (Some(BorrowingRequest::Pending(pending)), DomainEvent::BorrowRequestRejected(e)) => {
            assert_eq!(
                pending.request_id, e.request_id,
                "BorrowRequestRejected request_id does not match current request"
            );
            BorrowingRequest::Rejected(RejectedBorrowRequest {
                core: BorrowRequestCore {
                    updated_at: e.processed_at,
                    ..pending.core
                },
                processed_by: e.rejected_by,
                processed_at: e.processed_at,
            })
        }

        (request, event) => panic!(
            "Invalid state transition: request={:?}, event={:?}",
            request, event
        ),
    }
}

/// イベント列から現在の状態を復元する
pub fn replay_events(events: &[DomainEvent]) -> Option<BorrowingRequest> {
    events
        .iter()
        .fold(None, |request, event| Some(apply_event(request, event)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_submit_request_starts_pending() {
        let member_id = MemberId::new();
        let book_id = BookId::new();
        let now = Utc::now();

        let (pending, event) = submit_request(member_id, book_id, now);

        assert_eq!(pending.member_id, member_id);
        assert_eq!(pending.book_id, book_id);
        assert_eq!(event.request_id, pending.request_id);
        assert_eq!(
            BorrowingRequest::Pending(pending).status(),
            BorrowRequestStatus::Pending
        );
    }

    #[test]
    fn test_accept_links_borrowing() {
        let now = Utc::now();
        let (pending, _) = submit_request(MemberId::new(), BookId::new(), now);
        let borrowing_id = BorrowingId::new();

        let (accepted, event) =
            accept_request(pending, borrowing_id, StaffId::new(), now + Duration::hours(1));

        assert_eq!(accepted.borrowing_id, borrowing_id);
        assert_eq!(event.borrowing_id, borrowing_id);
        assert_eq!(accepted.updated_at, now + Duration::hours(1));
    }

    #[test]
    fn test_processed_request_is_terminal() {
        let now = Utc::now();
        let (pending, _) = submit_request(MemberId::new(), BookId::new(), now);
        let (rejected, _) =
            reject_request(BorrowingRequest::Pending(pending), StaffId::new(), now).unwrap();

        let again = BorrowingRequest::Rejected(rejected);
        assert_eq!(
            again.clone().into_pending().unwrap_err(),
            ProcessBorrowRequestError::NotPending(BorrowRequestStatus::Rejected)
        );
        assert!(reject_request(again, StaffId::new(), now).is_err());
    }

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!(
            "ACCEPT".parse::<BorrowRequestAction>(),
            Ok(BorrowRequestAction::Accept)
        );
        assert_eq!(
            "reject".parse::<BorrowRequestAction>(),
            Ok(BorrowRequestAction::Reject)
        );
        assert!("approve".parse::<BorrowRequestAction>().is_err());
    }

    #[test]
    fn test_replay_events() {
        let now = Utc::now();
        let (pending, requested) = submit_request(MemberId::new(), BookId::new(), now);
        let (accepted, accepted_event) =
            accept_request(pending, BorrowingId::new(), StaffId::new(), now);

        let events = vec![
            DomainEvent::BorrowRequested(requested),
            DomainEvent::BorrowRequestAccepted(accepted_event),
        ];

        assert_eq!(
            replay_events(&events),
            Some(BorrowingRequest::Accepted(accepted))
        );
    }
}
