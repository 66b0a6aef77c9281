use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    DomainEvent, MemberId, Membership, MembershipType, ProcessRenewalError, RenewalApproved,
    RenewalRejected, RenewalRequestId, RenewalRequested, StaffId,
};

/// 更新申請のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenewalStatus {
    /// 承認待ち（初期状態）
    Pending,
    /// 承認済み（終端）
    Approved,
    /// 却下（終端）
    Rejected,
}

impl RenewalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenewalStatus::Pending => "pending",
            RenewalStatus::Approved => "approved",
            RenewalStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for RenewalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RenewalStatus::Pending),
            "approved" => Ok(RenewalStatus::Approved),
            "rejected" => Ok(RenewalStatus::Rejected),
            _ => Err(format!("Invalid renewal status: {}", s)),
        }
    }
}

/// 職員による処理内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenewalAction {
    Approve,
    Reject,
}

impl std::str::FromStr for RenewalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("approve") {
            Ok(RenewalAction::Approve)
        } else if s.eq_ignore_ascii_case("reject") {
            Ok(RenewalAction::Reject)
        } else {
            Err(format!("Invalid action: {} (must be APPROVE or REJECT)", s))
        }
    }
}

/// RenewalRequest集約の共通フィールド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalCore {
    pub request_id: RenewalRequestId,
    pub member_id: MemberId,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 承認待ち状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRenewal {
    #[serde(flatten)]
    pub core: RenewalCore,
}

impl std::ops::Deref for PendingRenewal {
    type Target = RenewalCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 承認済み状態
///
/// 承認によって付与された会員期間を保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedRenewal {
    #[serde(flatten)]
    pub core: RenewalCore,
    pub processed_by: StaffId,
    pub processed_at: DateTime<Utc>,
    pub membership: Membership,
}

impl std::ops::Deref for ApprovedRenewal {
    type Target = RenewalCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 却下状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRenewal {
    #[serde(flatten)]
    pub core: RenewalCore,
    pub processed_by: StaffId,
    pub processed_at: DateTime<Utc>,
}

impl std::ops::Deref for RejectedRenewal {
    type Target = RenewalCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// RenewalRequest集約の統合型
///
/// 状態遷移：Pending → Approved | Rejected（どちらも終端）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum RenewalRequest {
    Pending(PendingRenewal),
    Approved(ApprovedRenewal),
    Rejected(RejectedRenewal),
}

impl RenewalRequest {
    pub fn core(&self) -> &RenewalCore {
        match self {
            RenewalRequest::Pending(p) => &p.core,
            RenewalRequest::Approved(a) => &a.core,
            RenewalRequest::Rejected(r) => &r.core,
        }
    }

    pub fn status(&self) -> RenewalStatus {
        match self {
            RenewalRequest::Pending(_) => RenewalStatus::Pending,
            RenewalRequest::Approved(_) => RenewalStatus::Approved,
            RenewalRequest::Rejected(_) => RenewalStatus::Rejected,
        }
    }

    fn into_pending(self) -> Result<PendingRenewal, ProcessRenewalError> {
        match self {
            RenewalRequest::Pending(pending) => Ok(pending),
            other => Err(ProcessRenewalError::NotPending(other.status())),
        }
    }
}

/// 純粋関数：会員資格の更新を申請する
///
/// 同一会員の承認待ち申請が既にあるかどうかはアプリケーション層で確認する。
pub fn request_renewal(
    member_id: MemberId,
    requested_at: DateTime<Utc>,
) -> (PendingRenewal, RenewalRequested) {
    let request_id = RenewalRequestId::new();

    let pending = PendingRenewal {
        core: RenewalCore {
            request_id,
            member_id,
            requested_at,
            updated_at: requested_at,
        },
    };

    let event = RenewalRequested {
        request_id,
        member_id,
        requested_at,
    };

    (pending, event)
}

/// 純粋関数：更新申請を承認する
///
/// ビジネスルール：
/// - Pendingのみ承認可能
/// - 新しい会員期間は承認日から開始し、BASICは90日、PREMIUMは180日
pub fn approve_renewal(
    request: RenewalRequest,
    membership_type: MembershipType,
    staff_id: StaffId,
    processed_at: DateTime<Utc>,
) -> Result<(ApprovedRenewal, RenewalApproved), ProcessRenewalError> {
    let pending = request.into_pending()?;
    let membership = Membership::starting(membership_type, processed_at);

    let event = RenewalApproved {
        request_id: pending.request_id,
        member_id: pending.member_id,
        approved_by: staff_id,
        processed_at,
        membership,
    };

    let approved = ApprovedRenewal {
        core: RenewalCore {
            updated_at: processed_at,
            ..pending.core
        },
        processed_by: staff_id,
        processed_at,
        membership,
    };

    Ok((approved, event))
}

/// 純粋関数：更新申請を却下する
pub fn reject_renewal(
    request: RenewalRequest,
    staff_id: StaffId,
    processed_at: DateTime<Utc>,
) -> Result<(RejectedRenewal, RenewalRejected), ProcessRenewalError> {
    let pending = request.into_pending()?;

    let event = RenewalRejected {
        request_id: pending.request_id,
        member_id: pending.member_id,
        rejected_by: staff_id,
        processed_at,
    };

    let rejected = RejectedRenewal {
        core: RenewalCore {
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
/// 不正な状態遷移（例: Approved状態への却下）の場合
pub fn apply_event(request: Option<RenewalRequest>, event: &DomainEvent) -> RenewalRequest {
    match (request, event) {
        (None, DomainEvent::RenewalRequested(e)) => RenewalRequest::Pending(PendingRenewal {
            core: RenewalCore {
                request_id: e.request_id,
                member_id: e.member_id,
                requested_at: e.requested_at,
                updated_at: e.requested_at,
            },
        }),

        (Some(RenewalRequest::Pending(pending)), DomainEvent::RenewalApproved(e)) => {
            assert_eq!(
                pending.request_id, e.request_id,
                "RenewalApproved request_id does not match current request"
            );
            RenewalRequest::Approved(ApprovedRenewal {
                core: RenewalCore {
                    updated_at: e.processed_at,
                    ..pending.core
                },
                processed_by: e.approved_by,
                processed_at: e.processed_at,
                membership: e.membership,
            })
        }

        (Some(RenewalRequest::Pending(pending)), DomainEvent::RenewalRejected(e)) => {
            assert_eq!(
                pending.request_id, e.request_id,
                "RenewalRejected request_id does not match current request"
            );
            RenewalRequest::Rejected(RejectedRenewal {
                core: RenewalCore {
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
pub fn replay_events(events: &[DomainEvent]) -> Option<RenewalRequest> {
    events
        .iter()
        .fold(None, |request, event| Some(apply_event(request, event)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_request_renewal_starts_pending() {
        let member_id = MemberId::new();
        let now = Utc::now();
        let (pending, event) = request_renewal(member_id, now);

        assert_eq!(pending.member_id, member_id);
        assert_eq!(pending.requested_at, now);
        assert_eq!(event.request_id, pending.request_id);
        assert_eq!(RenewalRequest::Pending(pending).status(), RenewalStatus::Pending);
    }

    #[test]
    fn test_approve_renewal_grants_plan_period() {
        let now = Utc::now();
        let (pending, _) = request_renewal(MemberId::new(), now);
        let processed_at = now + Duration::days(1);

        let (approved, event) = approve_renewal(
            RenewalRequest::Pending(pending),
            MembershipType::Premium,
            StaffId::new(),
            processed_at,
        )
        .unwrap();

        assert_eq!(approved.membership.start_date, processed_at);
        assert_eq!(approved.membership.end_date, processed_at + Duration::days(180));
        assert_eq!(event.membership, approved.membership);
    }

    #[test]
    fn test_reject_renewal() {
        let now = Utc::now();
        let staff_id = StaffId::new();
        let (pending, _) = request_renewal(MemberId::new(), now);

        let (rejected, event) =
            reject_renewal(RenewalRequest::Pending(pending), staff_id, now).unwrap();

        assert_eq!(rejected.processed_by, staff_id);
        assert_eq!(event.rejected_by, staff_id);
    }

    #[test]
    fn test_processed_request_cannot_be_processed_again() {
        let now = Utc::now();
        let (pending, _) = request_renewal(MemberId::new(), now);
        let (approved, _) = approve_renewal(
            RenewalRequest::Pending(pending),
            MembershipType::Basic,
            StaffId::new(),
            now,
        )
        .unwrap();

        let result = reject_renewal(RenewalRequest::Approved(approved.clone()), StaffId::new(), now);
        assert_eq!(
            result.unwrap_err(),
            ProcessRenewalError::NotPending(RenewalStatus::Approved)
        );

        let result = approve_renewal(
            RenewalRequest::Approved(approved),
            MembershipType::Basic,
            StaffId::new(),
            now,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejected_request_is_terminal() {
        let now = Utc::now();
        let (pending, _) = request_renewal(MemberId::new(), now);
        let (rejected, _) =
            reject_renewal(RenewalRequest::Pending(pending), StaffId::new(), now).unwrap();

        let result = approve_renewal(
            RenewalRequest::Rejected(rejected),
            MembershipType::Basic,
            StaffId::new(),
            now,
        );
        assert_eq!(
            result.unwrap_err(),
            ProcessRenewalError::NotPending(RenewalStatus::Rejected)
        );
    }

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!("APPROVE".parse::<RenewalAction>(), Ok(RenewalAction::Approve));
        assert_eq!("reject".parse::<RenewalAction>(), Ok(RenewalAction::Reject));
        assert!("cancel".parse::<RenewalAction>().is_err());
    }

    #[test]
    fn test_replay_events() {
        let now = Utc::now();
        let (pending, requested) = request_renewal(MemberId::new(), now);
        let (approved, approved_event) = approve_renewal(
            RenewalRequest::Pending(pending),
            MembershipType::Basic,
            StaffId::new(),
            now + Duration::hours(2),
        )
        .unwrap();

        let events = vec![
            DomainEvent::RenewalRequested(requested),
            DomainEvent::RenewalApproved(approved_event),
        ];

        let replayed = replay_events(&events).unwrap();
        assert_eq!(replayed, RenewalRequest::Approved(approved));
    }
}
