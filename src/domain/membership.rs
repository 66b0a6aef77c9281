use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{MembershipError, MembershipType};

/// 会員資格
///
/// 不変条件：end_date > start_date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub membership_type: MembershipType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        membership_type: MembershipType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, MembershipError> {
        if end_date <= start_date {
            return Err(MembershipError::InvalidPeriod);
        }
        Ok(Self {
            membership_type,
            start_date,
            end_date,
        })
    }

    /// プランの更新期間で新しい会員資格を開始する
    pub fn starting(membership_type: MembershipType, start_date: DateTime<Utc>) -> Self {
        Self {
            membership_type,
            start_date,
            end_date: start_date + Duration::days(membership_type.renewal_period_days()),
        }
    }

    /// 有効期間内か（両端を含む）
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    /// 同じプランで`now`から更新した会員資格
    pub fn renewed(&self, now: DateTime<Utc>) -> Self {
        Self::starting(self.membership_type, now)
    }
}
