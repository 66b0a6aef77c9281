use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 1日あたりの延滞料金（通貨単位）
pub const FINE_PER_DAY: u64 = 10;

/// 貸出記録ID - 貸出管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowingId(Uuid);

impl BorrowingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BorrowingId {
    fn default() -> Self {
        Self::new()
    }
}

/// 更新申請ID - 会員資格更新申請の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenewalRequestId(Uuid);

impl RenewalRequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for RenewalRequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// 貸出申請ID - 会員からの貸出申請の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowingRequestId(Uuid);

impl BorrowingRequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BorrowingRequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通知ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

/// 書籍ID - カタログ管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 会員ID - 会員管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

/// 職員ID - 司書・管理者への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(Uuid);

impl StaffId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for StaffId {
    fn default() -> Self {
        Self::new()
    }
}

/// 会員プラン
///
/// 貸出期間・貸出上限・更新時の延長期間はすべてプランから決まる。
/// プランが不明な場合は常に`Basic`として扱う（`Default`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipType {
    #[default]
    Basic,
    Premium,
}

impl MembershipType {
    /// 貸出期間（日数）
    pub fn loan_period_days(&self) -> i64 {
        match self {
            MembershipType::Basic => 15,
            MembershipType::Premium => 30,
        }
    }

    /// 同時に借りられる冊数の上限
    pub fn borrowing_limit(&self) -> usize {
        match self {
            MembershipType::Basic => 3,
            MembershipType::Premium => 5,
        }
    }

    /// 更新承認時に付与される会員期間（日数）
    pub fn renewal_period_days(&self) -> i64 {
        match self {
            MembershipType::Basic => 90,
            MembershipType::Premium => 180,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Basic => "BASIC",
            MembershipType::Premium => "PREMIUM",
        }
    }

    /// 外部から渡されたプラン名を解決する
    ///
    /// 未設定・未知の値は`Basic`になる。
    pub fn resolve(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl std::str::FromStr for MembershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("BASIC") {
            Ok(MembershipType::Basic)
        } else if s.eq_ignore_ascii_case("PREMIUM") {
            Ok(MembershipType::Premium)
        } else {
            Err(format!("Invalid membership type: {}", s))
        }
    }
}

/// 延滞料金（通貨単位、非負）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fine(u64);

impl Fine {
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// 延滞日数から料金を求める
    pub fn for_overdue_days(days: u32) -> Self {
        Self(u64::from(days) * FINE_PER_DAY)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, other: Fine) -> Fine {
        Fine(self.0.saturating_sub(other.0))
    }
}

impl std::ops::Add for Fine {
    type Output = Fine;

    fn add(self, rhs: Fine) -> Fine {
        Fine(self.0 + rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_period_by_plan() {
        assert_eq!(MembershipType::Basic.loan_period_days(), 15);
        assert_eq!(MembershipType::Premium.loan_period_days(), 30);
    }

    #[test]
    fn test_premium_grants_larger_limit() {
        assert!(MembershipType::Premium.borrowing_limit() > MembershipType::Basic.borrowing_limit());
    }

    #[test]
    fn test_membership_type_parse_is_case_insensitive() {
        assert_eq!("premium".parse::<MembershipType>(), Ok(MembershipType::Premium));
        assert_eq!("Basic".parse::<MembershipType>(), Ok(MembershipType::Basic));
        assert!("GOLD".parse::<MembershipType>().is_err());
    }

    #[test]
    fn test_unknown_or_absent_plan_resolves_to_basic() {
        assert_eq!(MembershipType::resolve(None), MembershipType::Basic);
        assert_eq!(MembershipType::resolve(Some("GOLD")), MembershipType::Basic);
        assert_eq!(MembershipType::resolve(Some("PREMIUM")), MembershipType::Premium);
    }

    #[test]
    fn test_membership_type_serializes_uppercase() {
        let json = serde_json::to_string(&MembershipType::Premium).unwrap();
        assert_eq!(json, "\"PREMIUM\"");
    }

    #[test]
    fn test_fine_for_overdue_days() {
        assert_eq!(Fine::for_overdue_days(0), Fine::zero());
        assert_eq!(Fine::for_overdue_days(4).value(), 40);
    }

    #[test]
    fn test_fine_saturating_sub() {
        assert_eq!(Fine::new(30).saturating_sub(Fine::new(50)), Fine::zero());
        assert_eq!(Fine::new(50).saturating_sub(Fine::new(30)), Fine::new(20));
    }

    #[test]
    fn test_borrowing_id_creation() {
        let id1 = BorrowingId::new();
        let id2 = BorrowingId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_member_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = MemberId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }
}
