use crate::domain::Membership;
use crate::domain::value_objects::MemberId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員サービスポート
///
/// 貸出コンテキストと会員コンテキストの境界を維持する。
/// 貸出コンテキストはMemberIDと会員資格のみを知り、会員詳細は知らない。
#[async_trait]
pub trait MemberService: Send + Sync {
    /// 会員が存在するか確認する
    async fn exists(&self, member_id: MemberId) -> Result<bool>;

    /// 会員資格を取得する
    ///
    /// 会員資格が未設定の会員は`None`。
    async fn get_membership(&self, member_id: MemberId) -> Result<Option<Membership>>;

    /// 会員資格を更新する
    ///
    /// 更新申請の承認時に呼ばれる。
    async fn update_membership(&self, member_id: MemberId, membership: Membership) -> Result<()>;
}
