use crate::domain::value_objects::{Fine, MemberId};
use async_trait::async_trait;
use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知サービスポート
///
/// 会員・職員への通知配信メカニズムを抽象化する。
/// 配信した通知は`NotificationFeed`から参照できる。
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// 返却期限が近いことを会員に通知する
    async fn send_due_date_reminder(
        &self,
        member_id: MemberId,
        book_title: &str,
        due_date: NaiveDate,
    ) -> Result<()>;

    /// 延滞を会員に通知する
    async fn send_overdue_notification(
        &self,
        member_id: MemberId,
        book_title: &str,
        due_date: NaiveDate,
        fine: Fine,
    ) -> Result<()>;

    /// 更新申請の受付を職員に通知する
    async fn send_renewal_submitted(&self, member_id: MemberId) -> Result<()>;

    /// 更新申請の処理結果を会員に通知する
    async fn send_renewal_decision(&self, member_id: MemberId, approved: bool) -> Result<()>;

    /// 延滞料金の支払い確認を会員に通知する
    async fn send_fine_payment_confirmation(
        &self,
        member_id: MemberId,
        book_title: &str,
        amount: Fine,
    ) -> Result<()>;

    /// 貸出申請の受付を職員に通知する
    async fn send_borrow_request_submitted(&self, member_id: MemberId, book_title: &str)
    -> Result<()>;

    /// 貸出申請の処理結果を会員に通知する
    async fn send_borrow_request_decision(
        &self,
        member_id: MemberId,
        book_title: &str,
        accepted: bool,
    ) -> Result<()>;
}
