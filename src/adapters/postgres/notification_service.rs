use crate::domain::notification::{self, Audience, Notification, NotificationKind, Recipient};
use crate::domain::value_objects::{Fine, MemberId, NotificationId};
use crate::ports::notification_feed::NotificationFeed;
use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

const SELECT_COLUMNS: &str = r#"
    SELECT
        notification_id,
        audience,
        member_id,
        kind,
        message,
        is_read,
        created_at
    FROM notifications
"#;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

fn map_row_to_notification(row: &PgRow) -> Result<Notification> {
    let audience_str: &str = row.get("audience");
    let kind_str: &str = row.get("kind");

    Ok(Notification {
        notification_id: NotificationId::from_uuid(row.get("notification_id")),
        audience: Audience::from_str(audience_str).map_err(invalid_data)?,
        member_id: MemberId::from_uuid(row.get("member_id")),
        kind: NotificationKind::from_str(kind_str).map_err(invalid_data)?,
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}

/// 宛先に対応するWHERE句と束縛する会員ID
fn recipient_filter(recipient: Recipient) -> (&'static str, Option<uuid::Uuid>) {
    match recipient {
        Recipient::Staff => ("audience = 'staff'", None),
        Recipient::Member(member_id) => (
            "audience = 'member' AND member_id = $1",
            Some(member_id.value()),
        ),
    }
}

/// 通知をnotificationsテーブルに保存するNotificationServiceの実装
///
/// 外部への配信は行わず、保存した通知はフィードとして参照される。
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn store(&self, entry: Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                notification_id,
                audience,
                member_id,
                kind,
                message,
                is_read,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.notification_id.value())
        .bind(entry.audience.as_str())
        .bind(entry.member_id.value())
        .bind(entry.kind.as_str())
        .bind(&entry.message)
        .bind(entry.is_read)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            notification_id = %entry.notification_id.value(),
            kind = entry.kind.as_str(),
            "Notification stored"
        );
        Ok(())
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn send_due_date_reminder(
        &self,
        member_id: MemberId,
        book_title: &str,
        due_date: NaiveDate,
    ) -> Result<()> {
        self.store(notification::due_date_reminder(
            member_id,
            book_title,
            due_date,
            Utc::now(),
        ))
        .await
    }

    async fn send_overdue_notification(
        &self,
        member_id: MemberId,
        book_title: &str,
        due_date: NaiveDate,
        fine: Fine,
    ) -> Result<()> {
        self.store(notification::overdue(
            member_id,
            book_title,
            due_date,
            fine,
            Utc::now(),
        ))
        .await
    }

    async fn send_renewal_submitted(&self, member_id: MemberId) -> Result<()> {
        self.store(notification::renewal_submitted(member_id, Utc::now()))
            .await
    }

    async fn send_renewal_decision(&self, member_id: MemberId, approved: bool) -> Result<()> {
        self.store(notification::renewal_decision(member_id, approved, Utc::now()))
            .await
    }

    async fn send_fine_payment_confirmation(
        &self,
        member_id: MemberId,
        book_title: &str,
        amount: Fine,
    ) -> Result<()> {
        self.store(notification::fine_payment(
            member_id,
            book_title,
            amount,
            Utc::now(),
        ))
        .await
    }

    async fn send_borrow_request_submitted(
        &self,
        member_id: MemberId,
        book_title: &str,
    ) -> Result<()> {
        self.store(notification::borrow_request_submitted(
            member_id,
            book_title,
            Utc::now(),
        ))
        .await
    }

    async fn send_borrow_request_decision(
        &self,
        member_id: MemberId,
        book_title: &str,
        accepted: bool,
    ) -> Result<()> {
        self.store(notification::borrow_request_decision(
            member_id,
            book_title,
            accepted,
            Utc::now(),
        ))
        .await
    }
}

#[async_trait]
impl NotificationFeed for NotificationService {
    async fn list_for(&self, recipient: Recipient) -> Result<Vec<Notification>> {
        let (filter, member_id) = recipient_filter(recipient);
        let query = format!("{SELECT_COLUMNS} WHERE {filter} ORDER BY created_at DESC");

        let mut q = sqlx::query(&query);
        if let Some(member_id) = member_id {
            q = q.bind(member_id);
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.iter().map(map_row_to_notification).collect()
    }

    async fn mark_all_read(&self, recipient: Recipient) -> Result<u64> {
        let (filter, member_id) = recipient_filter(recipient);
        let query = format!("UPDATE notifications SET is_read = TRUE WHERE {filter} AND NOT is_read");

        let mut q = sqlx::query(&query);
        if let Some(member_id) = member_id {
            q = q.bind(member_id);
        }
        let result = q.execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
