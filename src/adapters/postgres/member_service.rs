use crate::domain::Membership;
use crate::domain::value_objects::{MemberId, MembershipType};
use crate::ports::member_service::{MemberService as MemberServiceTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// 会員テーブルに対するMemberServiceのPostgreSQL実装
///
/// 会員資格の3列（membership_type, start_date, end_date）はすべて設定されているか、
/// すべてNULLのどちらか。
pub struct MemberService {
    pool: PgPool,
}

impl MemberService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberServiceTrait for MemberService {
    async fn exists(&self, member_id: MemberId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE member_id = $1)")
                .bind(member_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn get_membership(&self, member_id: MemberId) -> Result<Option<Membership>> {
        let row = sqlx::query(
            r#"
            SELECT membership_type, start_date, end_date
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let membership_type: Option<String> = row.get("membership_type");
        let start_date: Option<DateTime<Utc>> = row.get("start_date");
        let end_date: Option<DateTime<Utc>> = row.get("end_date");

        match (membership_type, start_date, end_date) {
            (Some(plan), Some(start), Some(end)) => {
                let plan = MembershipType::resolve(Some(&plan));
                let membership = Membership::new(plan, start, end).map_err(|_| {
                    format!("Invalid membership period for member {}", member_id.value())
                })?;
                Ok(Some(membership))
            }
            _ => Ok(None),
        }
    }

    async fn update_membership(&self, member_id: MemberId, membership: Membership) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET membership_type = $2, start_date = $3, end_date = $4
            WHERE member_id = $1
            "#,
        )
        .bind(member_id.value())
        .bind(membership.membership_type.as_str())
        .bind(membership.start_date)
        .bind(membership.end_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("Member not found: {}", member_id.value()).into());
        }
        Ok(())
    }
}
