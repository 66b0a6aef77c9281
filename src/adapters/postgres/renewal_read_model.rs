use crate::domain::RenewalStatus;
use crate::domain::value_objects::{MemberId, RenewalRequestId, StaffId};
use crate::ports::renewal_read_model::{
    RenewalReadModel as RenewalReadModelTrait, RenewalView, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT
        request_id,
        member_id,
        status,
        requested_at,
        processed_at,
        processed_by,
        updated_at
    FROM renewals_view
"#;

fn map_row_to_renewal_view(row: &PgRow) -> Result<RenewalView> {
    let status_str: &str = row.get("status");
    let status = RenewalStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;
    let processed_by: Option<Uuid> = row.get("processed_by");

    Ok(RenewalView {
        request_id: RenewalRequestId::from_uuid(row.get("request_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        status,
        requested_at: row.get("requested_at"),
        processed_at: row.get("processed_at"),
        processed_by: processed_by.map(StaffId::from_uuid),
        updated_at: row.get("updated_at"),
    })
}

/// RenewalReadModelのPostgreSQL実装
///
/// 会員ごとの承認待ち申請はrenewals_viewの部分ユニークインデックスで
/// 一意性が保証され、`insert_pending`はその制約を使って登録する。
pub struct RenewalReadModel {
    pool: PgPool,
}

impl RenewalReadModel {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RenewalReadModelTrait for RenewalReadModel {
    async fn save(&self, view: RenewalView) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO renewals_view (
                request_id,
                member_id,
                status,
                requested_at,
                processed_at,
                processed_by,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (request_id)
            DO UPDATE SET
                member_id = EXCLUDED.member_id,
                status = EXCLUDED.status,
                requested_at = EXCLUDED.requested_at,
                processed_at = EXCLUDED.processed_at,
                processed_by = EXCLUDED.processed_by,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(view.request_id.value())
        .bind(view.member_id.value())
        .bind(view.status.as_str())
        .bind(view.requested_at)
        .bind(view.processed_at)
        .bind(view.processed_by.map(|s| s.value()))
        .bind(view.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_pending(&self, view: RenewalView) -> Result<bool> {
        // 部分ユニークインデックスとの競合は挿入せずに0行を返す
        let result = sqlx::query(
            r#"
            INSERT INTO renewals_view (
                request_id,
                member_id,
                status,
                requested_at,
                processed_at,
                processed_by,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (member_id) WHERE status = 'pending'
            DO NOTHING
            "#,
        )
        .bind(view.request_id.value())
        .bind(view.member_id.value())
        .bind(view.status.as_str())
        .bind(view.requested_at)
        .bind(view.processed_at)
        .bind(view.processed_by.map(|s| s.value()))
        .bind(view.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, request_id: RenewalRequestId) -> Result<()> {
        sqlx::query("DELETE FROM renewals_view WHERE request_id = $1")
            .bind(request_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_by_id(&self, request_id: RenewalRequestId) -> Result<Option<RenewalView>> {
        let query = format!("{SELECT_COLUMNS} WHERE request_id = $1");
        let row = sqlx::query(&query)
            .bind(request_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_renewal_view).transpose()
    }

    async fn find_pending(&self) -> Result<Vec<RenewalView>> {
        let query = format!("{SELECT_COLUMNS} WHERE status = 'pending' ORDER BY requested_at ASC");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(map_row_to_renewal_view).collect()
    }

    async fn find_pending_by_member(&self, member_id: MemberId) -> Result<Option<RenewalView>> {
        let query = format!("{SELECT_COLUMNS} WHERE member_id = $1 AND status = 'pending'");
        let row = sqlx::query(&query)
            .bind(member_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_renewal_view).transpose()
    }
}
