use crate::domain::BorrowRequestStatus;
use crate::domain::value_objects::{BookId, BorrowingId, BorrowingRequestId, MemberId, StaffId};
use crate::ports::borrowing_request_read_model::{
    BorrowingRequestReadModel as BorrowingRequestReadModelTrait, BorrowingRequestView, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT
        request_id,
        member_id,
        book_id,
        status,
        requested_at,
        borrowing_id,
        processed_at,
        processed_by,
        updated_at
    FROM borrowing_requests_view
"#;

fn map_row_to_request_view(row: &PgRow) -> Result<BorrowingRequestView> {
    let status_str: &str = row.get("status");
    let status = BorrowRequestStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;
    let borrowing_id: Option<Uuid> = row.get("borrowing_id");
    let processed_by: Option<Uuid> = row.get("processed_by");

    Ok(BorrowingRequestView {
        request_id: BorrowingRequestId::from_uuid(row.get("request_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        status,
        requested_at: row.get("requested_at"),
        borrowing_id: borrowing_id.map(BorrowingId::from_uuid),
        processed_at: row.get("processed_at"),
        processed_by: processed_by.map(StaffId::from_uuid),
        updated_at: row.get("updated_at"),
    })
}

/// BorrowingRequestReadModelのPostgreSQL実装
///
/// 会員・書籍ごとの承認待ち申請は部分ユニークインデックスで一意。
pub struct BorrowingRequestReadModel {
    pool: PgPool,
}

impl BorrowingRequestReadModel {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowingRequestReadModelTrait for BorrowingRequestReadModel {
    async fn save(&self, view: BorrowingRequestView) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO borrowing_requests_view (
                request_id,
                member_id,
                book_id,
                status,
                requested_at,
                borrowing_id,
                processed_at,
                processed_by,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (request_id)
            DO UPDATE SET
                member_id = EXCLUDED.member_id,
                book_id = EXCLUDED.book_id,
                status = EXCLUDED.status,
                requested_at = EXCLUDED.requested_at,
                borrowing_id = EXCLUDED.borrowing_id,
                processed_at = EXCLUDED.processed_at,
                processed_by = EXCLUDED.processed_by,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(view.request_id.value())
        .bind(view.member_id.value())
        .bind(view.book_id.value())
        .bind(view.status.as_str())
        .bind(view.requested_at)
        .bind(view.borrowing_id.map(|b| b.value()))
        .bind(view.processed_at)
        .bind(view.processed_by.map(|s| s.value()))
        .bind(view.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_pending(&self, view: BorrowingRequestView) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO borrowing_requests_view (
                request_id,
                member_id,
                book_id,
                status,
                requested_at,
                borrowing_id,
                processed_at,
                processed_by,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (member_id, book_id) WHERE status = 'pending'
            DO NOTHING
            "#,
        )
        .bind(view.request_id.value())
        .bind(view.member_id.value())
        .bind(view.book_id.value())
        .bind(view.status.as_str())
        .bind(view.requested_at)
        .bind(view.borrowing_id.map(|b| b.value()))
        .bind(view.processed_at)
        .bind(view.processed_by.map(|s| s.value()))
        .bind(view.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, request_id: BorrowingRequestId) -> Result<()> {
        sqlx::query("DELETE FROM borrowing_requests_view WHERE request_id = $1")
            .bind(request_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_by_id(
        &self,
        request_id: BorrowingRequestId,
    ) -> Result<Option<BorrowingRequestView>> {
        let query = format!("{SELECT_COLUMNS} WHERE request_id = $1");
        let row = sqlx::query(&query)
            .bind(request_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_request_view).transpose()
    }

    async fn find_pending(&self) -> Result<Vec<BorrowingRequestView>> {
        let query = format!("{SELECT_COLUMNS} WHERE status = 'pending' ORDER BY requested_at ASC");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(map_row_to_request_view).collect()
    }

    async fn find_pending_by_member(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<BorrowingRequestView>> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE member_id = $1 AND status = 'pending' ORDER BY requested_at ASC"
        );
        let rows = sqlx::query(&query)
            .bind(member_id.value())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_request_view).collect()
    }
}
