use crate::domain::value_objects::{BookId, BorrowingId, Fine, MemberId, MembershipType};
use crate::ports::borrowing_read_model::{
    BorrowingReadModel as BorrowingReadModelTrait, BorrowingStatus, BorrowingView, Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

const SELECT_COLUMNS: &str = r#"
    SELECT
        borrowing_id,
        book_id,
        member_id,
        membership_type,
        borrowed_at,
        expected_return_date,
        returned_at,
        fine_paid,
        status,
        created_at,
        updated_at
    FROM borrowings_view
"#;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// PostgreSQLの行データをBorrowingViewに変換する
///
/// fine_paidのi64からFineへの変換と、文字列からのステータス・プランの変換で
/// エラーハンドリングを行う。
fn map_row_to_borrowing_view(row: &PgRow) -> Result<BorrowingView> {
    let fine_paid: i64 = row.get("fine_paid");
    let fine_paid = u64::try_from(fine_paid)
        .map(Fine::new)
        .map_err(|_| invalid_data(format!("fine_paid out of range: {}", fine_paid)))?;

    let status_str: &str = row.get("status");
    let status = BorrowingStatus::from_str(status_str).map_err(invalid_data)?;

    let membership_type_str: &str = row.get("membership_type");
    let membership_type = MembershipType::from_str(membership_type_str).map_err(invalid_data)?;

    Ok(BorrowingView {
        borrowing_id: BorrowingId::from_uuid(row.get("borrowing_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        membership_type,
        borrowed_at: row.get("borrowed_at"),
        expected_return_date: row.get("expected_return_date"),
        returned_at: row.get("returned_at"),
        fine_paid,
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// BorrowingReadModelのPostgreSQL実装
pub struct BorrowingReadModel {
    pool: PgPool,
}

impl BorrowingReadModel {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowingReadModelTrait for BorrowingReadModel {
    /// 貸出ビューを保存（upsert）
    ///
    /// INSERT ... ON CONFLICT UPDATEで冪等に保存する。
    /// Read Modelの再構築で同じビューを何度保存しても結果は変わらない。
    async fn save(&self, view: BorrowingView) -> Result<()> {
        let fine_paid = i64::try_from(view.fine_paid.value())
            .map_err(|_| invalid_data(format!("fine_paid out of range: {}", view.fine_paid.value())))?;

        sqlx::query(
            r#"
            INSERT INTO borrowings_view (
                borrowing_id,
                book_id,
                member_id,
                membership_type,
                borrowed_at,
                expected_return_date,
                returned_at,
                fine_paid,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (borrowing_id)
            DO UPDATE SET
                book_id = EXCLUDED.book_id,
                member_id = EXCLUDED.member_id,
                membership_type = EXCLUDED.membership_type,
                borrowed_at = EXCLUDED.borrowed_at,
                expected_return_date = EXCLUDED.expected_return_date,
                returned_at = EXCLUDED.returned_at,
                fine_paid = EXCLUDED.fine_paid,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(view.borrowing_id.value())
        .bind(view.book_id.value())
        .bind(view.member_id.value())
        .bind(view.membership_type.as_str())
        .bind(view.borrowed_at)
        .bind(view.expected_return_date)
        .bind(view.returned_at)
        .bind(fine_paid)
        .bind(view.status.as_str())
        .bind(view.created_at)
        .bind(view.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<BorrowingView>> {
        let query = format!("{SELECT_COLUMNS} WHERE borrowing_id = $1");
        let row = sqlx::query(&query)
            .bind(borrowing_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_borrowing_view).transpose()
    }

    /// (member_id, status)の部分インデックスを使用する
    async fn find_active_by_member(&self, member_id: MemberId) -> Result<Vec<BorrowingView>> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE member_id = $1 AND status = 'active' ORDER BY borrowed_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(member_id.value())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_borrowing_view).collect()
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<BorrowingView>> {
        let query = format!("{SELECT_COLUMNS} WHERE member_id = $1 ORDER BY borrowed_at DESC");
        let rows = sqlx::query(&query)
            .bind(member_id.value())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_borrowing_view).collect()
    }

    async fn find_overdue_candidates(&self, as_of: NaiveDate) -> Result<Vec<BorrowingView>> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE status = 'active' AND expected_return_date < $1 \
             ORDER BY expected_return_date ASC, borrowed_at ASC"
        );
        let rows = sqlx::query(&query)
            .bind(as_of)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_borrowing_view).collect()
    }

    async fn find_due_on(&self, date: NaiveDate) -> Result<Vec<BorrowingView>> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE status = 'active' AND expected_return_date = $1 \
             ORDER BY borrowed_at ASC"
        );
        let rows = sqlx::query(&query)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_borrowing_view).collect()
    }
}
