use crate::domain::value_objects::{BorrowingId, MemberId};
use crate::ports::borrowing_read_model::{
    BorrowingReadModel as BorrowingReadModelTrait, BorrowingStatus, BorrowingView, Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of BorrowingReadModel
///
/// Query ordering matches the PostgreSQL implementation.
pub struct BorrowingReadModel {
    views: Mutex<HashMap<BorrowingId, BorrowingView>>,
}

impl BorrowingReadModel {
    pub fn new() -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
        }
    }

    fn select(
        &self,
        predicate: impl Fn(&BorrowingView) -> bool,
    ) -> Result<Vec<BorrowingView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        Ok(views.values().filter(|v| predicate(v)).cloned().collect())
    }
}

impl Default for BorrowingReadModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BorrowingReadModelTrait for BorrowingReadModel {
    async fn save(&self, view: BorrowingView) -> Result<()> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        views.insert(view.borrowing_id, view);
        Ok(())
    }

    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<BorrowingView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        Ok(views.get(&borrowing_id).cloned())
    }

    async fn find_active_by_member(&self, member_id: MemberId) -> Result<Vec<BorrowingView>> {
        let mut found = self
            .select(|v| v.member_id == member_id && v.status == BorrowingStatus::Active)?;
        found.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        Ok(found)
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<BorrowingView>> {
        let mut found = self.select(|v| v.member_id == member_id)?;
        found.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        Ok(found)
    }

    async fn find_overdue_candidates(&self, as_of: NaiveDate) -> Result<Vec<BorrowingView>> {
        let mut found = self
            .select(|v| v.status == BorrowingStatus::Active && v.expected_return_date < as_of)?;
        found.sort_by_key(|v| (v.expected_return_date, v.borrowed_at));
        Ok(found)
    }

    async fn find_due_on(&self, date: NaiveDate) -> Result<Vec<BorrowingView>> {
        let mut found = self
            .select(|v| v.status == BorrowingStatus::Active && v.expected_return_date == date)?;
        found.sort_by_key(|v| v.borrowed_at);
        Ok(found)
    }
}
