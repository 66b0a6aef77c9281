use crate::domain::BorrowRequestStatus;
use crate::domain::value_objects::{BorrowingRequestId, MemberId};
use crate::ports::borrowing_request_read_model::{
    BorrowingRequestReadModel as BorrowingRequestReadModelTrait, BorrowingRequestView, Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of BorrowingRequestReadModel
pub struct BorrowingRequestReadModel {
    views: Mutex<HashMap<BorrowingRequestId, BorrowingRequestView>>,
}

impl BorrowingRequestReadModel {
    pub fn new() -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for BorrowingRequestReadModel {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_pending<'a>(
    views: impl Iterator<Item = &'a BorrowingRequestView>,
) -> Vec<BorrowingRequestView> {
    let mut pending: Vec<_> = views
        .filter(|v| v.status == BorrowRequestStatus::Pending)
        .cloned()
        .collect();
    pending.sort_by_key(|v| v.requested_at);
    pending
}

#[async_trait]
impl BorrowingRequestReadModelTrait for BorrowingRequestReadModel {
    async fn save(&self, view: BorrowingRequestView) -> Result<()> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        views.insert(view.request_id, view);
        Ok(())
    }

    async fn insert_pending(&self, view: BorrowingRequestView) -> Result<bool> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        let duplicate = views.values().any(|v| {
            v.member_id == view.member_id
                && v.book_id == view.book_id
                && v.status == BorrowRequestStatus::Pending
        });
        if duplicate {
            return Ok(false);
        }
        views.insert(view.request_id, view);
        Ok(true)
    }

    async fn delete(&self, request_id: BorrowingRequestId) -> Result<()> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        views.remove(&request_id);
        Ok(())
    }

    async fn get_by_id(
        &self,
        request_id: BorrowingRequestId,
    ) -> Result<Option<BorrowingRequestView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        Ok(views.get(&request_id).cloned())
    }

    async fn find_pending(&self) -> Result<Vec<BorrowingRequestView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        Ok(sorted_pending(views.values()))
    }

    async fn find_pending_by_member(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<BorrowingRequestView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        Ok(sorted_pending(
            views.values().filter(|v| v.member_id == member_id),
        ))
    }
}
