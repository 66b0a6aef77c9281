use crate::domain::RenewalStatus;
use crate::domain::value_objects::{MemberId, RenewalRequestId};
use crate::ports::renewal_read_model::{
    RenewalReadModel as RenewalReadModelTrait, RenewalView, Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of RenewalReadModel
pub struct RenewalReadModel {
    views: Mutex<HashMap<RenewalRequestId, RenewalView>>,
}

impl RenewalReadModel {
    pub fn new() -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for RenewalReadModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenewalReadModelTrait for RenewalReadModel {
    async fn save(&self, view: RenewalView) -> Result<()> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        views.insert(view.request_id, view);
        Ok(())
    }

    async fn insert_pending(&self, view: RenewalView) -> Result<bool> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        let has_pending = views
            .values()
            .any(|v| v.member_id == view.member_id && v.status == RenewalStatus::Pending);
        if has_pending {
            return Ok(false);
        }
        views.insert(view.request_id, view);
        Ok(true)
    }

    async fn delete(&self, request_id: RenewalRequestId) -> Result<()> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        views.remove(&request_id);
        Ok(())
    }

    async fn get_by_id(&self, request_id: RenewalRequestId) -> Result<Option<RenewalView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        Ok(views.get(&request_id).cloned())
    }

    async fn find_pending(&self) -> Result<Vec<RenewalView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        let mut pending: Vec<_> = views
            .values()
            .filter(|v| v.status == RenewalStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|v| v.requested_at);
        Ok(pending)
    }

    async fn find_pending_by_member(&self, member_id: MemberId) -> Result<Option<RenewalView>> {
        let views = self.views.lock().map_err(|e| e.to_string())?;
        Ok(views
            .values()
            .find(|v| v.member_id == member_id && v.status == RenewalStatus::Pending)
            .cloned())
    }
}
