use crate::domain::Membership;
use crate::domain::value_objects::MemberId;
use crate::ports::member_service::{MemberService as MemberServiceTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mock implementation of MemberService
///
/// Stores members in memory. A member may be registered with or
/// without a membership.
pub struct MemberService {
    members: Mutex<HashMap<MemberId, Option<Membership>>>,
    fail_updates: AtomicBool,
}

impl MemberService {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
            fail_updates: AtomicBool::new(false),
        }
    }

    /// Make `update_membership` fail until switched back
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Register a member without a membership
    pub fn add_member(&self, member_id: MemberId) {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(member_id, None);
    }

    /// Register a member holding the given membership
    pub fn add_member_with_membership(&self, member_id: MemberId, membership: Membership) {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(member_id, Some(membership));
    }
}

impl Default for MemberService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberServiceTrait for MemberService {
    async fn exists(&self, member_id: MemberId) -> Result<bool> {
        let members = self.members.lock().map_err(|e| e.to_string())?;
        Ok(members.contains_key(&member_id))
    }

    async fn get_membership(&self, member_id: MemberId) -> Result<Option<Membership>> {
        let members = self.members.lock().map_err(|e| e.to_string())?;
        Ok(members.get(&member_id).copied().flatten())
    }

    async fn update_membership(&self, member_id: MemberId, membership: Membership) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err("Member service unavailable".into());
        }
        let mut members = self.members.lock().map_err(|e| e.to_string())?;
        match members.get_mut(&member_id) {
            Some(slot) => {
                *slot = Some(membership);
                Ok(())
            }
            None => Err(format!("Member not found: {}", member_id.value()).into()),
        }
    }
}
