mod errors;
mod renewal_service;

pub use errors::{RenewalApplicationError, Result};
pub use renewal_service::{get_pending_for_member, list_pending, process_renewal, request_renewal};
