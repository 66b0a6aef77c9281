mod borrowing_request_service;
mod errors;

pub use borrowing_request_service::{
    list_pending, list_pending_for_member, process_request, submit_request,
};
pub use errors::{BorrowingRequestApplicationError, Result};
