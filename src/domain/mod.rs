pub mod borrowing;
pub mod borrowing_request;
pub mod commands;
pub mod errors;
pub mod events;
pub mod fine;
pub mod membership;
pub mod notification;
pub mod renewal;
pub mod value_objects;

pub use borrowing_request::{BorrowRequestAction, BorrowRequestStatus};
pub use errors::*;
pub use events::*;
pub use membership::Membership;
pub use renewal::{RenewalAction, RenewalStatus};
pub use value_objects::*;
