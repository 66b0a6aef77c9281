pub mod borrowing;
pub mod borrowing_request;
mod dependencies;
pub mod notification;
pub mod renewal;

pub use dependencies::ServiceDependencies;
