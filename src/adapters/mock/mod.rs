pub mod book_service;
pub mod borrowing_read_model;
pub mod borrowing_request_read_model;
pub mod event_store;
pub mod member_service;
pub mod notification_service;
pub mod renewal_read_model;

pub use book_service::BookService;
pub use borrowing_read_model::BorrowingReadModel;
pub use borrowing_request_read_model::BorrowingRequestReadModel;
pub use event_store::EventStore;
pub use member_service::MemberService;
pub use notification_service::{NotificationService, SentNotification};
pub use renewal_read_model::RenewalReadModel;
