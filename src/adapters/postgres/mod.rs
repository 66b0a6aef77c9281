pub mod borrowing_read_model;
pub mod borrowing_request_read_model;
pub mod event_store;
pub mod member_service;
pub mod notification_service;
pub mod projector;
pub mod renewal_read_model;

// パブリックに型を再エクスポート
pub use borrowing_read_model::BorrowingReadModel as PostgresBorrowingReadModel;
pub use borrowing_request_read_model::BorrowingRequestReadModel as PostgresBorrowingRequestReadModel;
pub use event_store::EventStore as PostgresEventStore;
pub use member_service::MemberService as PostgresMemberService;
pub use notification_service::NotificationService as PostgresNotificationService;
pub use renewal_read_model::RenewalReadModel as PostgresRenewalReadModel;
