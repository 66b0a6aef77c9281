use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、アプリケーション層の関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub event_store: Arc<dyn EventStore>,
    pub borrowing_read_model: Arc<dyn BorrowingReadModel>,
    pub renewal_read_model: Arc<dyn RenewalReadModel>,
    pub borrowing_request_read_model: Arc<dyn BorrowingRequestReadModel>,
    pub member_service: Arc<dyn MemberService>,
    pub book_service: Arc<dyn BookService>,
    pub notification_service: Arc<dyn NotificationService>,
    pub notification_feed: Arc<dyn NotificationFeed>,
}
