use library_circulation::{
    adapters::mock::BookService as MockBookService,
    adapters::postgres::{
        PostgresBorrowingReadModel, PostgresBorrowingRequestReadModel, PostgresEventStore,
        PostgresMemberService, PostgresNotificationService, PostgresRenewalReadModel,
        projector::{ReadModels, rebuild_read_models},
    },
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::AppConfig,
    jobs::spawn_notification_job,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_circulation=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    // 通知はnotificationsテーブルに保存し、フィードとして参照する
    let notifications = Arc::new(PostgresNotificationService::new(pool.clone()));

    // 書籍カタログは外部コンテキストのため、モックで代替する
    let service_deps = ServiceDependencies {
        event_store: Arc::new(PostgresEventStore::new(pool.clone())),
        borrowing_read_model: Arc::new(PostgresBorrowingReadModel::new(pool.clone())),
        renewal_read_model: Arc::new(PostgresRenewalReadModel::new(pool.clone())),
        borrowing_request_read_model: Arc::new(PostgresBorrowingRequestReadModel::new(
            pool.clone(),
        )),
        member_service: Arc::new(PostgresMemberService::new(pool.clone())),
        book_service: Arc::new(MockBookService::permissive()),
        notification_service: notifications.clone(),
        notification_feed: notifications,
    };

    if config.rebuild_read_models {
        rebuild_read_models(
            service_deps.event_store.as_ref(),
            ReadModels {
                borrowings: service_deps.borrowing_read_model.as_ref(),
                renewals: service_deps.renewal_read_model.as_ref(),
                borrowing_requests: service_deps.borrowing_request_read_model.as_ref(),
            },
        )
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    }

    if let Some(period) = config.notification_interval {
        spawn_notification_job(service_deps.clone(), period);
    }

    let app = create_router(Arc::new(AppState { service_deps }));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
