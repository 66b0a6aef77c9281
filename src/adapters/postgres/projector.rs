use crate::domain::events::DomainEvent;
use crate::domain::{borrowing, borrowing_request, renewal};
use crate::ports::{
    BorrowingReadModel, BorrowingRequestReadModel, BorrowingRequestView, BorrowingView,
    EventStore, RenewalReadModel, RenewalView,
};
use futures::StreamExt;
use std::collections::HashMap;
use uuid::Uuid;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出集約のイベントをRead Modelに投影する
///
/// # イベントソーシングの原則
///
/// 1. イベントが真実の情報源
/// 2. Read Modelはイベントから導出される
/// 3. Read Modelは集約の完全な状態で更新される
///
/// # 引数
/// * `read_model` - 更新するRead Model
/// * `events` - 集約の全イベント（時系列順）
pub async fn project_borrowing_events(
    read_model: &dyn BorrowingReadModel,
    events: &[DomainEvent],
) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    let borrowing = borrowing::replay_events(events)
        .ok_or("Failed to reconstruct borrowing from events")?;

    read_model.save(BorrowingView::from(&borrowing)).await
}

/// 更新申請集約のイベントをRead Modelに投影する
pub async fn project_renewal_events(
    read_model: &dyn RenewalReadModel,
    events: &[DomainEvent],
) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    let request = renewal::replay_events(events)
        .ok_or("Failed to reconstruct renewal request from events")?;

    read_model.save(RenewalView::from(&request)).await
}

/// 貸出申請集約のイベントをRead Modelに投影する
pub async fn project_borrowing_request_events(
    read_model: &dyn BorrowingRequestReadModel,
    events: &[DomainEvent],
) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    let request = borrowing_request::replay_events(events)
        .ok_or("Failed to reconstruct borrowing request from events")?;

    read_model.save(BorrowingRequestView::from(&request)).await
}

/// 再構築の対象となるRead Model
pub struct ReadModels<'a> {
    pub borrowings: &'a dyn BorrowingReadModel,
    pub renewals: &'a dyn RenewalReadModel,
    pub borrowing_requests: &'a dyn BorrowingRequestReadModel,
}

/// Read Model再構築の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub borrowings: usize,
    pub renewals: usize,
    pub borrowing_requests: usize,
}

/// イベントログ全体からRead Modelを再構築する
///
/// イベントを集約ごとにまとめ、集約の種類に応じて投影する。
/// Read Modelの保存はupsertなので、何度実行しても結果は同じ。
pub async fn rebuild_read_models(
    event_store: &dyn EventStore,
    read_models: ReadModels<'_>,
) -> Result<RebuildSummary> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut by_aggregate: HashMap<Uuid, Vec<DomainEvent>> = HashMap::new();

    let mut stream = event_store.stream_all();
    while let Some(event) = stream.next().await {
        let event = event?;
        let aggregate_id = event.aggregate_id();
        by_aggregate
            .entry(aggregate_id)
            .or_insert_with(|| {
                order.push(aggregate_id);
                Vec::new()
            })
            .push(event);
    }
    drop(stream);

    let mut summary = RebuildSummary::default();
    for aggregate_id in order {
        let Some(events) = by_aggregate.get(&aggregate_id) else {
            continue;
        };
        match events.first().map(DomainEvent::aggregate_type) {
            Some("Borrowing") => {
                project_borrowing_events(read_models.borrowings, events).await?;
                summary.borrowings += 1;
            }
            Some("RenewalRequest") => {
                project_renewal_events(read_models.renewals, events).await?;
                summary.renewals += 1;
            }
            Some("BorrowingRequest") => {
                project_borrowing_request_events(read_models.borrowing_requests, events).await?;
                summary.borrowing_requests += 1;
            }
            other => {
                tracing::warn!(%aggregate_id, ?other, "Skipping events of unknown aggregate type");
            }
        }
    }

    tracing::info!(
        borrowings = summary.borrowings,
        renewals = summary.renewals,
        borrowing_requests = summary.borrowing_requests,
        "Read models rebuilt"
    );

    Ok(summary)
}
