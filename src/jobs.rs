use chrono::{NaiveDate, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::application::ServiceDependencies;
use crate::application::borrowing::{self, BorrowingApplicationError};

/// 1回の通知処理の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationPassSummary {
    pub reminders_sent: usize,
    pub overdue_notices_sent: usize,
}

/// 返却期限リマインダーと延滞通知を1回送る
pub async fn run_notification_pass(
    deps: &ServiceDependencies,
    today: NaiveDate,
) -> Result<NotificationPassSummary, BorrowingApplicationError> {
    let reminders_sent = borrowing::send_due_date_reminders(deps, today).await?;
    let overdue_notices_sent = borrowing::send_overdue_notifications(deps, today).await?;

    Ok(NotificationPassSummary {
        reminders_sent,
        overdue_notices_sent,
    })
}

/// 通知処理を定期実行するタスクを起動する
///
/// 最初の実行は起動から1周期後。再起動のたびに同じ日の通知を送り直さない。
/// 処理が周期より長引いた場合、遅れた分はまとめて実行しない。
pub fn spawn_notification_job(deps: ServiceDependencies, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // intervalの初回tickは即時に完了する
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let today = Utc::now().date_naive();

            match run_notification_pass(&deps, today).await {
                Ok(summary) => tracing::info!(
                    %today,
                    reminders = summary.reminders_sent,
                    overdue = summary.overdue_notices_sent,
                    "Notification pass completed"
                ),
                Err(e) => tracing::error!(%today, "Notification pass failed: {}", e),
            }
        }
    })
}
