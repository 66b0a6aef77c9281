use library_circulation::adapters::mock::SentNotification;
use library_circulation::application::borrowing;
use library_circulation::domain::commands::BorrowBook;
use library_circulation::domain::value_objects::*;
use library_circulation::jobs::spawn_notification_job;
use std::time::Duration;

mod common;

use common::{TestContext, jan_first};

fn overdue_sent(ctx: &TestContext) -> usize {
    ctx.notifications
        .sent()
        .iter()
        .filter(|n| matches!(n, SentNotification::Overdue { .. }))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_first_pass_runs_one_period_after_start() {
    let ctx = TestContext::new();
    let member_id = ctx.member_with_plan(MembershipType::Basic, jan_first());
    borrowing::borrow_book(
        &ctx.deps,
        BorrowBook {
            book_id: ctx.book("Dune"),
            member_id,
            borrowed_at: jan_first(),
            staff_id: StaffId::new(),
        },
    )
    .await
    .unwrap();

    let job = spawn_notification_job(ctx.deps.clone(), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(overdue_sent(&ctx), 0, "no pass should run at startup");

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(overdue_sent(&ctx), 1);

    job.abort();
}
