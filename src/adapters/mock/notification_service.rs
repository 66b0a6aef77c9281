use crate::domain::notification::{self, Notification, Recipient};
use crate::domain::value_objects::{Fine, MemberId};
use crate::ports::notification_feed::NotificationFeed;
use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Mutex;

/// A notification captured by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    DueDateReminder {
        member_id: MemberId,
        book_title: String,
        due_date: NaiveDate,
    },
    Overdue {
        member_id: MemberId,
        book_title: String,
        due_date: NaiveDate,
        fine: Fine,
    },
    RenewalSubmitted {
        member_id: MemberId,
    },
    RenewalDecision {
        member_id: MemberId,
        approved: bool,
    },
    FinePaymentConfirmation {
        member_id: MemberId,
        book_title: String,
        amount: Fine,
    },
    BorrowRequestSubmitted {
        member_id: MemberId,
        book_title: String,
    },
    BorrowRequestDecision {
        member_id: MemberId,
        book_title: String,
        accepted: bool,
    },
}

/// In-memory implementation of NotificationService and NotificationFeed
///
/// Does not deliver anything. Each call is logged and recorded so tests
/// can inspect what would have been sent, and the resulting feed entry is
/// kept for the feed queries.
pub struct NotificationService {
    sent: Mutex<Vec<SentNotification>>,
    feed: Mutex<Vec<Notification>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            feed: Mutex::new(Vec::new()),
        }
    }

    /// Notifications recorded so far, oldest first
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, sent: SentNotification, entry: Notification) -> Result<()> {
        tracing::info!(notification = ?sent, "Notification sent (mock)");
        self.sent.lock().map_err(|e| e.to_string())?.push(sent);
        self.feed.lock().map_err(|e| e.to_string())?.push(entry);
        Ok(())
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn send_due_date_reminder(
        &self,
        member_id: MemberId,
        book_title: &str,
        due_date: NaiveDate,
    ) -> Result<()> {
        self.record(
            SentNotification::DueDateReminder {
                member_id,
                book_title: book_title.to_string(),
                due_date,
            },
            notification::due_date_reminder(member_id, book_title, due_date, Utc::now()),
        )
    }

    async fn send_overdue_notification(
        &self,
        member_id: MemberId,
        book_title: &str,
        due_date: NaiveDate,
        fine: Fine,
    ) -> Result<()> {
        self.record(
            SentNotification::Overdue {
                member_id,
                book_title: book_title.to_string(),
                due_date,
                fine,
            },
            notification::overdue(member_id, book_title, due_date, fine, Utc::now()),
        )
    }

    async fn send_renewal_submitted(&self, member_id: MemberId) -> Result<()> {
        self.record(
            SentNotification::RenewalSubmitted { member_id },
            notification::renewal_submitted(member_id, Utc::now()),
        )
    }

    async fn send_renewal_decision(&self, member_id: MemberId, approved: bool) -> Result<()> {
        self.record(
            SentNotification::RenewalDecision {
                member_id,
                approved,
            },
            notification::renewal_decision(member_id, approved, Utc::now()),
        )
    }

    async fn send_fine_payment_confirmation(
        &self,
        member_id: MemberId,
        book_title: &str,
        amount: Fine,
    ) -> Result<()> {
        self.record(
            SentNotification::FinePaymentConfirmation {
                member_id,
                book_title: book_title.to_string(),
                amount,
            },
            notification::fine_payment(member_id, book_title, amount, Utc::now()),
        )
    }

    async fn send_borrow_request_submitted(
        &self,
        member_id: MemberId,
        book_title: &str,
    ) -> Result<()> {
        self.record(
            SentNotification::BorrowRequestSubmitted {
                member_id,
                book_title: book_title.to_string(),
            },
            notification::borrow_request_submitted(member_id, book_title, Utc::now()),
        )
    }

    async fn send_borrow_request_decision(
        &self,
        member_id: MemberId,
        book_title: &str,
        accepted: bool,
    ) -> Result<()> {
        self.record(
            SentNotification::BorrowRequestDecision {
                member_id,
                book_title: book_title.to_string(),
                accepted,
            },
            notification::borrow_request_decision(member_id, book_title, accepted, Utc::now()),
        )
    }
}

#[async_trait]
impl NotificationFeed for NotificationService {
    async fn list_for(&self, recipient: Recipient) -> Result<Vec<Notification>> {
        let feed = self.feed.lock().map_err(|e| e.to_string())?;
        // 追加順に並んでいるので逆順で新しい順
        Ok(feed
            .iter()
            .rev()
            .filter(|n| n.is_for(recipient))
            .cloned()
            .collect())
    }

    async fn mark_all_read(&self, recipient: Recipient) -> Result<u64> {
        let mut feed = self.feed.lock().map_err(|e| e.to_string())?;
        let mut marked = 0;
        for entry in feed.iter_mut().filter(|n| n.is_for(recipient) && !n.is_read) {
            entry.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }
}
