mod borrowing_service;
mod errors;
mod overdue;

pub use borrowing_service::{FineSummary, borrow_book, get_fine, pay_fine, return_book};
pub use errors::{BorrowingApplicationError, Result};
pub use overdue::{
    OverdueBorrowing, PaymentStatus, REMINDER_DAYS_BEFORE_DUE, UNKNOWN_BOOK_TITLE, list_overdue,
    list_overdue_for_member, send_due_date_reminders, send_overdue_notifications,
};
