use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookBorrowed, BookId, BookReturned, BorrowingId, DomainEvent, Fine, FinePaid, MemberId,
    MembershipType, PayFineError, ReturnBookError, StaffId, fine,
};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Borrowing集約の共通フィールド
///
/// すべての貸出状態（Active, Returned）で共有されるコアデータ。
/// 貸出記録は作成後に削除されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingCore {
    // 識別子
    pub borrowing_id: BorrowingId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    // 貸出時点のプラン（以後のプラン変更は返却予定日に影響しない）
    pub membership_type: MembershipType,
    pub borrowed_at: DateTime<Utc>,
    pub expected_return_date: NaiveDate,

    // 支払い済みの延滞料金
    pub fine_paid: Fine,

    // 監査情報
    pub created_by: StaffId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowingCore {
    pub fn borrow_date(&self) -> NaiveDate {
        self.borrowed_at.date_naive()
    }
}

/// 貸出中状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBorrowing {
    #[serde(flatten)]
    pub core: BorrowingCore,
}

impl std::ops::Deref for ActiveBorrowing {
    type Target = BorrowingCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - returned_atが必須（型で保証）
/// - 延滞料金の加算は返却日で止まる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedBorrowing {
    #[serde(flatten)]
    pub core: BorrowingCore,
    pub returned_at: DateTime<Utc>,
}

impl std::ops::Deref for ReturnedBorrowing {
    type Target = BorrowingCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Borrowing集約の統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Borrowing {
    Active(ActiveBorrowing),
    Returned(ReturnedBorrowing),
}

impl Borrowing {
    pub fn core(&self) -> &BorrowingCore {
        match self {
            Borrowing::Active(active) => &active.core,
            Borrowing::Returned(returned) => &returned.core,
        }
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Borrowing::Active(_) => None,
            Borrowing::Returned(returned) => Some(returned.returned_at),
        }
    }

    fn with_core(self, core: BorrowingCore) -> Self {
        match self {
            Borrowing::Active(_) => Borrowing::Active(ActiveBorrowing { core }),
            Borrowing::Returned(returned) => Borrowing::Returned(ReturnedBorrowing {
                core,
                returned_at: returned.returned_at,
            }),
        }
    }
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 返却予定日 = 貸出日 + プランの貸出期間（BASIC 15日、PREMIUM 30日）
/// - 状態はActive
///
/// 副作用なし。新しいActiveBorrowingとイベントを返す。
pub fn borrow_book(
    book_id: BookId,
    member_id: MemberId,
    membership_type: MembershipType,
    borrowed_at: DateTime<Utc>,
    staff_id: StaffId,
) -> (ActiveBorrowing, BookBorrowed) {
    let borrowing_id = BorrowingId::new();
    let expected_return_date = fine::expected_return_date(borrowed_at.date_naive(), membership_type);

    let borrowing = ActiveBorrowing {
        core: BorrowingCore {
            borrowing_id,
            book_id,
            member_id,
            membership_type,
            borrowed_at,
            expected_return_date,
            fine_paid: Fine::zero(),
            created_by: staff_id,
            created_at: borrowed_at,
            updated_at: borrowed_at,
        },
    };

    let event = BookBorrowed {
        borrowing_id,
        book_id,
        member_id,
        membership_type,
        borrowed_at,
        expected_return_date,
        borrowed_by: staff_id,
    };

    (borrowing, event)
}

/// 純粋関数：書籍を返却する
///
/// 延滞していても返却は受け付ける。延滞料金は返却日の時点で確定する。
pub fn return_book(
    borrowing: Borrowing,
    returned_at: DateTime<Utc>,
) -> Result<(ReturnedBorrowing, BookReturned), ReturnBookError> {
    let active = match borrowing {
        Borrowing::Active(active) => active,
        Borrowing::Returned(_) => return Err(ReturnBookError::AlreadyReturned),
    };

    let overdue_days = fine::overdue_days_since(active.expected_return_date, returned_at.date_naive());

    let event = BookReturned {
        borrowing_id: active.borrowing_id,
        book_id: active.book_id,
        member_id: active.member_id,
        returned_at,
        was_overdue: overdue_days > 0,
        overdue_days,
    };

    let returned = ReturnedBorrowing {
        core: BorrowingCore {
            updated_at: returned_at,
            ..active.core
        },
        returned_at,
    };

    Ok((returned, event))
}

/// 純粋関数：基準日時点の延滞評価
///
/// 貸出中なら基準日まで、返却済みなら返却日まで料金が加算される。
pub fn assess_as_of(borrowing: &Borrowing, today: NaiveDate) -> fine::FineAssessment {
    let end = fine::accrual_end(borrowing.returned_at().map(|r| r.date_naive()), today);
    fine::assess(borrowing.core().expected_return_date, end)
}

/// 純粋関数：基準日時点の延滞料金（支払い前の総額）
pub fn fine_as_of(borrowing: &Borrowing, today: NaiveDate) -> Fine {
    assess_as_of(borrowing, today).fine
}

/// 純粋関数：基準日時点の未払い額
pub fn outstanding_fine(borrowing: &Borrowing, today: NaiveDate) -> Fine {
    fine_as_of(borrowing, today).saturating_sub(borrowing.core().fine_paid)
}

/// 純粋関数：延滞料金を支払う
///
/// ビジネスルール：
/// - 未払い額がなければ支払えない
/// - 支払額は1以上かつ未払い額以下
/// - 貸出中・返却済みのどちらでも支払える
pub fn pay_fine(
    borrowing: Borrowing,
    amount: Fine,
    paid_at: DateTime<Utc>,
) -> Result<(Borrowing, FinePaid), PayFineError> {
    let outstanding = outstanding_fine(&borrowing, paid_at.date_naive());
    if outstanding.is_zero() {
        return Err(PayFineError::NoFineOutstanding);
    }
    if amount.is_zero() || amount > outstanding {
        return Err(PayFineError::InvalidPaymentAmount);
    }

    let core = borrowing.core().clone();
    let event = FinePaid {
        borrowing_id: core.borrowing_id,
        member_id: core.member_id,
        amount,
        paid_at,
    };

    let updated = borrowing.with_core(BorrowingCore {
        fine_paid: core.fine_paid + amount,
        updated_at: paid_at,
        ..core
    });

    Ok((updated, event))
}

/// イベントを適用して新しい状態を生成する純粋関数
///
/// 永続化済みのイベント列は正しい順序であることを前提とし、
/// 不正な状態遷移はpanicする。
///
/// # Panics
/// 不正な状態遷移（例: Returned状態からの返却）の場合
pub fn apply_event(borrowing: Option<Borrowing>, event: &DomainEvent) -> Borrowing {
    match (borrowing, event) {
        (None, DomainEvent::BookBorrowed(e)) => Borrowing::Active(ActiveBorrowing {
            core: BorrowingCore {
                borrowing_id: e.borrowing_id,
                book_id: e.book_id,
                member_id: e.member_id,
                membership_type: e.membership_type,
                borrowed_at: e.borrowed_at,
                expected_return_date: e.expected_return_date,
                fine_paid: Fine::zero(),
                created_by: e.borrowed_by,
                created_at: e.borrowed_at,
                updated_at: e.borrowed_at,
            },
        }),

        (Some(Borrowing::Active(active)), DomainEvent::BookReturned(e)) => {
            assert_eq!(
                active.borrowing_id, e.borrowing_id,
                "BookReturned borrowing_id does not match current borrowing"
            );
            Borrowing::Returned(ReturnedBorrowing {
                core: BorrowingCore {
                    updated_at: e.returned_at,
                    ..active.core
                },
                returned_at: e.returned_at,
            })
        }

        (Some(borrowing), DomainEvent::FinePaid(e)) => {
            let core = borrowing.core().clone();
            assert_eq!(
                core.borrowing_id, e.borrowing_id,
                "FinePaid borrowing_id does not match current borrowing"
            );
            borrowing.with_core(BorrowingCore {
                fine_paid: core.fine_paid + e.amount,
                updated_at: e.paid_at,
                ..core
            })
        }

        (borrowing, event) => panic!(
            "Invalid state transition: borrowing={:?}, event={:?}",
            borrowing, event
        ),
    }
}

/// イベント列から現在の状態を復元する
///
/// イベントが空の場合は`None`。
pub fn replay_events(events: &[DomainEvent]) -> Option<Borrowing> {
    events
        .iter()
        .fold(None, |borrowing, event| Some(apply_event(borrowing, event)))
}
