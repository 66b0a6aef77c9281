//! 延滞料金の計算
//!
//! 貸出期間・延滞日数・料金の規則はすべてここに集約する。
//! 日付はUTCの暦日で扱い、時刻は切り捨てる。

use chrono::{Duration, NaiveDate};

use super::{Fine, MembershipType};

/// 延滞状況の評価結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineAssessment {
    pub expected_return_date: NaiveDate,
    pub overdue_days: u32,
    pub fine: Fine,
}

/// 純粋関数：プランごとの貸出期間
pub fn loan_period(membership_type: MembershipType) -> Duration {
    Duration::days(membership_type.loan_period_days())
}

/// 純粋関数：返却予定日
///
/// 返却予定日 = 貸出日 + 貸出期間
pub fn expected_return_date(borrow_date: NaiveDate, membership_type: MembershipType) -> NaiveDate {
    borrow_date + loan_period(membership_type)
}

/// 純粋関数：返却予定日からの経過日数（延滞していなければ0）
pub fn overdue_days_since(expected_return_date: NaiveDate, today: NaiveDate) -> u32 {
    let days = today.signed_duration_since(expected_return_date).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// 純粋関数：返却予定日と基準日から延滞を評価する
pub fn assess(expected_return_date: NaiveDate, today: NaiveDate) -> FineAssessment {
    let overdue_days = overdue_days_since(expected_return_date, today);
    FineAssessment {
        expected_return_date,
        overdue_days,
        fine: Fine::for_overdue_days(overdue_days),
    }
}

/// 純粋関数：延滞日数
pub fn overdue_days(borrow_date: NaiveDate, membership_type: MembershipType, today: NaiveDate) -> u32 {
    overdue_days_since(expected_return_date(borrow_date, membership_type), today)
}

/// 純粋関数：延滞料金
///
/// ビジネスルール：
/// - 延滞1日あたり10
/// - 上限なし、猶予期間なし
pub fn calculate_fine(borrow_date: NaiveDate, membership_type: MembershipType, today: NaiveDate) -> Fine {
    Fine::for_overdue_days(overdue_days(borrow_date, membership_type, today))
}

/// 純粋関数：延滞判定（返却予定日を過ぎているか）
pub fn is_overdue(borrow_date: NaiveDate, membership_type: MembershipType, today: NaiveDate) -> bool {
    today > expected_return_date(borrow_date, membership_type)
}

/// 純粋関数：返却予定日までの残り日数（過ぎていれば負）
pub fn days_until_due(borrow_date: NaiveDate, membership_type: MembershipType, today: NaiveDate) -> i64 {
    expected_return_date(borrow_date, membership_type)
        .signed_duration_since(today)
        .num_days()
}

/// 料金の加算が止まる日
///
/// 返却済みなら返却日、未返却なら基準日。
pub fn accrual_end(returned_on: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    match returned_on {
        Some(returned_on) => returned_on.min(today),
        None => today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_basic_example_fine_is_40() {
        let borrow_date = date(2024, 1, 1);
        let today = date(2024, 1, 20);

        assert_eq!(
            expected_return_date(borrow_date, MembershipType::Basic),
            date(2024, 1, 16)
        );
        assert_eq!(overdue_days(borrow_date, MembershipType::Basic, today), 4);
        assert_eq!(
            calculate_fine(borrow_date, MembershipType::Basic, today).value(),
            40
        );
    }

    #[test]
    fn test_premium_example_fine_is_zero() {
        let borrow_date = date(2024, 1, 1);
        let today = date(2024, 1, 20);

        assert_eq!(
            expected_return_date(borrow_date, MembershipType::Premium),
            date(2024, 1, 31)
        );
        assert_eq!(overdue_days(borrow_date, MembershipType::Premium, today), 0);
        assert!(calculate_fine(borrow_date, MembershipType::Premium, today).is_zero());
    }

    #[test]
    fn test_premium_window_is_30_days() {
        let borrow_date = date(2024, 3, 1);

        // 30日目はまだ期限内
        assert!(calculate_fine(borrow_date, MembershipType::Premium, date(2024, 3, 31)).is_zero());
        assert_eq!(
            calculate_fine(borrow_date, MembershipType::Premium, date(2024, 4, 1)).value(),
            10
        );
    }

    #[test]
    fn test_basic_window_is_15_days() {
        let borrow_date = date(2024, 3, 1);

        assert!(calculate_fine(borrow_date, MembershipType::Basic, date(2024, 3, 16)).is_zero());
        assert_eq!(
            calculate_fine(borrow_date, MembershipType::Basic, date(2024, 3, 17)).value(),
            10
        );
    }

    #[test]
    fn test_no_fine_before_borrow_date() {
        let borrow_date = date(2024, 5, 10);
        assert!(calculate_fine(borrow_date, MembershipType::Basic, date(2024, 5, 1)).is_zero());
        assert_eq!(overdue_days(borrow_date, MembershipType::Basic, date(2024, 5, 1)), 0);
    }

    #[test]
    fn test_fine_is_monotonically_non_decreasing() {
        let borrow_date = date(2024, 1, 1);
        for membership_type in [MembershipType::Basic, MembershipType::Premium] {
            let mut previous = Fine::zero();
            for offset in 0..120 {
                let today = borrow_date + Duration::days(offset);
                let fine = calculate_fine(borrow_date, membership_type, today);
                assert!(fine >= previous, "fine decreased at offset {}", offset);
                previous = fine;
            }
        }
    }

    #[test]
    fn test_is_overdue_boundary() {
        let borrow_date = date(2024, 1, 1);
        assert!(!is_overdue(borrow_date, MembershipType::Basic, date(2024, 1, 16)));
        assert!(is_overdue(borrow_date, MembershipType::Basic, date(2024, 1, 17)));
    }

    #[test]
    fn test_days_until_due() {
        let borrow_date = date(2024, 1, 1);
        assert_eq!(days_until_due(borrow_date, MembershipType::Basic, date(2024, 1, 14)), 2);
        assert_eq!(days_until_due(borrow_date, MembershipType::Basic, date(2024, 1, 20)), -4);
    }

    #[test]
    fn test_assess_matches_calculate_fine() {
        let borrow_date = date(2024, 1, 1);
        let today = date(2024, 2, 10);
        let assessment = assess(expected_return_date(borrow_date, MembershipType::Basic), today);

        assert_eq!(assessment.overdue_days, 25);
        assert_eq!(
            assessment.fine,
            calculate_fine(borrow_date, MembershipType::Basic, today)
        );
    }

    #[test]
    fn test_accrual_end() {
        let today = date(2024, 2, 10);
        assert_eq!(accrual_end(None, today), today);
        assert_eq!(accrual_end(Some(date(2024, 1, 20)), today), date(2024, 1, 20));
    }
}
