/// 소프트 클로즈(종료 임박 연장) 판정
/// 종료 직전 입찰 시 종료 시각을 뒤로 미뤄 스나이핑을 막는다.
// region:    --- Imports
use chrono::{DateTime, Duration, Utc};

use crate::bidding::model::AuctionEvent;
use crate::config::BidPolicy;

// endregion: --- Imports

// region:    --- Soft Close

/// 이벤트별 재정의가 있으면 그 값을, 없으면 플랫폼 기본값을 적용한다.
pub fn effective_policy(event: &AuctionEvent, policy: &BidPolicy) -> (i64, i64) {
    (
        event
            .soft_close_window_secs
            .unwrap_or(policy.soft_close_window_secs),
        event
            .soft_close_extend_secs
            .unwrap_or(policy.soft_close_extend_secs),
    )
}

/// 연장 판정
/// 남은 시간이 window 이하(경계 포함)면 종료 시각 + extend 를 반환한다.
/// 연달아 발생하는 막판 입찰은 매번 다시 연장되며 상한은 없다.
pub fn maybe_extend(
    ends_at: DateTime<Utc>,
    window_secs: i64,
    extend_secs: i64,
    bid_time: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let remaining = ends_at - bid_time;
    if remaining <= Duration::seconds(window_secs) {
        Some(ends_at + Duration::seconds(extend_secs))
    } else {
        None
    }
}

// endregion: --- Soft Close

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_window_extends() {
        let end = Utc::now();
        let bid_time = end - Duration::seconds(60);
        let new_end = maybe_extend(end, 120, 120, bid_time);
        assert_eq!(new_end, Some(end + Duration::seconds(120)));
    }

    #[test]
    fn exactly_at_window_boundary_extends() {
        let end = Utc::now();
        let bid_time = end - Duration::seconds(120);
        assert!(maybe_extend(end, 120, 120, bid_time).is_some());
    }

    #[test]
    fn one_second_outside_window_does_not_extend() {
        let end = Utc::now();
        let bid_time = end - Duration::seconds(121);
        assert_eq!(maybe_extend(end, 120, 120, bid_time), None);
    }

    #[test]
    fn consecutive_late_bids_compound() {
        let end = Utc::now();
        let first = maybe_extend(end, 120, 120, end - Duration::seconds(10)).unwrap();
        assert_eq!(first, end + Duration::seconds(120));

        // 연장된 종료 시각 기준으로 또 한 번 연장
        let second = maybe_extend(first, 120, 120, first - Duration::seconds(10)).unwrap();
        assert_eq!(second, first + Duration::seconds(120));
    }
}

// endregion: --- Tests
