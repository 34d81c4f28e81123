/// 호가 단위(bid increment) 스케줄
/// 가격 구간 [min, max) 별 최소 인상 단위를 결정한다.
// region:    --- Imports
use thiserror::Error;

use crate::bidding::model::IncrementTier;

// endregion: --- Imports

// region:    --- Tier Error

/// 잘못 구성된 호가 구간 테이블
/// 해당 이벤트의 입찰은 전부 거부된다(fail closed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    #[error("호가 구간이 비어 있습니다.")]
    Empty,
    #[error("첫 구간은 0에서 시작해야 합니다. (시작: {0})")]
    FirstNotZero(i64),
    #[error("호가 구간 사이에 빈 구간이 있습니다. ({0} ~ {1})")]
    Gap(i64, i64),
    #[error("호가 구간이 겹칩니다. ({0} 이전에 {1} 시작)")]
    Overlap(i64, i64),
    #[error("마지막이 아닌 구간은 상한이 있어야 합니다. (시작: {0})")]
    UnboundedBeforeLast(i64),
    #[error("마지막 구간은 무제한이어야 합니다.")]
    BoundedLast,
    #[error("호가 단위는 양수여야 합니다. (구간 시작: {0}, 단위: {1})")]
    NonPositiveIncrement(i64, i64),
}

// endregion: --- Tier Error

// region:    --- Increment Schedule

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tier {
    min: i64,
    max: Option<i64>,
    step: i64,
}

/// 검증 완료된 호가 스케줄
/// [0, ∞) 를 빈틈·중복 없이 덮는 것이 보장된다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementSchedule {
    tiers: Vec<Tier>,
}

impl IncrementSchedule {
    /// 구간 목록 (min, max, increment) 으로부터 스케줄 생성
    /// 정렬 후 연속성과 단위의 양수 여부를 검증한다.
    pub fn from_bounds(
        bounds: impl IntoIterator<Item = (i64, Option<i64>, i64)>,
    ) -> Result<Self, TierError> {
        let mut tiers: Vec<Tier> = bounds
            .into_iter()
            .map(|(min, max, step)| Tier { min, max, step })
            .collect();
        tiers.sort_by_key(|t| t.min);

        if tiers.is_empty() {
            return Err(TierError::Empty);
        }
        if tiers[0].min != 0 {
            return Err(TierError::FirstNotZero(tiers[0].min));
        }

        for (i, tier) in tiers.iter().enumerate() {
            if tier.step <= 0 {
                return Err(TierError::NonPositiveIncrement(tier.min, tier.step));
            }
            let last = i == tiers.len() - 1;
            match (tier.max, last) {
                (None, false) => return Err(TierError::UnboundedBeforeLast(tier.min)),
                (Some(_), true) => return Err(TierError::BoundedLast),
                (Some(max), false) => {
                    let next_min = tiers[i + 1].min;
                    if max < next_min {
                        return Err(TierError::Gap(max, next_min));
                    }
                    if max > next_min {
                        return Err(TierError::Overlap(max, next_min));
                    }
                }
                (None, true) => {}
            }
        }

        Ok(Self { tiers })
    }

    /// DB 의 호가 구간 행으로부터 스케줄 생성
    pub fn from_tiers(rows: &[IncrementTier]) -> Result<Self, TierError> {
        Self::from_bounds(
            rows.iter()
                .map(|r| (r.min_amount, r.max_amount, r.increment)),
        )
    }

    /// 금액이 속한 [min, max) 구간의 호가 단위
    pub fn increment_for(&self, amount: i64) -> i64 {
        // 검증된 스케줄에서는 음수가 아닌 모든 금액이 정확히 한 구간에 속한다.
        self.tiers
            .iter()
            .rev()
            .find(|t| t.min <= amount)
            .map(|t| t.step)
            .unwrap_or_else(|| self.tiers[0].step)
    }

    /// 다음 최소 입찰가
    /// 입찰이 없는 상품은 시작가 자체가 첫 최소 입찰가다.
    pub fn next_minimum_bid(&self, highest: Option<i64>, starting_bid: i64) -> i64 {
        match highest {
            Some(top) => top + self.increment_for(top),
            None => starting_bid,
        }
    }
}

// endregion: --- Increment Schedule

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_increment_bounds;

    fn schedule() -> IncrementSchedule {
        IncrementSchedule::from_bounds(default_increment_bounds()).unwrap()
    }

    #[test]
    fn increment_matches_tier_boundaries() {
        let s = schedule();
        assert_eq!(s.increment_for(0), 1);
        assert_eq!(s.increment_for(19), 1);
        assert_eq!(s.increment_for(20), 2);
        assert_eq!(s.increment_for(49), 2);
        assert_eq!(s.increment_for(50), 5);
        assert_eq!(s.increment_for(199), 5);
        assert_eq!(s.increment_for(200), 10);
        assert_eq!(s.increment_for(500), 25);
        assert_eq!(s.increment_for(1000), 50);
        assert_eq!(s.increment_for(5000), 100);
        assert_eq!(s.increment_for(10000), 250);
        assert_eq!(s.increment_for(25000), 500);
        assert_eq!(s.increment_for(50000), 1000);
        assert_eq!(s.increment_for(10_000_000), 1000);
    }

    #[test]
    fn next_minimum_is_strictly_greater_than_top() {
        let s = schedule();
        for top in [0, 19, 20, 199, 4999, 49999, 50000, 123456] {
            let min = s.next_minimum_bid(Some(top), 0);
            assert!(min > top, "top={} min={}", top, min);
            assert_eq!(min, top + s.increment_for(top));
        }
    }

    #[test]
    fn first_bid_minimum_is_starting_bid_itself() {
        let s = schedule();
        assert_eq!(s.next_minimum_bid(None, 100), 100);
        assert_eq!(s.next_minimum_bid(None, 0), 0);
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(
            IncrementSchedule::from_bounds([]).unwrap_err(),
            TierError::Empty
        );
    }

    #[test]
    fn rejects_table_not_starting_at_zero() {
        assert_eq!(
            IncrementSchedule::from_bounds([(10, None, 5)]).unwrap_err(),
            TierError::FirstNotZero(10)
        );
    }

    #[test]
    fn rejects_gap_between_tiers() {
        let err =
            IncrementSchedule::from_bounds([(0, Some(100), 5), (200, None, 10)]).unwrap_err();
        assert_eq!(err, TierError::Gap(100, 200));
    }

    #[test]
    fn rejects_overlapping_tiers() {
        let err =
            IncrementSchedule::from_bounds([(0, Some(300), 5), (200, None, 10)]).unwrap_err();
        assert_eq!(err, TierError::Overlap(300, 200));
    }

    #[test]
    fn rejects_bounded_last_tier() {
        let err =
            IncrementSchedule::from_bounds([(0, Some(100), 5), (100, Some(200), 10)]).unwrap_err();
        assert_eq!(err, TierError::BoundedLast);
    }

    #[test]
    fn rejects_unbounded_middle_tier() {
        let err = IncrementSchedule::from_bounds([(0, None, 5), (100, None, 10)]).unwrap_err();
        assert_eq!(err, TierError::UnboundedBeforeLast(0));
    }

    #[test]
    fn rejects_non_positive_increment() {
        let err = IncrementSchedule::from_bounds([(0, None, 0)]).unwrap_err();
        assert_eq!(err, TierError::NonPositiveIncrement(0, 0));
    }
}

// endregion: --- Tests
