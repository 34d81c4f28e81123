/// 입찰 검증기: 권한 → 시간 → 가격 순서로 검사하는 순수 함수
/// 첫 번째로 실패한 검사가 거부 사유가 된다.
// region:    --- Imports
use chrono::{DateTime, Utc};

use crate::bidding::clock::{phase, Phase};
use crate::bidding::error::BidRejection;
use crate::bidding::increment::{IncrementSchedule, TierError};
use crate::bidding::model::{AuctionEvent, AuctionItem, BidderProfile};

// endregion: --- Imports

// region:    --- Accepted Bid

/// 수락된 입찰 의도
/// next_minimum 은 이 입찰이 확정된 뒤 적용될 최소 입찰가다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBid {
    pub amount: i64,
    pub next_minimum: i64,
}

// endregion: --- Accepted Bid

// region:    --- Validator

/// 입찰 요청 검증
/// 금액이 지정되면 그대로(최소가 이상일 때), 지정되지 않으면 다음 최소가로 입찰한다(원클릭).
/// 단계 판정은 저장된 status 가 아니라 타임스탬프에서 매번 다시 계산한다.
#[allow(clippy::too_many_arguments)]
pub fn validate(
    bidder_id: Option<i64>,
    profile: Option<&BidderProfile>,
    item: &AuctionItem,
    event: &AuctionEvent,
    schedule: Result<&IncrementSchedule, &TierError>,
    highest: Option<i64>,
    requested: Option<i64>,
    now: DateTime<Utc>,
) -> Result<AcceptedBid, BidRejection> {
    // 1. 인증 여부
    let bidder_id = bidder_id.ok_or(BidRejection::Unauthenticated)?;

    // 2~3. 프로필 검사 (프로필 미등록은 미승인과 동일하게 취급)
    let profile = profile.ok_or(BidRejection::NotApproved)?;
    if profile.banned {
        return Err(BidRejection::Banned);
    }
    if !profile.approved {
        return Err(BidRejection::NotApproved);
    }

    // 4. 본인 출품 여부
    if item.seller_id == Some(bidder_id) {
        return Err(BidRejection::SelfBid);
    }

    // 5. 경매 단계
    match phase(event.starts_at, event.ends_at, now) {
        Phase::Live => {}
        Phase::Draft | Phase::Scheduled => return Err(BidRejection::NotStarted),
        Phase::Ended => return Err(BidRejection::AlreadyEnded),
    }

    // 호가 구간 설정 오류는 가격 검사 전에 fail closed
    let schedule = schedule.map_err(|_| BidRejection::IncrementConfig)?;

    // 6. 가격 검사
    let minimum = schedule.next_minimum_bid(highest, item.starting_bid);
    let amount = match requested {
        Some(amount) if amount < minimum => {
            return Err(BidRejection::BidTooLow { minimum });
        }
        Some(amount) => amount,
        None => minimum,
    };

    Ok(AcceptedBid {
        amount,
        next_minimum: amount + schedule.increment_for(amount),
    })
}

// endregion: --- Validator

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_increment_bounds;
    use chrono::Duration;

    fn schedule() -> IncrementSchedule {
        IncrementSchedule::from_bounds(default_increment_bounds()).unwrap()
    }

    fn live_event() -> AuctionEvent {
        let now = Utc::now();
        AuctionEvent {
            id: 1,
            title: "테스트 경매".to_string(),
            status: "live".to_string(),
            starts_at: Some(now - Duration::hours(1)),
            ends_at: Some(now + Duration::hours(1)),
            soft_close_window_secs: None,
            soft_close_extend_secs: None,
            increment_table_id: None,
            created_at: now,
        }
    }

    fn item(starting_bid: i64, seller_id: Option<i64>) -> AuctionItem {
        AuctionItem {
            id: 1,
            event_id: 1,
            title: "테스트 상품".to_string(),
            description: String::new(),
            seller_id,
            status: "approved".to_string(),
            starting_bid,
            current_bid: None,
            created_at: Utc::now(),
        }
    }

    fn profile(approved: bool, banned: bool) -> BidderProfile {
        BidderProfile {
            id: 7,
            approved,
            banned,
        }
    }

    #[test]
    fn anonymous_caller_is_rejected_first() {
        let s = schedule();
        let err = validate(
            None,
            None,
            &item(100, None),
            &live_event(),
            Ok(&s),
            None,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::Unauthenticated);
    }

    #[test]
    fn banned_wins_over_not_approved() {
        let s = schedule();
        let p = profile(false, true);
        let err = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &live_event(),
            Ok(&s),
            None,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::Banned);
    }

    #[test]
    fn unapproved_profile_is_rejected() {
        let s = schedule();
        let p = profile(false, false);
        let err = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &live_event(),
            Ok(&s),
            None,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::NotApproved);
    }

    #[test]
    fn seller_cannot_bid_on_own_item() {
        let s = schedule();
        let p = profile(true, false);
        let err = validate(
            Some(7),
            Some(&p),
            &item(100, Some(7)),
            &live_event(),
            Ok(&s),
            None,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::SelfBid);
    }

    #[test]
    fn scheduled_event_rejects_with_not_started() {
        let s = schedule();
        let p = profile(true, false);
        let now = Utc::now();
        let mut event = live_event();
        event.starts_at = Some(now + Duration::minutes(5));
        let err = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &event,
            Ok(&s),
            None,
            None,
            now,
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::NotStarted);
    }

    #[test]
    fn ended_event_rejects_even_when_status_cache_says_live() {
        let s = schedule();
        let p = profile(true, false);
        let now = Utc::now();
        let mut event = live_event();
        event.status = "live".to_string(); // 캐시가 낡은 경우
        event.ends_at = Some(now - Duration::seconds(1));
        let err = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &event,
            Ok(&s),
            None,
            None,
            now,
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::AlreadyEnded);
    }

    #[test]
    fn malformed_schedule_fails_closed_before_price_check() {
        let p = profile(true, false);
        let tier_err = TierError::Gap(100, 200);
        let err = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &live_event(),
            Err(&tier_err),
            None,
            Some(1_000_000),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::IncrementConfig);
    }

    #[test]
    fn one_click_first_bid_takes_starting_bid() {
        let s = schedule();
        let p = profile(true, false);
        let accepted = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &live_event(),
            Ok(&s),
            None,
            None,
            Utc::now(),
        )
        .unwrap();
        // 첫 입찰은 시작가 그대로, 105 가 아니다
        assert_eq!(accepted.amount, 100);
        assert_eq!(accepted.next_minimum, 105);
    }

    #[test]
    fn one_click_follow_up_takes_next_tier() {
        let s = schedule();
        let p = profile(true, false);
        let accepted = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &live_event(),
            Ok(&s),
            Some(100),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(accepted.amount, 105);
        assert_eq!(accepted.next_minimum, 110);
    }

    #[test]
    fn explicit_amount_below_minimum_is_too_low_with_retry_hint() {
        let s = schedule();
        let p = profile(true, false);
        let err = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &live_event(),
            Ok(&s),
            Some(105),
            Some(105),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, BidRejection::BidTooLow { minimum: 110 });
        assert_eq!(err.minimum(), Some(110));
    }

    #[test]
    fn explicit_amount_at_or_above_minimum_is_kept_verbatim() {
        let s = schedule();
        let p = profile(true, false);
        let accepted = validate(
            Some(7),
            Some(&p),
            &item(100, None),
            &live_event(),
            Ok(&s),
            Some(100),
            Some(150),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(accepted.amount, 150);
        assert_eq!(accepted.next_minimum, 155);
    }
}

// endregion: --- Tests
