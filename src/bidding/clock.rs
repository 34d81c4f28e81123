/// 경매 시계: 타임스탬프로부터 수명 주기 단계를 도출한다.
/// 저장된 status 컬럼은 표시용 캐시일 뿐, 입찰 게이트는 항상 이 함수를 다시 계산한다.
// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Phase

/// 경매 이벤트 수명 주기 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Draft,
    Scheduled,
    Live,
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Draft => "draft",
            Phase::Scheduled => "scheduled",
            Phase::Live => "live",
            Phase::Ended => "ended",
        }
    }
}

/// 단계 판정
/// 시작/종료 시각이 하나라도 없으면 Draft, 경계는 양쪽 모두 포함(Live)이다.
pub fn phase(
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Phase {
    let (start, end) = match (starts_at, ends_at) {
        (Some(s), Some(e)) => (s, e),
        _ => return Phase::Draft,
    };

    if now < start {
        Phase::Scheduled
    } else if now <= end {
        Phase::Live
    } else {
        Phase::Ended
    }
}

// endregion: --- Phase

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn missing_timestamps_mean_draft() {
        let now = Utc::now();
        assert_eq!(phase(None, None, now), Phase::Draft);
        assert_eq!(phase(Some(now), None, now), Phase::Draft);
        assert_eq!(phase(None, Some(now), now), Phase::Draft);
    }

    #[test]
    fn before_start_is_scheduled() {
        let now = Utc::now();
        let p = phase(
            Some(now + Duration::minutes(1)),
            Some(now + Duration::hours(1)),
            now,
        );
        assert_eq!(p, Phase::Scheduled);
    }

    #[test]
    fn both_edges_are_live() {
        let now = Utc::now();
        // 시작 시각 정각
        assert_eq!(
            phase(Some(now), Some(now + Duration::hours(1)), now),
            Phase::Live
        );
        // 종료 시각 정각
        assert_eq!(
            phase(Some(now - Duration::hours(1)), Some(now), now),
            Phase::Live
        );
    }

    #[test]
    fn past_end_is_ended() {
        let now = Utc::now();
        let p = phase(
            Some(now - Duration::hours(2)),
            Some(now - Duration::seconds(1)),
            now,
        );
        assert_eq!(p, Phase::Ended);
    }
}

// endregion: --- Tests
