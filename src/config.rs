/// 환경 변수 기반 서비스 설정
// region:    --- Imports
use serde::Deserialize;
use thiserror::Error;

use crate::bidding::increment::{IncrementSchedule, TierError};

// endregion: --- Imports

// region:    --- Defaults

/// 플랫폼 기본 소프트 클로즈 창/연장 (2분)
pub const DEFAULT_SOFT_CLOSE_WINDOW_SECS: i64 = 120;
pub const DEFAULT_SOFT_CLOSE_EXTEND_SECS: i64 = 120;

/// 커밋 충돌 재시도 한도
pub const DEFAULT_BID_COMMIT_RETRIES: u32 = 100;

/// 플랫폼 기본 호가 구간 (이벤트에 호가 테이블이 없을 때 사용)
pub fn default_increment_bounds() -> Vec<(i64, Option<i64>, i64)> {
    vec![
        (0, Some(20), 1),
        (20, Some(50), 2),
        (50, Some(200), 5),
        (200, Some(500), 10),
        (500, Some(1_000), 25),
        (1_000, Some(5_000), 50),
        (5_000, Some(10_000), 100),
        (10_000, Some(25_000), 250),
        (25_000, Some(50_000), 500),
        (50_000, None, 1_000),
    ]
}

// endregion: --- Defaults

// region:    --- Config Error

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("환경 변수가 설정되지 않았습니다: {0}")]
    MissingVar(&'static str),
    #[error("환경 변수 값이 잘못되었습니다: {0}={1}")]
    InvalidVar(&'static str, String),
    #[error("DEFAULT_INCREMENT_TIERS 파싱 실패: {0}")]
    ParseTiers(#[from] serde_json::Error),
    #[error("기본 호가 구간이 잘못되었습니다: {0}")]
    InvalidTiers(#[from] TierError),
}

// endregion: --- Config Error

// region:    --- Bid Policy

/// 입찰 경로에 전달되는 정책 값
#[derive(Debug, Clone)]
pub struct BidPolicy {
    pub soft_close_window_secs: i64,
    pub soft_close_extend_secs: i64,
    pub commit_retries: u32,
    pub default_schedule: IncrementSchedule,
}

impl Default for BidPolicy {
    fn default() -> Self {
        Self {
            soft_close_window_secs: DEFAULT_SOFT_CLOSE_WINDOW_SECS,
            soft_close_extend_secs: DEFAULT_SOFT_CLOSE_EXTEND_SECS,
            commit_retries: DEFAULT_BID_COMMIT_RETRIES,
            default_schedule: IncrementSchedule::from_bounds(default_increment_bounds())
                .expect("기본 호가 구간은 항상 유효해야 합니다"),
        }
    }
}

// endregion: --- Bid Policy

// region:    --- Config

/// DEFAULT_INCREMENT_TIERS JSON 항목
#[derive(Debug, Deserialize)]
struct TierSpec {
    min: i64,
    #[serde(default)]
    max: Option<i64>,
    inc: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub kafka_brokers: String,
    pub bind_addr: String,
    pub notice_topic: String,
    pub recreate_db: bool,
    pub policy: BidPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let kafka_brokers =
            std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let notice_topic =
            std::env::var("NOTICE_TOPIC").unwrap_or_else(|_| "bid-notices".to_string());
        let recreate_db = parse_bool("RECREATE_DB", false)?;

        let default_schedule = match std::env::var("DEFAULT_INCREMENT_TIERS") {
            Ok(raw) => {
                let specs: Vec<TierSpec> = serde_json::from_str(&raw)?;
                IncrementSchedule::from_bounds(specs.into_iter().map(|s| (s.min, s.max, s.inc)))?
            }
            Err(_) => IncrementSchedule::from_bounds(default_increment_bounds())?,
        };

        let policy = BidPolicy {
            soft_close_window_secs: parse_i64(
                "SOFT_CLOSE_WINDOW_SECS",
                DEFAULT_SOFT_CLOSE_WINDOW_SECS,
            )?,
            soft_close_extend_secs: parse_i64(
                "SOFT_CLOSE_EXTEND_SECS",
                DEFAULT_SOFT_CLOSE_EXTEND_SECS,
            )?,
            commit_retries: parse_i64("BID_COMMIT_RETRIES", DEFAULT_BID_COMMIT_RETRIES as i64)?
                as u32,
            default_schedule,
        };

        Ok(Self {
            database_url,
            kafka_brokers,
            bind_addr,
            notice_topic,
            recreate_db,
            policy,
        })
    }
}

fn parse_i64(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidVar(name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => match raw.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidVar(name, raw)),
        },
        Err(_) => Ok(default),
    }
}

// endregion: --- Config
