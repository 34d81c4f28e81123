/// 경매 이벤트 조회
pub const GET_EVENT: &str = "SELECT id, title, status, starts_at, ends_at, soft_close_window_secs, soft_close_extend_secs, increment_table_id, created_at FROM auction_events WHERE id = $1";

/// 상품 조회
pub const GET_ITEM: &str = "SELECT id, event_id, title, description, seller_id, status, starting_bid, current_bid, created_at FROM auction_items WHERE id = $1";

/// 모든 상품 조회
pub const GET_ALL_ITEMS: &str = "SELECT id, event_id, title, description, seller_id, status, starting_bid, current_bid, created_at FROM auction_items ORDER BY created_at DESC";

/// 최고 입찰 조회 (동액은 먼저 생성된 입찰 우선)
pub const GET_TOP_BID: &str = r#"
    SELECT id, item_id, bidder_id, amount, created_at
    FROM bids
    WHERE item_id = $1
    ORDER BY amount DESC, created_at ASC
    LIMIT 1
"#;

/// 최고 입찰가 조회
pub const GET_TOP_AMOUNT: &str = "SELECT MAX(amount) FROM bids WHERE item_id = $1";

/// 입찰 이력 조회 (최신순)
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, item_id, bidder_id, amount, created_at
    FROM bids
    WHERE item_id = $1
    ORDER BY created_at DESC, id DESC
"#;

/// 이벤트의 호가 구간 조회
pub const GET_TIERS: &str = "SELECT table_id, min_amount, max_amount, increment FROM increment_tiers WHERE table_id = $1 ORDER BY min_amount ASC";

/// 상품 행 잠금 (같은 상품에 대한 입찰 직렬화)
pub const LOCK_ITEM: &str = "SELECT id FROM auction_items WHERE id = $1 FOR UPDATE";

/// 이벤트 행 잠금 및 종료 시각 재확인
pub const LOCK_EVENT_ENDS_AT: &str = "SELECT ends_at FROM auction_events WHERE id = $1 FOR UPDATE";

/// 입찰 추가 (동일 금액 중복은 유니크 제약으로 차단)
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (item_id, bidder_id, amount, created_at)
    VALUES ($1, $2, $3, clock_timestamp())
    ON CONFLICT (item_id, amount) DO NOTHING
    RETURNING id, item_id, bidder_id, amount, created_at
"#;

/// current_bid 미러 갱신
pub const UPDATE_CURRENT_BID: &str = "UPDATE auction_items SET current_bid = $1 WHERE id = $2";

/// 종료 시각 연장 (뒤로만 이동)
pub const EXTEND_EVENT: &str =
    "UPDATE auction_events SET ends_at = GREATEST(ends_at, $1) WHERE id = $2";

/// 입찰자 프로필 조회
pub const GET_PROFILE: &str = "SELECT id, approved, banned FROM user_profiles WHERE id = $1";
