/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Maximum accepted length for record IDs.
///
/// The identity columns are TEXT, so nothing truncates at the storage
/// layer; the cap exists so an oversized ID is rejected up front instead
/// of silently diverging from what a narrower remote column would keep.
pub const MAX_ID_LEN: usize = 64;

/// Generate an opaque string record ID.
///
/// Layout: millisecond UTC timestamp in decimal followed by 8 random
/// base36 characters. Sorts roughly by creation time and is collision-free
/// at single-user entry rates.
///
/// Used by quote-server for product, price-history and config rows;
/// clients may supply their own IDs of the same shape.
pub fn record_id() -> String {
    use rand::Rng;
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}", now_millis(), suffix)
}
