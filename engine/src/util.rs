//! Small helpers for ids and timestamps.

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `len` random characters from `[0-9a-z]`. Not suitable for secrets.
pub(crate) fn random_base36(len: usize) -> String {
    (0..len)
        .map(|_| {
            let idx = (rand::random::<u32>() % 36) as usize;
            char::from(BASE36[idx])
        })
        .collect()
}

/// Current wall clock as Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
