//! Record identifier generation.

use rand::Rng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const PREFIX_LEN: usize = 8;

/// Generate a record identifier: a random lowercase-alphanumeric prefix,
/// a `-` separator, then the current epoch time in milliseconds.
///
/// No lookup against existing ids is performed. A clash requires the same
/// prefix in the same millisecond; callers surface that residual case
/// through the store's uniqueness constraint.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let prefix: String = (0..PREFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{prefix}-{}", chrono::Utc::now().timestamp_millis())
}
