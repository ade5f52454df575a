/// Short one-time codes for email verification and password reset
///
/// Codes are 5 lowercase hex characters, drawn uniformly from
/// `[0, 0xFFFFF]` and zero-padded. The key space is about one million, so a
/// code is only meaningful together with the email it was issued for and
/// before its expiry.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::tokens::{generate_short_token, is_short_token};
///
/// let code = generate_short_token();
/// assert_eq!(code.len(), 5);
/// assert!(is_short_token(&code));
/// ```

use chrono::Duration;
use rand::Rng;

/// Length of a short token in characters
pub const SHORT_TOKEN_LENGTH: usize = 5;

/// Largest value a short token can encode
const SHORT_TOKEN_MAX: u32 = 0xFFFFF;

/// Lifetime of an email verification token
pub fn verification_token_ttl() -> Duration {
    Duration::days(7)
}

/// Lifetime of a password reset token
pub fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Generates a 5-character lowercase hex token
pub fn generate_short_token() -> String {
    let value = rand::thread_rng().gen_range(0..=SHORT_TOKEN_MAX);
    format!("{:05x}", value)
}

/// Checks that a string is exactly 5 lowercase hex characters
pub fn is_short_token(token: &str) -> bool {
    token.len() == SHORT_TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
