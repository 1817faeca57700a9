//! CSRF tokens
//!
//! Tokens are generated per request and carried explicitly on the
//! request/response context, never in ambient state. Comparison is
//! constant-time.

use rand::Rng;

pub fn generate_csrf_token() -> String {
    let token: [u8; 32] = rand::rng().random();
    hex::encode(token)
}

pub fn validate_csrf_token(token: &str, expected: &str) -> bool {
    if token.len() != expected.len() {
        return false;
    }
    token
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_csrf_token(), generate_csrf_token());
    }

    #[test]
    fn validates_matching_tokens() {
        let token = generate_csrf_token();
        assert!(validate_csrf_token(&token, &token));
        assert!(!validate_csrf_token(&token, &generate_csrf_token()));
        assert!(!validate_csrf_token(&token, "short"));
    }
}
