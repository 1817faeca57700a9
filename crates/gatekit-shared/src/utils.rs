//! Utility functions

/// Masks the local part of an email address for log output. Keeps at most
/// the first two characters, never slicing inside a multibyte character.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            // Short locals keep a single character so the mask hides something.
            let visible = if local.chars().count() <= 2 { 1 } else { 2 };
            let prefix: String = local.chars().take(visible).collect();
            format!("{}***@{}", prefix, domain)
        }
        None => "***".to_string(),
    }
}
