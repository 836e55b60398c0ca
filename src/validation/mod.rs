//! Request validation helpers.

use uuid::Uuid;

/// Check an email address against a simple structural pattern.
///
/// Intentionally loose: one `@`, a non-empty local part, and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.len() > 254 || email.contains(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Check that a string has UUID v4 shape.
pub fn is_uuid_v4(id: &str) -> bool {
    match Uuid::try_parse(id) {
        Ok(uuid) => uuid.get_version_num() == 4,
        Err(_) => false,
    }
}
