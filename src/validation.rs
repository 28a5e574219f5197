//! Contact form validation, applied before a submission ever reaches the
//! game flow. Mirrors the client-side rules: a loose email shape and a
//! 10-character-minimum phone shape.

/// Errors reported back to the form
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhone,
}

/// Loose shape check: `non-space @ non-space . non-space`. Deliverability is
/// not this layer's problem.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let has_space = email.chars().any(|c| c.is_whitespace());
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || host.is_empty() || tld.is_empty() || has_space || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// At least ten characters, all drawn from digits, spaces, `+`, `(`, `)`, `-`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '(' | ')' | '-');
    if phone.chars().count() < 10 || !phone.chars().all(allowed) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}
