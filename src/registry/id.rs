//! Provider identifiers are slugs: they end up in file names and URLs.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum IdError {
    #[error("provider id is empty")]
    Empty,
    #[error("provider id \"{0}\" may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter(String),
    #[error("provider id \"{0}\" may not start or end with a hyphen")]
    EdgeHyphen(String),
    #[error("provider id \"{0}\" may not contain consecutive hyphens")]
    DoubleHyphen(String),
}

pub(crate) fn validate_id(id: &str) -> Result<(), IdError> {
    if id.is_empty() {
        return Err(IdError::Empty);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(IdError::InvalidCharacter(id.to_string()));
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(IdError::EdgeHyphen(id.to_string()));
    }

    if id.contains("--") {
        return Err(IdError::DoubleHyphen(id.to_string()));
    }

    Ok(())
}

/// Derives a valid id from a display name, e.g. "My Gateway (EU)" becomes
/// "my-gateway-eu". Returns `None` when the name has nothing usable.
pub(crate) fn slug_from_name(name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
