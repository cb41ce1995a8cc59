//! Field validation shared by every model.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for `Group::title`.
pub const GROUP_TITLE_MAX_CHARS: usize = 200;
/// Upper bound for `User::username`.
pub const USERNAME_MAX_CHARS: usize = 150;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Model-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUsername,
    InvalidUsername(String),
    UsernameTooLong { chars: usize },
    EmptySlug,
    InvalidSlug(String),
    EmptyTitle,
    TitleTooLong { chars: usize },
    EmptyText,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::InvalidUsername(value) => {
                write!(f, "username `{value}` may only contain letters, digits and @.+-_")
            }
            Self::UsernameTooLong { chars } => write!(
                f,
                "username has {chars} chars, at most {USERNAME_MAX_CHARS} allowed"
            ),
            Self::EmptySlug => write!(f, "group slug must not be empty"),
            Self::InvalidSlug(value) => {
                write!(f, "group slug `{value}` may only contain letters, digits, - and _")
            }
            Self::EmptyTitle => write!(f, "group title must not be blank"),
            Self::TitleTooLong { chars } => write!(
                f,
                "group title has {chars} chars, at most {GROUP_TITLE_MAX_CHARS} allowed"
            ),
            Self::EmptyText => write!(f, "post text must not be blank"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    let chars = username.chars().count();
    if chars > USERNAME_MAX_CHARS {
        return Err(ValidationError::UsernameTooLong { chars });
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::EmptySlug);
    }
    if !SLUG_RE.is_match(slug) {
        return Err(ValidationError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let chars = title.chars().count();
    if chars > GROUP_TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong { chars });
    }
    Ok(())
}

pub(crate) fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_slug, validate_text, validate_title, validate_username, ValidationError};

    #[test]
    fn username_accepts_auth_charset_and_rejects_spaces() {
        assert!(validate_username("author_3").is_ok());
        assert!(validate_username("leo.tolstoy+blog@home-1").is_ok());
        assert!(validate_username("Автор").is_ok());
        assert!(matches!(
            validate_username("has space"),
            Err(ValidationError::InvalidUsername(_))
        ));
        assert_eq!(validate_username(""), Err(ValidationError::EmptyUsername));
    }

    #[test]
    fn username_length_is_capped() {
        let long = "a".repeat(151);
        assert_eq!(
            validate_username(&long),
            Err(ValidationError::UsernameTooLong { chars: 151 })
        );
    }

    #[test]
    fn slug_is_ascii_word_or_dash() {
        assert!(validate_slug("group_test-1").is_ok());
        assert_eq!(validate_slug(""), Err(ValidationError::EmptySlug));
        assert!(matches!(
            validate_slug("группа"),
            Err(ValidationError::InvalidSlug(_))
        ));
    }

    #[test]
    fn title_must_be_non_blank_and_bounded() {
        assert!(validate_title("Первая тестовая группа").is_ok());
        assert_eq!(validate_title("   "), Err(ValidationError::EmptyTitle));
        assert_eq!(
            validate_title(&"x".repeat(201)),
            Err(ValidationError::TitleTooLong { chars: 201 })
        );
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        assert_eq!(validate_text(" \n\t"), Err(ValidationError::EmptyText));
        assert!(validate_text("Тестовый пост").is_ok());
    }
}
