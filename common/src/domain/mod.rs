use std::fmt::{self, Display};
use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod access;
pub mod roles;
pub mod status;
pub mod tables;

pub use access::{AccessCategory, AccessContext, AccessDecision, RouteTarget};
pub use roles::{Role, UnknownRole};
pub use status::{SubmissionStatus, UnknownStatus};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Wrapper to prevent ID confusion
    UserId
);
record_id!(PublicationId);
record_id!(SubmissionId);
record_id!(ContentId);
record_id!(CommentId);
record_id!(StyleCriteriaId);
record_id!(NotificationId);

/// Publication names are trimmed before they are validated and persisted.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct PublicationName(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 512),
    derive(Clone, Debug, Display, AsRef, PartialEq, Eq, Serialize, Deserialize)
)]
pub struct SubmissionTitle(String);

// Usernames are derived from email local parts, so the same punctuation is allowed.
const USERNAME_REGEX: &str = r"^[A-Za-z0-9_.+\-]+$";

static USERNAME_REGEX_COMPILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(USERNAME_REGEX).expect("USERNAME_REGEX must be a valid regex")
});

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256, regex = USERNAME_REGEX_COMPILED),
    derive(Clone, Debug, Display, AsRef, PartialEq, Eq, Hash, Serialize, Deserialize)
)]
pub struct Username(String);

pub fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Emails are stored lowercase, whatever the caller supplied.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 256, predicate = is_email),
    derive(Clone, Debug, Display, AsRef, PartialEq, Eq, Hash, Serialize, Deserialize)
)]
pub struct Email(String);

impl Email {
    /// Part of the address before `@`
    pub fn local_part(&self) -> &str {
        self.as_ref().split('@').next().unwrap_or_default()
    }
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 20),
    derive(Clone, Debug, Display, AsRef, PartialEq, Eq, Serialize, Deserialize)
)]
pub struct CriteriaName(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_name_is_trimmed() {
        let name = PublicationName::try_new("  Journal of Tests \n").unwrap();
        assert_eq!(name.as_ref(), "Journal of Tests");
    }

    #[test]
    fn blank_publication_name_is_rejected() {
        assert!(PublicationName::try_new("   ").is_err());
        assert!(PublicationName::try_new("x".repeat(257)).is_err());
    }

    #[test]
    fn email_is_lowercased() {
        let email = Email::try_new("Jane.Doe@Example.ORG").unwrap();
        assert_eq!(email.as_ref(), "jane.doe@example.org");
        assert_eq!(email.local_part(), "jane.doe");
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert!(Email::try_new("no-at-sign").is_err());
        assert!(Email::try_new("@example.org").is_err());
        assert!(Email::try_new("a@b@c").is_err());
    }

    #[test]
    fn usernames_reject_spaces_and_markup() {
        assert!(Username::try_new("jane.doe_x7").is_ok());
        assert!(Username::try_new("jane doe").is_err());
        assert!(Username::try_new("<script>").is_err());
    }

    #[test]
    fn submission_title_limit() {
        assert!(SubmissionTitle::try_new("x".repeat(512)).is_ok());
        assert!(SubmissionTitle::try_new("x".repeat(513)).is_err());
    }
}
