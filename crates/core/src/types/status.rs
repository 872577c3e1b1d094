//! Status enums for shelf entries, memberships, friendships and admins.
//!
//! Each enum serializes in `snake_case` (form values, session payloads) and
//! displays with its human-readable label. With the `postgres` feature they
//! map onto the matching `PostgreSQL` enum types.

use serde::{Deserialize, Serialize};

/// Reading status of a bookshelf entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "library.reading_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    #[default]
    WantToRead,
    Reading,
    Read,
}

impl ReadingStatus {
    /// All statuses in shelf display order.
    pub const ALL: [Self; 3] = [Self::WantToRead, Self::Reading, Self::Read];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WantToRead => "Want to Read",
            Self::Reading => "Reading",
            Self::Read => "Read",
        }
    }

    /// Form/database value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WantToRead => "want_to_read",
            Self::Reading => "reading",
            Self::Read => "read",
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = String;

    /// Accepts both the form value (`want_to_read`) and the label (`Want to Read`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "want_to_read" | "Want to Read" => Ok(Self::WantToRead),
            "reading" | "Reading" => Ok(Self::Reading),
            "read" | "Read" => Ok(Self::Read),
            other => Err(format!("invalid reading status: {other}")),
        }
    }
}

/// How a user possesses a copy of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "library.ownership_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipType {
    #[default]
    Physical,
    Ebook,
    Audiobook,
}

impl OwnershipType {
    /// All ownership types in display order.
    pub const ALL: [Self; 3] = [Self::Physical, Self::Ebook, Self::Audiobook];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Ebook => "E-book",
            Self::Audiobook => "Audiobook",
        }
    }

    /// Form/database value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Ebook => "ebook",
            Self::Audiobook => "audiobook",
        }
    }
}

impl std::fmt::Display for OwnershipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OwnershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "physical" | "Physical" => Ok(Self::Physical),
            "ebook" | "E-book" => Ok(Self::Ebook),
            "audiobook" | "Audiobook" => Ok(Self::Audiobook),
            other => Err(format!("invalid ownership type: {other}")),
        }
    }
}

/// A member's role within a book club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "library.club_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ClubRole {
    /// Created the club; cannot leave, may delete it.
    Owner,
    Member,
}

impl std::fmt::Display for ClubRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Member => write!(f, "member"),
        }
    }
}

/// State of a friendship between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "library.friendship_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

/// Role of a signed-in reader.
///
/// Carried in the session context; readers and admins authenticate
/// separately, so the web site only ever sees `Member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Member,
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin user management.
    SuperAdmin,
    /// Manages users and the book catalog.
    Admin,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_status_labels() {
        assert_eq!(ReadingStatus::WantToRead.to_string(), "Want to Read");
        assert_eq!(ReadingStatus::Reading.to_string(), "Reading");
        assert_eq!(ReadingStatus::Read.to_string(), "Read");
    }

    #[test]
    fn test_reading_status_parses_form_value_and_label() {
        assert_eq!(
            "want_to_read".parse::<ReadingStatus>().unwrap(),
            ReadingStatus::WantToRead
        );
        assert_eq!(
            "Want to Read".parse::<ReadingStatus>().unwrap(),
            ReadingStatus::WantToRead
        );
        assert!("finished".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn test_reading_status_default_is_want_to_read() {
        assert_eq!(ReadingStatus::default(), ReadingStatus::WantToRead);
    }

    #[test]
    fn test_reading_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&ReadingStatus::WantToRead).unwrap();
        assert_eq!(json, "\"want_to_read\"");
    }

    #[test]
    fn test_ownership_labels_and_default() {
        assert_eq!(OwnershipType::default(), OwnershipType::Physical);
        assert_eq!(OwnershipType::Ebook.label(), "E-book");
        assert_eq!(
            "audiobook".parse::<OwnershipType>().unwrap(),
            OwnershipType::Audiobook
        );
    }

    #[test]
    fn test_admin_role_roundtrip() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin] {
            assert_eq!(role.to_string().parse::<AdminRole>().unwrap(), role);
        }
        assert!("viewer".parse::<AdminRole>().is_err());
    }
}
