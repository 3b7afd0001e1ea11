use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NewsdeskError;

pub const CONFIG_DIR: &str = ".newsdesk";

/// Opaque backend token meaning "resume after this item".
///
/// The first page has no cursor; it is represented as `Option<Cursor>::None`
/// wherever a cursor can be absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Cursor(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Cursor(s.to_string())
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Cursor(s)
    }
}

/// Kind of foreign entity referenced from listing items.
///
/// Each kind lives in its own backend collection and gets its own
/// resolution cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Organisation,
    Creator,
    Category,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Organisation,
        EntityKind::Creator,
        EntityKind::Category,
    ];

    /// Collection path segment for the batch lookup endpoint
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Organisation => "organisations",
            EntityKind::Creator => "users",
            EntityKind::Category => "categories",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Organisation => write!(f, "organisation"),
            EntityKind::Creator => write!(f, "creator"),
            EntityKind::Category => write!(f, "category"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = NewsdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "organisation" | "organization" => Ok(EntityKind::Organisation),
            "creator" | "user" => Ok(EntityKind::Creator),
            "category" => Ok(EntityKind::Category),
            _ => Err(NewsdeskError::InvalidValue("entity kind", s.to_string())),
        }
    }
}

/// A foreign-key reference found on a listing item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForeignRef {
    pub kind: EntityKind,
    pub id: String,
}

impl ForeignRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn organisation(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Organisation, id)
    }

    pub fn creator(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Creator, id)
    }

    pub fn category(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Category, id)
    }
}

/// Display attributes returned by a batch lookup.
///
/// Fields other than `id` and `displayName` are kept as-is so adapters can
/// show auxiliary details (logo URL, email, ...) without a schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntity {
    pub id: String,
    pub display_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ResolvedEntity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            extra: serde_json::Map::new(),
        }
    }
}
