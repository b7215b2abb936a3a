use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A link as it exists between the initial insert and the code write-back.
///
/// The store hands one of these out of `create`; it carries no short code
/// and cannot be resolved. [`PendingLink::with_code`] is the only way to
/// turn it into a [`Link`], which keeps the two-phase creation protocol
/// visible in the types.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PendingLink {
    pub id: i64,
    pub original_url: String,
    pub created_at: i64,
}

impl PendingLink {
    pub fn with_code(self, short_code: String) -> Link {
        Link {
            id: self.id,
            original_url: self.original_url,
            short_code,
            created_at: self.created_at,
        }
    }
}

/// A fully created, resolvable link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Link {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: i64,
}
