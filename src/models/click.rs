use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recorded redirect event. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: i64,
}

/// A click event as captured on the redirect path, before persistence.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
