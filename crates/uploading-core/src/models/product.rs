use serde::{Deserialize, Serialize};

/// Host product row, read only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub slug: String,
}
