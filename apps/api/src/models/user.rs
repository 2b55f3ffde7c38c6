use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A stored user account as the job store returns it.
///
/// `profile` is the loosely-typed document the profile editor writes: any
/// nested field may be missing, `null`, or of an unexpected type. Only
/// `recommendation::profile` interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub email: String,
    pub name: Option<String>,
    pub profile: Option<Value>,
}
