use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity verified upstream and handed to the engine at attempt start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
