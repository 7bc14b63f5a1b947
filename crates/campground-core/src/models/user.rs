use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in user as seen by the upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub display_name: Option<String>,
}

impl SessionUser {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            display_name: None,
        }
    }
}
