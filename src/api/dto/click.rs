//! DTOs for click registration endpoint.

use serde::{Deserialize, Serialize};

/// Response after a click was counted.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClickResponse {
    pub success: bool,
    pub clicks: i64,
}
