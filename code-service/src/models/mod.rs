use lumina_shared::models::InvitationCode;
use serde::{Deserialize, Serialize};

// Request DTOs
#[derive(Deserialize, Debug)]
pub struct CreateCodeRequest {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub code: String,
    #[serde(rename = "maxUses")]
    pub max_uses: u32,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RedeemCodeRequest {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub code: String,
}

// Response DTOs
/// Invitation code as returned to the admin UI. The stored hash never leaves
/// the service.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponse {
    pub id: String,
    pub event_id: String,
    pub max_uses: u32,
    pub current_uses: u32,
    pub expires_at: Option<String>,
    pub active: bool,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<InvitationCode> for CodeResponse {
    fn from(code: InvitationCode) -> Self {
        CodeResponse {
            id: code.id,
            event_id: code.event_id,
            max_uses: code.max_uses,
            current_uses: code.current_uses,
            expires_at: code.expires_at,
            active: code.active,
            created_by: code.created_by,
            created_at: code.created_at,
            updated_at: code.updated_at,
        }
    }
}
