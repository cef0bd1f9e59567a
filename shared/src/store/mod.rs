use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::InvitationCode;

pub mod dynamo;

/// Persistence operations for invitation codes, implemented by the DynamoDB
/// store and the in-memory mock used in tests.
#[async_trait]
pub trait InvitationCodeStore: Send + Sync {
    async fn create_code(&self, code: InvitationCode) -> StoreResult<InvitationCode>;

    async fn get_code(&self, id: &str) -> StoreResult<InvitationCode>;

    /// Every code issued for an event, including deactivated ones. Admin
    /// listing only.
    async fn get_codes_by_event(&self, event_id: &str) -> StoreResult<Vec<InvitationCode>>;

    /// Active codes for an event. Expiry and exhaustion are filtered by the
    /// caller; deactivated codes never leave the store on this path.
    async fn get_active_codes_by_event(&self, event_id: &str) -> StoreResult<Vec<InvitationCode>>;

    async fn update_code(&self, code: InvitationCode) -> StoreResult<InvitationCode>;

    /// Consumes one use of a code as a single conditional update: the
    /// increment happens only while the code is active and `current_uses` is
    /// still below `max_uses`. Two callers racing for the last remaining use
    /// cannot both succeed; the loser gets `UsesExhausted`.
    async fn redeem_code_use(&self, id: &str) -> StoreResult<InvitationCode>;
}
