use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::models::{now_str, InvitationCode};
use crate::store::InvitationCodeStore;

/// In-memory invitation code store for tests. The redeem guard runs under the
/// same mutex as the read, so concurrent redemptions observe the same
/// exactly-once semantics as the conditional update in DynamoDB.
pub struct MockCodeStore {
    codes: Mutex<HashMap<String, InvitationCode>>,
}

impl MockCodeStore {
    pub fn new() -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MockCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvitationCodeStore for MockCodeStore {
    async fn create_code(&self, code: InvitationCode) -> StoreResult<InvitationCode> {
        let mut codes = self.codes.lock().unwrap();
        codes.insert(code.id.clone(), code.clone());
        Ok(code)
    }

    async fn get_code(&self, id: &str) -> StoreResult<InvitationCode> {
        let codes = self.codes.lock().unwrap();
        codes
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Invitation code {} not found", id)))
    }

    async fn get_codes_by_event(&self, event_id: &str) -> StoreResult<Vec<InvitationCode>> {
        let codes = self.codes.lock().unwrap();
        Ok(codes
            .values()
            .filter(|code| code.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn get_active_codes_by_event(&self, event_id: &str) -> StoreResult<Vec<InvitationCode>> {
        let codes = self.codes.lock().unwrap();
        Ok(codes
            .values()
            .filter(|code| code.event_id == event_id && code.active)
            .cloned()
            .collect())
    }

    async fn update_code(&self, code: InvitationCode) -> StoreResult<InvitationCode> {
        let mut codes = self.codes.lock().unwrap();
        if !codes.contains_key(&code.id) {
            return Err(StoreError::NotFound(format!(
                "Invitation code {} not found",
                code.id
            )));
        }
        codes.insert(code.id.clone(), code.clone());
        Ok(code)
    }

    async fn redeem_code_use(&self, id: &str) -> StoreResult<InvitationCode> {
        let mut codes = self.codes.lock().unwrap();
        let code = codes
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("Invitation code {} not found", id)))?;

        // Check and increment under one lock, matching the DynamoDB
        // conditional update.
        if !code.active || code.current_uses >= code.max_uses {
            return Err(StoreError::UsesExhausted);
        }

        code.current_uses += 1;
        code.updated_at = now_str();

        Ok(code.clone())
    }
}
