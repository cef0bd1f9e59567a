use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current time as an RFC3339 string, the format used for every timestamp
/// persisted by this workspace.
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

/// A stored invitation code gating registration for an event. Only the salted
/// hash of the code is persisted; the plaintext is discarded at issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationCode {
    pub id: String,
    pub event_id: String,
    /// `"<salt_hex>:<derived_key_hex>"`, see the crypto module.
    pub code_hash: String,
    pub max_uses: u32,
    pub current_uses: u32,
    /// RFC3339; `None` means the code never expires.
    pub expires_at: Option<String>,
    pub active: bool,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl InvitationCode {
    /// A code is usable when it is active, has uses left, and has not reached
    /// its expiry. The expiry comparison is strict: a code whose `expires_at`
    /// equals `now` is already expired. An unparseable expiry makes the code
    /// unusable.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        if !self.active || self.current_uses >= self.max_uses {
            return false;
        }

        match &self.expires_at {
            None => true,
            Some(expires_at) => match DateTime::parse_from_rfc3339(expires_at) {
                Ok(dt) => dt.with_timezone(&Utc) > now,
                Err(_) => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_code(max_uses: u32, current_uses: u32, expires_at: Option<String>) -> InvitationCode {
        let now = now_str();
        InvitationCode {
            id: "code-1".to_string(),
            event_id: "event-1".to_string(),
            code_hash: "00:00".to_string(),
            max_uses,
            current_uses,
            expires_at,
            active: true,
            created_by: "admin-1".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[test]
    fn test_usable_without_expiry() {
        let code = test_code(1, 0, None);
        assert!(code.is_usable_at(Utc::now()));
    }

    #[test]
    fn test_usable_before_expiry() {
        let now = Utc::now();
        let code = test_code(1, 0, Some((now + Duration::hours(1)).to_rfc3339()));
        assert!(code.is_usable_at(now));
    }

    #[test]
    fn test_expiry_at_exact_now_is_expired() {
        let now = Utc::now();
        let code = test_code(1, 0, Some(now.to_rfc3339()));
        assert!(!code.is_usable_at(now));
    }

    #[test]
    fn test_expired_code_is_not_usable() {
        let now = Utc::now();
        let code = test_code(1, 0, Some((now - Duration::hours(1)).to_rfc3339()));
        assert!(!code.is_usable_at(now));
    }

    #[test]
    fn test_unparseable_expiry_is_not_usable() {
        let code = test_code(1, 0, Some("next week".to_string()));
        assert!(!code.is_usable_at(Utc::now()));
    }

    #[test]
    fn test_exhausted_code_is_not_usable() {
        let code = test_code(3, 3, None);
        assert!(!code.is_usable_at(Utc::now()));
    }

    #[test]
    fn test_one_use_remaining_is_usable() {
        let code = test_code(3, 2, None);
        assert!(code.is_usable_at(Utc::now()));
    }

    #[test]
    fn test_inactive_code_is_not_usable() {
        let mut code = test_code(1, 0, None);
        code.active = false;
        assert!(!code.is_usable_at(Utc::now()));
    }
}
