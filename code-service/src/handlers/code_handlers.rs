use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CodeResponse, CreateCodeRequest, RedeemCodeRequest};
// Import models and the hasher from the shared crate
use lumina_shared::crypto::{hash_code, verify_code};
use lumina_shared::models::{now_str, InvitationCode};
use lumina_shared::store::InvitationCodeStore;

/// The one user-facing message for every failed redemption. Wrong code,
/// expired code, exhausted code, and "no codes issued" must stay
/// indistinguishable from outside.
const REDEMPTION_REJECTED: &str = "Invalid invitation code or no available slots";

const MIN_CODE_LEN: usize = 4;
const MAX_CODE_LEN: usize = 50;

// POST /codes
pub async fn create_code<S>(
    State(store): State<Arc<S>>,
    Extension(user_id): Extension<String>,
    Json(payload): Json<CreateCodeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: InvitationCodeStore,
{
    if payload.event_id.is_empty() {
        return Err(AppError::bad_request("eventId must not be empty".into()));
    }

    let code_len = payload.code.chars().count();
    if code_len < MIN_CODE_LEN || code_len > MAX_CODE_LEN {
        return Err(AppError::bad_request(format!(
            "Invitation code must be between {} and {} characters",
            MIN_CODE_LEN, MAX_CODE_LEN
        )));
    }

    if payload.max_uses == 0 {
        return Err(AppError::bad_request("maxUses must be at least 1".into()));
    }

    if let Some(expires_at) = &payload.expires_at {
        if DateTime::parse_from_rfc3339(expires_at).is_err() {
            return Err(AppError::bad_request(
                "expiresAt must be an RFC3339 timestamp".into(),
            ));
        }
    }

    // The plaintext is only needed long enough to derive the hash.
    let hashed = hash_code(&payload.code);

    let now = now_str();
    let new_code = InvitationCode {
        id: Uuid::new_v4().to_string(),
        event_id: payload.event_id,
        code_hash: hashed.hash,
        max_uses: payload.max_uses,
        current_uses: 0,
        expires_at: payload.expires_at,
        active: true,
        created_by: user_id,
        created_at: now.clone(),
        updated_at: now,
    };

    let created = store.create_code(new_code).await?;

    info!(
        "Issued invitation code {} for event {}",
        created.id, created.event_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "code": CodeResponse::from(created) })),
    ))
}

// GET /events/:event_id/codes
pub async fn get_event_codes<S>(
    State(store): State<Arc<S>>,
    Path(event_id): Path<String>,
    Extension(_user_id): Extension<String>,
) -> Result<Json<serde_json::Value>>
where
    S: InvitationCodeStore,
{
    let codes = store.get_codes_by_event(&event_id).await?;

    let codes: Vec<_> = codes.into_iter().map(CodeResponse::from).collect();

    Ok(Json(serde_json::json!({ "codes": codes })))
}

// PATCH /codes/:id/deactivate
pub async fn deactivate_code<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
    Extension(user_id): Extension<String>,
) -> Result<Json<serde_json::Value>>
where
    S: InvitationCodeStore,
{
    let mut code = store.get_code(&id).await?;

    if code.created_by != user_id {
        return Err(AppError::forbidden(
            "You don't have permission to deactivate this code".into(),
        ));
    }

    // Deactivation is idempotent; report the current state
    if !code.active {
        return Ok(Json(serde_json::json!({
            "message": "Invitation code already deactivated",
            "code": CodeResponse::from(code)
        })));
    }

    code.active = false;
    code.updated_at = now_str();

    let updated = store.update_code(code).await?;

    info!("Deactivated invitation code {}", updated.id);

    Ok(Json(serde_json::json!({
        "message": "Invitation code deactivated",
        "code": CodeResponse::from(updated)
    })))
}

// POST /codes/redeem
pub async fn redeem_code<S>(
    State(store): State<Arc<S>>,
    Extension(user_id): Extension<String>,
    Json(payload): Json<RedeemCodeRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: InvitationCodeStore,
{
    let candidates = match store.get_active_codes_by_event(&payload.event_id).await {
        Ok(candidates) => candidates,
        Err(e) => {
            // Store failures collapse into the same rejection as a wrong code
            error!(
                "Failed to fetch codes for event {}: {}",
                payload.event_id, e
            );
            return Err(AppError::not_found(REDEMPTION_REJECTED.into()));
        }
    };

    let now = Utc::now();
    let matched = candidates
        .iter()
        .filter(|code| code.is_usable_at(now))
        .find(|code| verify_code(&payload.code, &code.code_hash));

    let matched = match matched {
        Some(code) => code,
        None => {
            debug!("No usable code matched for event {}", payload.event_id);
            return Err(AppError::not_found(REDEMPTION_REJECTED.into()));
        }
    };

    // The conditional increment is the authoritative check: a concurrent
    // redemption may have consumed the last use after the read above.
    let redeemed = match store.redeem_code_use(&matched.id).await {
        Ok(code) => code,
        Err(e) => {
            debug!("Redemption of code {} rejected: {}", matched.id, e);
            return Err(AppError::not_found(REDEMPTION_REJECTED.into()));
        }
    };

    info!(
        "User {} redeemed invitation code {} for event {}",
        user_id, redeemed.id, redeemed.event_id
    );

    Ok(Json(serde_json::json!({
        "codeId": redeemed.id,
        "eventId": redeemed.event_id,
        "remainingUses": redeemed.max_uses - redeemed.current_uses
    })))
}
