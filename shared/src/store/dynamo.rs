use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use log::{debug, info};
use serde_dynamo::{from_item, from_items, to_item};
use std::collections::HashMap;
use std::env;

use crate::error::{StoreError, StoreResult};
use crate::models::{now_str, InvitationCode};
use crate::store::InvitationCodeStore;

const DEFAULT_TABLE_NAME: &str = "invitation-codes";

/// GSI keyed on `eventId`, projecting all attributes.
pub const EVENT_ID_INDEX: &str = "eventId-index";

/// DynamoDB-backed invitation code store.
pub struct DynamoCodeStore {
    client: Client,
    table_name: String,
}

impl DynamoCodeStore {
    /// Creates a store from the ambient AWS configuration. The table name
    /// comes from `INVITATION_CODES_TABLE_NAME`.
    pub async fn new() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let client = Client::new(&config);
        let table_name = env::var("INVITATION_CODES_TABLE_NAME")
            .unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());

        info!("DynamoCodeStore using table '{}'", table_name);

        Self { client, table_name }
    }

    /// Creates a store against an explicit client and table, used by tests
    /// running against DynamoDB Local.
    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    async fn query_event_codes(
        &self,
        event_id: &str,
        active_only: bool,
    ) -> StoreResult<Vec<InvitationCode>> {
        let mut query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(EVENT_ID_INDEX)
            .key_condition_expression("#event_id = :event_id")
            .expression_attribute_names("#event_id", "eventId")
            .expression_attribute_values(":event_id", AttributeValue::S(event_id.to_string()));

        if active_only {
            query = query
                .filter_expression("#active = :active")
                .expression_attribute_names("#active", "active")
                .expression_attribute_values(":active", AttributeValue::Bool(true));
        }

        let result = query
            .send()
            .await
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let items = result.items.unwrap_or_default();
        debug!(
            "Query on {} returned {} codes for event {}",
            EVENT_ID_INDEX,
            items.len(),
            event_id
        );

        from_items(items).map_err(|e| StoreError::SerializationError(e.to_string()))
    }
}

#[async_trait]
impl InvitationCodeStore for DynamoCodeStore {
    async fn create_code(&self, code: InvitationCode) -> StoreResult<InvitationCode> {
        let item: HashMap<String, AttributeValue> =
            to_item(&code).map_err(|e| StoreError::SerializationError(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        debug!(
            "Created invitation code {} for event {}",
            code.id, code.event_id
        );

        Ok(code)
    }

    async fn get_code(&self, id: &str) -> StoreResult<InvitationCode> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let item = result
            .item
            .ok_or_else(|| StoreError::NotFound(format!("Invitation code {} not found", id)))?;

        from_item(item).map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    async fn get_codes_by_event(&self, event_id: &str) -> StoreResult<Vec<InvitationCode>> {
        self.query_event_codes(event_id, false).await
    }

    async fn get_active_codes_by_event(&self, event_id: &str) -> StoreResult<Vec<InvitationCode>> {
        self.query_event_codes(event_id, true).await
    }

    async fn update_code(&self, code: InvitationCode) -> StoreResult<InvitationCode> {
        let item: HashMap<String, AttributeValue> =
            to_item(&code).map_err(|e| StoreError::SerializationError(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    StoreError::NotFound(format!("Invitation code {} not found", code.id))
                } else {
                    StoreError::DatabaseError(service_err.to_string())
                }
            })?;

        debug!("Updated invitation code {}", code.id);

        Ok(code)
    }

    async fn redeem_code_use(&self, id: &str) -> StoreResult<InvitationCode> {
        // Single conditional update: read-side usability checks are advisory
        // only, this condition is what makes the last slot consumable exactly
        // once under concurrent redemptions.
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET #current_uses = #current_uses + :one, #updated_at = :now")
            .condition_expression(
                "attribute_exists(id) AND #active = :active AND #current_uses < #max_uses",
            )
            .expression_attribute_names("#current_uses", "currentUses")
            .expression_attribute_names("#max_uses", "maxUses")
            .expression_attribute_names("#active", "active")
            .expression_attribute_names("#updated_at", "updatedAt")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(":active", AttributeValue::Bool(true))
            .expression_attribute_values(":now", AttributeValue::S(now_str()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    StoreError::UsesExhausted
                } else {
                    StoreError::DatabaseError(service_err.to_string())
                }
            })?;

        let attributes = result.attributes.ok_or_else(|| {
            StoreError::DatabaseError("UpdateItem returned no attributes".to_string())
        })?;

        from_item(attributes).map_err(|e| StoreError::SerializationError(e.to_string()))
    }
}
