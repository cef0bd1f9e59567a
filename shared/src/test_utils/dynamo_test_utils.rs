use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use log::debug;
use std::env;

use crate::store::dynamo::EVENT_ID_INDEX;

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Tests run against the in-memory mock unless `USE_DYNAMODB=true`, in which
/// case they expect DynamoDB Local on `DYNAMODB_ENDPOINT` (default
/// http://localhost:8000).
pub fn use_dynamodb() -> bool {
    env::var("USE_DYNAMODB")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Creates a client pointed at the local test endpoint with dummy
/// credentials.
pub async fn create_dynamo_client() -> Client {
    let endpoint =
        env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://localhost:8000".to_string());

    debug!("Creating DynamoDB test client for endpoint {}", endpoint);

    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(endpoint)
        .region(aws_config::Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .load()
        .await;

    Client::new(&config)
}

/// Creates the invitation code table with its `eventId-index` GSI. Fails with
/// ResourceInUseException if the table already exists; callers treat that as
/// success.
pub async fn create_code_table(client: &Client, table_name: &str) -> TestResult<()> {
    let event_id_index = GlobalSecondaryIndex::builder()
        .index_name(EVENT_ID_INDEX)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("eventId")
                .key_type(KeyType::Hash)
                .build()?,
        )
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .build()?;

    client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("id")
                .key_type(KeyType::Hash)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("id")
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("eventId")
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .global_secondary_indexes(event_id_index)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await?;

    Ok(())
}

/// Deletes every item in the table so each test starts from an empty store.
pub async fn clear_dynamo_table(client: &Client, table_name: &str) -> TestResult<()> {
    let scan = client.scan().table_name(table_name).send().await?;

    let items = scan.items.unwrap_or_default();
    debug!("Clearing {} items from table {}", items.len(), table_name);

    for item in items {
        if let Some(id) = item.get("id") {
            client
                .delete_item()
                .table_name(table_name)
                .key("id", id.clone())
                .send()
                .await?;
        }
    }

    Ok(())
}
