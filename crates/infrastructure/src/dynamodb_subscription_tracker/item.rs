use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use datamesh_core::{AppError, AppResult};
use datamesh_domain::{SubscriptionRecord, SubscriptionRequest, SubscriptionStatus};

pub(super) const ATTR_SUBSCRIPTION_ID: &str = "SubscriptionId";
const ATTR_OWNER_ACCOUNT_ID: &str = "OwnerAccountId";
const ATTR_DATABASE_NAME: &str = "DatabaseName";
const ATTR_TABLES: &str = "Tables";
const ATTR_PRINCIPAL: &str = "Principal";
const ATTR_REQUESTED_GRANTS: &str = "RequestedGrants";
const ATTR_STATUS: &str = "Status";
const ATTR_CREATED_AT: &str = "CreatedAt";
const ATTR_UPDATED_AT: &str = "UpdatedAt";

type Item = HashMap<String, AttributeValue>;

pub(super) fn record_to_item(record: &SubscriptionRecord) -> Item {
    let request = record.request();
    let mut item = HashMap::from([
        (
            ATTR_SUBSCRIPTION_ID.to_owned(),
            AttributeValue::S(record.subscription_id().to_owned()),
        ),
        (
            ATTR_OWNER_ACCOUNT_ID.to_owned(),
            AttributeValue::S(request.owner_account_id.clone()),
        ),
        (
            ATTR_DATABASE_NAME.to_owned(),
            AttributeValue::S(request.database_name.clone()),
        ),
        (
            ATTR_REQUESTED_GRANTS.to_owned(),
            string_list(&request.requested_grants),
        ),
        (
            ATTR_STATUS.to_owned(),
            AttributeValue::S(record.status().as_str().to_owned()),
        ),
        (
            ATTR_CREATED_AT.to_owned(),
            AttributeValue::S(record.created_at().to_rfc3339()),
        ),
        (
            ATTR_UPDATED_AT.to_owned(),
            AttributeValue::S(record.updated_at().to_rfc3339()),
        ),
    ]);

    if let Some(tables) = &request.tables {
        item.insert(ATTR_TABLES.to_owned(), string_list(tables));
    }
    if let Some(principal) = &request.principal {
        item.insert(ATTR_PRINCIPAL.to_owned(), AttributeValue::S(principal.clone()));
    }

    item
}

pub(super) fn item_to_record(item: &Item) -> AppResult<SubscriptionRecord> {
    let request = SubscriptionRequest {
        owner_account_id: required_string(item, ATTR_OWNER_ACCOUNT_ID)?,
        database_name: required_string(item, ATTR_DATABASE_NAME)?,
        tables: item.get(ATTR_TABLES).map(read_string_list).transpose()?,
        principal: item
            .get(ATTR_PRINCIPAL)
            .and_then(|value| value.as_s().ok())
            .cloned(),
        requested_grants: item
            .get(ATTR_REQUESTED_GRANTS)
            .map(read_string_list)
            .transpose()?
            .unwrap_or_default(),
    };

    Ok(SubscriptionRecord::from_stored(
        required_string(item, ATTR_SUBSCRIPTION_ID)?,
        request,
        required_string(item, ATTR_STATUS)?.parse::<SubscriptionStatus>()?,
        required_timestamp(item, ATTR_CREATED_AT)?,
        required_timestamp(item, ATTR_UPDATED_AT)?,
    ))
}

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

fn read_string_list(value: &AttributeValue) -> AppResult<Vec<String>> {
    match value {
        AttributeValue::L(values) => values
            .iter()
            .map(|entry| {
                entry.as_s().cloned().map_err(|_| {
                    AppError::Internal("subscription list attribute holds a non-string".to_owned())
                })
            })
            .collect(),
        AttributeValue::Ss(values) => Ok(values.clone()),
        _ => Err(AppError::Internal(
            "subscription list attribute has an unexpected type".to_owned(),
        )),
    }
}

fn required_string(item: &Item, attribute: &str) -> AppResult<String> {
    item.get(attribute)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| {
            AppError::Internal(format!(
                "subscription item is missing string attribute '{attribute}'"
            ))
        })
}

fn required_timestamp(item: &Item, attribute: &str) -> AppResult<DateTime<Utc>> {
    let raw = required_string(item, attribute)?;
    DateTime::parse_from_rfc3339(raw.as_str())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| {
            AppError::Internal(format!(
                "subscription attribute '{attribute}' is not a timestamp: {error}"
            ))
        })
}
