//! Partial-update expressions built from item records.

use std::collections::HashMap;

use aws_sdk_dynamodb::operation::update_item::builders::UpdateItemFluentBuilder;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};

use super::conversions::{attr, Item};

/// Attributes an update never touches.
pub const IMMUTABLE_ATTRIBUTES: [&str; 6] = [
    attr::PK,
    attr::SK,
    attr::ITEM_TYPE,
    attr::ID,
    attr::PARTNER_ID,
    attr::CREATED_AT,
];

/// A `SET` update expression with its placeholder bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub update_expression: String,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    /// Builds `SET #a = :a, ...` for every mutable attribute of `item`.
    ///
    /// When the item carries `updated_at`, it is bound to `now` rather than
    /// the stored value.
    pub fn from_item(mut item: Item, now: DateTime<Utc>) -> Self {
        for key in IMMUTABLE_ATTRIBUTES {
            item.remove(key);
        }
        if let Some(updated_at) = item.get_mut(attr::UPDATED_AT) {
            *updated_at = AttributeValue::S(now.to_rfc3339());
        }

        let mut attributes: Vec<(String, AttributeValue)> = item.into_iter().collect();
        attributes.sort_by(|a, b| a.0.cmp(&b.0));

        let mut clauses = Vec::with_capacity(attributes.len());
        let mut expression_attribute_names = HashMap::with_capacity(attributes.len());
        let mut expression_attribute_values = HashMap::with_capacity(attributes.len());

        for (name, value) in attributes {
            clauses.push(format!("#{name} = :{name}"));
            expression_attribute_names.insert(format!("#{name}"), name.clone());
            expression_attribute_values.insert(format!(":{name}"), value);
        }

        Self {
            update_expression: format!("SET {}", clauses.join(", ")),
            expression_attribute_names,
            expression_attribute_values,
        }
    }

    /// Binds the expression onto an `UpdateItem` request.
    pub fn apply_to(self, builder: UpdateItemFluentBuilder) -> UpdateItemFluentBuilder {
        builder
            .update_expression(self.update_expression)
            .set_expression_attribute_names(Some(self.expression_attribute_names))
            .set_expression_attribute_values(Some(self.expression_attribute_values))
    }
}
