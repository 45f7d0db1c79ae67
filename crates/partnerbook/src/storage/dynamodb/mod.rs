//! DynamoDB storage backend implementation.
//!
//! Single-table design: a partner and all of its services and staff share the
//! partition `PARTNER#<partner_id>`, told apart by sort key and `item_type`.
//!
//! The partial-update codec (`TableItem::to_update_expression`) has no route
//! calling it yet, so its dead_code warnings are expected.

#![allow(dead_code)]

mod assembly;
mod conversions;
mod error;
mod keys;
mod repository;
mod store;
mod update;

pub use conversions::{attr, Item};
pub use repository::SingleTableRepository;
pub use store::{
    BatchRetryConfig, BatchWriteOutcome, DynamoDbItemStore, ItemStore, TRANSACT_WRITE_LIMIT,
};
