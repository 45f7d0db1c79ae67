//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `partnerbook_core::storage`. Both backends share the same
//! single-table record layout; the backend is picked at startup from
//! `STORAGE_BACKEND`.
//!
//! - `dynamodb` (default): AWS DynamoDB via `aws-sdk-dynamodb`
//! - `memory`: in-process item store, for tests and local runs

pub mod dynamodb;
pub mod inmemory;
