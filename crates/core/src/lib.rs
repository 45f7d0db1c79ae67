//! Functional core for partnerbook.
//!
//! Pure types, validation and error taxonomy for the partner aggregate.
//! Nothing in this crate performs I/O; the `partnerbook` crate wires these
//! pieces to DynamoDB and HTTP.

pub mod auth;
pub mod partner;
pub mod storage;
