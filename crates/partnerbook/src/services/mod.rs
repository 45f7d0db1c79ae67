//! Application services sitting between the HTTP handlers and the repository.

mod partners;

pub use partners::PartnerService;
