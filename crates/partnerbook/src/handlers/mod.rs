pub mod error;
pub mod health;
pub mod partners;

pub use error::AppError;
