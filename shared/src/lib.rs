pub mod auth;
pub mod crypto;
pub mod error;
pub mod models;
pub mod store;

#[cfg(feature = "test_utils")]
pub mod test_utils;
