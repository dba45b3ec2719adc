pub mod config;
pub mod credentials;
pub mod generation;
pub mod guide;
pub mod keyring;
pub mod message;
pub mod models;
pub mod profile;
pub mod records;
pub mod router;
pub mod session;
