pub mod authentication;
pub mod user;
