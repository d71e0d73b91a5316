//! Application services and ports.

#![forbid(unsafe_code)]

mod access_service;
mod user_directory_ports;

pub use access_service::{AccessService, AuthOutcome, PermissionSnapshot};
pub use user_directory_ports::{AuthenticationGateway, PasswordHasher, UserDirectory};
