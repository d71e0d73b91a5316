//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_user_directory;
mod postgrest_user_directory;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use postgrest_user_directory::PostgrestUserDirectory;
