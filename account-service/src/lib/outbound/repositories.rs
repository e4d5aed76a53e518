pub mod account;
pub mod revoked_token;

pub use account::PostgresAccountRepository;
pub use revoked_token::PostgresRevocationRepository;
