pub mod claims;
pub mod errors;
pub mod handler;
pub mod issuer;

pub use claims::Claims;
pub use claims::TokenType;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use issuer::IssuedPair;
pub use issuer::IssuedToken;
pub use issuer::TokenIssuer;
pub use issuer::TokenLifetimes;
