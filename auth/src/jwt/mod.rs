pub mod algorithm;
pub mod bearer;
pub mod claims;
pub mod errors;
pub mod issuer;
pub mod verifier;

pub use algorithm::SigningAlgorithm;
pub use bearer::bearer_token;
pub use claims::Claims;
pub use errors::ClaimsViolation;
pub use errors::JwtError;
pub use issuer::TokenIssuer;
pub use verifier::TokenVerifier;
