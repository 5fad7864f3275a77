//! `stockscan-auth` — authentication boundary.
//!
//! Credential validation, the identity-provider port, signed session tokens,
//! and the explicit per-login auth session. Decoupled from HTTP and storage.

pub mod claims;
pub mod credentials;
pub mod identity;
pub mod session;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credentials::{
    CredentialError, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, normalize_email, validate_login,
    validate_sign_up,
};
pub use identity::{IdentityError, IdentityProvider, InMemoryIdentityProvider};
pub use session::{AuthSession, AuthSubscription, CurrentUser};
pub use token::{Hs256Tokens, JwtValidator, TokenError, TokenIssuer};
