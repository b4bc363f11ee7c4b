//! # Curricula Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`session`]: session token signing and cookie settings
//! - [`oauth`]: OAuth identity provider endpoints and credentials
//! - [`cors`]: allowed browser origins
//!
//! # Example
//!
//! ```ignore
//! use curricula_config::{CorsConfig, OAuthConfig, SessionConfig};
//!
//! let session_config = SessionConfig::from_env();
//! let oauth_config = OAuthConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! ```

pub mod cors;
pub mod oauth;
pub mod session;

pub use cors::CorsConfig;
pub use oauth::OAuthConfig;
pub use session::SessionConfig;
