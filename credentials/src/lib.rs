//! # Credentials
//!
//! Named secrets for the external services the console calls.
//!
//! - **[`CredentialStore`]**: persistent key-value storage of credential values
//! - **[`Credentials`]**: an immutable snapshot injected into each service adapter
//! - **[`Service`]**: the external services and the credential each one needs
//!
//! Values are opaque. The only normalization is trimming: submitting an
//! empty or whitespace-only value removes the credential.

pub mod error;
pub mod name;
pub mod store;

pub use error::{CredentialError, Result};
pub use name::{CredentialName, Service};
pub use store::{CredentialStore, Credentials};
