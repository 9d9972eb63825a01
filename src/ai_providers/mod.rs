pub mod anthropic;
pub mod client;
pub mod credentials;
pub mod factory;
pub mod keychain;
pub mod models;
pub mod openai;
pub mod unavailable;

pub use client::{AIClient, ProviderError, ProviderErrorKind, FALLBACK_RESPONSE};
pub use credentials::{CredentialBackend, CredentialStore, FileBackend, MemoryBackend};
pub use factory::ProviderFactory;
pub use keychain::KeychainBackend;
pub use models::{AIProvider, Credential, UnsupportedProviderError};
