//! Secret Storage Abstraction
//!
//! Provides a platform-agnostic trait for durable client-side storage of the
//! session fields: access token, refresh token, and serialized current user.
//! Each field lives under its own independent string key; there is no
//! transaction spanning keys and no cross-process locking discipline.

use async_trait::async_trait;

use crate::error::Result;

/// Durable keyed storage for session credentials
///
/// Abstracts secure storage mechanisms:
/// - macOS: Keychain
/// - Windows: Credential Manager (DPAPI)
/// - Linux: Secret Service (libsecret)
/// - Tests: in-memory maps
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Encrypt data at rest where the platform allows
/// - Never log or expose stored values
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecretStore;
///
/// async fn store_token(store: &dyn SecretStore, token: &str) -> Result<()> {
///     store.set("access_token", token).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store a value, overwriting any previous value under the key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete a value.
    ///
    /// Deleting an absent key is not an error; the operation is idempotent.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a value exists without retrieving it.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
