use crate::{LookupError, SignatureStatus, lookup::SignatureStatusLookup};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory signature status table keyed by base64 signature
///
/// Clones share the same table. Useful when statuses were fetched ahead of
/// validation, and in tests.
#[derive(Clone, Default)]
pub struct StatusCache {
    statuses: Arc<RwLock<HashMap<String, SignatureStatus>>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, signature: impl Into<String>, status: SignatureStatus) {
        let mut statuses = self.statuses.write().await;
        statuses.insert(signature.into(), status);
    }

    pub async fn remove(&self, signature: &str) -> Option<SignatureStatus> {
        let mut statuses = self.statuses.write().await;
        statuses.remove(signature)
    }

    pub async fn len(&self) -> usize {
        self.statuses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.statuses.read().await.is_empty()
    }
}

#[async_trait]
impl SignatureStatusLookup for StatusCache {
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LookupError> {
        let statuses = self.statuses.read().await;
        Ok(statuses.get(signature).cloned())
    }
}
