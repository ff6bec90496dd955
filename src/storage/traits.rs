use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Opaque get/put-by-key service holding the snapshot document.
///
/// `put` must replace the whole value in one step; readers only ever see
/// a previously complete value.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> Result<()>;
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        (**self).put(key, value).await
    }
}
