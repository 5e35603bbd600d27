use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::StoreError;
use crate::schema::{IndexDefinition, UserGrant};

/// Operations a bootstrap run needs, scoped to one selected database.
///
/// Creation methods report duplicates as [`StoreError::AlreadyExists`] only
/// where the server itself rejects them (users, collections); creating an
/// index that already exists with the same keys is a no-op.
#[async_trait]
pub trait Store: Send + Sync {
    /// Name of the database every call is scoped to.
    fn database_name(&self) -> &str;

    /// Round-trip to the server without touching data.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn create_user(&self, user: &UserGrant) -> Result<(), StoreError>;

    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;

    async fn create_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Names of every index on `collection`, including `_id_`.
    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    /// Returns the name the server assigned to the index.
    async fn create_index(
        &self,
        collection: &str,
        index: &IndexDefinition,
    ) -> Result<String, StoreError>;

    /// Inserts `documents` as one batch and returns how many were written.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError>;

    async fn count_documents(&self, collection: &str, filter: Document)
        -> Result<u64, StoreError>;
}
