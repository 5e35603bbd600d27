//! In-memory [`Store`] that mirrors the server behaviours a bootstrap run
//! depends on. Filters only support top-level equality.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::error::{ArtifactKind, StoreError};
use crate::schema::{IndexDefinition, UserGrant};
use crate::store::Store;

const ID_INDEX: &str = "_id_";

#[derive(Debug)]
struct MemoryCollection {
    indexes: Vec<String>,
    documents: Vec<Document>,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self {
            indexes: vec![ID_INDEX.to_string()],
            documents: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, UserGrant>,
    collections: BTreeMap<String, MemoryCollection>,
    journal: Vec<String>,
}

#[derive(Debug)]
pub struct MemoryStore {
    database: String,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Mutating calls in the order they were applied, e.g. `create_user:app`.
    pub fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    pub fn user(&self, username: &str) -> Option<UserGrant> {
        self.lock().users.get(username).cloned()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

#[async_trait]
impl Store for MemoryStore {
    fn database_name(&self) -> &str {
        &self.database
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.lock().users.contains_key(username))
    }

    async fn create_user(&self, user: &UserGrant) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.users.contains_key(&user.username) {
            return Err(StoreError::already_exists(ArtifactKind::User, &user.username));
        }
        state.users.insert(user.username.clone(), user.clone());
        state.journal.push(format!("create_user:{}", user.username));
        Ok(())
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().collections.keys().cloned().collect())
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.collections.contains_key(name) {
            return Err(StoreError::already_exists(ArtifactKind::Collection, name));
        }
        state
            .collections
            .insert(name.to_string(), MemoryCollection::default());
        state.journal.push(format!("create_collection:{name}"));
        Ok(())
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()
            .collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default())
    }

    async fn create_index(
        &self,
        collection: &str,
        index: &IndexDefinition,
    ) -> Result<String, StoreError> {
        let mut state = self.lock();
        let entry = state.collections.entry(collection.to_string()).or_default();
        if !entry.indexes.contains(&index.name) {
            entry.indexes.push(index.name.clone());
        }
        state
            .journal
            .push(format!("create_index:{collection}.{}", index.name));
        Ok(index.name.clone())
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let mut state = self.lock();
        let inserted = documents.len();
        let entry = state.collections.entry(collection.to_string()).or_default();
        for mut document in documents {
            if !document.contains_key("_id") {
                document.insert("_id", ObjectId::new());
            }
            entry.documents.push(document);
        }
        state
            .journal
            .push(format!("insert_many:{collection}:{inserted}"));
        Ok(inserted)
    }

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, StoreError> {
        let state = self.lock();
        let count = state
            .collections
            .get(collection)
            .map(|c| {
                c.documents
                    .iter()
                    .filter(|document| matches_filter(document, &filter))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn duplicate_collection_is_rejected() {
        let store = MemoryStore::new("db");
        store.create_collection("items").await.unwrap();
        let err = store.create_collection("items").await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn new_collection_has_id_index() {
        let store = MemoryStore::new("db");
        store.create_collection("items").await.unwrap();
        assert_eq!(store.index_names("items").await.unwrap(), vec!["_id_"]);
    }

    #[tokio::test]
    async fn count_applies_equality_filter() {
        let store = MemoryStore::new("db");
        store
            .insert_many(
                "items",
                vec![doc! { "brand": "a" }, doc! { "brand": "b" }, doc! { "brand": "a" }],
            )
            .await
            .unwrap();

        assert_eq!(store.count_documents("items", doc! {}).await.unwrap(), 3);
        assert_eq!(
            store
                .count_documents("items", doc! { "brand": "a" })
                .await
                .unwrap(),
            2
        );
    }
}
