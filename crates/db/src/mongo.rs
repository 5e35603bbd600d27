//! MongoDB-backed [`Store`] and the client factory used to reach it.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};

use crate::error::{
    command_code, is_transient_driver_error, ArtifactKind, StoreError, NAMESPACE_NOT_FOUND_CODE,
};
use crate::schema::{IndexDefinition, UserGrant};
use crate::store::Store;

/// Everything needed to open a client and select the target database.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub uri: String,
    pub database: String,
    pub app_name: Option<String>,
    /// Applied to both socket connect and server selection.
    pub connect_timeout: Duration,
    /// Extra ping attempts after the first one fails transiently.
    pub max_retries: usize,
}

/// Opens a client and waits for the server to answer a `ping`, backing off
/// exponentially between attempts.
pub async fn connect(options: &ConnectOptions) -> Result<MongoStore, StoreError> {
    let mut client_options = ClientOptions::parse(&options.uri).await?;
    client_options.app_name = options.app_name.clone();
    client_options.connect_timeout = Some(options.connect_timeout);
    client_options.server_selection_timeout = Some(options.connect_timeout);

    let client = Client::with_options(client_options)?;
    let store = MongoStore::new(client, &options.database);

    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(options.max_retries)
        .with_jitter();

    let mut retries = 0usize;
    let target = &store;
    let result = (|| async move { target.ping().await })
        .retry(backoff)
        .when(StoreError::is_transient)
        .notify(|err, delay| {
            retries += 1;
            tracing::warn!(
                target: "arryn-db",
                attempt = retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "database not ready, retrying"
            );
        })
        .await;

    match result {
        Ok(()) => {
            tracing::info!(
                target: "arryn-db",
                database = store.database_name(),
                "connected to MongoDB"
            );
            Ok(store)
        }
        Err(StoreError::Driver(source))
            if retries >= options.max_retries && is_transient_driver_error(&source) =>
        {
            Err(StoreError::Unavailable {
                attempts: retries + 1,
                source,
            })
        }
        Err(err) => Err(err),
    }
}

/// Store scoped to one database of a MongoDB deployment.
#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, database: &str) -> Self {
        Self {
            db: client.database(database),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl Store for MongoStore {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let reply = self.db.run_command(doc! { "usersInfo": username }).await?;
        Ok(reply
            .get_array("users")
            .map(|users| !users.is_empty())
            .unwrap_or(false))
    }

    async fn create_user(&self, user: &UserGrant) -> Result<(), StoreError> {
        self.db
            .run_command(user.create_command())
            .await
            .map_err(|err| StoreError::from_create(err, ArtifactKind::User, &user.username))?;
        Ok(())
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.db.list_collection_names().await?)
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.db
            .create_collection(name)
            .await
            .map_err(|err| StoreError::from_create(err, ArtifactKind::Collection, name))
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        match self.collection(collection).list_index_names().await {
            Ok(names) => Ok(names),
            Err(err) if command_code(&err) == Some(NAMESPACE_NOT_FOUND_CODE) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn create_index(
        &self,
        collection: &str,
        index: &IndexDefinition,
    ) -> Result<String, StoreError> {
        let model = IndexModel::builder()
            .keys(index.key_document())
            .options(IndexOptions::builder().name(index.name.clone()).build())
            .build();

        let created = self.collection(collection).create_index(model).await?;
        Ok(created.index_name)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let result = self.collection(collection).insert_many(documents).await?;
        Ok(result.inserted_ids.len())
    }

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, StoreError> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }
}
