//! MongoDB access for the Arryn bootstrap: the [`Store`] seam, its MongoDB
//! implementation, and the artifact definitions a run creates.

pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod mongo;
pub mod schema;
pub mod store;

pub use error::{ArtifactKind, StoreError};
pub use mongo::{connect, ConnectOptions, MongoStore};
pub use schema::{IndexDefinition, IndexDirection, RoleGrant, UserGrant};
pub use store::Store;
