//! Provisioning steps, registered in the order a run applies them.

pub mod collections;
pub mod indexes;
pub mod seed;
pub mod select_database;
pub mod user;

use std::sync::Arc;

use arryn_kernel::Pipeline;

pub use collections::CreateCollections;
pub use indexes::CreateIndexes;
pub use seed::SeedDocuments;
pub use select_database::SelectDatabase;
pub use user::CreateAppUser;

/// Register every provisioning step with the pipeline
pub fn register_all(pipeline: &mut Pipeline) {
    pipeline.register(Arc::new(SelectDatabase));
    pipeline.register(Arc::new(CreateAppUser));
    pipeline.register(Arc::new(CreateCollections));
    pipeline.register(Arc::new(CreateIndexes));
    pipeline.register(Arc::new(SeedDocuments));
}

/// Pipeline holding every provisioning step
pub fn pipeline() -> Pipeline {
    let mut pipeline = Pipeline::new();
    register_all(&mut pipeline);
    pipeline
}
