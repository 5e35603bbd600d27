//! Core of the Arryn bootstrap: layered settings, the [`Step`] trait, and
//! the [`Pipeline`] that runs steps in order.

pub mod pipeline;
pub mod settings;
pub mod step;

pub use pipeline::Pipeline;
pub use settings::{BootstrapMode, Settings};
pub use step::{Step, StepCtx, StepOutcome};
