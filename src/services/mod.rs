// Service exports
pub mod artifact;
pub mod registry;

pub use artifact::{ArtifactError, LogisticScorer, StandardScaler};
pub use registry::ModelRegistry;
