pub mod applier;
pub mod settings;
pub mod snapshot;

pub use applier::{ApplyOutcome, TransformApplier};
pub use settings::TransformSettings;
pub use snapshot::StyleSnapshot;
