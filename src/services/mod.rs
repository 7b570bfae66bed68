pub mod enrichment;
pub mod model;
pub mod providers;
pub mod recommendations;

pub use enrichment::Enricher;
pub use model::{ensure_model, ModelOrigin, ReadyModel};
pub use providers::{ImageProvider, JikanProvider};
pub use recommendations::recommend;
