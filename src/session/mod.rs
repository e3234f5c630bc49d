pub mod assets;
pub mod stage;
pub mod state;
pub mod store;

pub use assets::{Thumbnail, Voiceover};
pub use stage::{AssetStage, StageStatus};
pub use state::{ProductionState, RunId, StudioEvent};
pub use store::StateStore;
