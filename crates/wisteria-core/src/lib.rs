pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod experience;
pub mod instruments;
pub mod mapping;
pub mod notes;
pub mod orchestrator;
pub mod pattern;
pub mod physics;
pub mod sequencer;
pub mod stages;
pub mod timing;
pub mod toggle;
pub mod track;

pub use clock::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use experience::*;
pub use instruments::*;
pub use mapping::*;
pub use notes::*;
pub use orchestrator::*;
pub use pattern::*;
pub use physics::*;
pub use sequencer::*;
pub use timing::*;
pub use toggle::*;
pub use track::*;
