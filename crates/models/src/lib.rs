mod board;
mod keys;
mod listing;
mod run;
mod score;
mod source;
mod specs;

pub use board::{Board, TerrainScores};
pub use keys::{strip_zero_width, BoardKey};
pub use listing::{listing_id, Availability, Condition, Listing};
pub use run::{RunScope, RunStage, ScraperError, SearchRun};
pub use score::beginner_score;
pub use source::{SourceId, SourceKind};
pub use specs::{AbilityLevel, AbilityRange, Category, Gender, ManufacturerKey, Profile, Shape};
