mod ids;
mod progress;
mod registry;

pub use ids::GameId;
pub use progress::{
    GameProgress, LevelProgress, ProgressDocument, SCHEMA_VERSION, stars_from_accuracy,
};
pub use registry::{Category, GameMeta, GameRegistry, LevelMeta};
