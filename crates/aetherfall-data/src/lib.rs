pub mod loader;
pub mod schema;

pub use loader::{
    load_game, load_game_str, load_projects_str, load_recipes_str, load_resources_str,
    load_units_str, DataLoadError, LoadedGame,
};
