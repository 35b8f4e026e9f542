//! File-based content and configuration loading for the workbench.
//!
//! Content (items, entities, vehicles, recipes) and the server deny-list
//! are plain data files in RON, TOML, or JSON.

pub mod game_data;
pub mod loader;
pub mod schema;
pub mod server_config;

#[cfg(test)]
mod test_dir;

pub use game_data::{GameData, load_game_data, load_registry};
pub use loader::{DataFile, DataLoadError, Format};
pub use server_config::{load_server_config, reload_eligibility};
