pub mod actions;
pub mod app;
pub mod cache;
pub mod effects;
pub mod native;
pub mod painter;
pub mod serialization;
pub mod settings;
pub mod state;
pub mod store;
pub mod versioned;
pub mod web;

use app::DiceApp;
use settings::Settings;
use state::State;
use std::path::Path;
use store::Store;
use tracing::warn;

const SETTINGS_FILE: &str = "settings.json";
const STATE_FILE: &str = "state.json";

/// Build the app from the files in the working directory, falling back
/// to defaults for whatever is missing or broken.
pub fn create_app(_cc: &eframe::CreationContext<'_>) -> DiceApp {
    let settings = Settings::load_or_default(Path::new(SETTINGS_FILE));
    let saved = load_saved_state(Path::new(STATE_FILE));
    DiceApp::new(State::new(Store::new(settings, saved)))
}

fn load_saved_state(
    path: &Path,
) -> Option<serialization::SerializableState> {
    if !path.exists() {
        return None;
    }
    match serialization::load_from_file(path) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("Error loading {}: {}. Using default state.", STATE_FILE, e);
            None
        }
    }
}
