//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_duel;
pub use validate::run_validate;

use std::path::Path;

use contracts::GameBlueprint;
use tracing::info;

use crate::error::{CliError, Result};

/// Load and validate a blueprint, or fall back to the built-in defaults
pub(crate) fn load_blueprint(path: Option<&Path>) -> Result<GameBlueprint> {
    let Some(path) = path else {
        info!("No configuration file given, using built-in defaults");
        return Ok(GameBlueprint::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }

    config_loader::ConfigLoader::load_from_path(path)
        .map_err(|e| CliError::config_invalid(path.display().to_string(), e))
}
