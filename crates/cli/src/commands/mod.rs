//! Command implementations.

mod routes;
mod run;
mod validate;

pub use routes::run_routes;
pub use run::run_gateway;
pub use validate::run_validate;

use std::path::Path;

use contracts::GatewayBlueprint;

use crate::error::{CliError, Result};

/// Load and validate a configuration file
pub(crate) fn load_blueprint(path: &Path) -> Result<GatewayBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}
