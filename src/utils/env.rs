// src/utils/env.rs - environment bootstrap

use log::debug;

/// Loads a `.env` file if one is present; the process environment wins.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found; using process environment"),
    }
}
