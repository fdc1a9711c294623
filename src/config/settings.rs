//! Server settings read from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_CONFIG_DIR: &str = "./config/canada";

/// Settings for running the HTTP server.
///
/// Values come from `PAYROLL_BIND_ADDR` and `PAYROLL_CONFIG_DIR`; a `.env`
/// file in the working directory is loaded first if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Address the server listens on.
    pub bind_addr: SocketAddr,
    /// Directory holding `payroll.yaml` and `rates/`.
    pub config_dir: PathBuf,
}

impl ServerSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_values(
            env::var("PAYROLL_BIND_ADDR").ok(),
            env::var("PAYROLL_CONFIG_DIR").ok(),
        )
    }

    fn from_values(bind_addr: Option<String>, config_dir: Option<String>) -> EngineResult<Self> {
        let bind_addr = bind_addr.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| EngineError::ConfigParseError {
                path: "PAYROLL_BIND_ADDR".to_string(),
                message: format!("'{}': {}", bind_addr, e),
            })?;

        Ok(Self {
            bind_addr,
            config_dir: PathBuf::from(config_dir.unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string())),
        })
    }
}
