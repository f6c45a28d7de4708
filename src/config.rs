use std::fmt;
use std::time::Duration;

use config::Environment;
use serde::Deserialize;

use crate::node::NodeConfig;

/// Process configuration, resolved once before the watch loop starts.
///
/// Read from the environment: `DATABASE_URL`, `MONITORED_MNEMONIC`,
/// `DESTINATION_MNEMONIC`, `ALGOD_URL`, `ALGOD_TOKEN`, `NODE_TIMEOUT_SECS`.
#[derive(Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    /// Account whose pending transactions are watched and swept.
    pub monitored_mnemonic: String,
    /// Account receiving the swept balance.
    pub destination_mnemonic: String,
    pub algod_url: String,
    pub algod_token: String,
    pub node_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(Environment::default())
    }

    // Values stay strings until deserialized, so tokens like "0042" survive.
    fn from_source(environment: Environment) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .set_default("database_url", "postgresql://localhost/ledger_watcher")?
            .set_default("algod_url", "http://localhost:4001")?
            .set_default("algod_token", "")?
            .set_default("node_timeout_secs", 120)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        if config.node_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "NODE_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            url: self.algod_url.clone(),
            token: self.algod_token.clone(),
            timeout: Duration::from_secs(self.node_timeout_secs),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("algod_url", &self.algod_url)
            .field("node_timeout_secs", &self.node_timeout_secs)
            .finish_non_exhaustive()
    }
}
