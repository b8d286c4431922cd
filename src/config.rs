/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::error::ConfigError;
use crate::shared::SecurityClearance;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub elevator: ElevatorConfig,
    #[serde(default)]
    pub access: AccessConfig,
    pub simulation: SimulationConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ElevatorConfig {
    pub settle_delay_ms: u64,
    #[serde(default = "default_cancel_poll_ms")]
    pub cancel_poll_ms: u64,
}

// Minimum clearance needed to exit at each floor
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct AccessConfig {
    pub ground: SecurityClearance,
    pub mezzanine: SecurityClearance,
    pub tier1: SecurityClearance,
    pub tier2: SecurityClearance,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub agents: Vec<SecurityClearance>,
    pub think_time_min_ms: u64,
    pub think_time_max_ms: u64,
    // 0 means run until stopped
    #[serde(default)]
    pub requests_per_agent: u32,
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;

    let simulation = &config.simulation;
    if simulation.think_time_min_ms > simulation.think_time_max_ms {
        return Err(ConfigError::InvalidThinkTime {
            min: simulation.think_time_min_ms,
            max: simulation.think_time_max_ms,
        });
    }

    Ok(config)
}

impl ElevatorConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn cancel_poll(&self) -> Duration {
        Duration::from_millis(self.cancel_poll_ms.max(1))
    }
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            settle_delay_ms: 1000,
            cancel_poll_ms: default_cancel_poll_ms(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            ground: SecurityClearance::Confidential,
            mezzanine: SecurityClearance::Secret,
            tier1: SecurityClearance::TopSecret,
            tier2: SecurityClearance::TopSecret,
        }
    }
}

impl SimulationConfig {
    pub fn think_time_range_ms(&self) -> std::ops::RangeInclusive<u64> {
        self.think_time_min_ms..=self.think_time_max_ms
    }
}

/***************************************/
/*         Private functions           */
/***************************************/
fn default_cancel_poll_ms() -> u64 {
    10
}
