use config::{Config, ConfigError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{DEFAULT_DATA_SIZE, DEFAULT_ITERATIONS, ENV_PREFIX};
use crate::sss::ThresholdPolicy;

const CONF_FILE: &str = "conf.toml";

/// Settings for the benchmark client.
///
/// Resolved in order: built-in defaults, `<dir>/conf.toml` when present, then
/// `SSBENCH_*` environment variables (e.g. `SSBENCH_ITERATIONS=10`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchConfig {
    /// Timed repetitions per command.
    pub iterations: u32,
    /// Secret length selecting which commands run.
    pub data_size: usize,
    /// Seed for a reproducible coefficient source; OS entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Threshold policy for `split` when none is given on the command line.
    pub policy: ThresholdPolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            iterations: DEFAULT_ITERATIONS,
            data_size: DEFAULT_DATA_SIZE,
            seed: None,
            policy: ThresholdPolicy::Standard,
        }
    }
}

impl BenchConfig {
    /// Loads the configuration from `dir` (if given) and the environment.
    pub fn load(dir: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("iterations", DEFAULT_ITERATIONS as i64)?
            .set_default("data_size", DEFAULT_DATA_SIZE as i64)?
            .set_default("policy", ThresholdPolicy::Standard.to_string())?;

        if let Some(dir) = dir {
            let conf_file = dir.join(CONF_FILE);
            debug!("📝 Loading config at path: {:#?}", conf_file);
            builder = builder.add_source(config::File::from(conf_file).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        settings.try_into()
    }

    /// Writes a default `conf.toml` into `dir` unless one already exists.
    pub fn init(dir: &Path) -> Result<PathBuf, ConfigError> {
        fs::create_dir_all(dir).map_err(|err| ConfigError::Foreign(Box::new(err)))?;

        let conf_file = dir.join(CONF_FILE);
        if !conf_file.exists() {
            let toml = toml::to_string_pretty(&BenchConfig::default())
                .map_err(|err| ConfigError::Foreign(Box::new(err)))?;
            fs::write(&conf_file, toml).map_err(|err| ConfigError::Foreign(Box::new(err)))?;
            debug!("📝 Wrote default config to {:#?}", conf_file);
        }

        Ok(conf_file)
    }
}

impl TryFrom<Config> for BenchConfig {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let iterations = u32::try_from(config.get_int("iterations")?)
            .map_err(|_| ConfigError::Message("iterations must be a non-negative 32-bit integer".into()))?;
        let data_size = usize::try_from(config.get_int("data_size")?)
            .map_err(|_| ConfigError::Message("data_size must be non-negative".into()))?;
        let seed = match config.get_int("seed") {
            Ok(seed) => Some(
                u64::try_from(seed).map_err(|_| ConfigError::Message("seed must be non-negative".into()))?,
            ),
            Err(ConfigError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        let policy = config
            .get_string("policy")?
            .parse::<ThresholdPolicy>()
            .map_err(ConfigError::Message)?;

        Ok(BenchConfig {
            iterations,
            data_size,
            seed,
            policy,
        })
    }
}
