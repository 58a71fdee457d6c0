use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;

/// Directory holding the configuration files, relative to the working directory.
const CONFIGURATION_DIR: &str = "configuration";

/// File extensions tried for every layer, in order.
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Prefix of environment variable overrides, e.g. `APP_STORAGE__ROOT`.
const ENV_PREFIX: &str = "APP";
const ENV_PREFIX_SEPARATOR: &str = "_";
const ENV_NESTING_SEPARATOR: &str = "__";

/// Implemented by the top level configuration of each binary.
pub trait Config {
    /// Human readable name used in error messages.
    const NAME: &'static str;
}

/// A file layer of the configuration. Later layers override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// `base.*`, shared by every environment.
    Base,
    /// `{environment}.*`.
    Environment(Environment),
}

impl ConfigLayer {
    fn file_stem(self) -> &'static str {
        match self {
            ConfigLayer::Base => "base",
            ConfigLayer::Environment(environment) => environment.as_str(),
        }
    }

    /// Returns the first existing file of this layer in `directory`.
    fn locate(self, directory: &Path) -> Result<PathBuf, LoadConfigError> {
        let candidates: Vec<PathBuf> = EXTENSIONS
            .iter()
            .map(|extension| directory.join(format!("{}.{extension}", self.file_stem())))
            .collect();

        if let Some(found) = candidates.iter().find(|path| path.is_file()) {
            return Ok(found.clone());
        }

        Err(LoadConfigError::FileMissing {
            layer: self,
            directory: directory.to_path_buf(),
            candidates,
        })
    }
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLayer::Base => f.write_str("base configuration"),
            ConfigLayer::Environment(environment) => {
                write!(f, "`{environment}` environment configuration")
            }
        }
    }
}

/// Errors raised while assembling a configuration.
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("failed to determine runtime environment: {0}")]
    Environment(#[source] io::Error),

    #[error("configuration directory `{}` does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("no {layer} in `{}`; tried {}", directory.display(), display_paths(candidates))]
    FileMissing {
        layer: ConfigLayer,
        directory: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("failed to parse {layer} `{}`: {source}", path.display())]
    FileParse {
        layer: ConfigLayer,
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("invalid {name}: {source}")]
    Deserialization {
        name: &'static str,
        #[source]
        source: config::ConfigError,
    },

    #[error("failed to merge configuration sources: {0}")]
    Merge(#[source] config::ConfigError),
}

/// Loads `T` from `./configuration` for the environment in `APP_ENVIRONMENT`.
///
/// See [`load_config_from`] for the layering rules.
pub fn load_config<T>() -> Result<T, LoadConfigError>
where
    T: Config + DeserializeOwned,
{
    let directory = std::env::current_dir()
        .map_err(LoadConfigError::CurrentDir)?
        .join(CONFIGURATION_DIR);
    let environment = Environment::load().map_err(LoadConfigError::Environment)?;

    load_config_from(&directory, environment)
}

/// Loads `T` from `directory` for an explicit environment.
///
/// Sources, lowest priority first:
/// 1. `base.(yaml|yml|json)`
/// 2. `{environment}.(yaml|yml|json)`
/// 3. `APP_`-prefixed environment variables, with `__` between nested keys
///    (`APP_APPLICATION__PORT=9000`). Values are parsed as numbers or booleans
///    when they look like one.
///
/// Both files must exist. Each file is parsed on its own first, so a syntax
/// error names the offending file.
pub fn load_config_from<T>(directory: &Path, environment: Environment) -> Result<T, LoadConfigError>
where
    T: Config + DeserializeOwned,
{
    if !directory.is_dir() {
        return Err(LoadConfigError::MissingDirectory(directory.to_path_buf()));
    }

    let mut builder = config::Config::builder();
    for layer in [ConfigLayer::Base, ConfigLayer::Environment(environment)] {
        let path = layer.locate(directory)?;

        config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .map_err(|source| LoadConfigError::FileParse {
                layer,
                path: path.clone(),
                source,
            })?;

        builder = builder.add_source(config::File::from(path));
    }

    let overrides = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_NESTING_SEPARATOR)
        .try_parsing(true);

    builder
        .add_source(overrides)
        .build()
        .map_err(LoadConfigError::Merge)?
        .try_deserialize::<T>()
        .map_err(|source| LoadConfigError::Deserialization {
            name: T::NAME,
            source,
        })
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("`{}`", path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
