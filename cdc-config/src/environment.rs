use std::env::{self, VarError};
use std::fmt;
use std::io;
use std::str::FromStr;

/// Variable selecting the runtime environment.
const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Runtime environment of a CDC binary.
///
/// Picks the environment configuration file (`dev.yaml`, `prod.yaml`) and the
/// log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl Environment {
    const ALL: [Environment; 2] = [Environment::Dev, Environment::Prod];

    /// Reads `APP_ENVIRONMENT`. An unset variable means [`Environment::Dev`].
    pub fn load() -> Result<Environment, io::Error> {
        match env::var(ENVIRONMENT_VAR) {
            Ok(value) => value.parse(),
            Err(VarError::NotPresent) => Ok(Environment::default()),
            Err(err @ VarError::NotUnicode(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{ENVIRONMENT_VAR}: {err}"),
            )),
        }
    }

    /// Name of the environment, also the stem of its configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = io::Error;

    /// Case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|environment| value.eq_ignore_ascii_case(environment.as_str()))
            .ok_or_else(|| {
                io::Error::other(format!(
                    "`{value}` is not a supported environment, expected `dev` or `prod`"
                ))
            })
    }
}
