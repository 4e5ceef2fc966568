use std::ffi::OsString;
use std::fmt::Display;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;

pub const DEFAULT_HEIGHT: usize = 76;
pub const DEFAULT_OUTPUT: &str = "data/roots.txt";

const HEIGHT_VAR: &str = "ROOTS_HEIGHT";
const OUTPUT_VAR: &str = "ROOTS_OUTPUT";

/// A config object specifies how far the root system is constructed and where the table goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The height up to which the root system is constructed. This is positive.
    pub max_height: usize,
    /// The file the multiplicity table is written to
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_HEIGHT,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Config {
    /// The default config, overridden by the `ROOTS_HEIGHT` and `ROOTS_OUTPUT` environment
    /// variables if they are set.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var_os(HEIGHT_VAR),
            std::env::var_os(OUTPUT_VAR),
        )
    }

    fn from_vars(height: Option<OsString>, output: Option<OsString>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(height) = height {
            let height = height
                .into_string()
                .map_err(|h| anyhow::anyhow!("{h:?} is not valid unicode"))
                .and_then(|h| parse_height(&h).map_err(anyhow::Error::msg))
                .with_context(|| format!("Invalid value of {HEIGHT_VAR}"))?;
            config.max_height = height;
        }
        if let Some(output) = output {
            config.output = PathBuf::from(output);
        }
        Ok(config)
    }
}

/// Parses a config of the form `height` or `height@path`.
impl TryFrom<&str> for Config {
    type Error = anyhow::Error;

    fn try_from(spec: &str) -> Result<Self, Self::Error> {
        let mut args = spec.splitn(2, '@');
        let max_height = parse_height(args.next().unwrap_or_default()).map_err(anyhow::Error::msg)?;
        let output = match args.next() {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            Some(_) => anyhow::bail!("Empty output path in '{spec}'"),
            None => PathBuf::from(DEFAULT_OUTPUT),
        };
        Ok(Self { max_height, output })
    }
}

fn parse_height(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("0 is an invalid positive int value".to_string()),
        Ok(h) => Ok(h),
        Err(e) => Err(format!("'{s}' is not a positive integer: {e}")),
    }
}

/// Asks for the construction height and the output file, suggesting the values of
/// [`Config::from_env`] as defaults.
pub fn query_config() -> anyhow::Result<Config> {
    let defaults = Config::from_env()?;
    let max_height = query::with_default(
        "Max height",
        &defaults.max_height.to_string(),
        |h: String| parse_height(&h),
    );
    let output = query::with_default(
        "Output file",
        &defaults.output.to_string_lossy(),
        |p: String| Ok::<_, String>(PathBuf::from(p)),
    );
    Ok(Config { max_height, output })
}

/// Installs a `tracing` subscriber that logs to stderr. The filter is read from `RUST_LOG` and
/// defaults to `info`. Spans are reported when they close, together with their duration.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
}

pub struct Timer(Instant);

impl Timer {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }

    pub fn end(self, what: impl Display) {
        tracing::info!("{what} in {:.2?}", self.elapsed());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_from_str() {
        assert_eq!(
            Config::try_from("40").unwrap(),
            Config {
                max_height: 40,
                output: PathBuf::from(DEFAULT_OUTPUT)
            }
        );
        assert_eq!(
            Config::try_from("12@out/table.csv").unwrap(),
            Config {
                max_height: 12,
                output: PathBuf::from("out/table.csv")
            }
        );
        assert!(Config::try_from("0").is_err());
        assert!(Config::try_from("-3").is_err());
        assert!(Config::try_from("5@").is_err());
    }

    #[test]
    fn test_config_from_vars() {
        assert_eq!(Config::from_vars(None, None).unwrap(), Config::default());

        let config = Config::from_vars(Some("20".into()), Some("t.txt".into())).unwrap();
        assert_eq!(config.max_height, 20);
        assert_eq!(config.output, PathBuf::from("t.txt"));

        let err = Config::from_vars(Some("zero".into()), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value of ROOTS_HEIGHT");
        assert!(Config::from_vars(Some("0".into()), None).is_err());
    }
}
