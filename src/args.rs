use std::path::{Path, PathBuf};

use clap::Parser;

use crate::errors::CliError;

pub const DEFAULT_PORT: u16 = 8080;

/// Serve a directory over HTTP for local development.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path whose parent directory will be served.
    pub path: Option<PathBuf>,
    /// Port to listen on.
    pub port: Option<String>,
}

/// Validated serving configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory to change into before serving; `None` keeps the current one.
    pub directory: Option<PathBuf>,
    pub port: u16,
}

impl Args {
    /// Validates the raw arguments. The port is kept as a string by clap so
    /// that a bad value is reported through [`CliError`] and the process
    /// controls the exit code.
    pub fn resolve(&self) -> Result<Config, CliError> {
        let directory = self.path.as_deref().map(parent_directory).transpose()?;

        let port = match self.port.as_deref() {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => return Err(CliError::InvalidPort(raw.to_string())),
            },
            None => DEFAULT_PORT,
        };

        Ok(Config { directory, port })
    }
}

fn parent_directory(path: &Path) -> Result<PathBuf, CliError> {
    // A bare filename has an empty parent, which never names a directory.
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if !parent.is_dir() {
        return Err(CliError::InvalidDirectory(parent.to_path_buf()));
    }
    Ok(parent.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn args(path: Option<&str>, port: Option<&str>) -> Args {
        Args {
            path: path.map(PathBuf::from),
            port: port.map(String::from),
        }
    }

    #[test]
    fn positional_arguments_map_to_path_and_port() {
        let args = Args::try_parse_from(["local-www-server", "dist/index.html", "3000"]).unwrap();
        assert_eq!(args.path.as_deref(), Some(Path::new("dist/index.html")));
        assert_eq!(args.port.as_deref(), Some("3000"));
    }

    #[test]
    fn defaults_when_no_arguments_are_given() {
        let config = args(None, None).resolve().unwrap();
        assert_eq!(
            config,
            Config {
                directory: None,
                port: DEFAULT_PORT
            }
        );
    }

    #[test]
    fn serving_directory_is_the_parent_of_the_path() {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("index.html");
        std::fs::write(&bundle, "<html></html>").unwrap();

        let config = args(bundle.to_str(), None).resolve().unwrap();

        assert_eq!(config.directory.as_deref(), Some(dir.path()));
    }

    #[test]
    fn missing_directory_is_reported_by_name() {
        let err = args(Some("no/such/dir/bundle.js"), None)
            .resolve()
            .unwrap_err();

        assert!(matches!(err, CliError::InvalidDirectory(_)));
        assert!(err.to_string().contains("no/such/dir"));
    }

    #[test]
    fn bare_filename_has_no_parent_directory() {
        let err = args(Some("bundle.js"), None).resolve().unwrap_err();
        assert!(matches!(err, CliError::InvalidDirectory(_)));
    }

    #[test]
    fn port_argument_overrides_the_default() {
        let config = args(None, Some("3000")).resolve().unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let err = args(None, Some("http")).resolve().unwrap_err();
        assert!(matches!(err, CliError::InvalidPort(_)));
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        assert!(args(None, Some("0")).resolve().is_err());
        assert!(args(None, Some("70000")).resolve().is_err());
        assert!(args(None, Some("-1")).resolve().is_err());
    }
}
