use clap::Parser;
use std::{env, path::PathBuf};

/// Parses command line options for `parley`.
#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal chat with cancellable requests")]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Run in pipe-friendly mode: no prompt decoration or styling.
    #[arg(long)]
    pub pipe: bool,
}

impl CliArgs {
    /// Returns the config file path candidates in priority order:
    /// - Command line argument (1st)
    /// - Environment variable `PARLEY_CONFIG` (2nd)
    /// - Current path: `./.parley/config.toml` (3rd)
    /// - Home directory: `~/.parley/config.toml` (4th)
    pub fn config_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();

        if let Some(ref path) = self.config {
            paths.push(path.to_path_buf());
        }

        if let Ok(env_path) = env::var("PARLEY_CONFIG") {
            paths.push(PathBuf::from(env_path));
        }

        paths.push(PathBuf::from(".").join(".parley").join("config.toml"));

        if let Some(home_dir) = env::home_dir() {
            paths.push(home_dir.join(".parley").join("config.toml"));
        }

        paths
    }
}
