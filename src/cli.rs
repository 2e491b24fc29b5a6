// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Defines all subcommands and global flags

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hexport")]
#[command(about = "Export Leanote notes as Hexo blog posts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Leanote account email
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Leanote account password
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory the posts are written to
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Directory the images are written to
    #[arg(long, global = true)]
    pub image_dir: Option<PathBuf>,

    /// Path prefix used in rewritten image links
    #[arg(long, global = true)]
    pub image_link: Option<String>,

    /// Export every Markdown note, not only blog posts
    #[arg(long, global = true)]
    pub all_notes: bool,

    /// Keep image links pointing at Leanote
    #[arg(long, global = true)]
    pub no_images: bool,

    /// Rewrite posts and images even when already up to date
    #[arg(long, global = true)]
    pub force: bool,

    /// Disable throttling (not recommended)
    #[arg(long, global = true)]
    pub no_throttle: bool,

    /// Throttle range in ms (min:max)
    #[arg(long, global = true, value_parser = parse_throttle_range)]
    pub throttle_ms: Option<(u64, u64)>,
}

fn parse_throttle_range(s: &str) -> Result<(u64, u64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected format: min:max".into());
    }

    let min = parts[0].parse().map_err(|_| "Invalid min value")?;
    let max = parts[1].parse().map_err(|_| "Invalid max value")?;

    if min > max {
        return Err("min must be <= max".into());
    }

    Ok((min, max))
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export notes as Markdown posts (default)
    Export,

    /// Print the directory each notebook maps to
    Notebooks,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_throttle_range_valid() {
        let result = parse_throttle_range("100:300").unwrap();
        assert_eq!(result, (100, 300));
    }

    #[test]
    fn test_parse_throttle_range_invalid() {
        assert!(parse_throttle_range("300:100").is_err());
        assert!(parse_throttle_range("abc:def").is_err());
        assert!(parse_throttle_range("100").is_err());
    }

    #[test]
    fn test_default_command_is_export() {
        let cli = Cli::parse_from(["hexport"]);
        assert!(matches!(cli.command(), Commands::Export));

        let cli = Cli::parse_from(["hexport", "notebooks", "--no-throttle"]);
        assert!(matches!(cli.command(), Commands::Notebooks));
        assert!(cli.no_throttle);
    }
}
