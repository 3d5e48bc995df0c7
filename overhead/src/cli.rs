//! Command line options for `overhead`.
//!
//! - `watch` runs the monitor with a small console shell to control it
//! - `once` polls a single time and prints what is around
//! - `radii` lists the radius choices
//! - `completion` generates shell completion files
//! - `version` shows the versions of all modules
//!
//! Location, radius and interval given here override the configuration file.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser, Subcommand};
use clap_complete::shells::Shell;

/// CLI options
#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// debug mode (tree-like traces).
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Also log into this directory.
    #[clap(short = 'L', long)]
    pub log_dir: Option<String>,
    /// Verbose mode.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Latitude of the center, needs --lon.
    #[clap(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Longitude of the center, needs --lat.
    #[clap(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
    /// Radius in km.
    #[clap(short = 'r', long)]
    pub radius: Option<f64>,
    /// Polling interval in seconds.
    #[clap(short = 'i', long)]
    pub interval: Option<u64>,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

/// All sub-commands:
///
/// `watch`
/// `once`
/// `radii`
/// `completion SHELL`
/// `version`
///
#[derive(Debug, Subcommand)]
pub enum SubCommand {
    /// Watch the sky and announce every new aircraft
    Watch,
    /// Poll once and list aircraft in range
    Once,
    /// List radius choices
    Radii,
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// List all package versions
    Version,
}

/// Options to generate completion files at runtime
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_opts() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_parse_location() {
        let opts =
            Opts::try_parse_from(["overhead", "--lat", "50.85", "--lon", "-4.35", "-r", "10", "once"])
                .unwrap();

        assert_eq!(Some(50.85), opts.lat);
        assert_eq!(Some(-4.35), opts.lon);
        assert_eq!(Some(10.), opts.radius);
        assert!(matches!(opts.subcmd, SubCommand::Once));
    }

    #[test]
    fn test_lat_needs_lon() {
        assert!(Opts::try_parse_from(["overhead", "--lat", "50.85", "watch"]).is_err());
    }
}
