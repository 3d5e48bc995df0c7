use std::io;
use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use tracing::{info, trace, warn};

use overhead::{list_once, watch, Config, Context, Opts, Status, SubCommand, RADII};
use overhead_common::{init_logging, ConfigFile};
use overhead_sources::Auth;

/// Binary name, using a different binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

fn main() -> Result<()> {
    let opts = Opts::parse();

    init_logging(NAME, opts.debug, opts.log_dir.clone())?;

    // Commands not needing anything else
    //
    match &opts.subcmd {
        // NOTE: you can generate UNIX shells completion on Windows and vice-versa.
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
            return Ok(());
        }
        SubCommand::Version => {
            eprintln!("Modules: ");
            eprintln!("\t{}", version());
            eprintln!("\t{}", overhead::version());
            eprintln!("\t{}", overhead_common::version());
            eprintln!("\t{}", overhead_sources::version());
            return Ok(());
        }
        SubCommand::Radii => {
            let radii: Vec<String> = RADII.iter().map(|r| format!("{r} km")).collect();
            println!("{}", radii.join("\n"));
            return Ok(());
        }
        _ => (),
    }

    let (cfg, basedir) = load_config(&opts)?;

    if opts.verbose > 0 {
        banner()?;
    }

    let ctx = Context::setup(&opts, &cfg, &basedir)?;

    match opts.subcmd {
        SubCommand::Watch => {
            trace!("watch");
            watch(ctx)?;
        }
        SubCommand::Once => {
            trace!("once");
            println!("{}", list_once(&ctx)?);
        }
        _ => (),
    }
    Ok(())
}

/// Given file, default file or nothing if we have credentials in the environment.
///
fn load_config(opts: &Opts) -> Result<(Config, PathBuf)> {
    if let Some(fname) = &opts.config {
        let cfg = ConfigFile::<Config>::load(Some(fname.as_path()))?;
        info!("Using {:?}", cfg.file());
        let basedir = cfg.config_path().to_path_buf();
        return Ok((cfg.into_inner(), basedir));
    }

    let def = ConfigFile::<Config>::default_file()?;
    if def.exists() {
        let cfg = ConfigFile::<Config>::load(Some(def.as_path()))?;
        let basedir = cfg.config_path().to_path_buf();
        return Ok((cfg.into_inner(), basedir));
    }

    if Auth::from_env().is_err() {
        return Err(Status::MissingConfig.into());
    }
    warn!("No configuration file, using defaults");
    Ok((Config::default(), PathBuf::from(".")))
}

/// Return our version number
///
#[inline]
pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}
