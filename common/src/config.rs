//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for various configuration files for
//! `overhead`.  This is a configuration file/struct neutral loading engine, storing only the
//! base directory and with `load()` read the proper file or the default one.
//!
//! This encapsulates the configuration file, available with `.inner()` or `.inner_mut()`.
//!

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::makepath;

/// Config filename
const CONFIG: &str = "config.hcl";

/// Main name for the directory base
const TAG: &str = "overhead";

/// Every configuration file carries a version number we check on load.
///
pub trait Versioned {
    /// Version expected by the code
    const VERSION: usize;

    /// Version found in the file
    fn version(&self) -> usize;
}

/// Configuration for the CLI tool, supposed to include parameters and most importantly
/// credentials for the various sources.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + DeserializeOwned + Versioned> {
    /// This is the base directory for all files.
    basedir: PathBuf,
    /// Actual file we read
    path: PathBuf,
    inner: T,
}

impl<T> ConfigFile<T>
where
    T: Debug + DeserializeOwned + Versioned,
{
    /// Returns the path of the default config directory
    ///
    pub fn default_path() -> Result<PathBuf> {
        let base = BaseDirs::new().ok_or_else(|| eyre!("No home directory, can not continue"))?;

        #[cfg(unix)]
        let base = makepath!(base.home_dir(), ".config", TAG);

        #[cfg(windows)]
        let base = makepath!(base.data_local_dir(), TAG);

        debug!("base = {base:?}");
        Ok(base)
    }

    /// Returns the path of the default config file
    ///
    pub fn default_file() -> Result<PathBuf> {
        Ok(Self::default_path()?.join(CONFIG))
    }

    /// Load the file and return a struct T in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI
    /// - default basedir (base on $HOME or $LOCALAPPDATA)
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&Path>) -> Result<ConfigFile<T>> {
        let fname = match fname {
            Some(fname) => fname.to_path_buf(),
            None => Self::default_file()?,
        };

        // Use a full path
        //
        if !fname.exists() {
            return Err(eyre!("Unknown config file {:?}", fname));
        }
        let path = fname.canonicalize()?;
        let basedir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        trace!("Loading config file {path:?} from {basedir:?}");

        let data = fs::read_to_string(&path)?;
        let inner = Self::parse(&data)?;

        Ok(ConfigFile {
            basedir,
            path,
            inner,
        })
    }

    /// Parse and check the version.
    ///
    pub fn parse(data: &str) -> Result<T> {
        let inner: T = hcl::from_str(data)?;
        debug!("struct data = {inner:?}");

        if inner.version() != T::VERSION {
            return Err(eyre!(
                "Bad config file version {}, expected {}",
                inner.version(),
                T::VERSION
            ));
        }
        Ok(inner)
    }

    /// Directory holding the file, relative paths inside the file are based on it.
    ///
    pub fn config_path(&self) -> &Path {
        &self.basedir
    }

    /// Full path of the loaded file
    ///
    pub fn file(&self) -> &Path {
        &self.path
    }

    /// Return the inner configuration file
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Return the inner configuration file as putable
    ///
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the wrapper
    ///
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Clone, Debug, Default, Deserialize)]
    struct Foo {
        version: usize,
        pub name: String,
    }

    impl Versioned for Foo {
        const VERSION: usize = 1;

        fn version(&self) -> usize {
            self.version
        }
    }

    #[test]
    fn test_config_load_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "version = 1\nname = \"foo\"")?;

        let cfg = ConfigFile::<Foo>::load(Some(file.path()))?;
        assert_eq!("foo", cfg.inner().name);
        assert_eq!(1, cfg.inner().version());
        assert_eq!(file.path().canonicalize()?, cfg.file());
        Ok(())
    }

    #[test]
    fn test_config_bad_version() {
        let cfg = ConfigFile::<Foo>::parse("version = 2\nname = \"foo\"");
        assert!(cfg.is_err());
    }

    #[test]
    fn test_config_missing_file() {
        let cfg = ConfigFile::<Foo>::load(Some(Path::new("/nonexistent/config.hcl")));
        assert!(cfg.is_err());
    }
}
