use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::env::TargetEnv;
use crate::error::Error;
use crate::model::LoadReport;
use crate::parser::parse_reader;

const DEFAULT_FILE: &str = ".env";

/// Load `.env` from the current working directory into the process
/// environment.
///
/// # Safety
///
/// See [`TargetEnv::process`].
pub unsafe fn dotenv() -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    unsafe { from_path(DEFAULT_FILE) }
}

/// Load a `.env` file from a specific path into the process environment.
///
/// # Safety
///
/// See [`TargetEnv::process`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    let target = unsafe { TargetEnv::process() };
    EnvLoader::new().path(path).target(target).load()
}

/// Builder-style loader for a single `.env` file.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    path: PathBuf,
    required: bool,
    override_existing: bool,
    target: TargetEnv,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// When `false`, a missing file loads nothing instead of failing.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &TargetEnv {
        &self.target
    }

    pub fn into_target(self) -> TargetEnv {
        self.target
    }

    /// Parse the file without touching the target.
    pub fn parse_only(&self) -> Result<HashMap<String, String>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound && !self.required => {
                debug!(path = %self.path.display(), "optional env file not found");
                return Ok(HashMap::new());
            }
            Err(err) => return Err(err.into()),
        };

        parse_reader(BufReader::new(file)).map_err(|err| {
            warn!(path = %self.path.display(), line = err.line, "failed to parse env file");
            Error::from(err)
        })
    }

    /// Parse the file and apply its entries to the target.
    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let entries = self.parse_only()?;
        let mut report = LoadReport::default();

        for (key, value) in &entries {
            if !self.override_existing && self.target.contains_key(key) {
                report.skipped_existing += 1;
                debug!(key = %key, "skipping existing key");
                continue;
            }

            self.target.set_var(key, value);
            report.loaded += 1;
        }

        debug!(
            path = %self.path.display(),
            loaded = report.loaded,
            skipped = report.skipped_existing,
            "loaded env file"
        );
        Ok(report)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE),
            required: true,
            override_existing: false,
            target: TargetEnv::memory(),
        }
    }
}
