use crate::Result;
use crate::adapters::{SourceContext, SourceKind};
use crate::facts::EntityKind;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::fs;

/// Manifest file name looked up in the current directory when none is given
pub const DEFAULT_MANIFEST: &str = "gh-facts.toml";

/// The payload files normalized together in one run of the `collect` command.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Fixed reference instant for derived computations
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,

    /// Payloads to normalize, in order
    #[serde(default, rename = "payload")]
    pub payloads: Vec<PayloadEntry>,
}

/// One payload file of a [`Manifest`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayloadEntry {
    pub entity: EntityKind,
    pub source: SourceKind,

    /// Payload file, relative to the manifest's directory
    pub path: Utf8PathBuf,

    /// Repository (`owner/name`) the payload belongs to
    #[serde(default)]
    pub repository: Option<String>,

    /// Length in days of the period an activity payload covers
    #[serde(default)]
    pub period_days: Option<u32>,
}

impl PayloadEntry {
    #[must_use]
    pub fn context(&self) -> SourceContext {
        let mut context = SourceContext::new();
        if let Some(repository) = &self.repository {
            context = context.with_repository(repository.clone());
        }
        if let Some(period_days) = self.period_days {
            context = context.with_period_days(period_days);
        }
        context
    }
}

impl Manifest {
    /// Load and validate a manifest.
    ///
    /// Relative payload paths are resolved against the manifest's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or fails validation
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading manifest file '{path}'"))?;
        let mut manifest: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing manifest file '{path}'"))?;
        manifest.validate()?;

        let base = path.parent().unwrap_or_else(|| Utf8Path::new(""));
        for entry in &mut manifest.payloads {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }

        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.payloads.is_empty() {
            return Err(app_err!("the manifest must list at least one [[payload]]"));
        }

        for (index, entry) in self.payloads.iter().enumerate() {
            let position = index + 1;

            if entry.path.as_str().trim().is_empty() {
                return Err(app_err!("payload {position}: path must not be empty"));
            }

            if entry.period_days == Some(0) {
                return Err(app_err!("payload {position}: period_days must be greater than 0"));
            }

            if let Some(repository) = &entry.repository
                && !is_owner_and_name(repository)
            {
                return Err(app_err!("payload {position}: repository must be of the form owner/name, got '{repository}'"));
            }
        }

        Ok(())
    }
}

fn is_owner_and_name(repository: &str) -> bool {
    repository
        .split_once('/')
        .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
}
