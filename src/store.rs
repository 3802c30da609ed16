//! Storage seam for generated dashboards.
//!
//! The engine never caches; callers that want at-most-once generation per
//! request go through [`generate_cached`] with a store of their choosing.
//! Stored documents are returned verbatim. A document that can no longer be
//! read is regenerated and overwritten.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::{debug, info, warn};

use crate::{
    config::EngineSettings,
    dashboard::{DashboardConfiguration, DashboardStyle},
    error::{DashboardError, Result},
    io_utils,
    table::ReadOptions,
};

const VARIANT_DIGEST_LEN: usize = 16;

/// Everything that can change a generated document: the source bytes, the
/// style, how the bytes are read and the engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub source_digest: String,
    pub style: DashboardStyle,
    pub delimiter: u8,
    pub encoding: &'static str,
    pub missing_tokens: Vec<String>,
    pub settings_digest: String,
}

impl StoreKey {
    pub fn new(
        bytes: &[u8],
        style: DashboardStyle,
        settings: &EngineSettings,
        options: &ReadOptions,
    ) -> Result<Self> {
        Ok(Self {
            source_digest: io_utils::source_digest(bytes),
            style,
            delimiter: options.delimiter,
            encoding: options.encoding.name(),
            missing_tokens: options.missing_tokens.clone(),
            settings_digest: io_utils::source_digest(&serde_json::to_vec(settings)?),
        })
    }

    /// Short digest over the read options and settings.
    fn variant(&self) -> String {
        let mut material = vec![self.delimiter];
        material.extend_from_slice(self.encoding.as_bytes());
        for token in &self.missing_tokens {
            material.push(0);
            material.extend_from_slice(token.as_bytes());
        }
        material.push(0);
        material.extend_from_slice(self.settings_digest.as_bytes());
        let mut digest = io_utils::source_digest(&material);
        digest.truncate(VARIANT_DIGEST_LEN);
        digest
    }

    fn file_name(&self) -> String {
        format!("{}-{}-{}.json", self.source_digest, self.style, self.variant())
    }
}

pub trait DashboardStore: Send + Sync {
    fn load(&self, key: &StoreKey) -> Result<Option<DashboardConfiguration>>;
    fn save(&self, key: &StoreKey, config: &DashboardConfiguration) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, DashboardConfiguration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // every insert is a single map operation, so a poisoned map is still consistent
    fn entries(&self) -> MutexGuard<'_, HashMap<StoreKey, DashboardConfiguration>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DashboardStore for MemoryStore {
    fn load(&self, key: &StoreKey) -> Result<Option<DashboardConfiguration>> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &StoreKey, config: &DashboardConfiguration) -> Result<()> {
        self.entries().insert(key.clone(), config.clone());
        Ok(())
    }
}

/// One JSON document per key under `root`, named
/// `{digest}-{style}-{variant}.json`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

impl DashboardStore for DirectoryStore {
    fn load(&self, key: &StoreKey) -> Result<Option<DashboardConfiguration>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let config = serde_json::from_slice(&bytes).map_err(|err| {
            DashboardError::CorruptDocument {
                path: path.clone(),
                reason: err.to_string(),
            }
        })?;
        Ok(Some(config))
    }

    /// Writes a sibling `.tmp` file and renames it over the final path, so
    /// readers never observe a partial document.
    fn save(&self, key: &StoreKey, config: &DashboardConfiguration) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let staging = staging_path(&path);
        if let Err(err) = write_document(&staging, config) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        fs::rename(&staging, &path)?;
        debug!("Stored dashboard document at {path:?}");
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_document(path: &Path, config: &DashboardConfiguration) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, config)?;
    writer.flush()?;
    Ok(())
}

/// Returns the stored configuration for this request when one exists,
/// otherwise generates it and stores the result.
pub fn generate_cached<S>(
    store: &S,
    bytes: &[u8],
    style: DashboardStyle,
    settings: &EngineSettings,
    options: &ReadOptions,
) -> Result<DashboardConfiguration>
where
    S: DashboardStore + ?Sized,
{
    let key = StoreKey::new(bytes, style, settings, options)?;
    match store.load(&key) {
        Ok(Some(config)) => {
            info!(
                "Reusing stored {style} dashboard for source {}",
                key.source_digest
            );
            return Ok(config);
        }
        Ok(None) => {}
        Err(err @ DashboardError::CorruptDocument { .. }) => {
            warn!("{err}; regenerating");
        }
        Err(err) => return Err(err),
    }
    let config = crate::generate_dashboard_from(bytes, style, settings, options)?;
    store.save(&key, &config)?;
    Ok(config)
}
