use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use getset::Getters;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{
    config::VNC_BASE_PORT,
    models::Slice,
    utils::{STORE_BACKUP_EXTENSION, STORE_TEMP_EXTENSION},
    SliceError, SliceResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The version of the snapshot layout written by this build.
pub const STORE_VERSION: u32 = 1;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Loads and saves the full store snapshot.
#[async_trait]
pub trait SliceRepository: Send + Sync {
    /// Loads the snapshot. A repository with nothing saved yet returns an empty snapshot.
    async fn load(&self) -> SliceResult<StoreSnapshot>;

    /// Replaces the saved snapshot.
    async fn save(&self, snapshot: &StoreSnapshot) -> SliceResult<()>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything the store persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// The layout version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// The VNC port offset of the next slice. Never decreases, even when slices are deleted.
    #[serde(default)]
    pub vnc_counter: u32,

    /// The stored slices, in creation order.
    #[serde(default)]
    pub slices: Vec<Slice>,
}

/// The encoding of a store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// Pretty-printed JSON.
    Json,

    /// YAML.
    Yaml,
}

/// A repository backed by a single JSON or YAML file.
///
/// Saves go to a temporary file that is then renamed over the store. The file being replaced
/// is kept next to it with a `.backup` extension.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct FileRepository {
    /// The store file.
    path: PathBuf,

    /// The encoding of the store file.
    format: StoreFormat,
}

/// A repository that keeps the snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    snapshot: Arc<Mutex<Option<StoreSnapshot>>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl StoreSnapshot {
    /// Returns true if no slice is stored.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Returns the index of a slice by id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.slices.iter().position(|slice| slice.id == id)
    }

    /// Checks a freshly loaded snapshot and brings its VNC counter up to date.
    ///
    /// Fails if the snapshot was written by a newer version, if two slices share an id or a
    /// VLAN, or if a link or segment references a VM the slice does not have. A counter that is
    /// behind the VNC ports already handed out, as in stores written without one, is raised so
    /// that ports are never reused.
    pub fn verified(mut self) -> SliceResult<Self> {
        if self.version > STORE_VERSION {
            return Err(SliceError::UnsupportedStoreVersion {
                found: self.version,
                supported: STORE_VERSION,
            });
        }

        let mut ids = HashSet::new();
        let mut vlans = HashSet::new();
        for slice in &self.slices {
            if !ids.insert(slice.id.as_str()) {
                return Err(SliceError::CorruptStore(format!("slice id {} is used twice", slice.id)));
            }

            if !vlans.insert(slice.vlan) {
                return Err(SliceError::CorruptStore(format!(
                    "vlan {} is used by more than one slice ({})",
                    slice.vlan, slice.id
                )));
            }

            let count = slice.vms.len();
            let members = slice
                .segments
                .iter()
                .flat_map(|segment| segment.members.iter().copied());
            let ends = slice.edges().flat_map(|link| [link.a(), link.b()]);
            if let Some(index) = members.chain(ends).find(|index| *index >= count) {
                return Err(SliceError::CorruptStore(format!(
                    "slice {} references VM index {} but has {} VMs",
                    slice.id, index, count
                )));
            }
        }

        let used = self
            .slices
            .iter()
            .flat_map(|slice| slice.vms.iter())
            .map(|vm| u32::from(vm.vnc_port.saturating_sub(VNC_BASE_PORT)))
            .max()
            .unwrap_or(0);
        if used > self.vnc_counter {
            tracing::warn!(
                "vnc counter {} is behind the ports in use, raising it to {}",
                self.vnc_counter,
                used
            );
            self.vnc_counter = used;
        }

        Ok(self)
    }
}

impl StoreFormat {
    /// Picks the format from the file extension: `.yaml` and `.yml` are YAML, anything else is
    /// JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => StoreFormat::Yaml,
            _ => StoreFormat::Json,
        }
    }

    /// Encodes a snapshot.
    pub fn encode(&self, snapshot: &StoreSnapshot) -> SliceResult<String> {
        Ok(match self {
            StoreFormat::Json => serde_json::to_string_pretty(snapshot)?,
            StoreFormat::Yaml => serde_yaml::to_string(snapshot)?,
        })
    }

    /// Decodes a snapshot.
    pub fn decode(&self, contents: &str) -> SliceResult<StoreSnapshot> {
        Ok(match self {
            StoreFormat::Json => serde_json::from_str(contents)?,
            StoreFormat::Yaml => serde_yaml::from_str(contents)?,
        })
    }
}

impl FileRepository {
    /// Creates a repository for `path`, with the format picked from its extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = StoreFormat::from_path(&path);
        Self { path, format }
    }

    /// Creates a repository for `path` with an explicit format.
    pub fn with_format(path: impl Into<PathBuf>, format: StoreFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Returns the path of the backup kept from the previous save.
    pub fn backup_path(&self) -> PathBuf {
        with_extra_extension(&self.path, STORE_BACKUP_EXTENSION)
    }

    fn temp_path(&self) -> PathBuf {
        with_extra_extension(&self.path, STORE_TEMP_EXTENSION)
    }

    /// Backs up the current store file, if any, and moves `temp_path` over it.
    async fn replace_with(&self, temp_path: &Path) -> SliceResult<()> {
        if fs::try_exists(&self.path).await? {
            fs::copy(&self.path, self.backup_path()).await?;
        }

        fs::rename(temp_path, &self.path).await?;
        Ok(())
    }
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already holds a snapshot.
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Some(snapshot))),
        }
    }

    /// Returns the last saved snapshot, if any.
    pub fn saved(&self) -> Option<StoreSnapshot> {
        self.snapshot
            .lock()
            .ok()
            .and_then(|snapshot| snapshot.clone())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn default_version() -> u32 {
    STORE_VERSION
}

fn with_extra_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            vnc_counter: 0,
            slices: Vec::new(),
        }
    }
}

#[async_trait]
impl SliceRepository for FileRepository {
    async fn load(&self) -> SliceResult<StoreSnapshot> {
        if !fs::try_exists(&self.path).await? {
            tracing::debug!("no store at {}, starting empty", self.path.display());
            return Ok(StoreSnapshot::default());
        }

        let contents = fs::read_to_string(&self.path).await?;
        if contents.trim().is_empty() {
            return Ok(StoreSnapshot::default());
        }

        let snapshot = self.format.decode(&contents)?.verified()?;

        tracing::debug!(
            "loaded {} slices from {}",
            snapshot.slices.len(),
            self.path.display()
        );

        Ok(snapshot)
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> SliceResult<()> {
        let contents = self.format.encode(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, contents).await?;

        if let Err(e) = self.replace_with(&temp_path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                tracing::warn!("failed to remove {}: {}", temp_path.display(), cleanup);
            }
            return Err(e);
        }

        tracing::debug!(
            "saved {} slices to {}",
            snapshot.slices.len(),
            self.path.display()
        );

        Ok(())
    }
}

#[async_trait]
impl SliceRepository for MemoryRepository {
    async fn load(&self) -> SliceResult<StoreSnapshot> {
        self.saved().unwrap_or_default().verified()
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> SliceResult<()> {
        let mut saved = self
            .snapshot
            .lock()
            .map_err(|e| SliceError::custom(anyhow::anyhow!("memory repository poisoned: {}", e)))?;
        *saved = Some(snapshot.clone());
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        builder::{SliceBuilder, VmSpec},
        management::{SliceStore, StaticPrincipal},
        topology::{Link, TopologyKind},
    };

    async fn two_slices() -> anyhow::Result<StoreSnapshot> {
        let store = SliceStore::load(MemoryRepository::new()).await?;
        let alice = StaticPrincipal::user("alice");
        for name in ["first", "second"] {
            let mut builder = SliceBuilder::new(name)?;
            builder.add_topology_segment(TopologyKind::Linear, vec![VmSpec::default(); 2])?;
            store.create(&alice, builder.finalize()?).await?;
        }

        Ok(store.snapshot().await)
    }

    #[test]
    fn test_store_format_from_path() {
        assert_eq!(StoreFormat::from_path("slices.json"), StoreFormat::Json);
        assert_eq!(StoreFormat::from_path("slices.yaml"), StoreFormat::Yaml);
        assert_eq!(StoreFormat::from_path("/tmp/SLICES.YML"), StoreFormat::Yaml);
        assert_eq!(StoreFormat::from_path("slices"), StoreFormat::Json);
    }

    #[test_log::test(tokio::test)]
    async fn test_file_repository_missing_file_is_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let repository = FileRepository::new(dir.path().join("slices.json"));

        let snapshot = repository.load().await?;
        assert_eq!(snapshot, StoreSnapshot::default());
        assert_eq!(snapshot.version, STORE_VERSION);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_file_repository_save_keeps_backup() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("slices.yaml");
        let repository = FileRepository::new(&path);
        assert_eq!(repository.get_format(), &StoreFormat::Yaml);

        let first = StoreSnapshot {
            vnc_counter: 3,
            ..Default::default()
        };
        repository.save(&first).await?;
        assert!(!repository.backup_path().exists());

        let second = StoreSnapshot {
            vnc_counter: 5,
            ..Default::default()
        };
        repository.save(&second).await?;

        assert_eq!(repository.load().await?, second);
        assert!(!dir.path().join("nested").join("slices.yaml.tmp").exists());

        let backup = std::fs::read_to_string(repository.backup_path())?;
        assert_eq!(StoreFormat::Yaml.decode(&backup)?, first);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_file_repository_rejects_newer_version() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("slices.json");
        std::fs::write(&path, r#"{"version": 99, "vnc_counter": 0, "slices": []}"#)?;

        let result = FileRepository::new(&path).load().await;
        assert!(matches!(
            result,
            Err(SliceError::UnsupportedStoreVersion {
                found: 99,
                supported: STORE_VERSION
            })
        ));
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_file_repository_reads_legacy_layout() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("slices.json");
        std::fs::write(&path, r#"{"slices": []}"#)?;

        let snapshot = FileRepository::new(&path).load().await?;
        assert_eq!(snapshot.version, STORE_VERSION);
        assert_eq!(snapshot.vnc_counter, 0);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_file_repository_with_explicit_format() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("slices.data");
        let repository = FileRepository::with_format(&path, StoreFormat::Yaml);

        let snapshot = StoreSnapshot {
            vnc_counter: 4,
            ..Default::default()
        };
        repository.save(&snapshot).await?;

        assert!(std::fs::read_to_string(&path)?.contains("vnc_counter: 4"));
        assert_eq!(repository.load().await?, snapshot);
        assert!(FileRepository::new(&path).load().await.is_err());
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_file_repository_failed_save_removes_temp_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("slices.json");
        let repository = FileRepository::new(&path);

        let first = StoreSnapshot {
            vnc_counter: 2,
            ..Default::default()
        };
        repository.save(&first).await?;

        // A directory in place of the backup makes the copy fail.
        std::fs::create_dir(repository.backup_path())?;
        let second = StoreSnapshot {
            vnc_counter: 9,
            ..Default::default()
        };
        assert!(matches!(
            repository.save(&second).await,
            Err(SliceError::Io(_))
        ));

        assert!(!dir.path().join("slices.json.tmp").exists());
        assert_eq!(repository.load().await?, first);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_file_repository_raises_missing_vnc_counter() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("slices.json");

        let mut legacy = serde_json::to_value(two_slices().await?)?;
        if let Some(fields) = legacy.as_object_mut() {
            fields.remove("vnc_counter");
        }
        std::fs::write(&path, serde_json::to_string(&legacy)?)?;

        let snapshot = FileRepository::new(&path).load().await?;
        assert_eq!(snapshot.vnc_counter, 4);

        let store = SliceStore::open(&path).await?;
        let mut builder = SliceBuilder::new("third")?;
        builder.add_topology_segment(TopologyKind::Linear, vec![VmSpec::default(); 2])?;
        let third = store
            .create(&StaticPrincipal::user("alice"), builder.finalize()?)
            .await?;

        let ports: Vec<_> = third.get_vms().iter().map(|vm| vm.get_vnc_port()).collect();
        assert_eq!(ports, vec![5905, 5906]);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_snapshot_rejects_duplicate_ids_and_vlans() -> anyhow::Result<()> {
        let snapshot = two_slices().await?;

        let mut duplicate_id = snapshot.clone();
        duplicate_id.slices[1].id = duplicate_id.slices[0].id.clone();
        assert!(matches!(
            duplicate_id.verified(),
            Err(SliceError::CorruptStore(_))
        ));

        let mut duplicate_vlan = snapshot.clone();
        duplicate_vlan.slices[1].vlan = duplicate_vlan.slices[0].vlan;
        assert!(matches!(
            duplicate_vlan.verified(),
            Err(SliceError::CorruptStore(_))
        ));

        assert_eq!(snapshot.clone().verified()?, snapshot);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_snapshot_rejects_out_of_range_vm_index() -> anyhow::Result<()> {
        let snapshot = two_slices().await?;

        let mut bad_link = snapshot.clone();
        bad_link.slices[0].links.push(Link::new(0, 5));
        assert!(matches!(bad_link.verified(), Err(SliceError::CorruptStore(_))));

        let mut bad_member = snapshot.clone();
        bad_member.slices[1].segments[0].members.push(2);
        assert!(matches!(
            bad_member.verified(),
            Err(SliceError::CorruptStore(_))
        ));

        let repository = MemoryRepository::new();
        let mut bad_edge = snapshot;
        bad_edge.slices[0].segments[0].edges.push(Link::new(1, 3));
        repository.save(&bad_edge).await?;
        assert!(matches!(
            repository.load().await,
            Err(SliceError::CorruptStore(_))
        ));
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_memory_repository_roundtrip() -> anyhow::Result<()> {
        let repository = MemoryRepository::new();
        assert!(repository.saved().is_none());
        assert!(repository.load().await?.is_empty());

        let snapshot = StoreSnapshot {
            vnc_counter: 7,
            ..Default::default()
        };
        repository.save(&snapshot).await?;
        assert_eq!(repository.load().await?, snapshot);
        Ok(())
    }
}
