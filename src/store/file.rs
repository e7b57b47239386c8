use super::{Config, DefaultPolicy, Error, Result, Snapshot};
use crate::{log_internal, logging::PrintColor};
use serde_yaml::Mapping;
use std::{
    hash::{DefaultHasher, Hash, Hasher},
    io::ErrorKind,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

/// A [`Config`] bound to a YAML file on disk.
///
/// The file remembers what it last read or wrote.  Saving is skipped when nothing changed, and if
/// someone edited the file by hand in the meantime their version is moved aside to
/// `<name>.<n>.bak` instead of being silently overwritten.
#[derive(Clone, Debug)]
pub struct ConfigFile {
    path: PathBuf,
    config: Config,
    // Hash of the serialized data as of the last load/save
    synced_hash: u64,
    // Hash of the file text as of the last load/save, `None` if there was no file
    synced_raw_hash: Option<u64>,
}

pub struct FileState {
    data: Mapping,
    synced_hash: u64,
    synced_raw_hash: Option<u64>,
}

impl ConfigFile {
    pub async fn open(path: impl AsRef<Path>, policy: DefaultPolicy) -> Result<Self> {
        let config = Config::new(policy);
        let mut file = Self {
            path: path.as_ref().to_path_buf(),
            synced_hash: hash_text(&config.to_yaml_string()?),
            synced_raw_hash: None,
            config,
        };
        file.reload().await?;
        Ok(file)
    }

    /// Throw away in-memory data and read the file again.  On error nothing changes.
    pub async fn reload(&mut self) -> Result<()> {
        let raw = read_optional(&self.path).await?;

        let mut config = Config::new(self.config.policy());
        if let Some(raw) = &raw {
            config.load_str(raw)?;
        }

        self.synced_hash = hash_text(&config.to_yaml_string()?);
        self.synced_raw_hash = raw.as_deref().map(hash_text);
        self.config = config;

        log_internal!("Loaded {}", self.path.color());
        Ok(())
    }

    /// Write pending changes.  Returns whether anything was written.
    pub async fn save(&mut self) -> Result<bool> {
        let serialized = self.config.to_yaml_string()?;
        let hash = hash_text(&serialized);
        if hash == self.synced_hash {
            return Ok(false);
        }

        if let Some(raw) = read_optional(&self.path).await? {
            if Some(hash_text(&raw)) != self.synced_raw_hash {
                self.back_up().await?;
            }
        }

        write_atomic(&self.path, &serialized).await?;
        self.synced_hash = hash;
        self.synced_raw_hash = Some(hash);

        log_internal!("Saved {}", self.path.color());
        Ok(true)
    }

    /// Save pending changes, then read the file back.
    pub async fn sync(&mut self) -> Result<()> {
        self.save().await?;
        self.reload().await
    }

    async fn back_up(&self) -> Result<PathBuf> {
        let backup = self.next_backup_path().await?;

        tokio::fs::rename(&self.path, &backup)
            .await
            .map_err(|source| Error::Io {
                path: self.path.clone(),
                source,
            })?;

        log_internal!(
            "{} was edited on disk since it was loaded, moved it to {}",
            self.path.color(),
            backup.color(),
        );
        Ok(backup)
    }

    async fn next_backup_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let io_error = |source| Error::Io {
            path: dir.to_path_buf(),
            source,
        };

        let prefix = format!("{file_name}.");
        let mut existing = 0;
        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(".bak") {
                existing += 1;
            }
        }

        // Numbers may have gaps if backups were deleted by hand.
        loop {
            let candidate = self.path.with_file_name(format!("{file_name}.{existing}.bak"));
            match tokio::fs::try_exists(&candidate).await {
                Ok(false) => return Ok(candidate),
                Ok(true) => existing += 1,
                Err(source) => {
                    return Err(Error::Io {
                        path: candidate,
                        source,
                    })
                }
            }
        }
    }
}

impl Deref for ConfigFile {
    type Target = Config;

    fn deref(&self) -> &Config {
        &self.config
    }
}

impl DerefMut for ConfigFile {
    fn deref_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

impl Snapshot for ConfigFile {
    type State = FileState;

    fn snapshot(&self) -> FileState {
        FileState {
            data: self.config.snapshot(),
            synced_hash: self.synced_hash,
            synced_raw_hash: self.synced_raw_hash,
        }
    }

    fn restore(&mut self, state: FileState) {
        self.config.restore(state.data);
        self.synced_hash = state.synced_hash;
        self.synced_raw_hash = state.synced_raw_hash;
    }
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `contents` to a sibling temporary file, then rename it over `path`.
pub(super) async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!("{file_name}.new"));

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|source| Error::Io {
            path: tmp_path.clone(),
            source,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open(path: &Path) -> ConfigFile {
        ConfigFile::open(path, DefaultPolicy::Raise).await.unwrap()
    }

    fn backups(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".bak"))
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = open(&dir.path().join("config.yaml")).await;

        assert!(file.data().is_empty());
        assert!(!file.save().await.unwrap());
        assert!(!dir.path().join("config.yaml").exists());
    }

    #[tokio::test]
    async fn unchanged_data_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "# hand formatted\nroles: {admin: 1}\n").unwrap();

        let mut file = open(&path).await;
        assert!(!file.save().await.unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# hand formatted\nroles: {admin: 1}\n"
        );
    }

    #[tokio::test]
    async fn changed_data_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "roles:\n  admin: 1\n").unwrap();

        let mut file = open(&path).await;
        file.set("features.react-roles.message", 77);
        assert!(file.save().await.unwrap());
        assert!(backups(dir.path()).is_empty());

        let reopened = open(&path).await;
        assert_eq!(
            reopened
                .get_integer("features.react-roles.message", None)
                .unwrap(),
            77
        );
        assert_eq!(reopened.get_integer("roles.admin", None).unwrap(), 1);
    }

    #[tokio::test]
    async fn external_edit_is_backed_up_before_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "roles:\n  admin: 1\n").unwrap();

        let mut file = open(&path).await;
        std::fs::write(&path, "roles:\n  admin: 2\n").unwrap();
        file.set("roles.trusted", 3);
        assert!(file.save().await.unwrap());

        assert_eq!(backups(dir.path()), vec!["config.yaml.0.bak"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("config.yaml.0.bak")).unwrap(),
            "roles:\n  admin: 2\n"
        );

        // A second conflict gets the next number
        std::fs::write(&path, "roles:\n  admin: 4\n").unwrap();
        file.set("roles.trusted", 5);
        file.save().await.unwrap();
        assert_eq!(
            backups(dir.path()),
            vec!["config.yaml.0.bak", "config.yaml.1.bak"]
        );
    }

    #[tokio::test]
    async fn save_after_own_write_is_not_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.yaml");

        let mut file = ConfigFile::open(&path, DefaultPolicy::Empty).await.unwrap();
        file.set("greet", "hi");
        file.save().await.unwrap();
        file.set("bye", "later");
        file.save().await.unwrap();

        assert!(backups(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "guild: 1\n").unwrap();

        let mut file = open(&path).await;
        std::fs::write(&path, "guild: [broken\n").unwrap();

        assert!(matches!(file.reload().await, Err(Error::Parse(_))));
        assert_eq!(file.get_integer("guild", None).unwrap(), 1);
    }

    #[tokio::test]
    async fn sync_writes_then_rereads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut file = open(&path).await;
        file.set("guild", 10);
        file.sync().await.unwrap();

        assert_eq!(file.get_integer("guild", None).unwrap(), 10);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn rolled_back_transaction_restores_sync_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "guild: 1\n").unwrap();

        let mut file = open(&path).await;
        {
            let mut change = file.begin_change();
            change.set("guild", 2);
        }

        assert_eq!(file.get_integer("guild", None).unwrap(), 1);
        assert!(!file.save().await.unwrap());
    }
}
