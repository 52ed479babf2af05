//! Seen-set store: the durable record of processed issue numbers.
//!
//! One line-oriented file per repository, all I/O through the `FileSystem`
//! port. Directory layout:
//!
//! ```text
//! <root>/
//!   ├── octo_cat.txt      # "12\n15\n16\n"
//!   └── octo_dog.txt
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::ports::filesystem::FileSystem;
use crate::ports::RepositoryHandle;

/// Issue numbers already processed for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    numbers: BTreeSet<u64>,
}

impl SeenSet {
    /// Returns `true` if `number` has been recorded.
    #[must_use]
    pub fn contains(&self, number: u64) -> bool {
        self.numbers.contains(&number)
    }

    /// Highest number ever recorded, `None` for a repository never polled.
    #[must_use]
    pub fn max_known(&self) -> Option<u64> {
        self.numbers.last().copied()
    }

    /// Number of recorded issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Returns `true` when nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Recorded numbers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.numbers.iter().copied()
    }

    /// Adds a number; returns `false` if it was already present.
    pub fn insert(&mut self, number: u64) -> bool {
        self.numbers.insert(number)
    }
}

impl FromIterator<u64> for SeenSet {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        Self { numbers: iter.into_iter().collect() }
    }
}

/// Persistence layer for per-repository seen-sets.
///
/// All I/O goes through the `FileSystem` port so that the store works with
/// the live disk and with in-memory filesystems in tests.
pub struct SeenStore<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
}

impl<'a> SeenStore<'a> {
    /// Creates a new store rooted at the given directory.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, root: &Path) -> Self {
        Self { fs, root: root.to_path_buf() }
    }

    /// Loads the seen-set for `repo`.
    ///
    /// A repository without a file has never been polled and yields an
    /// empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or contains a
    /// line that is not a positive issue number.
    pub fn load(&self, repo: &RepositoryHandle) -> Result<SeenSet, StoreError> {
        let path = self.path_for(repo);
        self.read_raw(&path).map(|raw| raw.seen)
    }

    /// Records `number` as processed for `repo`.
    ///
    /// Idempotent: a number already present is not written again. The new
    /// line is flushed to disk before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the current set cannot be read or the append fails.
    pub fn record(&self, repo: &RepositoryHandle, number: u64) -> Result<(), StoreError> {
        let path = self.path_for(repo);
        let raw = self.read_raw(&path)?;
        if raw.seen.contains(number) {
            return Ok(());
        }

        // Repair a torn final line so the new number does not get glued onto it.
        let contents = if raw.ends_clean { format!("{number}\n") } else { format!("\n{number}\n") };
        self.fs
            .append(&path, &contents)
            .map_err(|source| StoreError::Write { path: path.clone(), source })
    }

    /// Highest number recorded for `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be loaded.
    pub fn max_known(&self, repo: &RepositoryHandle) -> Result<Option<u64>, StoreError> {
        Ok(self.load(repo)?.max_known())
    }

    /// File backing the seen-set of `repo`: `<root>/<owner>_<name>.txt`.
    #[must_use]
    pub fn path_for(&self, repo: &RepositoryHandle) -> PathBuf {
        self.root.join(format!("{}.txt", repo.as_str().replace('/', "_")))
    }

    fn read_raw(&self, path: &Path) -> Result<RawSeenFile, StoreError> {
        if !self.fs.exists(path) {
            return Ok(RawSeenFile { seen: SeenSet::default(), ends_clean: true });
        }
        let contents = self
            .fs
            .read_to_string(path)
            .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
        let seen = parse_seen(path, &contents)?;
        Ok(RawSeenFile { seen, ends_clean: contents.is_empty() || contents.ends_with('\n') })
    }
}

struct RawSeenFile {
    seen: SeenSet,
    ends_clean: bool,
}

fn parse_seen(path: &Path, contents: &str) -> Result<SeenSet, StoreError> {
    let mut seen = SeenSet::default();
    for (index, line) in contents.lines().enumerate() {
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        match value.parse::<u64>() {
            Ok(number) if number > 0 => {
                seen.insert(number);
            }
            _ => {
                return Err(StoreError::Corrupt {
                    path: path.to_path_buf(),
                    line: index + 1,
                    value: value.to_string(),
                })
            }
        }
    }
    Ok(seen)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory filesystem for testing the store without touching disk.
    #[derive(Default)]
    pub(crate) struct MemFs {
        pub(crate) files: Mutex<HashMap<PathBuf, String>>,
        pub(crate) fail_appends: bool,
    }

    impl FileSystem for MemFs {
        fn read_to_string(
            &self,
            path: &Path,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            let files = self.files.lock().unwrap();
            files
                .get(path)
                .cloned()
                .ok_or_else(|| format!("File not found: {}", path.display()).into())
        }

        fn append(
            &self,
            path: &Path,
            contents: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail_appends {
                return Err("disk full".into());
            }
            let mut files = self.files.lock().unwrap();
            files.entry(path.to_path_buf()).or_default().push_str(contents);
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    fn repo(handle: &str) -> RepositoryHandle {
        handle.parse().unwrap()
    }

    #[test]
    fn missing_file_is_an_empty_set() {
        let fs = MemFs::default();
        let store = SeenStore::new(&fs, Path::new("/seen"));

        let seen = store.load(&repo("octo/cat")).unwrap();
        assert!(seen.is_empty());
        assert_eq!(store.max_known(&repo("octo/cat")).unwrap(), None);
    }

    #[test]
    fn record_persists_and_reloads() {
        let fs = MemFs::default();
        let store = SeenStore::new(&fs, Path::new("/seen"));
        let cat = repo("octo/cat");

        store.record(&cat, 12).unwrap();
        store.record(&cat, 3).unwrap();

        let seen = store.load(&cat).unwrap();
        assert!(seen.contains(12));
        assert!(seen.contains(3));
        assert_eq!(seen.max_known(), Some(12));
        let raw = fs.read_to_string(Path::new("/seen/octo_cat.txt")).unwrap();
        assert_eq!(raw, "12\n3\n");
    }

    #[test]
    fn record_is_idempotent() {
        let fs = MemFs::default();
        let store = SeenStore::new(&fs, Path::new("/seen"));
        let cat = repo("octo/cat");

        store.record(&cat, 7).unwrap();
        store.record(&cat, 7).unwrap();

        let seen = store.load(&cat).unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen.contains(7));
        let raw = fs.read_to_string(Path::new("/seen/octo_cat.txt")).unwrap();
        assert_eq!(raw.matches('7').count(), 1);
    }

    #[test]
    fn repositories_are_kept_apart() {
        let fs = MemFs::default();
        let store = SeenStore::new(&fs, Path::new("/seen"));

        store.record(&repo("octo/cat"), 1).unwrap();
        store.record(&repo("octo/dog"), 2).unwrap();

        assert!(!store.load(&repo("octo/cat")).unwrap().contains(2));
        assert!(!store.load(&repo("octo/dog")).unwrap().contains(1));
    }

    #[test]
    fn reads_original_format_with_blank_lines() {
        let fs = MemFs::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/seen/octo_cat.txt"), "40\n\n42 \n41\n".to_string());
        let store = SeenStore::new(&fs, Path::new("/seen"));

        let seen = store.load(&repo("octo/cat")).unwrap();
        assert_eq!(seen.iter().collect::<Vec<_>>(), vec![40, 41, 42]);
        assert_eq!(seen.max_known(), Some(42));
    }

    #[test]
    fn corrupt_line_is_reported_with_position() {
        let fs = MemFs::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from("/seen/octo_cat.txt"), "1\nabc\n".to_string());
        let store = SeenStore::new(&fs, Path::new("/seen"));

        let err = store.load(&repo("octo/cat")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }));
    }

    #[test]
    fn torn_final_line_is_not_glued_to_next_record() {
        let fs = MemFs::default();
        fs.files.lock().unwrap().insert(PathBuf::from("/seen/octo_cat.txt"), "4".to_string());
        let store = SeenStore::new(&fs, Path::new("/seen"));
        let cat = repo("octo/cat");

        store.record(&cat, 46).unwrap();

        let seen = store.load(&cat).unwrap();
        assert_eq!(seen.iter().collect::<Vec<_>>(), vec![4, 46]);
    }

    #[test]
    fn failed_append_surfaces_write_error() {
        let fs = MemFs { fail_appends: true, ..MemFs::default() };
        let store = SeenStore::new(&fs, Path::new("/seen"));

        let err = store.record(&repo("octo/cat"), 1).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(store.load(&repo("octo/cat")).unwrap().is_empty());
    }
}
