//! Filesystem port for the durable seen-set files.

use std::path::Path;

/// Provides the small slice of filesystem access the seen-set store needs.
///
/// Abstracting the filesystem allows testing the store without touching
/// the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Appends `contents` to a file in a single write, creating the file and
    /// its parent directories when missing.
    ///
    /// The append must be durable when this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the flush to disk fails.
    fn append(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;
}
