//! Where directive operands live on disk.
//!
//! Imports and embedded files are looked up in fixed subdirectories of the
//! template's base directory:
//! - `!import V` reads `<base>/imports/V.yml`
//! - `!file V` reads `<base>/files/V`

use std::path::{Path, PathBuf};

/// Directory holding documents referenced by `!import`.
pub const IMPORTS_DIRNAME: &str = "imports";

/// Directory holding files embedded by `!file`.
pub const FILES_DIRNAME: &str = "files";

/// Extension appended to `!import` operands.
pub const IMPORT_EXTENSION: &str = "yml";

/// Conventional source layout rooted at a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    base_dir: PathBuf,
}

impl SourceLayout {
    /// Layout rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the document imported as `name`.
    pub fn import_path(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(IMPORTS_DIRNAME)
            .join(format!("{}.{}", name, IMPORT_EXTENSION))
    }

    /// Path of the file embedded as `name`.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(FILES_DIRNAME).join(name)
    }
}

/// Rooted at the working directory.
impl Default for SourceLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_paths() {
        let layout = SourceLayout::default();
        assert_eq!(layout.import_path("network"), PathBuf::from("./imports/network.yml"));
        assert_eq!(layout.file_path("boot.sh"), PathBuf::from("./files/boot.sh"));
    }

    #[test]
    fn test_base_dir() {
        let layout = SourceLayout::new("/stack");
        assert_eq!(layout.base_dir(), Path::new("/stack"));
        assert_eq!(layout.import_path("vpc"), PathBuf::from("/stack/imports/vpc.yml"));
    }
}
