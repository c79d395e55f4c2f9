//! Live filesystem adapter using `std::fs`.

use std::path::Path;

use crate::ports::filesystem::{FileSystem, FsError};

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_directories() {
        let dir = std::env::temp_dir().join("confrisk_live_fs_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("state").join("graph.yaml");

        let fs = LiveFileSystem;
        assert!(!fs.exists(&path));
        fs.write(&path, "nodes: []\n").unwrap();
        assert!(fs.exists(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "nodes: []\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reading_missing_file_is_an_error() {
        let fs = LiveFileSystem;
        assert!(fs.read_to_string(Path::new("/definitely/not/here.json")).is_err());
    }
}
