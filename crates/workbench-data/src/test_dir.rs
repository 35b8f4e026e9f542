use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// A scratch directory unique to one test, removed on drop.
pub struct TestDir(PathBuf);

impl TestDir {
    pub fn new(suffix: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "workbench_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }
}

impl Deref for TestDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
