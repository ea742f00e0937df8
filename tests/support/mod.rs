#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;
use taskstash::storage::FileStorage;
use taskstash::TaskBook;

/// A throwaway data directory.
pub struct TestStash {
    dir: TempDir,
}

impl TestStash {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn book(&self) -> TaskBook {
        TaskBook::open_dir(self.path()).expect("open task book")
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.path())
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.path().join(rel_path);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_file(&self, rel_path: &str) -> Option<String> {
        fs::read_to_string(self.path().join(rel_path)).ok()
    }

    /// The binary pointed at this data directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskstash").expect("binary");
        cmd.env_remove("RUST_LOG");
        cmd.arg("--data-dir").arg(self.path());
        cmd
    }

    /// Run a `--json` command and return its `data` payload.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run taskstash");
        assert!(
            output.status.success(),
            "taskstash {args:?} failed: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        let value: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("json output");
        value["data"].clone()
    }
}
