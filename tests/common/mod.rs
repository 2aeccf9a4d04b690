//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use buildlog_dash::config::{DashConfig, PathsConfig};
use tempfile::TempDir;

/// A temporary workspace laid out like a build host.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let ws = Workspace { temp };
        fs::create_dir_all(ws.packages()).unwrap();
        fs::create_dir_all(ws.captures()).unwrap();
        ws
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn packages(&self) -> PathBuf {
        self.root().join("packages")
    }

    pub fn build_log(&self) -> PathBuf {
        self.root().join("build.log")
    }

    pub fn captures(&self) -> PathBuf {
        self.root().join("log")
    }

    pub fn html(&self) -> PathBuf {
        self.root().join("public/log")
    }

    pub fn checkpoint(&self) -> PathBuf {
        self.root().join("state/timestamp")
    }

    pub fn index_json(&self) -> PathBuf {
        self.root().join("public/build-log.json")
    }

    pub fn package(&self, name: &str, maintainers: &[&str]) {
        let dir = self.packages().join(name);
        fs::create_dir_all(&dir).unwrap();
        let mut yaml = String::from("maintainers:\n");
        for m in maintainers {
            yaml.push_str(&format!("  - github: {m}\n    email: {m}@example.org\n"));
        }
        fs::write(dir.join("lilac.yaml"), yaml).unwrap();
    }

    pub fn log_lines(&self, lines: &[&str]) {
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(self.build_log(), content).unwrap();
    }

    pub fn capture(&self, folder: &str, file: &str, body: &[u8]) {
        let dir = self.captures().join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), body).unwrap();
    }

    pub fn config(&self) -> DashConfig {
        let mut cfg = DashConfig::default();
        cfg.apply_overrides(PathsConfig {
            maintainers_root: Some(self.packages()),
            build_log: Some(self.build_log()),
            capture_root: Some(self.captures()),
            html_root: Some(self.html()),
            checkpoint: Some(self.checkpoint()),
            index_json: Some(self.index_json()),
        });
        cfg
    }
}
