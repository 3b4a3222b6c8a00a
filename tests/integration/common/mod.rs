//! Shared fixture: a temporary project directory with git helpers.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// A scratch project in a temporary directory.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// An empty directory, not yet a repository.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// A repository with identity configured and one initial commit.
    pub fn with_repo() -> Self {
        let project = Self::new();
        project.git(&["init"]);
        project.git(&["config", "user.email", "test@example.com"]);
        project.git(&["config", "user.name", "Test User"]);
        project.git(&["config", "commit.gpgsign", "false"]);
        project.commit("Initial commit");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the project, panicking on failure so tests fail loudly.
    pub fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Record an empty commit.
    pub fn commit(&self, message: &str) {
        self.git(&["commit", "--allow-empty", "-m", message]);
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    pub fn write_pyproject(&self, body: &str) {
        self.write_file("pyproject.toml", body);
    }

    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content).expect("failed to write file");
    }
}
