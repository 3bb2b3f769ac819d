//! Plan download

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};

/// File name every downloaded plan is saved under
pub const PLAN_FILE_NAME: &str = "metacognitive_study_plan.md";

/// Write the plan text verbatim into `dir`, returning the file path
pub fn download(plan: &str, dir: &Path) -> Result<PathBuf> {
    debug!(?dir, chars = plan.len(), "download: called");
    if !dir.exists() {
        fs::create_dir_all(dir).context(format!("Failed to create directory {}", dir.display()))?;
    }

    let path = dir.join(PLAN_FILE_NAME);
    fs::write(&path, plan).context(format!("Failed to write {}", path.display()))?;

    info!("Saved study plan to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_download_writes_plan_verbatim() {
        let dir = TempDir::new().unwrap();
        let plan = "| Week | Focus |\n|---|---|\n| 1 | Recall |\n\n### Sources\n- [a](https://a.example)";

        let path = download(plan, dir.path()).unwrap();

        assert_eq!(path, dir.path().join(PLAN_FILE_NAME));
        assert_eq!(fs::read_to_string(&path).unwrap(), plan);
    }

    #[test]
    fn test_download_creates_missing_dir_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("plans").join("spring");

        download("old", &nested).unwrap();
        let path = download("new", &nested).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }
}
