//! Fixed file layout shared by the stages

use std::path::{Path, PathBuf};

/// Well-known paths under one artifacts root.
///
/// Stages talk to each other only through these files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub root: PathBuf,
    pub raw_dir: PathBuf,
    pub raw_file: PathBuf,
    pub train_file: PathBuf,
    pub test_file: PathBuf,
    pub processed_dir: PathBuf,
    pub processed_train_file: PathBuf,
    pub processed_test_file: PathBuf,
    pub encoders_file: PathBuf,
    pub model_dir: PathBuf,
    pub model_file: PathBuf,
}

impl PipelinePaths {
    /// Lay out the standard tree under `root`
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let raw_dir = root.join("raw");
        let processed_dir = root.join("processed");
        let model_dir = root.join("models");

        Self {
            raw_file: raw_dir.join("raw.csv"),
            train_file: raw_dir.join("train.csv"),
            test_file: raw_dir.join("test.csv"),
            processed_train_file: processed_dir.join("processed_train.csv"),
            processed_test_file: processed_dir.join("processed_test.csv"),
            encoders_file: processed_dir.join("label_encoders.json"),
            model_file: model_dir.join("model.json"),
            root,
            raw_dir,
            processed_dir,
            model_dir,
        }
    }
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self::under("artifacts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = PipelinePaths::under("/tmp/run");

        assert_eq!(paths.raw_file, PathBuf::from("/tmp/run/raw/raw.csv"));
        assert_eq!(paths.train_file, PathBuf::from("/tmp/run/raw/train.csv"));
        assert_eq!(paths.test_file, PathBuf::from("/tmp/run/raw/test.csv"));
        assert_eq!(
            paths.processed_train_file,
            PathBuf::from("/tmp/run/processed/processed_train.csv")
        );
        assert_eq!(paths.model_file, PathBuf::from("/tmp/run/models/model.json"));
        assert!(paths.train_file.starts_with(&paths.raw_dir));
        assert!(paths.encoders_file.starts_with(&paths.processed_dir));
    }

    #[test]
    fn test_default_root() {
        assert_eq!(PipelinePaths::default().root, PathBuf::from("artifacts"));
    }
}
