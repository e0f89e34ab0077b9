//! On-disk fixtures for the integration tests

use derive_new::new;
use std::path::{Path, PathBuf};

/// A file the test plans to create, kept around for later assertions
#[derive(Debug, Clone, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

/// Write the file, creating parent directories on the way
pub fn write_file(file_spec: FileSpec) {
    let FileSpec { path, content } = file_spec;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("creating {parent:?} failed: {e}"));
    }

    std::fs::write(&path, content).unwrap_or_else(|e| panic!("writing {path:?} failed: {e}"));
}

/// Fill `dir` with lorem-ipsum text files and report what was written
pub fn write_generated_files(dir: &Path, files_count: usize) -> Vec<FileSpec> {
    use fake::Fake;
    use fake::faker::lorem::en::{Word, Words};

    std::iter::repeat_with(|| {
        let spec = FileSpec::new(
            dir.join(format!("{}.txt", Word().fake::<String>())),
            Words(5..10).fake::<Vec<String>>().join(" "),
        );
        write_file(spec.clone());

        spec
    })
    .take(files_count)
    .collect()
}

/// Remove a file or a whole directory tree
pub fn delete_path(path: &Path) {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    result.unwrap_or_else(|e| panic!("deleting {path:?} failed: {e}"));
}
