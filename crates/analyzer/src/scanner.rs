use calltrail_syntax::is_java_source;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walk settings, usually taken from [`crate::AnalyzerConfig`]
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_file_size_bytes: u64,
    pub ignored_dirs: Vec<String>,
    pub respect_gitignore: bool,
    pub include_hidden: bool,
}

/// Scanner for finding Java sources under a directory
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Scan for `.java` files (.gitignore aware), in path order
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let ignored: Vec<String> = self
            .options
            .ignored_dirs
            .iter()
            .map(|d| d.to_lowercase())
            .collect();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(!self.options.include_hidden)
            .git_ignore(self.options.respect_gitignore)
            .git_global(self.options.respect_gitignore)
            .git_exclude(self.options.respect_gitignore)
            // honor .gitignore files outside a git checkout too
            .require_git(false);
        builder.filter_entry(move |entry| !Self::is_ignored_scope(entry.path(), &root, &ignored));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !is_java_source(path) {
                        continue;
                    }

                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > self.options.max_file_size_bytes {
                            log::warn!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                self.options.max_file_size_bytes
                            );
                            continue;
                        }
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!("Found {} Java files under {}", files.len(), self.root.display());
        files
    }

    fn is_ignored_scope(path: &Path, root: &Path, ignored: &[String]) -> bool {
        if let Ok(relative) = path.strip_prefix(root) {
            for component in relative.components() {
                if let std::path::Component::Normal(name) = component {
                    let lowered = name.to_string_lossy().to_lowercase();
                    if ignored.iter().any(|candidate| candidate == &lowered) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{FileScanner, ScanOptions};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn options() -> ScanOptions {
        ScanOptions {
            max_file_size_bytes: 1024,
            ignored_dirs: vec!["target".to_string(), "build".to_string()],
            respect_gitignore: true,
            include_hidden: false,
        }
    }

    fn relative(root: &std::path::Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn finds_java_sources_only() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src").join("main").join("java");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("B.java"), b"class B {}").unwrap();
        fs::write(src.join("A.java"), b"class A {}").unwrap();
        fs::write(src.join("notes.md"), b"# notes").unwrap();
        fs::write(temp.path().join("pom.xml"), b"<project/>").unwrap();

        let files = FileScanner::new(temp.path(), options()).scan();
        assert_eq!(
            relative(temp.path(), files),
            vec!["src/main/java/A.java", "src/main/java/B.java"]
        );
    }

    #[test]
    fn skips_ignored_directories_and_large_files() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("Target").join("generated");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("Gen.java"), b"class Gen {}").unwrap();
        fs::write(temp.path().join("Big.java"), vec![b' '; 4096]).unwrap();
        fs::write(temp.path().join("Ok.java"), b"class Ok {}").unwrap();

        let files = FileScanner::new(temp.path(), options()).scan();
        assert_eq!(relative(temp.path(), files), vec!["Ok.java"]);
    }

    #[test]
    fn respects_gitignore_and_hidden() {
        let temp = tempdir().unwrap();
        let legacy = temp.path().join("legacy");
        let hidden = temp.path().join(".cache");
        fs::create_dir_all(&legacy).unwrap();
        fs::create_dir_all(&hidden).unwrap();
        fs::write(legacy.join("Old.java"), b"class Old {}").unwrap();
        fs::write(hidden.join("H.java"), b"class H {}").unwrap();
        fs::write(temp.path().join("Main.java"), b"class Main {}").unwrap();
        fs::write(temp.path().join(".gitignore"), b"/legacy\n").unwrap();

        let files = FileScanner::new(temp.path(), options()).scan();
        assert_eq!(relative(temp.path(), files), vec!["Main.java"]);

        let all = FileScanner::new(
            temp.path(),
            ScanOptions {
                respect_gitignore: false,
                include_hidden: true,
                ..options()
            },
        )
        .scan();
        assert_eq!(
            relative(temp.path(), all),
            vec![".cache/H.java", "Main.java", "legacy/Old.java"]
        );
    }
}
