use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Absolute paths of all files in `work_dir` matching at least one of the
/// newline separated patterns. `**` matches directories recursively; hidden
/// files and directories only match a literal leading dot.
pub fn glob_files(work_dir: &Path, patterns: &str) -> Result<BTreeSet<PathBuf>> {
    if !work_dir.is_absolute() {
        anyhow::bail!(
            "Please provide the absolute path of the work directory: {}",
            work_dir.display()
        );
    }

    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };
    let mut files = BTreeSet::new();
    for pattern in patterns.trim_matches('\n').lines() {
        if pattern.is_empty() {
            continue;
        }
        let full_pattern = work_dir.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();
        let paths = glob::glob_with(&pattern_str, options)
            .with_context(|| format!("Invalid glob pattern: {pattern}"))?;
        files.extend(paths.flatten());
    }
    Ok(files)
}

/// Path of `path` relative to the directory `base`.
///
/// Both are expected to be absolute (or both relative to the same root).
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<Component> = path.components().collect();
    let base: Vec<Component> = base.components().collect();
    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_glob_single_pattern() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.ipynb");
        touch(dir.path(), "b.txt");

        let files = glob_files(dir.path(), "*.ipynb").unwrap();
        assert_eq!(files.into_iter().collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_glob_recursive() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.ipynb");
        let b = touch(dir.path(), "sub/dir/b.ipynb");

        let files = glob_files(dir.path(), "**/*.ipynb").unwrap();
        assert!(files.contains(&a));
        assert!(files.contains(&b));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_glob_skips_hidden_entries() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.ipynb");
        touch(dir.path(), ".hidden.ipynb");
        touch(dir.path(), ".ipynb_checkpoints/a-checkpoint.ipynb");
        touch(dir.path(), "sub/.ipynb_checkpoints/b-checkpoint.ipynb");

        let files = glob_files(dir.path(), "**/*.ipynb").unwrap();
        assert_eq!(files.into_iter().collect::<Vec<_>>(), vec![a]);

        let checkpoints = glob_files(dir.path(), ".ipynb_checkpoints/*.ipynb").unwrap();
        assert_eq!(checkpoints.len(), 1);
    }

    #[test]
    fn test_glob_multiple_patterns_union() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.ipynb");
        let b = touch(dir.path(), "data/b.csv");
        touch(dir.path(), "data/c.txt");

        let files = glob_files(dir.path(), "*.ipynb\ndata/*.csv\n*.ipynb\n").unwrap();
        assert_eq!(files.into_iter().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_glob_no_match() {
        let dir = TempDir::new().unwrap();
        assert!(glob_files(dir.path(), "*.ipynb").unwrap().is_empty());
    }

    #[test]
    fn test_glob_requires_absolute_work_dir() {
        let err = glob_files(Path::new("relative/dir"), "*.ipynb").unwrap_err();
        assert!(err.to_string().contains("absolute path"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/work/images/a.png"), Path::new("/work/notebooks")),
            PathBuf::from("../images/a.png")
        );
        assert_eq!(
            relative_path(Path::new("/work/a.png"), Path::new("/work")),
            PathBuf::from("a.png")
        );
        assert_eq!(
            relative_path(Path::new("/work/sub/b.ipynb"), Path::new("/work/sub")),
            PathBuf::from("b.ipynb")
        );
    }
}
