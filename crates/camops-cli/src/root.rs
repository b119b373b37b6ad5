use std::path::{Path, PathBuf};

/// Resolve the deployment root directory.
///
/// An explicit path (`--root` flag or `CAMOPS_ROOT` env var) always wins.
/// Otherwise the nearest ancestor of the working directory holding a
/// `.camops/` marker is used, then the nearest holding `.git/`, then the
/// working directory itself. The two-pass order means an initialized
/// project nested inside a larger git checkout resolves to the project,
/// not the checkout.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_up(&cwd, ".camops")
        .or_else(|| find_up(&cwd, ".git"))
        .unwrap_or(cwd)
}

/// Nearest ancestor of `start` (inclusive) containing a `marker` directory.
fn find_up(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn find_up_locates_marker_from_nested_subdir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".camops")).unwrap();
        let nested = dir.path().join("deploy/scripts");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_up(&nested, ".camops").unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn find_up_prefers_nearest_marker() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir_all(inner.join(".camops")).unwrap();
        std::fs::create_dir(dir.path().join(".camops")).unwrap();
        let sub = inner.join("sub");
        std::fs::create_dir(&sub).unwrap();

        let found = find_up(&sub, ".camops").unwrap();
        assert_eq!(found, inner);
    }

    #[test]
    fn find_up_returns_none_without_marker() {
        let dir = TempDir::new().unwrap();
        assert!(find_up(dir.path(), ".camops").is_none());
    }

    #[test]
    fn find_up_ignores_plain_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".camops"), "not a dir").unwrap();
        assert!(find_up(dir.path(), ".camops").is_none());
    }
}
