//! Expansion of user-supplied paths.
//!
//! Same two-form pattern as the config store: `*_from(…)` takes the home and
//! working directories explicitly for tests, the plain form reads them from
//! the process environment.

use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` (alone or followed by a separator) to `home`.
///
/// `~user` forms are left untouched. With no home directory the input is
/// returned unchanged.
pub fn expand_tilde_from(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => home.join(components.as_path()),
        _ => path.to_path_buf(),
    }
}

/// `expand_tilde_from` using `dirs::home_dir()`.
pub fn expand_tilde(path: &Path) -> PathBuf {
    expand_tilde_from(path, dirs::home_dir().as_deref())
}

/// Expand `~` and make the result absolute against `cwd`.
///
/// Lexical only: `.` and `..` are folded without touching the filesystem, so
/// the path does not have to exist yet.
pub fn resolve_path_from(path: &Path, cwd: &Path, home: Option<&Path>) -> PathBuf {
    let expanded = expand_tilde_from(path, home);
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };
    normalize(&joined)
}

/// `resolve_path_from` using the current directory and `dirs::home_dir()`.
///
/// Falls back to the tilde-expanded input if the current directory is unknown.
pub fn resolve_path(path: &Path) -> PathBuf {
    let home = dirs::home_dir();
    match std::env::current_dir() {
        Ok(cwd) => resolve_path_from(path, &cwd, home.as_deref()),
        Err(_) => expand_tilde_from(path, home.as_deref()),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_alone_is_home() {
        let home = Path::new("/home/dev");
        assert_eq!(expand_tilde_from(Path::new("~"), Some(home)), home);
    }

    #[test]
    fn tilde_prefix_is_expanded() {
        let home = Path::new("/home/dev");
        assert_eq!(
            expand_tilde_from(Path::new("~/bruno/api"), Some(home)),
            PathBuf::from("/home/dev/bruno/api")
        );
    }

    #[test]
    fn tilde_user_and_inner_tilde_are_untouched() {
        let home = Path::new("/home/dev");
        assert_eq!(
            expand_tilde_from(Path::new("~other/x"), Some(home)),
            PathBuf::from("~other/x")
        );
        assert_eq!(
            expand_tilde_from(Path::new("a/~/b"), Some(home)),
            PathBuf::from("a/~/b")
        );
    }

    #[test]
    fn no_home_leaves_path_alone() {
        assert_eq!(expand_tilde_from(Path::new("~/x"), None), PathBuf::from("~/x"));
    }

    #[test]
    fn relative_paths_are_joined_and_folded() {
        let resolved = resolve_path_from(
            Path::new("../backend/./services"),
            Path::new("/work/tools"),
            None,
        );
        assert_eq!(resolved, PathBuf::from("/work/backend/services"));
    }

    #[test]
    fn absolute_paths_ignore_cwd() {
        let resolved = resolve_path_from(Path::new("/srv/api"), Path::new("/work"), None);
        assert_eq!(resolved, PathBuf::from("/srv/api"));
    }

    #[test]
    fn tilde_then_absolute() {
        let resolved = resolve_path_from(
            Path::new("~/bruno"),
            Path::new("/work"),
            Some(Path::new("/home/dev")),
        );
        assert_eq!(resolved, PathBuf::from("/home/dev/bruno"));
    }
}
