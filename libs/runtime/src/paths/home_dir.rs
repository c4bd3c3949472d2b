use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the application home directory.
///
/// `requested` is the raw value from config (may contain `~`); when `None`,
/// the platform user home joined with `default_subdir` is used. The result is
/// always absolute; with `create` the directory is created as well.
pub fn resolve_home_dir(
    requested: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let raw = match requested {
        Some(p) => expand_tilde(&p)?,
        None => user_home()?.join(default_subdir),
    };

    let absolute = if raw.is_absolute() {
        raw
    } else {
        std::env::current_dir()
            .context("cannot determine current directory")?
            .join(raw)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home directory {}", absolute.display()))?;
    }

    Ok(absolute)
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().context("cannot determine the user home directory")
}

/// Expand a leading `~` or `~/` into the user home directory.
fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return user_home();
    }
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(path).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_bare_tilde() {
        let p = expand_tilde("~").unwrap();
        assert!(p.is_absolute());
    }

    #[test]
    fn expands_tilde_prefix() {
        let p = expand_tilde("~/stockroom_home_test").unwrap();
        assert!(p.ends_with("stockroom_home_test"));
        assert!(!p.to_string_lossy().contains('~'));
    }

    #[test]
    fn leaves_plain_paths_alone() {
        let p = expand_tilde("/tmp/stockroom").unwrap();
        assert_eq!(p, PathBuf::from("/tmp/stockroom"));
    }

    #[test]
    fn resolves_default_subdir_without_create() {
        let p = resolve_home_dir(None, ".stockroom_test", false).unwrap();
        assert!(p.is_absolute());
        assert!(p.ends_with(".stockroom_test"));
    }

    #[test]
    fn makes_relative_paths_absolute() {
        let p = resolve_home_dir(Some("relative/home".to_string()), ".unused", false).unwrap();
        assert!(p.is_absolute());
        assert!(p.ends_with("relative/home"));
    }
}
