use crate::error::{BackendError, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// Well-known names under the XDG data root
const PROJECT_DIR_NAME: &str = "typetrace";
const DB_FILE_NAME: &str = "TypeTrace.db";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the database location per the XDG base-directory convention:
/// `$XDG_DATA_HOME/typetrace/TypeTrace.db`, falling back to
/// `$HOME/.local/share/typetrace/TypeTrace.db`.
pub fn resolve_database_path() -> Result<PathBuf> {
    data_root().map(|root| root.join(PROJECT_DIR_NAME).join(DB_FILE_NAME))
}

fn data_root() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_DATA_HOME") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => {
            Ok(PathBuf::from(home).join(".local").join("share"))
        }
        _ => Err(BackendError::DataDirUnset),
    }
}

/// Location of the optional config file:
/// `$XDG_CONFIG_HOME/typetrace/config.toml`, with the `~/.config` fallback.
pub fn config_file_path() -> Option<PathBuf> {
    let root = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()?.join(".config"),
    };
    Some(root.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Create every missing ancestor of `path`. Existing directories are fine.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BackendError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_env;

    #[test]
    fn xdg_data_home_wins_when_set() {
        let _guard = test_env::lock();
        let saved_xdg = test_env::save("XDG_DATA_HOME");
        let saved_home = test_env::save("HOME");

        test_env::set("XDG_DATA_HOME", "/tmp/xdg-data");
        test_env::set("HOME", "/home/somebody");
        let path = resolve_database_path().expect("resolve");
        assert_eq!(
            path,
            PathBuf::from("/tmp/xdg-data/typetrace/TypeTrace.db")
        );

        test_env::restore("XDG_DATA_HOME", saved_xdg);
        test_env::restore("HOME", saved_home);
    }

    #[test]
    fn empty_xdg_data_home_falls_back_to_home() {
        let _guard = test_env::lock();
        let saved_xdg = test_env::save("XDG_DATA_HOME");
        let saved_home = test_env::save("HOME");

        test_env::set("XDG_DATA_HOME", "");
        test_env::set("HOME", "/home/somebody");
        let path = resolve_database_path().expect("resolve");
        assert_eq!(
            path,
            PathBuf::from("/home/somebody/.local/share/typetrace/TypeTrace.db")
        );

        test_env::restore("XDG_DATA_HOME", saved_xdg);
        test_env::restore("HOME", saved_home);
    }

    #[test]
    fn unset_environment_is_an_error() {
        let _guard = test_env::lock();
        let saved_xdg = test_env::save("XDG_DATA_HOME");
        let saved_home = test_env::save("HOME");

        test_env::remove("XDG_DATA_HOME");
        test_env::remove("HOME");
        let err = resolve_database_path().expect_err("no data root available");
        assert!(matches!(err, BackendError::DataDirUnset));

        test_env::restore("XDG_DATA_HOME", saved_xdg);
        test_env::restore("HOME", saved_home);
    }

    #[test]
    fn resolution_is_pure_in_the_environment() {
        let _guard = test_env::lock();
        let saved_xdg = test_env::save("XDG_DATA_HOME");

        test_env::set("XDG_DATA_HOME", "/tmp/stable");
        let first = resolve_database_path().expect("resolve");
        let second = resolve_database_path().expect("resolve");
        assert_eq!(first, second);

        test_env::restore("XDG_DATA_HOME", saved_xdg);
    }

    #[test]
    fn ensure_parent_dirs_tolerates_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a").join("b").join("TypeTrace.db");
        ensure_parent_dirs(&target).expect("first create");
        ensure_parent_dirs(&target).expect("second create");
        assert!(target.parent().unwrap().is_dir());
    }
}
