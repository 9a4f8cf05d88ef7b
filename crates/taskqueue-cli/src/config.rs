//! Database path resolution: explicit flag, then environment, then config
//! file, then platform default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

const ENV_VAR: &str = "TASKQUEUE_DB_PATH";
const CONFIG_FILE_NAME: &str = "taskqueue.toml";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    store: Option<StoreSection>,
}

#[derive(Debug, Deserialize)]
struct StoreSection {
    path: Option<PathBuf>,
}

/// Resolves the database path in priority order: `explicit`, then
/// `TASKQUEUE_DB_PATH`, then a `taskqueue.toml` discovered by walking up
/// from the current directory, then a platform-appropriate default.
pub fn resolve_db_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = find_config_file_path()? {
        return Ok(path);
    }
    platform_default()
}

fn find_config_file_path() -> anyhow::Result<Option<PathBuf>> {
    let mut dir = std::env::current_dir()?;
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            let contents = std::fs::read_to_string(&candidate)?;
            let parsed: ConfigFile = toml::from_str(&contents)?;
            if let Some(path) = parsed.store.and_then(|s| s.path) {
                return Ok(Some(resolve_relative_to(&dir, path)));
            }
            return Ok(None);
        }
        if !dir.pop() {
            return Ok(None);
        }
    }
}

fn resolve_relative_to(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn platform_default() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("dev", "taskqueue", "taskqueue")
        .ok_or_else(|| anyhow::anyhow!("could not determine a platform data directory"))?;
    Ok(dirs.data_dir().join("taskqueue.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_wins() {
        let path = resolve_db_path(Some(PathBuf::from("/tmp/explicit.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit.db"));
    }

    #[test]
    fn env_var_is_used_when_no_flag() {
        std::env::set_var(ENV_VAR, "/tmp/env.db");
        let path = resolve_db_path(None).unwrap();
        std::env::remove_var(ENV_VAR);
        assert_eq!(path, PathBuf::from("/tmp/env.db"));
    }

    #[test]
    fn config_file_relative_path_is_resolved_against_its_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[store]\npath = \"data/taskqueue.db\"\n",
        )
        .unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        std::env::remove_var(ENV_VAR);
        let result = resolve_db_path(None);
        std::env::set_current_dir(original_dir).unwrap();

        assert_eq!(result.unwrap(), dir.path().join("data/taskqueue.db"));
    }
}
