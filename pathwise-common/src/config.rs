//! Configuration loading and data folder resolution

use std::path::{Path, PathBuf};

/// Environment variable consulted when no command-line path is given.
pub const DATA_FOLDER_ENV: &str = "PATHWISE_DATA_FOLDER";

/// Resolve the data folder in priority order:
/// 1. Command-line argument (highest priority)
/// 2. PATHWISE_DATA_FOLDER environment variable
/// 3. `data_folder` key in the platform config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(config_path) = find_config_file() {
        if let Ok(contents) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&contents) {
                if let Some(folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Database file inside the data folder.
pub fn database_path(data_folder: &Path) -> PathBuf {
    data_folder.join("pathwise.db")
}

/// Trained artifact directory inside the data folder.
pub fn models_dir(data_folder: &Path) -> PathBuf {
    data_folder.join("models")
}

/// Locate the platform config file, preferring the per-user location.
fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("pathwise").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/pathwise/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pathwise"))
        .unwrap_or_else(|| PathBuf::from("./pathwise_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_argument_wins_over_environment() {
        std::env::set_var(DATA_FOLDER_ENV, "/tmp/from-env");
        let resolved = resolve_data_folder(Some(Path::new("/tmp/from-cli")));
        std::env::remove_var(DATA_FOLDER_ENV);

        assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));
    }

    #[test]
    #[serial]
    fn environment_used_when_no_cli_argument() {
        std::env::set_var(DATA_FOLDER_ENV, "/tmp/from-env");
        let resolved = resolve_data_folder(None);
        std::env::remove_var(DATA_FOLDER_ENV);

        assert_eq!(resolved, PathBuf::from("/tmp/from-env"));
    }

    #[test]
    #[serial]
    fn default_used_when_nothing_configured() {
        std::env::remove_var(DATA_FOLDER_ENV);
        let resolved = resolve_data_folder(None);

        assert!(resolved.ends_with("pathwise") || resolved.ends_with("pathwise_data"));
    }

    #[test]
    fn derived_paths_join_the_data_folder() {
        let folder = Path::new("/data/pathwise");
        assert_eq!(database_path(folder), PathBuf::from("/data/pathwise/pathwise.db"));
        assert_eq!(models_dir(folder), PathBuf::from("/data/pathwise/models"));
    }
}
