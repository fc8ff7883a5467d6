use std::{
    env::{current_dir, current_exe, var},
    path::PathBuf,
    time::Duration,
};

/// Overrides the bundled library directory.
pub const LIBRARY_PATH_VAR: &str = "FABLE_LIBRARY_PATH";

/// Overrides the user library directory that `SAVE-LIBRARY` writes to.
pub const USER_LIBRARIES_VAR: &str = "FABLE_USER_LIBRARIES";

/// Default pause between visible steps, in milliseconds.
pub const DELAY_VAR: &str = "FABLE_DELAY_MS";

/// Where the interpreter looks for libraries and how it paces execution.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The libraries shipped with the interpreter.
    pub library_path: PathBuf,

    /// The learner's own libraries, written by `SAVE-LIBRARY`.
    pub user_library_path: PathBuf,

    /// Pause after every visible step when running.
    pub delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Config {
    /// Build a configuration with explicit library directories and no delay.
    pub fn new(library_path: PathBuf, user_library_path: PathBuf) -> Config {
        Config {
            library_path,
            user_library_path,
            delay: Duration::ZERO,
        }
    }

    /// Read the configuration from the environment, falling back to a `libraries` directory next
    /// to the executable and to `fable/libraries` under the platform's config directory.
    pub fn from_env() -> Config {
        let library_path = match var(LIBRARY_PATH_VAR) {
            Ok(path) => PathBuf::from(path),
            Err(_) => bundled_library_directory(),
        };

        let user_library_path = match var(USER_LIBRARIES_VAR) {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_user_library_directory(),
        };

        let delay = var(DELAY_VAR)
            .ok()
            .and_then(|text| text.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO);

        Config {
            library_path,
            user_library_path,
            delay,
        }
    }

    /// The directories `INCLUDE` searches, in order.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let working_directory = current_dir().unwrap_or_else(|_| PathBuf::from("."));

        vec![
            working_directory,
            self.user_library_path.clone(),
            self.library_path.clone(),
        ]
    }
}

fn bundled_library_directory() -> PathBuf {
    match current_exe() {
        Ok(exe_path) => match exe_path.parent() {
            Some(directory) => directory.join("libraries"),
            None => PathBuf::from("libraries"),
        },
        Err(_) => PathBuf::from("libraries"),
    }
}

fn default_user_library_directory() -> PathBuf {
    match dirs::config_dir() {
        Some(directory) => directory.join("fable").join("libraries"),
        None => PathBuf::from(".fable").join("libraries"),
    }
}
