//! Locator configuration read from the process environment.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Environment variable map, as handed over by the command layer.
pub type Environ = HashMap<String, String>;

/// Default mount table on Linux.
pub const MOUNT_TABLE: &str = "/proc/self/mounts";

/// Where to look for trash directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Home trash directory, `None` when neither `XDG_DATA_HOME` nor `HOME` is set.
    pub home_trash: Option<PathBuf>,
    /// Explicit volume list replacing the mount table scan.
    pub volumes: Option<Vec<PathBuf>>,
    /// Skip per-volume trash directories entirely.
    pub only_home_trash: bool,
    pub mount_table: PathBuf,
    pub uid: u32,
}

impl LocatorConfig {
    /// Reads the current process environment.
    pub fn from_env() -> Self {
        let environ: Environ = env::vars().collect();
        Self::from_environ(&environ)
    }

    /// Builds a configuration from the given variables.
    ///
    /// `TRASH_HOME_DIR` overrides the home trash, otherwise it is
    /// `$XDG_DATA_HOME/Trash` or `$HOME/.local/share/Trash`. `TRASH_VOLUMES`
    /// is a colon separated volume list used instead of the mount table.
    /// `TRASH_ONLY_HOME` set to `1` or `true` disables volume scanning.
    pub fn from_environ(environ: &Environ) -> Self {
        Self {
            home_trash: home_trash_from_environ(environ),
            volumes: volumes_from_environ(environ),
            only_home_trash: environ
                .get("TRASH_ONLY_HOME")
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            mount_table: PathBuf::from(MOUNT_TABLE),
            uid: current_uid(),
        }
    }

    pub fn with_home_trash(mut self, path: impl Into<PathBuf>) -> Self {
        self.home_trash = Some(path.into());
        self
    }

    pub fn with_volumes(mut self, volumes: Vec<PathBuf>) -> Self {
        self.volumes = Some(volumes);
        self
    }

    pub fn with_only_home_trash(mut self, only_home_trash: bool) -> Self {
        self.only_home_trash = only_home_trash;
        self
    }

    pub fn with_mount_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.mount_table = path.into();
        self
    }
}

/// Effective uid of this process.
pub fn current_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() }
}

fn home_trash_from_environ(environ: &Environ) -> Option<PathBuf> {
    let non_empty = |key: &str| environ.get(key).filter(|v| !v.is_empty());

    if let Some(dir) = non_empty("TRASH_HOME_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg_data_home) = non_empty("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg_data_home).join("Trash"));
    }
    non_empty("HOME").map(|home| PathBuf::from(home).join(".local/share/Trash"))
}

fn volumes_from_environ(environ: &Environ) -> Option<Vec<PathBuf>> {
    let volumes = environ.get("TRASH_VOLUMES").filter(|v| !v.is_empty())?;
    Some(
        volumes
            .split(':')
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environ(pairs: &[(&str, &str)]) -> Environ {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn home_trash_prefers_override_then_xdg_then_home() {
        let config = LocatorConfig::from_environ(&environ(&[("HOME", "/home/u")]));
        assert_eq!(config.home_trash, Some(PathBuf::from("/home/u/.local/share/Trash")));

        let config = LocatorConfig::from_environ(&environ(&[("HOME", "/home/u"), ("XDG_DATA_HOME", "/data")]));
        assert_eq!(config.home_trash, Some(PathBuf::from("/data/Trash")));

        let config = LocatorConfig::from_environ(&environ(&[
            ("HOME", "/home/u"),
            ("XDG_DATA_HOME", "/data"),
            ("TRASH_HOME_DIR", "/custom/trash"),
        ]));
        assert_eq!(config.home_trash, Some(PathBuf::from("/custom/trash")));

        assert_eq!(LocatorConfig::from_environ(&Environ::new()).home_trash, None);
    }

    #[test]
    fn volumes_split_on_colons() {
        let config = LocatorConfig::from_environ(&environ(&[("TRASH_VOLUMES", "/mnt/a::/mnt/b")]));
        assert_eq!(config.volumes, Some(vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/b")]));
        assert_eq!(LocatorConfig::from_environ(&environ(&[("TRASH_VOLUMES", "")])).volumes, None);
    }

    #[test]
    fn only_home_flag() {
        assert!(LocatorConfig::from_environ(&environ(&[("TRASH_ONLY_HOME", "TRUE")])).only_home_trash);
        assert!(!LocatorConfig::from_environ(&environ(&[("TRASH_ONLY_HOME", "0")])).only_home_trash);
    }
}
