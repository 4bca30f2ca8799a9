// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Default locations of the configuration file and package manager root.

use std::path::PathBuf;

/// Locate user's home directory without checking that it exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/portlist/config.toml` as the
/// default absolute path for the configuration file. Does not check if the
/// path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("portlist").join("config.toml"))
        .ok_or(NoWayHome)
}

/// Determine fallback path to package manager root.
///
/// Used when neither the configuration file nor the environment name a root.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn fallback_root_dir() -> Result<PathBuf> {
    home_dir().map(|path| path.join("vcpkg"))
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[cfg(unix)]
    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn fallback_root_lives_under_home() -> anyhow::Result<()> {
        assert_eq!(home_dir()?, PathBuf::from("/home/blah"));
        assert_eq!(fallback_root_dir()?, PathBuf::from("/home/blah/vcpkg"));

        Ok(())
    }
}
