// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for the configuration file that portlist uses to find
//! the package manager root, and to decide how the catalog is loaded.
//!
//! # General Layout
//!
//! ```toml
//! [vcpkg]
//! root = "$HOME/vcpkg"
//! default_triplet = "x86-windows"
//!
//! [catalog]
//! policy = "fail-fast"
//! sorted = false
//! ```
//!
//! Every setting is optional. The root goes through shell expansion, so
//! environment variables and `~` can be used in it.

use crate::catalog::WalkPolicy;

use serde::{Deserialize, Serialize};
use std::{
    env,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Environment variable naming the package manager root.
pub const ROOT_ENV: &str = "VCPKG_ROOT";

/// Triplet used when nothing else is configured.
pub const DEFAULT_TRIPLET: &str = "x86-windows";

/// Portlist settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Package manager settings.
    #[serde(default)]
    pub vcpkg: VcpkgSettings,

    /// Catalog loading settings.
    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl Settings {
    /// Load settings from file.
    ///
    /// A missing file is not an error. Default settings are returned instead.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file exists but cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file is not valid.
    /// - Return [`ConfigError::ShellExpansion`] if root cannot be expanded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string(path) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no configuration at {:?}, use defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Read {
                source: err,
                path: path.into(),
            }),
        }
    }

    /// Determine package manager root.
    ///
    /// Configured root wins over the `VCPKG_ROOT` environment variable.
    pub fn root(&self) -> Option<VcpkgRoot> {
        self.vcpkg.root.clone().or_else(|| {
            env::var_os(ROOT_ENV)
                .filter(|root| !root.is_empty())
                .map(VcpkgRoot::new)
        })
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on root field.
        if let Some(root) = &settings.vcpkg.root {
            settings.vcpkg.root = Some(VcpkgRoot::new(
                shellexpand::full(root.to_string().as_str())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Package manager settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VcpkgSettings {
    /// Top-level directory of package manager.
    pub root: Option<VcpkgRoot>,

    /// Triplet to select by default.
    pub default_triplet: String,
}

impl Default for VcpkgSettings {
    fn default() -> Self {
        Self {
            root: None,
            default_triplet: DEFAULT_TRIPLET.into(),
        }
    }
}

/// Catalog loading settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// What to do when a port fails to load.
    pub policy: WalkPolicy,

    /// Order ports by name after loading.
    pub sorted: bool,
}

/// Path to top-level directory of package manager.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct VcpkgRoot(PathBuf);

impl VcpkgRoot {
    /// Construct new package manager root.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat root as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }

    /// Path to ports folder.
    pub fn ports_dir(&self) -> PathBuf {
        self.0.join("ports")
    }

    /// Path to installed package status file.
    pub fn status_file(&self) -> PathBuf {
        self.0.join("installed").join("vcpkg").join("status")
    }
}

impl Display for VcpkgRoot {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("BLAH", "/home/blah/blah")])]
    fn deserialize_settings() -> anyhow::Result<()> {
        let result: Settings = r#"
            [vcpkg]
            root = "$BLAH/vcpkg"
            default_triplet = "x64-linux"

            [catalog]
            policy = "best-effort"
            sorted = true
        "#
        .parse()?;

        let expect = Settings {
            vcpkg: VcpkgSettings {
                root: Some(VcpkgRoot::new("/home/blah/blah/vcpkg")),
                default_triplet: "x64-linux".into(),
            },
            catalog: CatalogSettings {
                policy: WalkPolicy::BestEffort,
                sorted: true,
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_empty_settings() -> anyhow::Result<()> {
        let result: Settings = "".parse()?;
        assert_eq!(result, Settings::default());
        assert_eq!(result.vcpkg.default_triplet, DEFAULT_TRIPLET);
        assert_eq!(result.catalog.policy, WalkPolicy::FailFast);

        Ok(())
    }

    #[test]
    fn reject_unknown_policy() {
        let result = "[catalog]\npolicy = \"sometimes\"\n".parse::<Settings>();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn serialize_settings() {
        let result = Settings {
            vcpkg: VcpkgSettings {
                root: Some(VcpkgRoot::new("/opt/vcpkg")),
                default_triplet: "x86-windows".into(),
            },
            catalog: CatalogSettings {
                policy: WalkPolicy::BestEffort,
                sorted: false,
            },
        }
        .to_string();

        let expect = indoc! {r#"
            [vcpkg]
            root = "/opt/vcpkg"
            default_triplet = "x86-windows"

            [catalog]
            policy = "best-effort"
            sorted = false
        "#};

        assert_eq!(result, expect);
    }

    #[sealed_test]
    fn load_missing_settings_file() -> anyhow::Result<()> {
        let result = Settings::load("config.toml")?;
        assert_eq!(result, Settings::default());

        Ok(())
    }

    #[sealed_test]
    fn load_settings_file() -> anyhow::Result<()> {
        std::fs::write("config.toml", "[vcpkg]\nroot = \"/opt/vcpkg\"\n")?;
        let result = Settings::load("config.toml")?;
        assert_eq!(result.vcpkg.root, Some(VcpkgRoot::new("/opt/vcpkg")));

        Ok(())
    }

    #[sealed_test(env = [("VCPKG_ROOT", "/from/env")])]
    fn configured_root_wins_over_environment() -> anyhow::Result<()> {
        let result: Settings = "".parse()?;
        assert_eq!(result.root(), Some(VcpkgRoot::new("/from/env")));

        let result: Settings = "[vcpkg]\nroot = \"/from/config\"\n".parse()?;
        assert_eq!(result.root(), Some(VcpkgRoot::new("/from/config")));

        Ok(())
    }

    #[test]
    fn derive_layout_paths() {
        let root = VcpkgRoot::new("vcpkg");
        assert_eq!(root.ports_dir(), Path::new("vcpkg").join("ports"));
        assert_eq!(
            root.status_file(),
            Path::new("vcpkg").join("installed").join("vcpkg").join("status")
        );
    }
}
