// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Port catalog loading.
//!
//! The package manager keeps every port it knows about in one place called
//! the __ports folder__. Walking the ports folder produces the catalog of
//! all available ports.
//!
//! # Ports Folder Layout
//!
//! The ports folder lives at `<root>/ports`, where `<root>` is a directory
//! holding a `.vcpkg-root` marker file. Each port is given its own directory
//! inside the ports folder, and that directory must contain the port's
//! control file named `CONTROL`. So, `<root>/ports/zlib/CONTROL` means that
//! the catalog contains a port named "zlib".
//!
//! Only the top-level of the ports folder is evaluated. Directories are
//! visited in whatever order the file system lists them, so callers that need
//! a stable order should sort the result.
//!
//! # Walk Policy
//!
//! A walk either stops at the first port directory that fails to load
//! ([`WalkPolicy::FailFast`]), or visits every port directory and reports all
//! failures next to the ports that did load ([`WalkPolicy::BestEffort`]).

use crate::{
    port::{Port, PortError},
    status::{parse_status, StatusError, StatusParagraph},
};

use serde::{Deserialize, Serialize};
use std::{
    fs::{read_dir, read_to_string},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Name of control file inside each port directory.
pub const CONTROL_FILE_NAME: &str = "CONTROL";

/// Marker file at the top-level of a package manager root.
pub const ROOT_MARKER: &str = ".vcpkg-root";

/// File system access needed to load the catalog.
pub trait FileSystem {
    /// List immediate subdirectories of a directory.
    fn subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Check if path names an existing file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read whole file as text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// File system access through the host operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFileSystem;

impl FileSystem for HostFileSystem {
    fn subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut directories = Vec::new();
        for entry in read_dir(path)? {
            let directory = entry?.path();

            // INVARIANT: Follow symlinks to port directories.
            if directory.is_dir() {
                directories.push(directory);
            }
        }

        Ok(directories)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        read_to_string(path)
    }
}

/// Catalog loader.
///
/// Decodes ports folders and status files through a [`FileSystem`]. Every
/// call builds fresh records; nothing is cached between calls.
#[derive(Debug, Default, Clone)]
pub struct Catalog<F = HostFileSystem>
where
    F: FileSystem,
{
    fs: F,
}

impl Catalog {
    /// Construct new catalog loader over host file system.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F> Catalog<F>
where
    F: FileSystem,
{
    /// Construct new catalog loader over given file system.
    pub fn with_file_system(fs: F) -> Self {
        Self { fs }
    }

    /// Check if path is the top-level of a package manager root.
    pub fn is_root(&self, path: impl AsRef<Path>) -> bool {
        self.fs.is_file(&path.as_ref().join(ROOT_MARKER))
    }

    /// Decode control file into a port.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::ReadFile`] if control file cannot be read.
    /// - Return [`CatalogError::Port`] if control file cannot be decoded.
    pub fn read_port(&self, path: impl AsRef<Path>) -> Result<Port> {
        let path = path.as_ref();
        let data = self.read_file(path)?;

        data.parse::<Port>().map_err(|err| CatalogError::Port {
            source: err,
            path: path.into(),
        })
    }

    /// Decode status file into listing of package records.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::ReadFile`] if status file cannot be read.
    /// - Return [`CatalogError::Status`] if status file cannot be decoded.
    #[instrument(skip(self, path), level = "debug")]
    pub fn load_status(&self, path: impl AsRef<Path>) -> Result<Vec<StatusParagraph>> {
        let path = path.as_ref();
        debug!("load status file: {:?}", path.display());
        let data = self.read_file(path)?;

        parse_status(&data).map_err(|err| CatalogError::Status {
            source: err,
            path: path.into(),
        })
    }

    /// Walk ports folder, and stop at first port that fails to load.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::ReadDir`] if ports folder cannot be listed.
    /// - Return [`CatalogError::ControlNotFound`] if a port directory has no
    ///   control file.
    /// - Return [`CatalogError::ReadFile`] or [`CatalogError::Port`] if a
    ///   control file cannot be read or decoded.
    pub fn walk_ports(&self, root: impl AsRef<Path>) -> Result<Vec<Port>> {
        Ok(self.walk(root, WalkPolicy::FailFast)?.ports)
    }

    /// Walk ports folder according to walk policy.
    ///
    /// With [`WalkPolicy::FailFast`] the returned report never holds
    /// failures. With [`WalkPolicy::BestEffort`] only failure to list the
    /// ports folder itself is returned as an error.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::ReadDir`] if ports folder cannot be listed.
    /// - Return any error of [`Catalog::walk_ports`] under
    ///   [`WalkPolicy::FailFast`].
    #[instrument(skip(self, root), level = "debug")]
    pub fn walk(&self, root: impl AsRef<Path>, policy: WalkPolicy) -> Result<WalkReport> {
        let root = root.as_ref();
        info!("walk ports folder: {:?}", root.display());
        let directories = self
            .fs
            .subdirectories(root)
            .map_err(|err| CatalogError::ReadDir {
                source: err,
                path: root.into(),
            })?;

        let mut report = WalkReport::default();
        for directory in directories {
            match self.read_port_dir(&directory) {
                Ok(port) => report.ports.push(port),
                Err(error) if policy == WalkPolicy::BestEffort => {
                    warn!("skip {:?}: {error}", directory.display());
                    report.failures.push(WalkFailure { directory, error });
                }
                Err(error) => return Err(error),
            }
        }
        info!(
            "loaded {} port(s), {} failure(s)",
            report.ports.len(),
            report.failures.len()
        );

        Ok(report)
    }

    fn read_port_dir(&self, directory: &Path) -> Result<Port> {
        let control = directory.join(CONTROL_FILE_NAME);
        if !self.fs.is_file(&control) {
            return Err(CatalogError::ControlNotFound {
                name: directory
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| directory.to_string_lossy().into_owned()),
            });
        }

        debug!("read control file: {:?}", control.display());
        self.read_port(control)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        self.fs
            .read_to_string(path)
            .map_err(|err| CatalogError::ReadFile {
                source: err,
                path: path.into(),
            })
    }
}

/// What to do when a port directory fails to load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalkPolicy {
    /// Stop at first failure, and return no catalog.
    #[default]
    FailFast,

    /// Visit every port directory, and collect failures.
    BestEffort,
}

/// Outcome of a ports folder walk.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Ports that loaded in order of visit.
    pub ports: Vec<Port>,

    /// Port directories that failed to load in order of visit.
    pub failures: Vec<WalkFailure>,
}

impl WalkReport {
    /// Check if every port directory loaded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Order ports by name.
    pub fn sort(&mut self) {
        self.ports.sort_by(|a, b| a.name().cmp(b.name()));
    }
}

/// Port directory that failed to load.
#[derive(Debug)]
pub struct WalkFailure {
    pub directory: PathBuf,
    pub error: CatalogError,
}

/// Catalog loading error types.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Port directory has no control file.
    #[error("control file not found for {name}")]
    ControlNotFound { name: String },

    /// Directory cannot be listed.
    #[error("failed to read directory at {:?}", path.display())]
    ReadDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// File cannot be read from.
    #[error("failed to read file at {:?}", path.display())]
    ReadFile {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Control file cannot be decoded.
    #[error("failed to decode control file at {:?}", path.display())]
    Port {
        #[source]
        source: PortError,
        path: PathBuf,
    },

    /// Status file cannot be decoded.
    #[error("failed to decode status file at {:?}", path.display())]
    Status {
        #[source]
        source: StatusError,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::InstallState;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct MemoryFileSystem {
        directories: IndexMap<PathBuf, Vec<PathBuf>>,
        files: HashMap<PathBuf, String>,
    }

    impl MemoryFileSystem {
        fn with_port(mut self, name: &str, control: Option<&str>) -> Self {
            let directory = PathBuf::from("ports").join(name);
            self.directories
                .entry("ports".into())
                .or_default()
                .push(directory.clone());
            if let Some(control) = control {
                self.files
                    .insert(directory.join(CONTROL_FILE_NAME), control.into());
            }
            self
        }

        fn with_file(mut self, path: &str, contents: &str) -> Self {
            self.files.insert(path.into(), contents.into());
            self
        }
    }

    impl FileSystem for MemoryFileSystem {
        fn subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
            self.directories
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }

        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn names(ports: &[Port]) -> Vec<&str> {
        ports.iter().map(Port::name).collect()
    }

    #[test]
    fn walk_ports_in_listing_order() -> anyhow::Result<()> {
        let fs = MemoryFileSystem::default()
            .with_port("zlib", Some("Source: zlib\nVersion: 1.2.11\n"))
            .with_port("curl", Some("Source: curl\n\nFeature: ssl\n"))
            .with_port("boost", Some("Source: boost\n"));
        let catalog = Catalog::with_file_system(fs);

        let result = catalog.walk_ports("ports")?;
        assert_eq!(names(&result), ["zlib", "curl", "boost"]);
        assert_eq!(result[1].features()[0].core_name, "curl");

        Ok(())
    }

    #[test]
    fn empty_ports_folder_is_empty_catalog() -> anyhow::Result<()> {
        let mut fs = MemoryFileSystem::default();
        fs.directories.insert("ports".into(), Vec::new());
        let catalog = Catalog::with_file_system(fs);

        assert!(catalog.walk_ports("ports")?.is_empty());

        Ok(())
    }

    #[test]
    fn fail_fast_on_missing_control_file() {
        let fs = MemoryFileSystem::default()
            .with_port("zlib", Some("Source: zlib\n"))
            .with_port("broken", None)
            .with_port("curl", Some("Source: curl\n"));
        let catalog = Catalog::with_file_system(fs);

        let result = catalog.walk_ports("ports");
        assert!(matches!(
            result,
            Err(CatalogError::ControlNotFound { ref name }) if name == "broken"
        ));
        assert_eq!(
            result.unwrap_err().to_string(),
            "control file not found for broken"
        );
    }

    #[test]
    fn fail_fast_on_bad_control_file() {
        let fs = MemoryFileSystem::default().with_port("odd", Some("Foo: bar\n"));
        let catalog = Catalog::with_file_system(fs);

        let result = catalog.walk_ports("ports");
        assert!(matches!(
            result,
            Err(CatalogError::Port {
                source: PortError::UnknownParagraph { line: 1 },
                ..
            })
        ));
    }

    #[test]
    fn best_effort_collects_failures() -> anyhow::Result<()> {
        let fs = MemoryFileSystem::default()
            .with_port("zlib", Some("Source: zlib\n"))
            .with_port("broken", None)
            .with_port("unsupported", Some("Source: x\nSupports: windows\n"))
            .with_port("curl", Some("Source: curl\n"));
        let catalog = Catalog::with_file_system(fs);

        let result = catalog.walk("ports", WalkPolicy::BestEffort)?;
        assert!(!result.is_complete());
        assert_eq!(names(&result.ports), ["zlib", "curl"]);

        let failed = result
            .failures
            .iter()
            .map(|failure| failure.directory.clone())
            .collect::<Vec<_>>();
        let expect = vec![
            PathBuf::from("ports").join("broken"),
            PathBuf::from("ports").join("unsupported"),
        ];
        assert_eq!(failed, expect);
        assert!(matches!(
            result.failures[1].error,
            CatalogError::Port {
                source: PortError::UnsupportedField { .. },
                ..
            }
        ));

        Ok(())
    }

    #[test]
    fn sort_report_by_name() -> anyhow::Result<()> {
        let fs = MemoryFileSystem::default()
            .with_port("zlib", Some("Source: zlib\n"))
            .with_port("boost", Some("Source: boost\n"))
            .with_port("curl", Some("Source: curl\n"));
        let catalog = Catalog::with_file_system(fs);

        let mut result = catalog.walk("ports", WalkPolicy::FailFast)?;
        result.sort();
        assert!(result.is_complete());
        assert_eq!(names(&result.ports), ["boost", "curl", "zlib"]);

        Ok(())
    }

    #[test]
    fn report_unreadable_ports_folder() {
        let catalog = Catalog::with_file_system(MemoryFileSystem::default());

        for policy in [WalkPolicy::FailFast, WalkPolicy::BestEffort] {
            let result = catalog.walk("nowhere", policy);
            assert!(matches!(
                result,
                Err(CatalogError::ReadDir { ref path, .. }) if path == Path::new("nowhere")
            ));
        }
    }

    #[test]
    fn load_status_file() -> anyhow::Result<()> {
        let fs = MemoryFileSystem::default().with_file(
            "status",
            "Package: zlib\nArchitecture: x86-windows\nStatus: install ok installed\n",
        );
        let catalog = Catalog::with_file_system(fs);

        let result = catalog.load_status("status")?;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].state, InstallState::Installed);

        assert!(matches!(
            catalog.load_status("missing"),
            Err(CatalogError::ReadFile { .. })
        ));

        Ok(())
    }

    #[test]
    fn report_bad_status_file() {
        let fs = MemoryFileSystem::default().with_file(
            "status",
            "Package: zlib\nArchitecture: x86-windows\nStatus: install ok gone\n",
        );
        let catalog = Catalog::with_file_system(fs);

        assert!(matches!(
            catalog.load_status("status"),
            Err(CatalogError::Status {
                source: StatusError::UnknownState { .. },
                ..
            })
        ));
    }

    #[test]
    fn detect_root_marker() {
        let fs = MemoryFileSystem::default().with_file("vcpkg/.vcpkg-root", "");
        let catalog = Catalog::with_file_system(fs);

        assert!(catalog.is_root("vcpkg"));
        assert!(!catalog.is_root("elsewhere"));
    }
}
