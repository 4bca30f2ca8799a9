// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Port catalog and install status decoding.
//!
//! Portlist reads the text files a C++ package manager keeps on disk, and
//! turns them into strongly typed records:
//!
//! - Each port directory holds a `CONTROL` file describing one [`Port`], made
//!   of a [`SourceParagraph`] and any number of [`FeatureParagraph`]s.
//! - The status file lists every [`StatusParagraph`] of installed packages.
//!
//! Both formats share one RFC822-like paragraph layout, handled by
//! [`paragraph`]. The [`Catalog`] walks a ports folder on disk and applies the
//! decoders to every port it finds.

pub mod catalog;
pub mod config;
pub mod depends;
pub mod paragraph;
pub mod path;
pub mod port;
pub mod status;
pub mod tool;

pub use catalog::{Catalog, CatalogError, FileSystem, HostFileSystem, WalkPolicy, WalkReport};
pub use config::{Settings, VcpkgRoot};
pub use depends::split_depends;
pub use paragraph::{parse_paragraphs, Paragraph};
pub use port::{FeatureParagraph, Port, PortError, SourceParagraph};
pub use status::{parse_status, InstallState, StatusError, StatusParagraph, Want};
