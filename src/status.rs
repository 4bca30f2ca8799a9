// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installed package status decoding.
//!
//! The package manager records every package it ever touched in a __status
//! file__, usually found at `<root>/installed/vcpkg/status`. Each paragraph
//! of the status file is one record, either for a port itself or for one of
//! its features.
//!
//! # Status File Layout
//!
//! ```text
//! Package: zlib
//! Version: 1.2.11
//! Architecture: x64-windows
//! Multi-Arch: same
//! Description: A compression library
//! Status: install ok installed
//!
//! Package: curl
//! Feature: ssl
//! Depends: openssl
//! Architecture: x64-windows
//! Multi-Arch: same
//! Description: SSL support
//! Status: purge ok not-installed
//! ```
//!
//! The `Status` field is compound: `<want> <flag> <state>`. The want token
//! says what the user asked for, the state token says how far the package
//! manager actually got. The flag token in the middle is unused.
//!
//! Unlike control files, unknown fields are tolerated so newer status files
//! keep decoding.

use crate::{
    depends::split_depends,
    paragraph::{parse_paragraphs, Paragraph, ParagraphError},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

const PACKAGE: &str = "Package";
const FEATURE: &str = "Feature";
const VERSION: &str = "Version";
const ARCHITECTURE: &str = "Architecture";
const MULTI_ARCH: &str = "Multi-Arch";
const DESCRIPTION: &str = "Description";
const DEPENDS: &str = "Depends";
const STATUS: &str = "Status";

/// Record of one installed (or once installed) package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusParagraph {
    /// Name of the package.
    pub package: String,

    /// Feature of the package this record is about, if any.
    pub feature: Option<String>,

    /// Version of the package. Empty for feature records.
    pub version: String,

    /// Target triplet the package was built for.
    pub architecture: String,

    pub multi_arch: Option<String>,

    pub description: Option<String>,

    /// Runtime dependencies in order of declaration.
    pub depends: Vec<String>,

    /// Action requested for the package.
    pub want: Want,

    /// Actual install progress of the package.
    pub state: InstallState,
}

impl StatusParagraph {
    /// Check if package is fully installed.
    pub fn is_installed(&self) -> bool {
        self.state == InstallState::Installed
    }

    /// Render package spec used to remove this record, e.g.,
    /// `zlib:x64-windows` or `curl[ssl]:x64-windows`.
    pub fn remove_spec(&self) -> String {
        match &self.feature {
            Some(feature) if !feature.is_empty() => {
                format!("{}[{}]:{}", self.package, feature, self.architecture)
            }
            _ => format!("{}:{}", self.package, self.architecture),
        }
    }

    /// Match record against search keyword.
    ///
    /// A blank keyword matches everything. Otherwise the package name must
    /// contain the keyword, or its description must contain it if `name_only`
    /// is off.
    pub fn matches(&self, keyword: &str, name_only: bool) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.package.contains(keyword) {
            return true;
        }

        !name_only
            && self
                .description
                .as_deref()
                .is_some_and(|description| description.contains(keyword))
    }
}

impl TryFrom<&Paragraph> for StatusParagraph {
    type Error = StatusError;

    fn try_from(paragraph: &Paragraph) -> Result<Self, Self::Error> {
        let line = paragraph.line();
        let required = |field: &'static str| {
            paragraph
                .get(field)
                .ok_or(StatusError::MissingField { field, line })
        };

        let (want, state) = decode_status(required(STATUS)?, line)?;

        Ok(Self {
            package: required(PACKAGE)?.into(),
            feature: paragraph.get(FEATURE).map(Into::into),
            version: paragraph.get(VERSION).unwrap_or_default().into(),
            architecture: required(ARCHITECTURE)?.into(),
            multi_arch: paragraph.get(MULTI_ARCH).map(Into::into),
            description: paragraph.get(DESCRIPTION).map(Into::into),
            depends: paragraph
                .get(DEPENDS)
                .map(split_depends)
                .unwrap_or_default(),
            want,
            state,
        })
    }
}

/// Decode every paragraph of a status file.
///
/// # Errors
///
/// - Return [`StatusError::Paragraph`] if status file does not follow
///   paragraph layout.
/// - Return [`StatusError::MissingField`] if a record lacks its package,
///   architecture, or status.
/// - Return [`StatusError::MalformedStatus`] if status field does not have
///   at least three tokens.
/// - Return [`StatusError::UnknownWant`] or [`StatusError::UnknownState`] if
///   status field has unrecognized tokens.
pub fn parse_status(data: &str) -> Result<Vec<StatusParagraph>> {
    parse_paragraphs(data)?
        .iter()
        .map(StatusParagraph::try_from)
        .collect()
}

fn decode_status(value: &str, line: usize) -> Result<(Want, InstallState)> {
    let tokens = value.split(' ').collect::<Vec<_>>();
    let [want, _flag, state, ..] = tokens.as_slice() else {
        return Err(StatusError::MalformedStatus {
            value: value.into(),
            line,
        });
    };

    let want = want
        .parse::<Want>()
        .map_err(|UnknownValue(value)| StatusError::UnknownWant { value, line })?;
    let state = state
        .parse::<InstallState>()
        .map_err(|UnknownValue(value)| StatusError::UnknownState { value, line })?;

    Ok((want, state))
}

/// Action requested for a package.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Want {
    #[default]
    Unknown,
    Install,
    Hold,
    Deinstall,
    Purge,
}

impl FromStr for Want {
    type Err = UnknownValue;

    /// Case-insensitive.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_ascii_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "install" => Ok(Self::Install),
            "hold" => Ok(Self::Hold),
            "deinstall" => Ok(Self::Deinstall),
            "purge" => Ok(Self::Purge),
            _ => Err(UnknownValue(token.into())),
        }
    }
}

impl Display for Want {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let token = match self {
            Self::Unknown => "unknown",
            Self::Install => "install",
            Self::Hold => "hold",
            Self::Deinstall => "deinstall",
            Self::Purge => "purge",
        };
        fmt.write_str(token)
    }
}

/// Actual install progress of a package.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallState {
    #[default]
    NotInstalled,
    HalfInstalled,
    Installed,
}

impl FromStr for InstallState {
    type Err = UnknownValue;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "not-installed" => Ok(Self::NotInstalled),
            "half-installed" => Ok(Self::HalfInstalled),
            "installed" => Ok(Self::Installed),
            _ => Err(UnknownValue(token.into())),
        }
    }
}

impl Display for InstallState {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let token = match self {
            Self::NotInstalled => "not-installed",
            Self::HalfInstalled => "half-installed",
            Self::Installed => "installed",
        };
        fmt.write_str(token)
    }
}

/// Token does not name any variant of a status enumeration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown value {0:?}")]
pub struct UnknownValue(pub String);

/// Status file decoding error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// Status file does not follow paragraph layout.
    #[error(transparent)]
    Paragraph(#[from] ParagraphError),

    /// Record lacks a required field.
    #[error("record at line {line} has no {field:?} field")]
    MissingField { field: &'static str, line: usize },

    /// Status field is not made of want, flag, and state tokens.
    #[error("malformed status {value:?} in record at line {line}")]
    MalformedStatus { value: String, line: usize },

    /// Want token is not recognized.
    #[error("unknown want {value:?} in record at line {line}")]
    UnknownWant { value: String, line: usize },

    /// State token is not recognized.
    #[error("unknown install state {value:?} in record at line {line}")]
    UnknownState { value: String, line: usize },
}

/// Friendly result alias :3
pub type Result<T, E = StatusError> = std::result::Result<T, E>;
