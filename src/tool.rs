// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package manager output parsing.
//!
//! Some information is only available by asking the package manager binary
//! itself. Invoking the binary is left to the caller. This module only makes
//! sense of what the binary prints to stdout.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Version information printed by the `version` command.
///
/// The first line of output ends with a version word shaped like
/// `<version>-<build-date>-<hash>`, e.g., `0.0.113-2018-06-26-ab12cd`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    pub version: String,
    pub build_date: Option<String>,
    pub hash: Option<String>,
}

impl FromStr for ToolVersion {
    type Err = ToolError;

    fn from_str(output: &str) -> Result<Self, Self::Err> {
        let word = output
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().last())
            .ok_or(ToolError::MalformedVersion)?;

        // INVARIANT: Version ends at first dash, hash starts after last dash.
        let (version, build_date, hash) = match (word.find('-'), word.rfind('-')) {
            (Some(head), Some(tail)) if head < tail => (
                &word[..head],
                Some(&word[head + 1..tail]),
                Some(&word[tail + 1..]),
            ),
            (Some(head), _) => (&word[..head], None, Some(&word[head + 1..])),
            _ => (word, None, None),
        };

        if version.is_empty() {
            return Err(ToolError::MalformedVersion);
        }

        Ok(Self {
            version: version.into(),
            build_date: build_date.filter(|date| !date.is_empty()).map(Into::into),
            hash: hash.filter(|hash| !hash.is_empty()).map(Into::into),
        })
    }
}

impl Display for ToolVersion {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.version)?;
        if let Some(build_date) = &self.build_date {
            write!(fmt, " ({build_date})")?;
        }
        if let Some(hash) = &self.hash {
            write!(fmt, " {hash}")?;
        }

        Ok(())
    }
}

/// Parse triplet names printed by the `help triplet` command.
///
/// First non-blank line is a header. Every other non-blank line names one
/// triplet.
pub fn parse_triplets(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1)
        .map(str::to_owned)
        .collect()
}

/// Package manager output parsing error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Version output has no usable version word.
    #[error("cannot find version in package manager output")]
    MalformedVersion,
}
