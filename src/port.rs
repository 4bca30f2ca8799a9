// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Port control file decoding.
//!
//! A __port__ is a buildable package definition. Each port is described by a
//! __control file__, conventionally named `CONTROL`, that holds exactly one
//! source paragraph followed by zero or more feature paragraphs.
//!
//! # Control File Layout
//!
//! ```text
//! Source: zlib
//! Version: 1.2.11
//! Build-Depends: libpng, curl
//! Description: compression library
//!
//! Feature: tools
//! Build-Depends: zlib
//! Description: command line tools
//! ```
//!
//! The source paragraph is marked by its `Source` field, which names the port.
//! Each feature paragraph is marked by its `Feature` field, which names an
//! optional capability of the port that can be toggled on install. Feature
//! paragraphs always refer back to the port they belong to through their
//! core name.
//!
//! The `Supports` and `Default-Features` fields are recognized, but cannot be
//! represented yet. Any control file using them fails to decode instead of
//! silently losing what they say.

use crate::{
    depends::split_depends,
    paragraph::{parse_paragraphs, Paragraph, ParagraphError},
};

use std::str::FromStr;
use tracing::debug;

const SOURCE: &str = "Source";
const FEATURE: &str = "Feature";
const VERSION: &str = "Version";
const DESCRIPTION: &str = "Description";
const MAINTAINER: &str = "Maintainer";
const BUILD_DEPENDS: &str = "Build-Depends";
const UNSUPPORTED: [&str; 2] = ["Supports", "Default-Features"];

/// Buildable package definition.
///
/// Owns exactly one [`SourceParagraph`], and an ordered listing of
/// [`FeatureParagraph`]s whose core name always matches the name of the
/// source paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    source: SourceParagraph,
    features: Vec<FeatureParagraph>,
}

impl Port {
    /// Build port from paragraphs of one control file.
    ///
    /// # Errors
    ///
    /// - Return [`PortError::UnsupportedField`] if a paragraph uses a field
    ///   that cannot be represented yet.
    /// - Return [`PortError::UnknownParagraph`] if a paragraph is neither a
    ///   source nor a feature paragraph.
    /// - Return [`PortError::EmptyName`] if a source or feature paragraph has
    ///   an empty name.
    /// - Return [`PortError::FeatureBeforeSource`] if a feature paragraph
    ///   shows up before the source paragraph.
    /// - Return [`PortError::DuplicateSource`] if more than one source
    ///   paragraph exists.
    /// - Return [`PortError::MissingSource`] if no source paragraph exists.
    pub fn from_paragraphs(paragraphs: impl IntoIterator<Item = Paragraph>) -> Result<Self> {
        let mut source: Option<SourceParagraph> = None;
        let mut features = Vec::new();

        for paragraph in paragraphs {
            let line = paragraph.line();
            match ControlParagraph::try_from(&paragraph)? {
                ControlParagraph::Source(parsed) => {
                    if let Some(existing) = &source {
                        return Err(PortError::DuplicateSource {
                            name: existing.name.clone(),
                            line,
                        });
                    }
                    source = Some(parsed);
                }
                ControlParagraph::Feature(draft) => {
                    // INVARIANT: Core name must be known before binding a feature.
                    let Some(core) = &source else {
                        return Err(PortError::FeatureBeforeSource {
                            feature: draft.name,
                            line,
                        });
                    };
                    features.push(draft.bind(&core.name));
                }
            }
        }

        let source = source.ok_or(PortError::MissingSource)?;
        debug!(
            "decoded port {} with {} feature(s)",
            source.name,
            features.len()
        );

        Ok(Self { source, features })
    }

    /// Name of port given by its source paragraph.
    pub fn name(&self) -> &str {
        self.source.name.as_str()
    }

    /// Source paragraph of port.
    pub fn source(&self) -> &SourceParagraph {
        &self.source
    }

    /// Feature paragraphs of port in order of declaration.
    pub fn features(&self) -> &[FeatureParagraph] {
        &self.features
    }

    /// Find feature of port by name.
    pub fn feature(&self, name: &str) -> Option<&FeatureParagraph> {
        self.features.iter().find(|feature| feature.name == name)
    }

    /// Render package spec used to install port with selected features.
    ///
    /// Only selected features that belong to this port count. With none of
    /// them selected the spec is just the port name. Otherwise the features
    /// are listed after the core feature, e.g., `zlib[core,tools]`.
    pub fn install_spec<'f>(
        &self,
        selected: impl IntoIterator<Item = &'f FeatureParagraph>,
    ) -> String {
        let features = selected
            .into_iter()
            .filter(|feature| feature.core_name == self.name())
            .map(|feature| feature.name.as_str())
            .collect::<Vec<_>>();

        if features.is_empty() {
            return self.name().to_owned();
        }

        format!("{}[core,{}]", self.name(), features.join(","))
    }

    /// Match port against search keyword.
    ///
    /// A blank keyword matches everything. Otherwise the port name must contain
    /// the keyword, or its description must contain it if `name_only` is off.
    pub fn matches(&self, keyword: &str, name_only: bool) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.name().contains(keyword) {
            return true;
        }

        !name_only
            && self
                .source
                .description
                .as_deref()
                .is_some_and(|description| description.contains(keyword))
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Self::from_paragraphs(parse_paragraphs(data)?)
    }
}

/// Source paragraph of a port.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceParagraph {
    /// Name of the port. Never empty.
    pub name: String,

    /// Version of the port.
    pub version: String,

    /// Brief description of the port.
    pub description: Option<String>,

    /// Maintainer contact.
    pub maintainer: Option<String>,

    /// Build dependencies in order of declaration.
    pub depends: Vec<String>,
}

/// Feature paragraph of a port.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeatureParagraph {
    /// Name of the port this feature belongs to.
    pub core_name: String,

    /// Name of the feature. Never empty.
    pub name: String,

    /// Brief description of the feature.
    pub description: Option<String>,

    /// Build dependencies of the feature in order of declaration.
    pub depends: Vec<String>,
}

/// Paragraph of a control file classified by its marker field.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ControlParagraph {
    Source(SourceParagraph),
    Feature(FeatureDraft),
}

/// Feature paragraph that is not bound to its port yet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FeatureDraft {
    name: String,
    description: Option<String>,
    depends: Vec<String>,
}

impl FeatureDraft {
    fn bind(self, core_name: &str) -> FeatureParagraph {
        FeatureParagraph {
            core_name: core_name.into(),
            name: self.name,
            description: self.description,
            depends: self.depends,
        }
    }
}

impl TryFrom<&Paragraph> for ControlParagraph {
    type Error = PortError;

    fn try_from(paragraph: &Paragraph) -> Result<Self, Self::Error> {
        let line = paragraph.line();
        if let Some(field) = UNSUPPORTED
            .into_iter()
            .find(|field| paragraph.contains_key(field))
        {
            return Err(PortError::UnsupportedField {
                field: field.into(),
                line,
            });
        }

        if let Some(name) = paragraph.get(SOURCE) {
            ignore_unknown_fields(
                paragraph,
                &[SOURCE, VERSION, DESCRIPTION, MAINTAINER, BUILD_DEPENDS],
            );
            return Ok(Self::Source(SourceParagraph {
                name: non_empty_name(name, line)?,
                version: paragraph.get(VERSION).unwrap_or_default().into(),
                description: paragraph.get(DESCRIPTION).map(Into::into),
                maintainer: paragraph.get(MAINTAINER).map(Into::into),
                depends: paragraph
                    .get(BUILD_DEPENDS)
                    .map(split_depends)
                    .unwrap_or_default(),
            }));
        }

        if let Some(name) = paragraph.get(FEATURE) {
            ignore_unknown_fields(paragraph, &[FEATURE, DESCRIPTION, BUILD_DEPENDS]);
            return Ok(Self::Feature(FeatureDraft {
                name: non_empty_name(name, line)?,
                description: paragraph.get(DESCRIPTION).map(Into::into),
                depends: paragraph
                    .get(BUILD_DEPENDS)
                    .map(split_depends)
                    .unwrap_or_default(),
            }));
        }

        Err(PortError::UnknownParagraph { line })
    }
}

fn non_empty_name(name: &str, line: usize) -> Result<String> {
    if name.trim().is_empty() {
        return Err(PortError::EmptyName { line });
    }

    Ok(name.into())
}

fn ignore_unknown_fields(paragraph: &Paragraph, known: &[&str]) {
    for (key, _) in paragraph.iter().filter(|(key, _)| !known.contains(key)) {
        debug!("ignore field {key:?} of paragraph at line {}", paragraph.line());
    }
}

/// Control file decoding error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// Control file does not follow paragraph layout.
    #[error(transparent)]
    Paragraph(#[from] ParagraphError),

    /// Paragraph has neither a source nor a feature field.
    #[error("paragraph at line {line} is neither a source nor a feature paragraph")]
    UnknownParagraph { line: usize },

    /// Field is recognized but cannot be represented yet.
    #[error("unsupported field {field:?} in paragraph at line {line}")]
    UnsupportedField { field: String, line: usize },

    /// Source or feature paragraph has a blank name.
    #[error("paragraph at line {line} has an empty name")]
    EmptyName { line: usize },

    /// Feature paragraph appears before the source paragraph.
    #[error("feature {feature:?} at line {line} appears before source paragraph")]
    FeatureBeforeSource { feature: String, line: usize },

    /// More than one source paragraph in one control file.
    #[error("second source paragraph at line {line}, port {name:?} already has one")]
    DuplicateSource { name: String, line: usize },

    /// Control file has no source paragraph.
    #[error("control file has no source paragraph")]
    MissingSource,
}

/// Friendly result alias :3
pub type Result<T, E = PortError> = std::result::Result<T, E>;
