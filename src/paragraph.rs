// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Paragraph tokenizer.
//!
//! Both the per-port control files and the installed package status file are
//! written in an RFC822-like layout: blank-line separated __paragraphs__ of
//! `Key: Value` fields. This module knows nothing about what those fields
//! mean. It only splits raw text into an ordered listing of [`Paragraph`]
//! values that the port and status decoders interpret.
//!
//! # Layout
//!
//! ```text
//! # Comment lines start with a hash, and can appear anywhere.
//! Source: zlib
//! Version: 1.2.11
//! Description: A compression library
//!   that spans more than one line.
//!
//! Feature: tools
//! Build-Depends: zlib
//! ```
//!
//! - A line starting with `#` is a comment. It is skipped, and does not
//!   interrupt a run of continuation lines.
//! - A line that is empty or only whitespace ends the current paragraph. Runs
//!   of blank lines never produce empty paragraphs.
//! - A line starting with two or more spaces continues the value of the last
//!   field assigned in the current paragraph.
//! - Any other line is a field, split on the first `": "`. A line without
//!   `": "` is a key with an empty value.
//!
//! Both LF and CRLF line endings are accepted.

use indexmap::IndexMap;
use tracing::debug;

/// Line ending used to join continuation lines into one field value.
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Ordered mapping of field names to field values.
///
/// Field names are unique within a paragraph. Values may contain embedded
/// [`LINE_ENDING`]s when they were built from continuation lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Paragraph {
    line: usize,
    fields: IndexMap<String, String>,
}

impl Paragraph {
    /// Line number of the first field in the paragraph, starting from 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get value of field by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Check if paragraph contains a field.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate through fields in order of declaration.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of fields in paragraph.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if paragraph has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, key: &str, value: &str, line: usize) -> Result<()> {
        if self.fields.contains_key(key) {
            return Err(ParagraphError::DuplicateKey {
                key: key.into(),
                line,
            });
        }

        if self.fields.is_empty() {
            self.line = line;
        }
        self.fields.insert(key.into(), value.into());

        Ok(())
    }

    fn continue_field(&mut self, key: &str, text: &str) {
        if let Some(value) = self.fields.get_mut(key) {
            value.push_str(LINE_ENDING);
            value.push_str(text);
        }
    }
}

/// Split text into an ordered listing of paragraphs.
///
/// # Errors
///
/// - Return [`ParagraphError::DuplicateKey`] if a field name appears twice in
///   one paragraph.
pub fn parse_paragraphs(text: &str) -> Result<Vec<Paragraph>> {
    let tokenizer = text
        .lines()
        .enumerate()
        .try_fold(Tokenizer::default(), |tokenizer, (index, line)| {
            tokenizer.feed(index + 1, line)
        })?;

    Ok(tokenizer.finish())
}

/// Fold state of one tokenizer pass.
#[derive(Debug, Default)]
struct Tokenizer {
    paragraphs: Vec<Paragraph>,
    current: Paragraph,
    last_key: Option<String>,
}

impl Tokenizer {
    fn feed(mut self, line_number: usize, line: &str) -> Result<Self> {
        if line.starts_with('#') {
            return Ok(self);
        }

        // INVARIANT: Whitespace-only lines are boundaries, never continuations.
        if line.trim().is_empty() {
            self.flush();
            return Ok(self);
        }

        if line.starts_with("  ") {
            match &self.last_key {
                Some(key) => self.current.continue_field(key, line.trim()),
                None => debug!("discard continuation without field at line {line_number}"),
            }
            return Ok(self);
        }

        let (key, value) = line.split_once(": ").unwrap_or((line, ""));
        self.current.insert(key, value, line_number)?;
        self.last_key = Some(key.into());

        Ok(self)
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.current));
        }
        self.last_key = None;
    }

    fn finish(mut self) -> Vec<Paragraph> {
        self.flush();
        self.paragraphs
    }
}

/// Paragraph tokenizer error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParagraphError {
    /// Same field name appears twice in one paragraph.
    #[error("duplicate field {key:?} at line {line}")]
    DuplicateKey { key: String, line: usize },
}

/// Friendly result alias :3
pub type Result<T, E = ParagraphError> = std::result::Result<T, E>;
