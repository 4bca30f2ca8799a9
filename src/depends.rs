// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dependency list splitting.

/// Delimiter between dependency tokens.
///
/// A bare comma is not a delimiter, so descriptive text such as
/// `zlib (windows,linux)` stays in one token.
pub const DEPENDS_DELIMITER: &str = ", ";

/// Split field value into ordered listing of dependency tokens.
///
/// Empty tokens are dropped. Order of declaration and duplicates are kept as
/// they are.
pub fn split_depends(value: &str) -> Vec<String> {
    value
        .split(DEPENDS_DELIMITER)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("a, b, c", &["a", "b", "c"]; "comma space delimited")]
    #[test_case("a,b", &["a,b"]; "bare comma is not a delimiter")]
    #[test_case("", &[]; "empty value")]
    #[test_case("zlib", &["zlib"]; "single token")]
    #[test_case("a, , b, ", &["a", "b"]; "drop empty tokens")]
    #[test_case("b, a, b", &["b", "a", "b"]; "keep order and duplicates")]
    #[test_case("curl[ssl], zlib (windows,linux)", &["curl[ssl]", "zlib (windows,linux)"]; "qualified tokens")]
    #[test]
    fn split_dependency_tokens(value: &str, expect: &[&str]) {
        pretty_assertions::assert_eq!(split_depends(value), expect);
    }
}
