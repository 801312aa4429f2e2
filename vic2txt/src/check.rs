//! Structural lint that walks tokens without building a tree.

use std::path::Path;

use crate::error::ParseError;
use crate::source::TokenSource;
use crate::token::Token;

/// Extensions of files that are not in the text format.
const SKIPPED_EXTENSIONS: [&str; 3] = ["bmp", "dds", "csv"];

/// Whether [`check_file`] applies to `path` at all.
pub fn is_checkable(path: &Path) -> bool {
    !path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SKIPPED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Checks brace balance, trailing `=` and token placement in `path`.
///
/// Returns the problems found; only failing to open the file is an `Err`.
pub fn check_file(path: &Path) -> Result<Vec<ParseError>, ParseError> {
    let mut src = TokenSource::open(path)?;
    Ok(check_source(&mut src))
}

pub fn check_str(name: &str, text: &str) -> Vec<ParseError> {
    check_source(&mut TokenSource::from_text(name, text))
}

pub fn check_source(src: &mut TokenSource) -> Vec<ParseError> {
    let mut problems = Vec::new();
    // `can_eq`: the previous token was a key, so `=` may follow.
    // `in_value`: an `=` was read and its value has not appeared yet.
    let mut can_eq = false;
    let mut in_value = false;
    let mut depth = 0usize;

    while let Some(token) = src.next_token() {
        let line = src.line_number();
        if !in_value && !can_eq && token.is_symbol(',') {
            continue;
        }
        if can_eq {
            can_eq = false;
            if token.is_symbol('=') {
                in_value = true;
                continue;
            }
        }

        match token {
            ref t if in_value && t.is_data() => in_value = false,
            Token::Symbol('{') => {
                in_value = false;
                depth += 1;
            }
            Token::Symbol('}') if !in_value => {
                if depth > 0 {
                    depth -= 1;
                } else {
                    problems.push(ParseError::UnmatchedClose { line });
                }
            }
            ref t if !in_value && t.is_data() => can_eq = true,
            other => problems.push(ParseError::UnexpectedToken {
                line,
                token: other.to_string(),
                expected: if in_value { "a value" } else { "a key, '{' or '}'" },
            }),
        }
    }

    let line = src.line_number();
    if in_value {
        problems.push(ParseError::UnexpectedEof {
            line,
            context: "an assignment (trailing '=')",
        });
    }
    if depth > 0 {
        problems.push(ParseError::UnexpectedEof {
            line,
            context: "an unclosed { } block",
        });
    }

    let mut all = src.take_errors();
    all.append(&mut problems);
    for problem in &all {
        log::error!("[{}] {}", src.name(), problem);
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_text_passes() {
        let text = "a = 1\nb = { c = { 1 2 3 } d }\n{ g }, h\n";
        assert!(check_str("t", text).is_empty());
    }

    #[test]
    fn test_unmatched_close() {
        let problems = check_str("t", "a = 1\n}\n");
        assert_eq!(problems, vec![ParseError::UnmatchedClose { line: 2 }]);
    }

    #[test]
    fn test_trailing_equals_and_unclosed_block() {
        let problems = check_str("t", "a = { b =");
        assert_eq!(problems.len(), 2);
        assert!(
            problems
                .iter()
                .all(|p| matches!(p, ParseError::UnexpectedEof { .. }))
        );
    }

    #[test]
    fn test_misplaced_symbol() {
        let problems = check_str("t", "a = ;\n");
        assert!(matches!(
            problems[0],
            ParseError::UnexpectedToken { line: 1, .. }
        ));
    }

    #[test]
    fn test_skipped_extensions() {
        assert!(!is_checkable(Path::new("map/provinces.bmp")));
        assert!(!is_checkable(Path::new("map/definition.CSV")));
        assert!(is_checkable(Path::new("common/goods.txt")));
        assert!(is_checkable(Path::new("README")));
    }
}
