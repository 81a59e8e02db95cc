//! Sidecar tag text codec.
//!
//! A sidecar is the plain-text tag file stored next to a media file:
//! comma-separated tags such as `1girl, long_hair, smile`. Only the string
//! conversion lives here; reading and writing files is up to the caller.

/// Scanner state while reading sidecar text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Between words: leading whitespace or a collapsed run.
    Gap,
    /// Inside a word.
    Word,
    /// The previous character was a backslash.
    Escape,
}

fn is_gap(c: char) -> bool {
    c == '_' || c.is_whitespace()
}

/// Parse sidecar text into tags.
///
/// - Tags are separated by commas.
/// - Runs of whitespace and underscores inside a tag collapse to one space;
///   leading and trailing runs are dropped.
/// - A backslash escapes the next character. Both are kept, so `\(` stays
///   `\(` and `\,` does not split the tag.
/// - Empty entries are dropped.
pub fn parse_tags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut current = String::new();
    let mut state = Scan::Gap;

    for c in text.chars() {
        match state {
            Scan::Escape => {
                current.push(c);
                state = Scan::Word;
            }
            _ if c == ',' => {
                if !current.is_empty() {
                    tags.push(std::mem::take(&mut current));
                }
                state = Scan::Gap;
            }
            _ if is_gap(c) => state = Scan::Gap,
            _ => {
                if state == Scan::Gap && !current.is_empty() {
                    current.push(' ');
                }
                current.push(c);
                state = if c == '\\' { Scan::Escape } else { Scan::Word };
            }
        }
    }
    if !current.is_empty() {
        tags.push(current);
    }
    tags
}

/// Format tags as sidecar text, joined with `", "`.
///
/// Bare commas inside a tag are escaped so the tag survives a re-parse.
pub fn format_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|tag| escape_commas(tag.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_commas(tag: &str) -> String {
    let mut escaped = String::with_capacity(tag.len());
    let mut after_backslash = false;
    for c in tag.chars() {
        if c == ',' && !after_backslash {
            escaped.push('\\');
        }
        escaped.push(c);
        after_backslash = c == '\\' && !after_backslash;
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_list() {
        assert_eq!(parse_tags("cat, dog,bird"), vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn test_parse_collapses_spaces_and_underscores() {
        assert_eq!(
            parse_tags("  long_hair ,  blue   sky__high , "),
            vec!["long hair", "blue sky high"]
        );
    }

    #[test]
    fn test_parse_drops_empty_entries() {
        assert_eq!(parse_tags(",, a ,,_,b,"), vec!["a", "b"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" _ , ").is_empty());
    }

    #[test]
    fn test_parse_keeps_escapes() {
        assert_eq!(
            parse_tags(r"smile \(happy\), a\,b"),
            vec![r"smile \(happy\)", r"a\,b"]
        );
        // An escaped underscore is not a separator.
        assert_eq!(parse_tags(r"x\_y"), vec![r"x\_y"]);
    }

    #[test]
    fn test_parse_trailing_newline() {
        assert_eq!(parse_tags("a, b\n"), vec!["a", "b"]);
        assert_eq!(parse_tags("a,\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_format_joins_and_escapes() {
        assert_eq!(format_tags(&["a", "b c"]), "a, b c");
        assert_eq!(format_tags(&["x,y", r"p\,q"]), r"x\,y, p\,q");
        assert_eq!(format_tags::<&str>(&[]), "");
    }

    #[test]
    fn test_format_output_parses_back() {
        let tags = vec!["one".to_string(), "two, three".to_string(), r"\(four\)".to_string()];
        assert_eq!(
            parse_tags(&format_tags(&tags)),
            vec!["one", r"two\, three", r"\(four\)"]
        );
    }
}
