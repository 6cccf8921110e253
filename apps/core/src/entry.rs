//! Entry parsing - Turns the raw text field into fragments or an archive command.
//!
//! A committed line is one of:
//! - nothing (blank input)
//! - an archive command: text starting with `0`
//! - fragments: text split on `.`, each written on its own line
//!   followed by a `.` marker line

/// Separator written after every fragment.
pub const MARKER_LINE: &str = ".";

/// Where the active file goes when archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveTarget {
    /// `0` alone: pick `0_<random digits>.txt`
    Random,
    /// `0<name>`: rename to `<name>.txt`
    Named(String),
}

/// A parsed line from the text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Empty,
    Archive(ArchiveTarget),
    Fragments(Vec<String>),
}

impl Entry {
    /// Parse raw field text.
    ///
    /// Anything whose trimmed form starts with `0` is an archive command,
    /// including text like `0.5` that reads as prose.
    pub fn parse(raw: &str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        if let Some(rest) = line.strip_prefix('0') {
            return if rest.is_empty() {
                Self::Archive(ArchiveTarget::Random)
            } else {
                Self::Archive(ArchiveTarget::Named(rest.trim().to_string()))
            };
        }

        let segments: Vec<String> = line
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            Self::Empty
        } else {
            Self::Fragments(segments)
        }
    }
}

/// Render fragments in the on-disk format: `segment\n.\n` per segment.
pub fn format_fragments(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(segment);
        out.push('\n');
        out.push_str(MARKER_LINE);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(items: &[&str]) -> Entry {
        Entry::Fragments(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_blank_is_empty() {
        assert_eq!(Entry::parse(""), Entry::Empty);
        assert_eq!(Entry::parse("   \t "), Entry::Empty);
    }

    #[test]
    fn test_only_dots_is_empty() {
        assert_eq!(Entry::parse("..."), Entry::Empty);
        assert_eq!(Entry::parse(" . . "), Entry::Empty);
    }

    #[test]
    fn test_single_fragment() {
        assert_eq!(Entry::parse("  hello  "), fragments(&["hello"]));
    }

    #[test]
    fn test_split_on_dots() {
        assert_eq!(
            Entry::parse("first thought. second one.. third"),
            fragments(&["first thought", "second one", "third"])
        );
    }

    #[test]
    fn test_zero_alone_is_random_archive() {
        assert_eq!(Entry::parse(" 0 "), Entry::Archive(ArchiveTarget::Random));
    }

    #[test]
    fn test_zero_prefix_is_named_archive() {
        assert_eq!(
            Entry::parse("0monday"),
            Entry::Archive(ArchiveTarget::Named("monday".to_string()))
        );
        // leading zero wins over the dot syntax
        assert_eq!(
            Entry::parse("0.5"),
            Entry::Archive(ArchiveTarget::Named(".5".to_string()))
        );
    }

    #[test]
    fn test_zero_inside_text_is_fragment() {
        assert_eq!(Entry::parse("a0b"), fragments(&["a0b"]));
    }

    #[test]
    fn test_format_fragments() {
        let text = format_fragments(&["one".to_string(), "two".to_string()]);
        assert_eq!(text, "one\n.\ntwo\n.\n");
        assert_eq!(format_fragments(&[]), "");
    }
}
