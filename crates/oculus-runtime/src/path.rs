#![forbid(unsafe_code)]

//! Property paths addressing a location inside an observed target.
//!
//! A [`Path`] is parsed from the familiar accessor syntax and stored as a
//! list of segments, so different spellings of the same location compare
//! equal:
//!
//! ```text
//! a.b.c        -> [a, b, c]
//! items[0]     -> [items, 0]
//! a['b'].c     -> [a, b, c]
//! a["x.y"]     -> [a, x.y]
//! a["say \"hi\""] -> [a, say "hi"]
//! ```
//!
//! Inside a quoted bracket a backslash escapes the next character. Bare
//! segments and unquoted brackets take backslashes literally.
//!
//! # Invariants
//!
//! 1. A parsed path has at least one segment and no segment is empty.
//! 2. `Path::parse(&p.to_string()) == Ok(p)` for every parsed `p`.
//!
//! # Failure Modes
//!
//! | Input | Error |
//! |-------|-------|
//! | `""`, `"   "` | [`PathError::Empty`] |
//! | `a..b`, `.a`, `a.`, `a[]` | [`PathError::EmptySegment`] |
//! | `a[0` | [`PathError::UnclosedBracket`] |
//! | `a[0]b`, `a]` | [`PathError::UnexpectedCharacter`] |
//!
//! Positions are byte offsets into the input after surrounding whitespace
//! has been trimmed.

use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The input contained no segments at all.
    Empty,
    /// A segment between separators was empty.
    EmptySegment { position: usize },
    /// A `[` was never closed.
    UnclosedBracket { position: usize },
    /// A character appeared where a separator was required.
    UnexpectedCharacter { ch: char, position: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "path is empty"),
            Self::EmptySegment { position } => {
                write!(f, "empty path segment at offset {position}")
            }
            Self::UnclosedBracket { position } => {
                write!(f, "unclosed '[' at offset {position}")
            }
            Self::UnexpectedCharacter { ch, position } => {
                write!(f, "unexpected character '{ch}' at offset {position}")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A normalized property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse a dotted / bracketed accessor string.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        // Set after '.', cleared once a segment starts.
        let mut expect_segment = false;
        // Set after ']': only '.' or '[' may follow.
        let mut after_bracket = false;
        let mut chars = input.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '.' => {
                    if after_bracket {
                        after_bracket = false;
                    } else if current.is_empty() {
                        return Err(PathError::EmptySegment { position: pos });
                    } else {
                        segments.push(std::mem::take(&mut current));
                    }
                    expect_segment = true;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    } else if expect_segment {
                        return Err(PathError::EmptySegment { position: pos });
                    }
                    let segment = read_bracket(&mut chars, pos)?;
                    segments.push(segment);
                    after_bracket = true;
                    expect_segment = false;
                }
                ']' => return Err(PathError::UnexpectedCharacter { ch, position: pos }),
                _ => {
                    if after_bracket {
                        return Err(PathError::UnexpectedCharacter { ch, position: pos });
                    }
                    current.push(ch);
                    expect_segment = false;
                }
            }
        }

        if !current.is_empty() {
            segments.push(current);
        } else if expect_segment {
            return Err(PathError::EmptySegment {
                position: input.len(),
            });
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { segments })
    }

    /// Build a path directly from segments.
    ///
    /// Returns `None` if there are no segments or any segment is empty.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { segments })
    }

    /// Iterate over the path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

}

/// Consume a bracketed segment. `open` is the offset of the `[`.
fn read_bracket(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    open: usize,
) -> Result<String, PathError> {
    let quote = match chars.peek() {
        Some(&(_, q @ ('\'' | '"'))) => {
            chars.next();
            Some(q)
        }
        _ => None,
    };

    let mut segment = String::new();
    match quote {
        Some(q) => {
            loop {
                match chars.next() {
                    Some((_, c)) if c == q => break,
                    Some((_, '\\')) => match chars.next() {
                        Some((_, escaped)) => segment.push(escaped),
                        None => return Err(PathError::UnclosedBracket { position: open }),
                    },
                    Some((_, c)) => segment.push(c),
                    None => return Err(PathError::UnclosedBracket { position: open }),
                }
            }
            match chars.next() {
                Some((_, ']')) => {}
                Some((pos, ch)) => return Err(PathError::UnexpectedCharacter { ch, position: pos }),
                None => return Err(PathError::UnclosedBracket { position: open }),
            }
        }
        None => loop {
            match chars.next() {
                Some((_, ']')) => break,
                Some((pos, '[')) => {
                    return Err(PathError::UnexpectedCharacter {
                        ch: '[',
                        position: pos,
                    });
                }
                Some((_, c)) => segment.push(c),
                None => return Err(PathError::UnclosedBracket { position: open }),
            }
        },
    }

    if segment.is_empty() {
        return Err(PathError::EmptySegment { position: open });
    }
    Ok(segment)
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            let plain = !segment.contains(['.', '[', ']', '\'', '"', '\\'])
                && segment.trim() == segment.as_str();
            if plain {
                if i > 0 {
                    f.write_str(".")?;
                }
                f.write_str(segment)?;
                continue;
            }
            f.write_str("[\"")?;
            for c in segment.chars() {
                if matches!(c, '"' | '\\') {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }
            f.write_str("\"]")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Anything that can name a [`Path`]: parsed paths or accessor strings.
pub trait IntoPath {
    /// Convert into a parsed path.
    fn into_path(self) -> Result<Path, PathError>;
}

impl IntoPath for Path {
    fn into_path(self) -> Result<Path, PathError> {
        Ok(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Result<Path, PathError> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<Path, PathError> {
        Path::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<Path, PathError> {
        Path::parse(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<Path, PathError> {
        Path::parse(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(p: &Path) -> Vec<&str> {
        p.segments().collect()
    }

    #[test]
    fn dotted() {
        let p = Path::parse("a.b.c").unwrap();
        assert_eq!(segs(&p), vec!["a", "b", "c"]);
        assert_eq!(p.to_string(), "a.b.c");
    }

    #[test]
    fn single_segment() {
        let p = Path::parse("count").unwrap();
        assert_eq!(segs(&p), vec!["count"]);
    }

    #[test]
    fn bracket_index() {
        let p = Path::parse("items[0].name").unwrap();
        assert_eq!(segs(&p), vec!["items", "0", "name"]);
        assert_eq!(p.to_string(), "items.0.name");
    }

    #[test]
    fn quoted_keys() {
        let single = Path::parse("a['b'].c").unwrap();
        let double = Path::parse("a[\"b\"].c").unwrap();
        assert_eq!(single, double);
        assert_eq!(single, Path::parse("a.b.c").unwrap());
    }

    #[test]
    fn equivalent_spellings_are_equal() {
        let a = Path::parse("a[0].b").unwrap();
        let b = Path::parse("a.0.b").unwrap();
        let c = Path::parse("a['0']['b']").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn leading_bracket() {
        let p = Path::parse("[0].x").unwrap();
        assert_eq!(segs(&p), vec!["0", "x"]);
    }

    #[test]
    fn consecutive_brackets() {
        let p = Path::parse("grid[1][2]").unwrap();
        assert_eq!(segs(&p), vec!["grid", "1", "2"]);
    }

    #[test]
    fn quoted_segment_with_dot_round_trips() {
        let p = Path::parse("a[\"x.y\"]").unwrap();
        assert_eq!(segs(&p), vec!["a", "x.y"]);
        let shown = p.to_string();
        assert_eq!(shown, "a[\"x.y\"]");
        assert_eq!(Path::parse(&shown).unwrap(), p);
    }

    #[test]
    fn quoted_segment_containing_double_quote() {
        let p = Path::parse("a['say \"hi\"']").unwrap();
        assert_eq!(p.to_string(), r#"a["say \"hi\""]"#);
        assert_eq!(Path::parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn both_quote_kinds_round_trip() {
        let bracketed = Path::parse("a[x'y\"z]").unwrap();
        assert_eq!(bracketed.segments().collect::<Vec<_>>(), vec!["a", "x'y\"z"]);
        assert_eq!(Path::parse(&bracketed.to_string()).unwrap(), bracketed);

        let dotted = Path::parse("a.b'c\"d").unwrap();
        assert_eq!(dotted.to_string(), r#"a["b'c\"d"]"#);
        assert_eq!(Path::parse(&dotted.to_string()).unwrap(), dotted);
    }

    #[test]
    fn backslash_escapes_inside_quotes_only() {
        let quoted = Path::parse(r#"a["x\\y\"z"]"#).unwrap();
        assert_eq!(quoted.segments().collect::<Vec<_>>(), vec!["a", "x\\y\"z"]);

        let bare = Path::parse(r"a[x\y]").unwrap();
        assert_eq!(bare.segments().collect::<Vec<_>>(), vec!["a", "x\\y"]);
        assert_eq!(bare.to_string(), r#"a["x\\y"]"#);
        assert_eq!(Path::parse(&bare.to_string()).unwrap(), bare);
    }

    #[test]
    fn dangling_escape_is_unclosed() {
        assert_eq!(
            Path::parse(r#"a["x\"#),
            Err(PathError::UnclosedBracket { position: 1 })
        );
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(Path::parse("  a.b ").unwrap(), Path::parse("a.b").unwrap());
    }

    #[test]
    fn empty_input() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
        assert_eq!(Path::parse("   "), Err(PathError::Empty));
    }

    #[test]
    fn empty_segments() {
        assert_eq!(
            Path::parse("a..b"),
            Err(PathError::EmptySegment { position: 2 })
        );
        assert_eq!(
            Path::parse(".a"),
            Err(PathError::EmptySegment { position: 0 })
        );
        assert_eq!(
            Path::parse("a."),
            Err(PathError::EmptySegment { position: 2 })
        );
        assert_eq!(
            Path::parse("a[]"),
            Err(PathError::EmptySegment { position: 1 })
        );
        assert_eq!(
            Path::parse("a.[0]"),
            Err(PathError::EmptySegment { position: 2 })
        );
    }

    #[test]
    fn unclosed_bracket() {
        assert_eq!(
            Path::parse("a[0"),
            Err(PathError::UnclosedBracket { position: 1 })
        );
        assert_eq!(
            Path::parse("a['b"),
            Err(PathError::UnclosedBracket { position: 1 })
        );
    }

    #[test]
    fn unexpected_characters() {
        assert_eq!(
            Path::parse("a[0]b"),
            Err(PathError::UnexpectedCharacter {
                ch: 'b',
                position: 4
            })
        );
        assert_eq!(
            Path::parse("a]"),
            Err(PathError::UnexpectedCharacter {
                ch: ']',
                position: 1
            })
        );
        assert_eq!(
            Path::parse("a['b'x]"),
            Err(PathError::UnexpectedCharacter {
                ch: 'x',
                position: 5
            })
        );
    }

    #[test]
    fn from_segments_rejects_empty() {
        assert!(Path::from_segments(Vec::<String>::new()).is_none());
        assert!(Path::from_segments(["a", ""]).is_none());
        let p = Path::from_segments(["a", "b"]).unwrap();
        assert_eq!(p, Path::parse("a.b").unwrap());
    }

    #[test]
    fn from_str_and_try_from() {
        let a: Path = "x.y".parse().unwrap();
        let b = Path::try_from("x[y]").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn into_path_accepts_strings_and_paths() {
        let parsed = Path::parse("a.b").unwrap();
        assert_eq!("a[b]".into_path().unwrap(), parsed);
        assert_eq!(String::from("a.b").into_path().unwrap(), parsed);
        assert_eq!((&parsed).into_path().unwrap(), parsed);
        assert_eq!("".into_path(), Err(PathError::Empty));
    }

    #[test]
    fn error_display() {
        assert_eq!(PathError::Empty.to_string(), "path is empty");
        assert_eq!(
            PathError::UnclosedBracket { position: 3 }.to_string(),
            "unclosed '[' at offset 3"
        );
    }
}
