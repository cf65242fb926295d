//! Wildcard text patterns.
//!
//! Supported syntax:
//!
//! - `*` matches any sequence of characters (including none)
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` match one character from a class; `[!abc]` negates it
//!
//! Matching is case-insensitive and covers the whole text.

use regex::{Regex, RegexBuilder};

use super::error::WildcardError;

/// A parsed, validated wildcard pattern.
#[derive(Debug, Clone)]
pub struct Wildcard {
    pattern: String,
    regex: Regex,
}

impl Wildcard {
    /// Parses `pattern`, failing on malformed character classes.
    pub fn parse(pattern: &str) -> Result<Self, WildcardError> {
        let translated = translate(pattern)?;
        let regex = RegexBuilder::new(&translated)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| WildcardError::Invalid {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if `text` matches the whole pattern.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn escape(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

fn translate(pattern: &str) -> Result<String, WildcardError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                // Collapse runs of '*'
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let (class, next) = translate_class(pattern, &chars, i)?;
                out.push_str(&class);
                i = next;
                continue;
            }
            ']' => {
                return Err(WildcardError::UnbalancedBracket {
                    pattern: pattern.to_string(),
                    position: i,
                })
            }
            c => out.push_str(&escape(c)),
        }
        i += 1;
    }

    out.push('$');
    Ok(out)
}

/// Translates the class opening at `start`, returning it and the index just
/// past its closing bracket.
fn translate_class(
    pattern: &str,
    chars: &[char],
    start: usize,
) -> Result<(String, usize), WildcardError> {
    let mut i = start + 1;
    let mut class = String::from("[");

    if chars.get(i) == Some(&'!') {
        class.push('^');
        i += 1;
    }

    let body_start = i;
    loop {
        let Some(&c) = chars.get(i) else {
            return Err(WildcardError::UnbalancedBracket {
                pattern: pattern.to_string(),
                position: start,
            });
        };

        match c {
            ']' if i == body_start => {
                return Err(WildcardError::EmptyClass {
                    pattern: pattern.to_string(),
                    position: start,
                })
            }
            ']' => break,
            '[' => {
                return Err(WildcardError::UnbalancedBracket {
                    pattern: pattern.to_string(),
                    position: i,
                })
            }
            _ => {}
        }

        let is_range =
            chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|&e| e != ']');
        if is_range {
            let end = chars[i + 2];
            if end == '[' {
                return Err(WildcardError::UnbalancedBracket {
                    pattern: pattern.to_string(),
                    position: i + 2,
                });
            }
            if c > end {
                return Err(WildcardError::InvalidRange {
                    pattern: pattern.to_string(),
                    start: c,
                    end,
                });
            }
            class.push_str(&escape(c));
            class.push('-');
            class.push_str(&escape(end));
            i += 3;
        } else {
            class.push_str(&escape(c));
            i += 1;
        }
    }

    class.push(']');
    Ok((class, i + 1))
}
