//! Minimal JSON path queries: `$`, `$.field`, `$.field.nested`, `$.items[0]`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed JSON path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first syntax problem found.
    pub fn parse(expression: &str) -> Result<Self, String> {
        let rest = expression
            .trim()
            .strip_prefix('$')
            .ok_or_else(|| "path must start with '$'".to_string())?;

        let mut segments = Vec::new();
        let mut chars = rest.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    let mut key = String::new();
                    while let Some(&next) = chars.peek() {
                        if next == '.' || next == '[' {
                            break;
                        }
                        key.push(next);
                        chars.next();
                    }
                    if key.is_empty() {
                        return Err("empty field name".to_string());
                    }
                    segments.push(Segment::Key(key));
                }
                '[' => {
                    let mut index = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(digit) => index.push(digit),
                            None => return Err("unclosed '['".to_string()),
                        }
                    }
                    let index = index
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| format!("invalid array index '{index}'"))?;
                    segments.push(Segment::Index(index));
                }
                other => return Err(format!("unexpected character '{other}'")),
            }
        }

        Ok(Self { segments })
    }

    /// Resolves the path against a JSON document.
    #[must_use]
    pub fn query<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match segment {
                Segment::Key(key) => current.get(key),
                Segment::Index(index) => current.get(*index),
            })
    }
}
