//! Minimal XML reader for serialized markup documents.
//!
//! Handles elements, attributes (single or double quoted), character data, the
//! five predefined entities plus numeric references, self-closing tags, and skips
//! the XML prolog, comments, `<!DOCTYPE>` and CDATA-free processing instructions.

use thiserror::Error;

/// Errors produced while reading a markup document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character {found:?} at byte {pos}")]
    UnexpectedChar { pos: usize, found: char },
    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedTag { expected: String, found: String },
    #[error("unknown entity &{0};")]
    InvalidEntity(String),
    #[error("content after the root element at byte {0}")]
    TrailingContent(usize),
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },
}

/// A node in a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// A parsed element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated character data of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

/// Parse a document with a single root element.
pub fn parse_document(input: &str) -> Result<XmlElement, ParseError> {
    let mut reader = Reader { src: input, pos: 0 };
    reader.skip_misc()?;
    if reader.at_end() {
        return Err(ParseError::Empty);
    }
    let root = reader.element()?;
    reader.skip_misc()?;
    if !reader.at_end() {
        return Err(ParseError::TrailingContent(reader.pos));
    }
    Ok(root)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Result<char, ParseError> {
        let c = self.peek().ok_or(ParseError::UnexpectedEof)?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        let pos = self.pos;
        let found = self.bump()?;
        if found != expected {
            return Err(ParseError::UnexpectedChar { pos, found });
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn skip_past(&mut self, terminator: &str) -> Result<(), ParseError> {
        let idx = self.rest().find(terminator).ok_or(ParseError::UnexpectedEof)?;
        self.pos += idx + terminator.len();
        Ok(())
    }

    /// Skip whitespace, comments, the prolog and doctype declarations.
    fn skip_misc(&mut self) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<!") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            let found = self.peek().ok_or(ParseError::UnexpectedEof)?;
            return Err(ParseError::UnexpectedChar { pos: start, found });
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn element(&mut self) -> Result<XmlElement, ParseError> {
        self.expect('<')?;
        let name = self.name()?;
        let mut element = XmlElement {
            name,
            ..Default::default()
        };

        loop {
            self.skip_whitespace();
            match self.peek().ok_or(ParseError::UnexpectedEof)? {
                '/' => {
                    self.bump()?;
                    self.expect('>')?;
                    return Ok(element);
                }
                '>' => {
                    self.bump()?;
                    break;
                }
                _ => {
                    let key = self.name()?;
                    self.skip_whitespace();
                    self.expect('=')?;
                    self.skip_whitespace();
                    let value = self.quoted()?;
                    element.attributes.push((key, value));
                }
            }
        }

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(ParseError::UnexpectedEof);
            }
            if rest.starts_with("</") {
                self.pos += 2;
                let closing = self.name()?;
                self.skip_whitespace();
                self.expect('>')?;
                if closing != element.name {
                    return Err(ParseError::MismatchedTag {
                        expected: element.name,
                        found: closing,
                    });
                }
                return Ok(element);
            }
            if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with('<') {
                element.children.push(XmlNode::Element(self.element()?));
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                let raw = &rest[..end];
                self.pos += end;
                let text = unescape(raw)?;
                if !text.is_empty() {
                    element.children.push(XmlNode::Text(text));
                }
            }
        }
    }

    fn quoted(&mut self) -> Result<String, ParseError> {
        let pos = self.pos;
        let quote = self.bump()?;
        if quote != '"' && quote != '\'' {
            return Err(ParseError::UnexpectedChar { pos, found: quote });
        }
        let rest = self.rest();
        let end = rest.find(quote).ok_or(ParseError::UnexpectedEof)?;
        let raw = &rest[..end];
        self.pos += end + 1;
        unescape(raw)
    }
}

fn unescape(raw: &str) -> Result<String, ParseError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| ParseError::InvalidEntity(after.to_string()))?;
        let entity = &after[..semi];
        let decoded = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => numeric_entity(entity)
                .ok_or_else(|| ParseError::InvalidEntity(entity.to_string()))?,
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}
