//! Type tags: the compact type vocabulary that travels inside prompts.
//!
//! A tag names either a primary type (`str`, `list[int]`, `map[str, float]`)
//! or a custom type defined in the evaluation scope (`Person`). Rendering is
//! exact because the model is told to read these strings back.

use std::fmt;

/// A type annotation attached to inputs, outputs and tool parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Str,
    Int,
    Float,
    Bool,
    None,
    Any,
    List(Box<TypeTag>),
    Map(Box<TypeTag>, Box<TypeTag>),
    Tuple(Vec<TypeTag>),
    Set(Box<TypeTag>),
    Image,
    Video,
    /// A scope-defined record or enum type, by name.
    Custom(String),
}

impl TypeTag {
    /// Collects the names of every custom type this tag mentions,
    /// including those nested inside containers.
    pub fn custom_names(&self, out: &mut Vec<String>) {
        match self {
            TypeTag::List(inner) | TypeTag::Set(inner) => inner.custom_names(out),
            TypeTag::Map(k, v) => {
                k.custom_names(out);
                v.custom_names(out);
            }
            TypeTag::Tuple(items) => {
                for item in items {
                    item.custom_names(out);
                }
            }
            TypeTag::Custom(name) => out.push(name.clone()),
            _ => {}
        }
    }

    /// True when the tag is `str`, which makes coercion a passthrough.
    pub fn is_str(&self) -> bool {
        matches!(self, TypeTag::Str)
    }

    /// Parses a tag from its textual form, e.g. `list[map[str, int]]`.
    pub fn parse(text: &str) -> Result<TypeTag, String> {
        let mut p = TagParser {
            chars: text.chars().collect(),
            pos: 0,
        };
        let tag = p.parse_tag()?;
        p.skip_ws();
        if p.pos < p.chars.len() {
            return Err(format!(
                "unexpected trailing text in type tag at offset {}",
                p.pos
            ));
        }
        Ok(tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Str => write!(f, "str"),
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::None => write!(f, "none"),
            TypeTag::Any => write!(f, "any"),
            TypeTag::List(inner) => write!(f, "list[{inner}]"),
            TypeTag::Map(k, v) => write!(f, "map[{k}, {v}]"),
            TypeTag::Tuple(items) => {
                write!(f, "tuple[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            TypeTag::Set(inner) => write!(f, "set[{inner}]"),
            TypeTag::Image => write!(f, "Image"),
            TypeTag::Video => write!(f, "Video"),
            TypeTag::Custom(name) => write!(f, "{name}"),
        }
    }
}

// ──────────────────────────────────────────────
// Tag parser
// ──────────────────────────────────────────────

struct TagParser {
    chars: Vec<char>,
    pos: usize,
}

impl TagParser {
    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> Result<(), String> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(format!(
                "expected '{expected}' at offset {}, found '{c}'",
                self.pos
            )),
            None => Err(format!("expected '{expected}', found end of input")),
        }
    }

    fn word(&mut self) -> Result<String, String> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(format!("expected a type name at offset {}", self.pos));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_tag(&mut self) -> Result<TypeTag, String> {
        let name = self.word()?;
        match name.as_str() {
            "str" => Ok(TypeTag::Str),
            "int" => Ok(TypeTag::Int),
            "float" => Ok(TypeTag::Float),
            "bool" => Ok(TypeTag::Bool),
            "none" => Ok(TypeTag::None),
            "any" => Ok(TypeTag::Any),
            "Image" => Ok(TypeTag::Image),
            "Video" => Ok(TypeTag::Video),
            "list" => {
                self.eat('[')?;
                let inner = self.parse_tag()?;
                self.eat(']')?;
                Ok(TypeTag::List(Box::new(inner)))
            }
            "set" => {
                self.eat('[')?;
                let inner = self.parse_tag()?;
                self.eat(']')?;
                Ok(TypeTag::Set(Box::new(inner)))
            }
            "map" => {
                self.eat('[')?;
                let k = self.parse_tag()?;
                self.eat(',')?;
                let v = self.parse_tag()?;
                self.eat(']')?;
                Ok(TypeTag::Map(Box::new(k), Box::new(v)))
            }
            "tuple" => {
                self.eat('[')?;
                let mut items = vec![self.parse_tag()?];
                loop {
                    self.skip_ws();
                    match self.peek() {
                        Some(',') => {
                            self.pos += 1;
                            items.push(self.parse_tag()?);
                        }
                        Some(']') => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            return Err(format!(
                                "expected ',' or ']' in tuple tag at offset {}, found '{c}'",
                                self.pos
                            ))
                        }
                        None => return Err("unterminated tuple tag".to_string()),
                    }
                }
                Ok(TypeTag::Tuple(items))
            }
            other => Ok(TypeTag::Custom(other.to_string())),
        }
    }
}
