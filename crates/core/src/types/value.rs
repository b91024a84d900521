//! Runtime values and their canonical literal rendering.

use std::fmt;

use super::media::{MediaKind, MediaValue};
use super::tag::TypeTag;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A runtime value flowing through prompts and coercion.
///
/// `Map` and `Record` keep insertion order; equality is positional. `Set`
/// is an ordered collection with set rendering, not a hashed container.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Enum {
        type_name: String,
        member: String,
    },
    Record {
        type_name: String,
        fields: Vec<(String, Value)>,
    },
    Media(MediaValue),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Enum { .. } => "enum",
            Value::Record { .. } => "record",
            Value::Media(_) => "media",
        }
    }

    /// Infers the type tag this value would carry in a prompt. Container
    /// element tags come from the first element, `any` when empty.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::None => TypeTag::None,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            Value::List(items) => TypeTag::List(Box::new(first_tag(items))),
            Value::Tuple(items) => TypeTag::Tuple(items.iter().map(Value::tag).collect()),
            Value::Set(items) => TypeTag::Set(Box::new(first_tag(items))),
            Value::Map(pairs) => match pairs.first() {
                Some((k, v)) => TypeTag::Map(Box::new(k.tag()), Box::new(v.tag())),
                None => TypeTag::Map(Box::new(TypeTag::Any), Box::new(TypeTag::Any)),
            },
            Value::Enum { type_name, .. } | Value::Record { type_name, .. } => {
                TypeTag::Custom(type_name.clone())
            }
            Value::Media(m) => match m.kind {
                MediaKind::Image => TypeTag::Image,
                MediaKind::Video => TypeTag::Video,
            },
        }
    }

    /// The canonical literal text of this value. For every non-media
    /// value the restricted literal parser reads this text back to an
    /// equal value.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Checks this value against a declared tag, widening int to float
    /// where the tag asks for a float. Any other mismatch is an error
    /// naming both sides.
    pub fn conform(self, tag: &TypeTag) -> Result<Value, String> {
        match (tag, self) {
            (TypeTag::Any, v) => Ok(v),
            (TypeTag::Str, Value::Str(s)) => Ok(Value::Str(s)),
            (TypeTag::Int, Value::Int(i)) => Ok(Value::Int(i)),
            (TypeTag::Float, Value::Float(x)) => Ok(Value::Float(x)),
            (TypeTag::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (TypeTag::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (TypeTag::None, Value::None) => Ok(Value::None),
            (TypeTag::List(elem), Value::List(items)) => {
                let items = items
                    .into_iter()
                    .map(|v| v.conform(elem))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(items))
            }
            (TypeTag::Set(elem), Value::Set(items)) => {
                let items = items
                    .into_iter()
                    .map(|v| v.conform(elem))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Set(items))
            }
            (TypeTag::Tuple(tags), Value::Tuple(items)) => {
                if tags.len() != items.len() {
                    return Err(format!(
                        "expected {tag} with {} items, got a tuple of {}",
                        tags.len(),
                        items.len()
                    ));
                }
                let items = items
                    .into_iter()
                    .zip(tags.iter())
                    .map(|(v, t)| v.conform(t))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(items))
            }
            (TypeTag::Map(kt, vt), Value::Map(pairs)) => {
                let pairs = pairs
                    .into_iter()
                    .map(|(k, v)| Ok((k.conform(kt)?, v.conform(vt)?)))
                    .collect::<Result<Vec<_>, String>>()?;
                Ok(Value::Map(pairs))
            }
            (TypeTag::Image, Value::Media(m)) if m.kind == MediaKind::Image => {
                Ok(Value::Media(m))
            }
            (TypeTag::Video, Value::Media(m)) if m.kind == MediaKind::Video => {
                Ok(Value::Media(m))
            }
            (TypeTag::Custom(name), v @ Value::Enum { .. })
                if matches!(&v, Value::Enum { type_name, .. } if type_name == name) =>
            {
                Ok(v)
            }
            (TypeTag::Custom(name), v @ Value::Record { .. })
                if matches!(&v, Value::Record { type_name, .. } if type_name == name) =>
            {
                Ok(v)
            }
            (tag, other) => Err(format!(
                "expected a value of type {tag}, got {} ({})",
                other.type_name(),
                other.render()
            )),
        }
    }

    /// Collects the names of every custom type embedded in this value,
    /// walking container elements, map keys and values, and record
    /// fields. Inferred tags only carry a container's first element, so
    /// catalog seeding uses this walk instead.
    pub fn custom_names(&self, out: &mut Vec<String>) {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                for item in items {
                    item.custom_names(out);
                }
            }
            Value::Map(pairs) => {
                for (k, v) in pairs {
                    k.custom_names(out);
                    v.custom_names(out);
                }
            }
            Value::Enum { type_name, .. } => out.push(type_name.clone()),
            Value::Record { type_name, fields } => {
                out.push(type_name.clone());
                for (_, v) in fields {
                    v.custom_names(out);
                }
            }
            _ => {}
        }
    }
}

fn first_tag(items: &[Value]) -> TypeTag {
    items.first().map(Value::tag).unwrap_or(TypeTag::Any)
}

// ──────────────────────────────────────────────
// Canonical rendering
// ──────────────────────────────────────────────

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(true) => write!(f, "true"),
            Value::Bool(false) => write!(f, "false"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write_float(f, *x),
            Value::Str(s) => write_quoted(f, s),
            Value::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Set(items) => {
                if items.is_empty() {
                    return write!(f, "set()");
                }
                write!(f, "{{")?;
                write_joined(f, items)?;
                write!(f, "}}")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Enum { type_name, member } => write!(f, "{type_name}.{member}"),
            Value::Record { type_name, fields } => {
                write!(f, "{type_name}(")?;
                for (i, (name, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}={v}")?;
                }
                write!(f, ")")
            }
            Value::Media(m) => write!(f, "<{}>", m.kind.tag_name()),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Floats always carry a decimal point or a word form, so the literal
/// parser never mistakes them for ints.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        write!(f, "nan")
    } else if x.is_infinite() {
        write!(f, "{}", if x > 0.0 { "inf" } else { "-inf" })
    } else if x == x.trunc() {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            other => write!(f, "{other}")?,
        }
    }
    write!(f, "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_primitives() {
        assert_eq!(Value::None.render(), "none");
        assert_eq!(Value::Bool(true).render(), "true");
        assert_eq!(Value::Int(-42).render(), "-42");
        assert_eq!(Value::Float(3.0).render(), "3.0");
        assert_eq!(Value::Float(3.25).render(), "3.25");
        assert_eq!(Value::Float(f64::INFINITY).render(), "inf");
        assert_eq!(Value::Float(f64::NEG_INFINITY).render(), "-inf");
        assert_eq!(Value::Float(f64::NAN).render(), "nan");
        assert_eq!(Value::Str("plain".to_string()).render(), "\"plain\"");
        assert_eq!(
            Value::Str("a \"b\"\nc\\d".to_string()).render(),
            "\"a \\\"b\\\"\\nc\\\\d\""
        );
    }

    #[test]
    fn renders_containers() {
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).render(),
            "[1, 2]"
        );
        assert_eq!(Value::Tuple(vec![]).render(), "()");
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).render(), "(1,)");
        assert_eq!(
            Value::Tuple(vec![Value::Int(1), Value::Str("x".to_string())]).render(),
            "(1, \"x\")"
        );
        assert_eq!(Value::Set(vec![]).render(), "set()");
        assert_eq!(
            Value::Set(vec![Value::Int(1), Value::Int(2)]).render(),
            "{1, 2}"
        );
        assert_eq!(Value::Map(vec![]).render(), "{}");
        assert_eq!(
            Value::Map(vec![(Value::Str("k".to_string()), Value::Int(1))]).render(),
            "{\"k\": 1}"
        );
    }

    #[test]
    fn renders_composites() {
        let level = Value::Enum {
            type_name: "Level".to_string(),
            member: "HIGH".to_string(),
        };
        assert_eq!(level.render(), "Level.HIGH");

        let person = Value::Record {
            type_name: "Person".to_string(),
            fields: vec![
                ("name".to_string(), Value::Str("Ada".to_string())),
                ("age".to_string(), Value::Int(36)),
                ("level".to_string(), level),
            ],
        };
        assert_eq!(
            person.render(),
            "Person(name=\"Ada\", age=36, level=Level.HIGH)"
        );
    }

    #[test]
    fn infers_tags() {
        assert_eq!(Value::Int(1).tag(), TypeTag::Int);
        assert_eq!(
            Value::List(vec![Value::Int(1)]).tag(),
            TypeTag::List(Box::new(TypeTag::Int))
        );
        assert_eq!(
            Value::List(vec![]).tag(),
            TypeTag::List(Box::new(TypeTag::Any))
        );
        assert_eq!(
            Value::Map(vec![(Value::Str("k".to_string()), Value::Float(1.5))]).tag(),
            TypeTag::Map(Box::new(TypeTag::Str), Box::new(TypeTag::Float))
        );
        assert_eq!(
            Value::Enum {
                type_name: "Level".to_string(),
                member: "LOW".to_string()
            }
            .tag(),
            TypeTag::Custom("Level".to_string())
        );
    }

    #[test]
    fn collects_embedded_custom_names() {
        let person = Value::Record {
            type_name: "Person".to_string(),
            fields: vec![(
                "level".to_string(),
                Value::Enum {
                    type_name: "Level".to_string(),
                    member: "HIGH".to_string(),
                },
            )],
        };
        // Past the first element, so tag inference alone would miss it.
        let mixed = Value::List(vec![Value::Int(1), person]);
        let mut names = Vec::new();
        mixed.custom_names(&mut names);
        assert_eq!(names, vec!["Person".to_string(), "Level".to_string()]);

        let keyed = Value::Map(vec![(
            Value::Str("owner".to_string()),
            Value::Enum {
                type_name: "Mood".to_string(),
                member: "CALM".to_string(),
            },
        )]);
        let mut names = Vec::new();
        keyed.custom_names(&mut names);
        assert_eq!(names, vec!["Mood".to_string()]);

        let mut names = Vec::new();
        Value::List(vec![Value::Int(1), Value::Str("x".to_string())]).custom_names(&mut names);
        assert!(names.is_empty());
    }

    #[test]
    fn conform_widens_int_to_float() {
        assert_eq!(
            Value::Int(3).conform(&TypeTag::Float).unwrap(),
            Value::Float(3.0)
        );
        let items = Value::List(vec![Value::Int(1), Value::Float(2.5)]);
        assert_eq!(
            items
                .conform(&TypeTag::List(Box::new(TypeTag::Float)))
                .unwrap(),
            Value::List(vec![Value::Float(1.0), Value::Float(2.5)])
        );
    }

    #[test]
    fn conform_rejects_mismatches() {
        let err = Value::Str("3".to_string()).conform(&TypeTag::Int).unwrap_err();
        assert!(err.contains("expected a value of type int"), "{err}");
        assert!(err.contains("str"), "{err}");

        let err = Value::Tuple(vec![Value::Int(1)])
            .conform(&TypeTag::Tuple(vec![TypeTag::Int, TypeTag::Int]))
            .unwrap_err();
        assert!(err.contains("2 items"), "{err}");

        let err = Value::Enum {
            type_name: "Level".to_string(),
            member: "LOW".to_string(),
        }
        .conform(&TypeTag::Custom("Mood".to_string()))
        .unwrap_err();
        assert!(err.contains("Mood"), "{err}");
    }

    #[test]
    fn conform_accepts_any() {
        let v = Value::Map(vec![(Value::Int(1), Value::Str("x".to_string()))]);
        assert_eq!(v.clone().conform(&TypeTag::Any).unwrap(), v);
    }
}
