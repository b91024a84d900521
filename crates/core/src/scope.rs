//! The evaluation scope: explicit type definitions and value bindings.
//!
//! A [`Scope`] is captured once per invocation and read by the catalog
//! (to resolve custom type names) and the literal parser (to resolve
//! bare identifiers). It is never mutated during resolution.

use std::collections::BTreeMap;

use crate::types::tag::TypeTag;
use crate::types::value::Value;

/// One field of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub tag: TypeTag,
    pub meaning: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        FieldDef {
            name: name.into(),
            tag,
            meaning: None,
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }
}

/// A caller-declared custom type: a record with ordered fields, or an
/// enumeration with ordered members.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    Record {
        meaning: Option<String>,
        fields: Vec<FieldDef>,
    },
    Enum {
        meaning: Option<String>,
        members: Vec<String>,
    },
}

impl TypeDef {
    pub fn meaning(&self) -> Option<&str> {
        match self {
            TypeDef::Record { meaning, .. } | TypeDef::Enum { meaning, .. } => meaning.as_deref(),
        }
    }
}

/// The immutable evaluation context for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    types: BTreeMap<String, TypeDef>,
    bindings: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Declares a record type. Replaces any previous definition of the
    /// same name.
    pub fn define_record(
        &mut self,
        name: impl Into<String>,
        meaning: Option<&str>,
        fields: Vec<FieldDef>,
    ) -> &mut Self {
        self.types.insert(
            name.into(),
            TypeDef::Record {
                meaning: meaning.map(str::to_string),
                fields,
            },
        );
        self
    }

    /// Declares an enum type. Replaces any previous definition of the
    /// same name.
    pub fn define_enum(
        &mut self,
        name: impl Into<String>,
        meaning: Option<&str>,
        members: &[&str],
    ) -> &mut Self {
        self.types.insert(
            name.into(),
            TypeDef::Enum {
                meaning: meaning.map(str::to_string),
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        );
        self
    }

    /// Binds a named value, visible to the literal parser as a bare
    /// identifier.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_lookup() {
        let mut scope = Scope::new();
        scope
            .define_enum("Level", Some("threat level"), &["LOW", "HIGH"])
            .define_record(
                "Person",
                None,
                vec![
                    FieldDef::new("name", TypeTag::Str).with_meaning("full name"),
                    FieldDef::new("age", TypeTag::Int),
                ],
            )
            .bind("threshold", Value::Int(10));

        match scope.type_def("Level") {
            Some(TypeDef::Enum { meaning, members }) => {
                assert_eq!(meaning.as_deref(), Some("threat level"));
                assert_eq!(members, &["LOW".to_string(), "HIGH".to_string()]);
            }
            other => panic!("expected enum def, got {other:?}"),
        }
        assert!(scope.type_def("Person").is_some());
        assert!(scope.type_def("Ghost").is_none());
        assert_eq!(scope.binding("threshold"), Some(&Value::Int(10)));
        assert_eq!(scope.binding("missing"), None);
    }

    #[test]
    fn redefinition_replaces() {
        let mut scope = Scope::new();
        scope.define_enum("Level", None, &["A"]);
        scope.define_enum("Level", None, &["B", "C"]);
        match scope.type_def("Level") {
            Some(TypeDef::Enum { members, .. }) => {
                assert_eq!(members, &["B".to_string(), "C".to_string()])
            }
            other => panic!("expected enum def, got {other:?}"),
        }
    }
}
