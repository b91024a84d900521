//! The type description catalog: every custom type the request touches,
//! explained once, in discovery order.

use std::collections::BTreeSet;
use std::collections::VecDeque;

use crate::error::SemaError;
use crate::scope::{Scope, TypeDef};
use crate::types::tag::TypeTag;

/// A resolved custom type with its one-line schema rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExplanation {
    pub name: String,
    pub def: TypeDef,
}

impl TypeExplanation {
    /// Record types render
    /// `{meaning} ({Name}) (class) eg:- Name(field=meaning:tag, …)`;
    /// enum types render `{meaning} ({Name}) (enum) eg:- Name.MEMBER, …`.
    /// The leading meaning segment is omitted when the type has none.
    pub fn render_line(&self) -> String {
        let head = match self.def.meaning() {
            Some(meaning) => format!("{meaning} ({})", self.name),
            None => format!("({})", self.name),
        };
        match &self.def {
            TypeDef::Record { fields, .. } => {
                let rendered = fields
                    .iter()
                    .map(|f| match &f.meaning {
                        Some(meaning) => format!("{}={meaning}:{}", f.name, f.tag),
                        None => format!("{}={}", f.name, f.tag),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{head} (class) eg:- {}({rendered})", self.name)
            }
            TypeDef::Enum { members, .. } => {
                let rendered = members
                    .iter()
                    .map(|m| format!("{}.{m}", self.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{head} (enum) eg:- {rendered}")
            }
        }
    }
}

/// Expands the seed tags to the full set of custom types they reach,
/// transitively through record fields. Output order is discovery order;
/// each type appears once. A name missing from the scope is a
/// [`SemaError::TypeLookup`], raised immediately.
///
/// Cyclic type graphs terminate: a type is marked explained before its
/// fields are walked.
pub fn build_catalog(seeds: &[TypeTag], scope: &Scope) -> Result<Vec<TypeExplanation>, SemaError> {
    let mut frontier = VecDeque::new();
    for tag in seeds {
        let mut names = Vec::new();
        tag.custom_names(&mut names);
        frontier.extend(names);
    }

    let mut seen = BTreeSet::new();
    let mut catalog = Vec::new();
    while let Some(name) = frontier.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let def = scope
            .type_def(&name)
            .ok_or_else(|| SemaError::TypeLookup { name: name.clone() })?
            .clone();
        if let TypeDef::Record { fields, .. } = &def {
            for field in fields {
                let mut names = Vec::new();
                field.tag.custom_names(&mut names);
                frontier.extend(names);
            }
        }
        catalog.push(TypeExplanation { name, def });
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::FieldDef;

    fn demo_scope() -> Scope {
        let mut scope = Scope::new();
        scope
            .define_enum("Level", Some("urgency"), &["LOW", "HIGH"])
            .define_record(
                "Address",
                None,
                vec![
                    FieldDef::new("street", TypeTag::Str),
                    FieldDef::new("city", TypeTag::Str).with_meaning("city name"),
                ],
            )
            .define_record(
                "Person",
                Some("a person of interest"),
                vec![
                    FieldDef::new("name", TypeTag::Str),
                    FieldDef::new("home", TypeTag::Custom("Address".to_string())),
                    FieldDef::new("level", TypeTag::Custom("Level".to_string())),
                ],
            );
        scope
    }

    #[test]
    fn renders_schema_lines() {
        let scope = demo_scope();
        let catalog =
            build_catalog(&[TypeTag::Custom("Person".to_string())], &scope).unwrap();
        let lines: Vec<String> = catalog.iter().map(TypeExplanation::render_line).collect();
        assert_eq!(
            lines,
            vec![
                "a person of interest (Person) (class) eg:- Person(name=str, home=Address, level=Level)",
                "(Address) (class) eg:- Address(street=str, city=city name:str)",
                "urgency (Level) (enum) eg:- Level.LOW, Level.HIGH",
            ]
        );
    }

    #[test]
    fn discovery_is_transitive_and_duplicate_free() {
        let scope = demo_scope();
        let seeds = vec![
            TypeTag::List(Box::new(TypeTag::Custom("Person".to_string()))),
            TypeTag::Custom("Address".to_string()),
        ];
        let catalog = build_catalog(&seeds, &scope).unwrap();
        let names: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Person", "Address", "Level"]);
    }

    #[test]
    fn closure_is_idempotent() {
        let scope = demo_scope();
        let first =
            build_catalog(&[TypeTag::Custom("Person".to_string())], &scope).unwrap();
        let reseed: Vec<TypeTag> = first
            .iter()
            .map(|e| TypeTag::Custom(e.name.clone()))
            .collect();
        let second = build_catalog(&reseed, &scope).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cyclic_type_graphs_terminate() {
        let mut scope = Scope::new();
        scope.define_record(
            "Node",
            None,
            vec![
                FieldDef::new("label", TypeTag::Str),
                FieldDef::new(
                    "children",
                    TypeTag::List(Box::new(TypeTag::Custom("Node".to_string()))),
                ),
            ],
        );
        let catalog = build_catalog(&[TypeTag::Custom("Node".to_string())], &scope).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "Node");
    }

    #[test]
    fn unknown_type_is_lookup_error() {
        let scope = demo_scope();
        let err = build_catalog(&[TypeTag::Custom("Ghost".to_string())], &scope).unwrap_err();
        match err {
            SemaError::TypeLookup { name } => assert_eq!(name, "Ghost"),
            other => panic!("expected TypeLookup, got {other:?}"),
        }
    }

    #[test]
    fn primitives_never_enter_the_catalog() {
        let scope = demo_scope();
        let seeds = vec![
            TypeTag::Int,
            TypeTag::List(Box::new(TypeTag::Str)),
            TypeTag::Image,
            TypeTag::Any,
        ];
        let catalog = build_catalog(&seeds, &scope).unwrap();
        assert!(catalog.is_empty());
    }
}
