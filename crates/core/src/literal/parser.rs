//! Recursive-descent parser for the restricted literal grammar.
//!
//! Accepts built-in literals and containers, enum members and record
//! constructors of catalog-listed types, and bare identifiers bound in
//! the scope. Nothing is ever evaluated; anything outside the grammar
//! is an error with a character offset.

use std::collections::BTreeMap;

use crate::catalog::TypeExplanation;
use crate::literal::lexer::{lex, Spanned, Token};
use crate::scope::{Scope, TypeDef};
use crate::types::value::Value;

/// Parses one literal expression. `catalog` limits which custom type
/// names may be constructed; `scope` supplies bindings for bare
/// identifiers.
pub fn parse_literal(
    text: &str,
    scope: &Scope,
    catalog: &[TypeExplanation],
) -> Result<Value, String> {
    let tokens = lex(text)?;
    let types: BTreeMap<&str, &TypeDef> = catalog
        .iter()
        .map(|e| (e.name.as_str(), &e.def))
        .collect();
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        scope,
        types,
    };
    let value = parser.value()?;
    if parser.peek() != &Token::Eof {
        return Err(parser.err(format!(
            "unexpected {} after the literal",
            parser.peek().describe()
        )));
    }
    Ok(value)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    scope: &'a Scope,
    types: BTreeMap<&'a str, &'a TypeDef>,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek2(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].token
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, expected: &Token, what: &str) -> Result<(), String> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {what}, got {}", self.peek().describe())))
        }
    }

    fn err(&self, msg: impl Into<String>) -> String {
        format!("offset {}: {}", self.cur().pos, msg.into())
    }

    fn value(&mut self) -> Result<Value, String> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(Value::Str(s))
            }
            Token::Int(n) => {
                self.advance();
                Ok(Value::Int(n))
            }
            Token::Float(text) => {
                let parsed = text
                    .parse::<f64>()
                    .map_err(|_| self.err(format!("invalid float '{text}'")));
                self.advance();
                Ok(Value::Float(parsed?))
            }
            Token::Minus => {
                self.advance();
                match self.peek() {
                    Token::Word(w) if w == "inf" => {
                        self.advance();
                        Ok(Value::Float(f64::NEG_INFINITY))
                    }
                    other => Err(self.err(format!(
                        "expected 'inf' after '-', got {}",
                        other.describe()
                    ))),
                }
            }
            Token::Word(word) => self.word(word),
            Token::LBracket => self.list(),
            Token::LParen => self.group_or_tuple(),
            Token::LBrace => self.map_or_set(),
            other => Err(self.err(format!("expected a literal, got {}", other.describe()))),
        }
    }

    fn word(&mut self, word: String) -> Result<Value, String> {
        match word.as_str() {
            "true" | "True" => {
                self.advance();
                return Ok(Value::Bool(true));
            }
            "false" | "False" => {
                self.advance();
                return Ok(Value::Bool(false));
            }
            "none" | "None" | "null" => {
                self.advance();
                return Ok(Value::None);
            }
            "inf" => {
                self.advance();
                return Ok(Value::Float(f64::INFINITY));
            }
            "nan" => {
                self.advance();
                return Ok(Value::Float(f64::NAN));
            }
            "set" if self.peek2() == &Token::LParen => {
                self.advance();
                self.advance();
                self.eat(&Token::RParen, "')' (only the empty set() form is understood)")?;
                return Ok(Value::Set(Vec::new()));
            }
            _ => {}
        }

        match self.peek2() {
            Token::Dot => self.enum_member(word),
            Token::LParen => self.constructor(word),
            _ => {
                let looked_up = self.scope.binding(&word).cloned();
                match looked_up {
                    Some(value) => {
                        self.advance();
                        Ok(value)
                    }
                    None => Err(self.err(format!("unknown identifier '{word}'"))),
                }
            }
        }
    }

    fn enum_member(&mut self, type_name: String) -> Result<Value, String> {
        let def = match self.types.get(type_name.as_str()) {
            Some(def) => *def,
            None => {
                return Err(self.err(format!(
                    "unknown type '{type_name}' (not among the type definitions)"
                )))
            }
        };
        let members = match def {
            TypeDef::Enum { members, .. } => members.clone(),
            TypeDef::Record { .. } => {
                return Err(self.err(format!("'{type_name}' is not an enum")))
            }
        };
        self.advance();
        self.advance();
        let member = match self.peek().clone() {
            Token::Word(member) => {
                self.advance();
                member
            }
            other => {
                return Err(self.err(format!(
                    "expected a member name after '{type_name}.', got {}",
                    other.describe()
                )))
            }
        };
        if !members.contains(&member) {
            return Err(self.err(format!("'{type_name}' has no member '{member}'")));
        }
        Ok(Value::Enum { type_name, member })
    }

    fn constructor(&mut self, type_name: String) -> Result<Value, String> {
        let def = match self.types.get(type_name.as_str()) {
            Some(def) => *def,
            None => {
                return Err(self.err(format!(
                    "unknown type '{type_name}' (not among the type definitions)"
                )))
            }
        };
        let fields = match def {
            TypeDef::Record { fields, .. } => fields.clone(),
            TypeDef::Enum { .. } => {
                return Err(self.err(format!(
                    "'{type_name}' is an enum; write {type_name}.MEMBER instead of a call"
                )))
            }
        };
        self.advance();
        self.advance();

        let mut positional: Vec<Value> = Vec::new();
        let mut keyword: Vec<(String, Value)> = Vec::new();
        loop {
            if self.peek() == &Token::RParen {
                self.advance();
                break;
            }
            if let (Token::Word(name), Token::Eq) = (self.peek(), self.peek2()) {
                let name = name.clone();
                self.advance();
                self.advance();
                let value = self.value()?;
                if keyword.iter().any(|(n, _)| n == &name) {
                    return Err(self.err(format!(
                        "duplicate keyword argument '{name}' for '{type_name}'"
                    )));
                }
                keyword.push((name, value));
            } else {
                if !keyword.is_empty() {
                    return Err(
                        self.err("positional argument after a keyword argument".to_string())
                    );
                }
                positional.push(self.value()?);
            }
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RParen => {}
                other => {
                    return Err(self.err(format!(
                        "expected ',' or ')' in '{type_name}(…)', got {}",
                        other.describe()
                    )))
                }
            }
        }

        if positional.len() > fields.len() {
            return Err(self.err(format!(
                "too many arguments for '{type_name}' (takes {}, got {})",
                fields.len(),
                positional.len()
            )));
        }
        let mut positional: std::collections::VecDeque<Value> = positional.into();
        let mut out: Vec<(String, Value)> = Vec::new();
        for field in &fields {
            let kw_index = keyword.iter().position(|(n, _)| n == &field.name);
            let value = match positional.pop_front() {
                Some(value) => {
                    if kw_index.is_some() {
                        return Err(self.err(format!(
                            "'{type_name}' got multiple values for '{}'",
                            field.name
                        )));
                    }
                    value
                }
                None => match kw_index {
                    Some(i) => keyword.remove(i).1,
                    None => {
                        return Err(self.err(format!(
                            "missing argument '{}' for '{type_name}'",
                            field.name
                        )))
                    }
                },
            };
            out.push((field.name.clone(), value));
        }
        if let Some((name, _)) = keyword.first() {
            return Err(self.err(format!(
                "unexpected keyword argument '{name}' for '{type_name}'"
            )));
        }
        Ok(Value::Record {
            type_name,
            fields: out,
        })
    }

    fn list(&mut self) -> Result<Value, String> {
        self.advance();
        let mut items = Vec::new();
        loop {
            if self.peek() == &Token::RBracket {
                self.advance();
                break;
            }
            items.push(self.value()?);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBracket => {}
                other => {
                    return Err(self.err(format!(
                        "expected ',' or ']' in a list, got {}",
                        other.describe()
                    )))
                }
            }
        }
        Ok(Value::List(items))
    }

    /// `()` is the empty tuple, `(x)` is grouping, `(x,)` and longer are
    /// tuples.
    fn group_or_tuple(&mut self) -> Result<Value, String> {
        self.advance();
        if self.peek() == &Token::RParen {
            self.advance();
            return Ok(Value::Tuple(Vec::new()));
        }
        let first = self.value()?;
        match self.peek() {
            Token::RParen => {
                self.advance();
                Ok(first)
            }
            Token::Comma => {
                self.advance();
                let mut items = vec![first];
                loop {
                    if self.peek() == &Token::RParen {
                        self.advance();
                        break;
                    }
                    items.push(self.value()?);
                    match self.peek() {
                        Token::Comma => {
                            self.advance();
                        }
                        Token::RParen => {}
                        other => {
                            return Err(self.err(format!(
                                "expected ',' or ')' in a tuple, got {}",
                                other.describe()
                            )))
                        }
                    }
                }
                Ok(Value::Tuple(items))
            }
            other => Err(self.err(format!(
                "expected ',' or ')', got {}",
                other.describe()
            ))),
        }
    }

    /// `{}` is the empty map; a leading `key:` makes a map, otherwise a
    /// set.
    fn map_or_set(&mut self) -> Result<Value, String> {
        self.advance();
        if self.peek() == &Token::RBrace {
            self.advance();
            return Ok(Value::Map(Vec::new()));
        }
        let first = self.value()?;
        if self.peek() == &Token::Colon {
            self.advance();
            let value = self.value()?;
            let mut pairs = vec![(first, value)];
            loop {
                match self.peek() {
                    Token::RBrace => {
                        self.advance();
                        break;
                    }
                    Token::Comma => {
                        self.advance();
                        if self.peek() == &Token::RBrace {
                            self.advance();
                            break;
                        }
                        let key = self.value()?;
                        self.eat(&Token::Colon, "':' after a map key")?;
                        let value = self.value()?;
                        pairs.push((key, value));
                    }
                    other => {
                        return Err(self.err(format!(
                            "expected ',' or '}}' in a map, got {}",
                            other.describe()
                        )))
                    }
                }
            }
            return Ok(Value::Map(pairs));
        }
        let mut items = vec![first];
        loop {
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    if self.peek() == &Token::RBrace {
                        self.advance();
                        break;
                    }
                    items.push(self.value()?);
                }
                other => {
                    return Err(self.err(format!(
                        "expected ',' or '}}' in a set, got {}",
                        other.describe()
                    )))
                }
            }
        }
        Ok(Value::Set(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::scope::FieldDef;
    use crate::types::tag::TypeTag;

    fn scope_and_catalog() -> (Scope, Vec<TypeExplanation>) {
        let mut scope = Scope::new();
        scope
            .define_enum("Level", None, &["LOW", "HIGH"])
            .define_record(
                "Person",
                None,
                vec![
                    FieldDef::new("name", TypeTag::Str),
                    FieldDef::new("age", TypeTag::Int),
                ],
            )
            .bind("limit", Value::Int(99));
        let catalog = build_catalog(
            &[
                TypeTag::Custom("Person".to_string()),
                TypeTag::Custom("Level".to_string()),
            ],
            &scope,
        )
        .unwrap();
        (scope, catalog)
    }

    fn parse(text: &str) -> Result<Value, String> {
        let (scope, catalog) = scope_and_catalog();
        parse_literal(text, &scope, &catalog)
    }

    #[test]
    fn parses_primitives() {
        assert_eq!(parse("42").unwrap(), Value::Int(42));
        assert_eq!(parse("-3.5").unwrap(), Value::Float(-3.5));
        assert_eq!(parse("1e3").unwrap(), Value::Float(1000.0));
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse("False").unwrap(), Value::Bool(false));
        assert_eq!(parse("none").unwrap(), Value::None);
        assert_eq!(parse("None").unwrap(), Value::None);
        assert_eq!(parse("null").unwrap(), Value::None);
        assert_eq!(parse("\"hi\\n\"").unwrap(), Value::Str("hi\n".to_string()));
        assert_eq!(parse("inf").unwrap(), Value::Float(f64::INFINITY));
        assert_eq!(parse("-inf").unwrap(), Value::Float(f64::NEG_INFINITY));
        match parse("nan").unwrap() {
            Value::Float(x) => assert!(x.is_nan()),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn parses_containers() {
        assert_eq!(
            parse("[1, 2, 3]").unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(parse("[]").unwrap(), Value::List(vec![]));
        assert_eq!(parse("()").unwrap(), Value::Tuple(vec![]));
        assert_eq!(parse("(1,)").unwrap(), Value::Tuple(vec![Value::Int(1)]));
        assert_eq!(
            parse("(1, \"a\")").unwrap(),
            Value::Tuple(vec![Value::Int(1), Value::Str("a".to_string())])
        );
        assert_eq!(parse("(7)").unwrap(), Value::Int(7));
        assert_eq!(parse("{}").unwrap(), Value::Map(vec![]));
        assert_eq!(
            parse("{\"a\": 1, \"b\": 2}").unwrap(),
            Value::Map(vec![
                (Value::Str("a".to_string()), Value::Int(1)),
                (Value::Str("b".to_string()), Value::Int(2)),
            ])
        );
        assert_eq!(
            parse("{1, 2}").unwrap(),
            Value::Set(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(parse("set()").unwrap(), Value::Set(vec![]));
    }

    #[test]
    fn parses_nested_structures() {
        assert_eq!(
            parse("{\"rows\": [[1, 2], [3]]}").unwrap(),
            Value::Map(vec![(
                Value::Str("rows".to_string()),
                Value::List(vec![
                    Value::List(vec![Value::Int(1), Value::Int(2)]),
                    Value::List(vec![Value::Int(3)]),
                ])
            )])
        );
    }

    #[test]
    fn parses_enum_members() {
        assert_eq!(
            parse("Level.HIGH").unwrap(),
            Value::Enum {
                type_name: "Level".to_string(),
                member: "HIGH".to_string()
            }
        );
        assert!(parse("Level.MEDIUM").unwrap_err().contains("no member"));
        assert!(parse("Mood.HAPPY").unwrap_err().contains("unknown type 'Mood'"));
        assert!(parse("Person.HIGH").unwrap_err().contains("not an enum"));
    }

    #[test]
    fn parses_constructors() {
        let expected = Value::Record {
            type_name: "Person".to_string(),
            fields: vec![
                ("name".to_string(), Value::Str("Ada".to_string())),
                ("age".to_string(), Value::Int(36)),
            ],
        };
        assert_eq!(parse("Person(name=\"Ada\", age=36)").unwrap(), expected);
        assert_eq!(parse("Person(\"Ada\", 36)").unwrap(), expected);
        assert_eq!(parse("Person(\"Ada\", age=36)").unwrap(), expected);
        // keyword order does not matter
        assert_eq!(parse("Person(age=36, name=\"Ada\")").unwrap(), expected);
    }

    #[test]
    fn constructor_argument_errors() {
        assert!(parse("Person(name=\"Ada\")").unwrap_err().contains("missing argument 'age'"));
        assert!(parse("Person(\"Ada\", 36, 1)").unwrap_err().contains("too many arguments"));
        assert!(parse("Person(name=\"Ada\", age=36, extra=1)")
            .unwrap_err()
            .contains("unexpected keyword argument 'extra'"));
        assert!(parse("Person(\"Ada\", name=\"B\", age=1)")
            .unwrap_err()
            .contains("multiple values for 'name'"));
        assert!(parse("Person(name=\"A\", name=\"B\", age=1)")
            .unwrap_err()
            .contains("duplicate keyword argument 'name'"));
        assert!(parse("Person(name=\"A\" age=1)").unwrap_err().contains("expected ','"));
        assert!(parse("Level(1)").unwrap_err().contains("is an enum"));
    }

    #[test]
    fn resolves_scope_bindings() {
        assert_eq!(parse("limit").unwrap(), Value::Int(99));
        assert_eq!(
            parse("[limit, 1]").unwrap(),
            Value::List(vec![Value::Int(99), Value::Int(1)])
        );
        assert!(parse("missing").unwrap_err().contains("unknown identifier 'missing'"));
    }

    #[test]
    fn rejects_unlisted_call_shapes() {
        assert!(parse("open(\"/etc/passwd\")").unwrap_err().contains("unknown type 'open'"));
        assert!(parse("__import__(\"os\")").unwrap_err().contains("unknown type '__import__'"));
    }

    #[test]
    fn rejects_trailing_text() {
        let err = parse("3 is the answer").unwrap_err();
        assert!(err.contains("after the literal"), "{err}");
        assert!(err.contains("offset 2"), "{err}");
    }

    #[test]
    fn errors_carry_offsets() {
        let err = parse("[1, @]").unwrap_err();
        assert!(err.contains("offset 4"), "{err}");
    }

    #[test]
    fn round_trips_canonical_rendering() {
        let original = Value::Record {
            type_name: "Person".to_string(),
            fields: vec![
                ("name".to_string(), Value::Str("a \"quoted\" name".to_string())),
                ("age".to_string(), Value::Int(36)),
            ],
        };
        let rendered = original.render();
        assert_eq!(parse(&rendered).unwrap(), original);

        let nested = Value::Map(vec![
            (
                Value::Str("levels".to_string()),
                Value::List(vec![
                    Value::Enum {
                        type_name: "Level".to_string(),
                        member: "LOW".to_string(),
                    },
                    Value::Enum {
                        type_name: "Level".to_string(),
                        member: "HIGH".to_string(),
                    },
                ]),
            ),
            (
                Value::Str("pair".to_string()),
                Value::Tuple(vec![Value::Float(1.5), Value::Bool(true)]),
            ),
        ]);
        assert_eq!(parse(&nested.render()).unwrap(), nested);
    }
}
