//! Operation declarations: the caller-facing contract.
//!
//! An [`Operation`] carries everything the engine needs to turn one
//! invocation into a prompt: the meaning, typed parameters, the declared
//! return, the prompting method, and any advertised tools or auxiliary
//! informations. Declarations are validated before any model traffic.

use crate::dialect::Method;
use crate::error::SemaError;
use crate::types::info::{Information, OutputHint, ToolSpec};
use crate::types::tag::TypeTag;
use crate::types::value::Value;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub tag: TypeTag,
    pub meaning: Option<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        ParamSpec {
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

/// A meaning-annotated operation whose result the model supplies.
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub meaning: String,
    pub context: Option<String>,
    pub params: Vec<ParamSpec>,
    pub returns: Option<OutputHint>,
    pub method: Method,
    pub tools: Vec<ToolSpec>,
    pub informations: Vec<Information>,
}

impl Operation {
    pub fn new(name: impl Into<String>, meaning: impl Into<String>) -> Self {
        Operation {
            name: name.into(),
            meaning: meaning.into(),
            context: None,
            params: Vec::new(),
            returns: None,
            method: Method::Normal,
            tools: Vec::new(),
            informations: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, tag: TypeTag) -> Self {
        self.returns = Some(OutputHint::new(tag));
        self
    }

    pub fn returns_with_meaning(mut self, tag: TypeTag, meaning: impl Into<String>) -> Self {
        self.returns = Some(OutputHint::new(tag).with_meaning(meaning));
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn information(mut self, information: Information) -> Self {
        self.informations.push(information);
        self
    }

    /// Declaration checks that run before any model traffic. A failure
    /// here is terminal, never retried.
    pub(crate) fn check_args(&self, args: &[(&str, Value)]) -> Result<&OutputHint, SemaError> {
        let returns = self.returns.as_ref().ok_or_else(|| {
            SemaError::Configuration(format!(
                "operation '{}' declares no return type",
                self.name
            ))
        })?;
        if args.len() != self.params.len() {
            return Err(SemaError::Configuration(format!(
                "operation '{}' takes {} arguments, got {}",
                self.name,
                self.params.len(),
                args.len()
            )));
        }
        for (index, (param, (given, _))) in self.params.iter().zip(args).enumerate() {
            if param.name != *given {
                return Err(SemaError::Configuration(format!(
                    "operation '{}': argument {} should be '{}', got '{given}'",
                    self.name,
                    index + 1,
                    param.name
                )));
            }
        }
        Ok(returns)
    }

    /// Binds argument values to their declared parameters.
    pub(crate) fn input_informations(&self, args: &[(&str, Value)]) -> Vec<Information> {
        self.params
            .iter()
            .zip(args)
            .map(|(param, (_, value))| {
                let info = Information::new(param.name.clone(), value.clone());
                match &param.meaning {
                    Some(meaning) => info.with_meaning(meaning.clone()),
                    None => info,
                }
            })
            .collect()
    }

    /// The tags the type catalog must explain: declared parameter tags,
    /// tags inferred from argument and auxiliary values, tool
    /// signatures, and the return tag. Enum and record instances
    /// embedded anywhere inside a value seed their type names too.
    pub(crate) fn seed_tags(&self, args: &[(&str, Value)]) -> Vec<TypeTag> {
        let mut seeds = Vec::new();
        for param in &self.params {
            seeds.push(param.tag.clone());
        }
        for (_, value) in args {
            seeds.push(value.tag());
            push_embedded_names(&mut seeds, value);
        }
        for info in &self.informations {
            seeds.push(info.tag());
            push_embedded_names(&mut seeds, &info.value);
        }
        for tool in &self.tools {
            for param in &tool.params {
                seeds.push(param.tag.clone());
            }
            seeds.push(tool.returns.clone());
        }
        if let Some(hint) = &self.returns {
            seeds.push(hint.tag.clone());
        }
        seeds
    }
}

fn push_embedded_names(seeds: &mut Vec<TypeTag>, value: &Value) {
    let mut names = Vec::new();
    value.custom_names(&mut names);
    seeds.extend(names.into_iter().map(TypeTag::Custom));
}
