mod config;

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use sema_core::{
    parse_literal, Engine, Method, ModelBoundary, ModelParams, Operation, ParamSpec, Scope,
    ScriptedBoundary, TypeTag, Value,
};
use sema_providers::{AnthropicBoundary, OpenAiBoundary};

use config::{CliConfig, ProviderConfig};

/// Which model boundary serves the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Provider {
    Openai,
    Anthropic,
    Scripted,
}

/// Meaning-typed prompting toolchain.
#[derive(Parser)]
#[command(name = "sema", version, about = "Meaning-typed prompting toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one meaning-typed operation and print the coerced value
    Ask(AskArgs),
}

#[derive(Args)]
struct AskArgs {
    /// What the operation should accomplish
    #[arg(long)]
    meaning: String,

    /// Input binding as name=literal (repeatable)
    #[arg(long = "input", value_name = "NAME=LITERAL")]
    inputs: Vec<String>,

    /// Meaning for one input as name=text (repeatable)
    #[arg(long = "param-meaning", value_name = "NAME=TEXT")]
    param_meanings: Vec<String>,

    /// Return type tag, e.g. int, list[str], map[str, float]
    #[arg(long, default_value = "str")]
    returns: String,

    /// Prompting method: normal, reason, cot, reflection, react, planner
    #[arg(long, default_value = "normal")]
    method: String,

    /// Extra context text for the request
    #[arg(long)]
    context: Option<String>,

    /// Which model boundary to use
    #[arg(long, value_enum, default_value = "openai")]
    provider: Provider,

    /// Reply script for the scripted provider; replies separated by `---` lines
    #[arg(long)]
    script: Option<PathBuf>,

    /// Model identifier (falls back to config, then the provider default)
    #[arg(long)]
    model: Option<String>,

    /// API key (falls back to config, then OPENAI_API_KEY / ANTHROPIC_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL override, e.g. an OpenAI-compatible local server
    #[arg(long)]
    base_url: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f64>,

    /// Maximum tokens in the reply
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Print every captured section, not just the value
    #[arg(long)]
    detail: bool,

    /// TOML config file with provider defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask(args) => {
            if let Err(message) = cmd_ask(args) {
                eprintln!("error: {}", message);
                process::exit(1);
            }
        }
    }
}

fn cmd_ask(args: AskArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => CliConfig::default(),
    };

    let scope = Scope::new();
    let inputs = parse_inputs(&args.inputs, &scope)?;
    let param_meanings = parse_pairs(&args.param_meanings, "--param-meaning")?;
    for (name, _) in &param_meanings {
        if !inputs.iter().any(|(input, _)| input == name) {
            return Err(format!("--param-meaning names unknown input '{}'", name));
        }
    }

    let returns = TypeTag::parse(&args.returns)
        .map_err(|e| format!("invalid --returns '{}': {}", args.returns, e))?;
    let method = Method::parse(&args.method)
        .ok_or_else(|| format!("unknown --method '{}'", args.method))?;

    let mut op = Operation::new("ask", &args.meaning)
        .returns(returns)
        .with_method(method);
    if let Some(context) = &args.context {
        op = op.with_context(context);
    }
    for (name, value) in &inputs {
        let mut param = ParamSpec::new(name, value.tag());
        if let Some((_, meaning)) = param_meanings.iter().find(|(n, _)| n == name) {
            param = param.with_meaning(meaning);
        }
        op = op.param(param);
    }

    let boundary = build_boundary(&args, &config)?;
    let engine = Engine::new(boundary).with_params(build_params(&args, &config));

    let call_args: Vec<(&str, Value)> = inputs
        .iter()
        .map(|(name, value)| (name.as_str(), value.clone()))
        .collect();
    let resolved = engine
        .call_detailed(&op, &scope, &call_args)
        .map_err(|e| e.to_string())?;

    if args.detail {
        for (name, content) in &resolved.sections {
            if name != "output" {
                println!("[{}]", name);
                println!("{}", content);
                println!();
            }
        }
    }
    println!("{}", resolved.value.render());
    Ok(())
}

// ── Flag parsing ─────────────────────────────────────────────────────────────

/// Parses repeated `name=literal` bindings with the restricted literal
/// grammar (builtin shapes only; the CLI declares no custom types).
fn parse_inputs(raw: &[String], scope: &Scope) -> Result<Vec<(String, Value)>, String> {
    let mut inputs: Vec<(String, Value)> = Vec::new();
    for entry in raw {
        let (name, literal) = entry
            .split_once('=')
            .ok_or_else(|| format!("--input '{}' is not name=literal", entry))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("--input '{}' has an empty name", entry));
        }
        if inputs.iter().any(|(existing, _)| existing == name) {
            return Err(format!("--input '{}' given twice", name));
        }
        let value = parse_literal(literal.trim(), scope, &[])
            .map_err(|e| format!("--input '{}': {}", name, e))?;
        inputs.push((name.to_string(), value));
    }
    Ok(inputs)
}

fn parse_pairs(raw: &[String], flag: &str) -> Result<Vec<(String, String)>, String> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(name, text)| (name.trim().to_string(), text.trim().to_string()))
                .ok_or_else(|| format!("{} '{}' is not name=text", flag, entry))
        })
        .collect()
}

// ── Provider wiring ──────────────────────────────────────────────────────────

fn build_boundary(args: &AskArgs, config: &CliConfig) -> Result<Box<dyn ModelBoundary>, String> {
    match args.provider {
        Provider::Openai => {
            let section = config.openai.as_ref();
            let api_key = resolve_api_key(args, section, "OPENAI_API_KEY").ok_or_else(|| {
                "no OpenAI API key: pass --api-key, set OPENAI_API_KEY, or add it to the config"
                    .to_string()
            })?;
            let mut boundary = OpenAiBoundary::new(api_key);
            if let Some(base_url) = resolve_base_url(args, section) {
                boundary = boundary.with_base_url(base_url);
            }
            Ok(Box::new(boundary))
        }
        Provider::Anthropic => {
            let section = config.anthropic.as_ref();
            let api_key = resolve_api_key(args, section, "ANTHROPIC_API_KEY").ok_or_else(|| {
                "no Anthropic API key: pass --api-key, set ANTHROPIC_API_KEY, or add it to the config"
                    .to_string()
            })?;
            let mut boundary = AnthropicBoundary::new(api_key);
            if let Some(base_url) = resolve_base_url(args, section) {
                boundary = boundary.with_base_url(base_url);
            }
            Ok(Box::new(boundary))
        }
        Provider::Scripted => {
            let path = args
                .script
                .as_ref()
                .ok_or_else(|| "--provider scripted requires --script".to_string())?;
            let text = fs::read_to_string(path)
                .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
            let replies = split_replies(&text);
            if replies.is_empty() {
                return Err(format!("'{}' holds no replies", path.display()));
            }
            Ok(Box::new(ScriptedBoundary::new(replies)))
        }
    }
}

fn resolve_api_key(args: &AskArgs, section: Option<&ProviderConfig>, env_key: &str) -> Option<String> {
    args.api_key
        .clone()
        .or_else(|| section.and_then(|s| s.api_key.clone()))
        .or_else(|| std::env::var(env_key).ok())
}

fn resolve_base_url(args: &AskArgs, section: Option<&ProviderConfig>) -> Option<String> {
    args.base_url
        .clone()
        .or_else(|| section.and_then(|s| s.base_url.clone()))
}

fn build_params(args: &AskArgs, config: &CliConfig) -> ModelParams {
    let section = match args.provider {
        Provider::Openai => config.openai.as_ref(),
        Provider::Anthropic => config.anthropic.as_ref(),
        Provider::Scripted => None,
    };
    let model = args
        .model
        .clone()
        .or_else(|| section.and_then(|s| s.model.clone()))
        .unwrap_or_default();
    let mut params = ModelParams::new(model);
    if let Some(temperature) = args.temperature {
        params = params.with_temperature(temperature);
    }
    if let Some(max_tokens) = args.max_tokens {
        params = params.with_max_tokens(max_tokens);
    }
    params
}

/// Splits a script file into replies on lines holding only `---`.
fn split_replies(text: &str) -> Vec<String> {
    let mut replies = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim() == "---" {
            replies.push(std::mem::take(&mut current));
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.trim().is_empty() {
        replies.push(current);
    }
    replies
}
