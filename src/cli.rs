//! CLI: type expression → schema, and schema + JSON → atomized data
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde_json::Value;

use json_typespec::{atomize, convert, parse, Descriptions, SchemaNode};

use crate::jq_exec::JqFilter;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert type expressions into JSON Schema documents and re-key JSON data against them
#[derive(Parser, Debug)]
#[command(name = "json-typespec", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert a type expression into a JSON Schema document
    Schema(SchemaOut),
    /// re-key JSON documents using a previously produced schema
    Atomize(AtomizeOut),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct TypeSource {
    /// type expression given inline, e.g. '{name!: string, age?: integer}'
    #[arg(long)]
    expr: Option<String>,

    /// file containing the type expression
    #[arg(long, short)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    source: TypeSource,

    /// JSON object mapping field names to descriptions
    #[arg(long)]
    descriptions: Option<PathBuf>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// single-line output
    #[arg(long)]
    compact: bool,
}

#[derive(clap::Parser, Debug)]
struct AtomizeOut {
    /// schema document, as written by the `schema` command
    #[arg(long)]
    schema: PathBuf,

    #[command(flatten)]
    input_settings: InputSettings,

    #[arg(long, value_enum, default_value_t = OutputFormat::Term)]
    format: OutputFormat,

    /// output file, one document per line (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// symbols rendered as `:name`, string keys quoted
    Term,
    /// plain JSON, symbols back to strings
    Json,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeSource {
    fn load(&self) -> Result<String> {
        match (&self.expr, &self.input) {
            (Some(expr), _) => Ok(expr.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read type expression file {}", path.display())),
            (None, None) => bail!("either --expr or --input is required"),
        }
    }
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Value>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let jq_filter = self
            .jq_expr
            .as_deref()
            .map(JqFilter::compile)
            .transpose()
            .context("failed to compile jq expression")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let label = source_path.display().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {label}"))?;

            let values = if self.ndjson {
                source
                    .lines()
                    .enumerate()
                    .filter(|(_, line)| !line.trim().is_empty())
                    .map(|(ix, line)| {
                        serde_json::from_str::<Value>(line)
                            .with_context(|| format!("failed to parse JSON at {label}:{}", ix + 1))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                vec![serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file {label}"))?]
            };

            for value in values {
                let value = match self.json_pointer.as_deref() {
                    None => value,
                    Some(pointer) => match value.pointer(pointer) {
                        Some(selected) => selected.clone(),
                        None => {
                            tracing::warn!(%pointer, source = %label, "JSON pointer matched nothing; skipping");
                            continue;
                        }
                    },
                };
                match &jq_filter {
                    None => documents.push(value),
                    Some(filter) => {
                        let outputs = filter.run(&value).with_context(|| {
                            format!("failed to apply jq expression to source file {label}")
                        })?;
                        documents.extend(outputs);
                    }
                }
            }
        }
        Ok(documents)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                // descriptions are validated before the type expression is touched
                let descriptions = match target.descriptions.as_ref() {
                    Some(path) => {
                        let src = std::fs::read_to_string(path).with_context(|| {
                            format!("failed to read descriptions file {}", path.display())
                        })?;
                        Descriptions::from_json_str(&src)?
                    }
                    None => Descriptions::new(),
                };
                let expr = parse(&target.source.load()?)?;
                let schema = convert(&expr, &descriptions)?;
                tracing::info!(descriptions = descriptions.len(), "schema converted");

                let schema_src = if target.compact {
                    serde_json::to_string(&schema)?
                } else {
                    serde_json::to_string_pretty(&schema)?
                };
                write_output(target.out.as_deref(), &schema_src)
            }
            Command::Atomize(target) => {
                let schema_src = std::fs::read_to_string(&target.schema).with_context(|| {
                    format!("failed to read schema file {}", target.schema.display())
                })?;
                let schema_value = serde_json::from_str::<Value>(&schema_src)
                    .with_context(|| format!("schema file {} is not JSON", target.schema.display()))?;
                let schema = SchemaNode::from_json(&schema_value)?;
                if schema.properties().is_none() {
                    tracing::warn!("schema root is not an object; documents pass through unchanged");
                }

                let documents = target.input_settings.load_documents()?;
                tracing::info!(documents = documents.len(), "atomizing");

                // one shared schema, read concurrently; output keeps input order
                let format = target.format;
                let rendered = documents
                    .par_iter()
                    .map(|document| {
                        let atomized = atomize(&schema, document);
                        match format {
                            OutputFormat::Term => Ok(atomized.to_string()),
                            OutputFormat::Json => serde_json::to_string(&atomized),
                        }
                    })
                    .collect::<Result<Vec<String>, serde_json::Error>>()?;

                write_output(target.out.as_deref(), &rendered.join("\n"))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
