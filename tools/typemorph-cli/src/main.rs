// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typemorph CLI
//!
//! Converts JSON or YAML documents into types declared in a schema file.
//!
//! # Usage
//!
//! ```bash
//! # Convert a document into the schema's root type
//! typemorph convert --schema types.toml --input server.json
//!
//! # Pick a type, strict typing, YAML output
//! typemorph convert --schema types.toml --type Endpoint --input ep.yaml --strict --format yaml
//!
//! # List declared types and their field names
//! typemorph inspect --schema types.toml
//!
//! # Write default mapper settings
//! typemorph gen-config --output typemorph.toml
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use typemorph::dynamic::{DynamicData, TypeDescriptor, TypeKind};
use typemorph::schema::Schema;
use typemorph::{json, Mapper, MapperSettings};

/// Runtime type conversion driven by schema files
#[derive(Parser, Debug)]
#[command(name = "typemorph")]
#[command(about = "Convert loosely typed documents into declared types")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a document into a schema type
    Convert {
        /// Schema file (.toml, .yaml)
        #[arg(short, long)]
        schema: PathBuf,

        /// Destination type (defaults to the schema root)
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,

        /// Input document (.json, .yaml, .yml)
        #[arg(short, long)]
        input: PathBuf,

        /// Mapper settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Require identical nominal types
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List declared types and their field descriptors
    Inspect {
        /// Schema file (.toml, .yaml)
        #[arg(short, long)]
        schema: PathBuf,

        /// Mapper settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a default settings file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "typemorph.toml")]
        output: PathBuf,
    },

    /// Validate a settings file
    ValidateConfig {
        /// Settings file path
        #[arg(value_name = "FILE")]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Convert {
            schema,
            type_name,
            input,
            config,
            strict,
            format,
            output,
        } => {
            let rendered = cmd_convert(
                &schema,
                type_name.as_deref(),
                &input,
                config.as_deref(),
                strict,
                format,
            )?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!("wrote {}", path.display());
                }
                None => println!("{}", rendered.trim_end()),
            }
            Ok(())
        }
        Commands::Inspect { schema, config } => {
            print!("{}", cmd_inspect(&schema, config.as_deref())?);
            Ok(())
        }
        Commands::GenConfig { output } => cmd_gen_config(&output),
        Commands::ValidateConfig { config } => cmd_validate_config(&config),
    }
}

fn load_settings(path: Option<&Path>) -> Result<MapperSettings> {
    match path {
        Some(path) => MapperSettings::from_file(path)
            .with_context(|| format!("loading settings {}", path.display())),
        None => Ok(MapperSettings::default()),
    }
}

fn build_mapper(settings: MapperSettings) -> Mapper {
    Mapper::prototype()
        .to_builder()
        .config(settings.into_config())
        .build()
}

fn load_schema(path: &Path) -> Result<Schema> {
    Schema::from_file(path).with_context(|| format!("loading schema {}", path.display()))
}

fn load_document(path: &Path) -> Result<serde_json::Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("parsing YAML {}", path.display()))?,
        Some("json") | None => serde_json::from_str(&content)
            .with_context(|| format!("parsing JSON {}", path.display()))?,
        Some(other) => bail!("unsupported input format: .{}", other),
    };
    Ok(value)
}

fn select_type(schema: &Schema, name: Option<&str>) -> Result<Arc<TypeDescriptor>> {
    match name {
        Some(name) => match schema.get(name) {
            Some(desc) => Ok(Arc::clone(desc)),
            None => bail!(
                "type '{}' is not declared (known: {})",
                name,
                schema.names().collect::<Vec<_>>().join(", ")
            ),
        },
        None => match schema.root() {
            Some(desc) => Ok(Arc::clone(desc)),
            None => bail!("schema has no root type; pass --type"),
        },
    }
}

fn cmd_convert(
    schema_path: &Path,
    type_name: Option<&str>,
    input: &Path,
    config: Option<&Path>,
    strict: bool,
    format: OutputFormat,
) -> Result<String> {
    let schema = load_schema(schema_path)?;
    let target = select_type(&schema, type_name)?;
    let mut settings = load_settings(config)?;
    settings.strict_types |= strict;
    let mapper = build_mapper(settings);

    let document = load_document(input)?;
    let mut value = DynamicData::new(&target);
    mapper
        .convert(&json::from_json(&document), &mut value)
        .with_context(|| format!("converting {} into {}", input.display(), target))?;
    tracing::debug!("converted {} into {}", input.display(), target);

    let rendered = json::to_json(&value).context("rendering result")?;
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&rendered)?,
        OutputFormat::Yaml => serde_yaml::to_string(&rendered)?,
    })
}

/// Structural form of a declared type, ignoring its own name.
fn form(desc: &TypeDescriptor) -> String {
    match desc.kind() {
        TypeKind::Struct(members) => format!("record ({} fields)", members.len()),
        kind => TypeDescriptor::new("", kind.clone()).to_string(),
    }
}

fn cmd_inspect(schema_path: &Path, config: Option<&Path>) -> Result<String> {
    let schema = load_schema(schema_path)?;
    let mapper = build_mapper(load_settings(config)?);
    let root = schema.root().map(|r| r.name().to_string());

    let mut out = String::new();
    for name in schema.names() {
        let Some(desc) = schema.get(name) else {
            continue;
        };
        let marker = if root.as_deref() == Some(name) { " (root)" } else { "" };
        out.push_str(&format!("{}{}: {}\n", name, marker, form(desc)));
        let members = desc.members().unwrap_or_default();
        for field in mapper.field_descriptors(desc).iter() {
            let Some(member) = members.get(field.index) else {
                continue;
            };
            let external = if field.skip {
                "skipped".to_string()
            } else {
                format!("-> {}", field.path.join(" / "))
            };
            out.push_str(&format!(
                "  {:<20} {:<16} {}\n",
                member.name,
                member.type_desc.to_string(),
                external
            ));
        }
    }

    let mut provided: Vec<String> = mapper.registry().types().map(|t| t.to_string()).collect();
    provided.sort();
    out.push_str(&format!("providers: {}\n", provided.join(", ")));
    Ok(out)
}

fn cmd_gen_config(output: &Path) -> Result<()> {
    let settings = MapperSettings::default().to_toml_string()?;
    let content = format!(
        r#"# typemorph mapper settings
# Generated by typemorph gen-config

{}
"#,
        settings
    );
    std::fs::write(output, content).with_context(|| format!("writing {}", output.display()))?;
    println!("Generated settings file: {}", output.display());
    Ok(())
}

fn cmd_validate_config(path: &Path) -> Result<()> {
    let settings = load_settings(Some(path))?;
    println!("Settings valid!");
    println!();
    println!("strict_types:   {}", settings.strict_types);
    println!("tag_key:        {:?}", settings.tag_key);
    println!("path_separator: {:?}", settings.path_separator);
    println!("name_case:      {:?}", settings.name_case);
    println!("byte_order:     {:?}", settings.byte_order);
    Ok(())
}
