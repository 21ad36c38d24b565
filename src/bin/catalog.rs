//! Project catalog command line interface
//!
//! Loads the catalog from the configured content source and prints what
//! the cache holds.
//!
//! # Usage
//!
//! ```bash
//! # List every project
//! catalog projects
//!
//! # One project with its documentation entries
//! catalog project spring-boot
//!
//! # Generations with computed support end dates
//! catalog generations spring-boot
//!
//! # Latest patch of a generation
//! catalog patch spring-boot 3.2.x
//!
//! # Replay a push notification against a freshly loaded catalog
//! catalog apply project/spring-boot/index.md project/spring-boot/documentation.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_catalog::{
    CatalogConfig, ContentSource, GitHubContentSource, LocalContentSource, ProjectCache,
    SourceConfig,
};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(version)]
#[command(about = "Inspect the project catalog built from the content repository")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// List all projects
    Projects,

    /// Show one project and its documentation
    Project {
        /// Project slug, e.g. spring-boot
        slug: String,
    },

    /// Show a project's generations and their support windows
    Generations { slug: String },

    /// Resolve the latest GA patch of a generation
    Patch {
        slug: String,
        /// Generation name, e.g. 3.2.x
        generation: String,
    },

    /// Apply changed repository paths and print what changed
    Apply {
        /// Repository-relative paths, e.g. project/spring-boot/index.md
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "project_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = CatalogConfig::from_env()?;
    let source: Arc<dyn ContentSource> = match &config.source {
        SourceConfig::Github(github) => Arc::new(GitHubContentSource::new(
            github.clone(),
            config.cache.content_root.clone(),
        )?),
        SourceConfig::Local(local) => Arc::new(LocalContentSource::new(local.root.clone())),
    };

    let cache = ProjectCache::with_config(source, config.cache.clone());
    let report = cache.reload().await.context("Failed to load catalog")?;
    if !report.omitted.is_empty() {
        tracing::warn!(omitted = ?report.omitted, "Some projects could not be loaded");
    }

    match cli.command {
        Commands::Projects => cmd_projects(&cache, cli.format),
        Commands::Project { slug } => cmd_project(&cache, &slug, cli.format),
        Commands::Generations { slug } => cmd_generations(&cache, &slug, cli.format),
        Commands::Patch { slug, generation } => cmd_patch(&cache, &slug, &generation, cli.format),
        Commands::Apply { paths } => cmd_apply(&cache, paths, cli.format).await,
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization failed")?
    );
    Ok(())
}

fn cmd_projects(cache: &ProjectCache, format: OutputFormat) -> Result<()> {
    let projects = cache.get_projects();
    match format {
        OutputFormat::Json => print_json(&projects)?,
        OutputFormat::Pretty => {
            println!("{} {} project(s)", "OK".green().bold(), projects.len());
            for project in &projects {
                println!(
                    "  {:<32} {:<12} {}",
                    project.slug.cyan(),
                    project.status.as_str(),
                    project.title
                );
            }
        }
    }
    Ok(())
}

fn cmd_project(cache: &ProjectCache, slug: &str, format: OutputFormat) -> Result<()> {
    let project = cache.get_project(slug)?;
    let documentation = cache.get_project_documentations(slug)?;
    let policy = cache.get_project_support_policy(slug)?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "project": project,
            "supportPolicy": policy,
            "documentation": documentation,
        }))?,
        OutputFormat::Pretty => {
            println!("{} ({})", project.title.bold(), project.slug.cyan());
            println!("  status:         {}", project.status);
            println!("  support policy: {}", policy);
            if let Some(url) = &project.repository_url {
                println!("  repository:     {}", url);
            }
            println!("  documentation:");
            for doc in &documentation {
                let marker = if doc.current {
                    "*".green().bold().to_string()
                } else {
                    " ".to_string()
                };
                println!("   {} {:<24} {:?}", marker, doc.version, doc.status);
            }
        }
    }
    Ok(())
}

fn cmd_generations(cache: &ProjectCache, slug: &str, format: OutputFormat) -> Result<()> {
    let generations = cache.get_project_generations(slug)?;
    let rows = generations
        .generations
        .iter()
        .map(|generation| -> Result<_> {
            let support = cache.get_generation_support(slug, &generation.name)?;
            Ok((generation, support))
        })
        .collect::<Result<Vec<_>>>()?;

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = rows
                .iter()
                .map(|(generation, support)| {
                    serde_json::json!({
                        "generation": generation,
                        "support": support,
                    })
                })
                .collect();
            print_json(&output)?;
        }
        OutputFormat::Pretty => {
            println!("{} {} generation(s)", "OK".green().bold(), rows.len());
            for (generation, support) in &rows {
                println!(
                    "  {:<12} released {}  oss until {}  enterprise until {}",
                    generation.name.cyan(),
                    generation.initial_release,
                    support.oss_end,
                    support.enterprise_end
                );
            }
        }
    }
    Ok(())
}

fn cmd_patch(
    cache: &ProjectCache,
    slug: &str,
    generation: &str,
    format: OutputFormat,
) -> Result<()> {
    let patch = cache.get_latest_patch(slug, generation, None)?;
    match format {
        OutputFormat::Json => print_json(&patch)?,
        OutputFormat::Pretty => match patch.and_then(|p| p.oss) {
            Some(version) => println!("{} {} {}", "OK".green().bold(), generation, version),
            None => println!("{} no GA release in {}", "--".yellow(), generation),
        },
    }
    Ok(())
}

async fn cmd_apply(cache: &ProjectCache, paths: Vec<String>, format: OutputFormat) -> Result<()> {
    let report = cache.apply_changes(paths).await;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Pretty => {
            let headline = if report.changed() {
                "UPDATED".green().bold()
            } else {
                "UNCHANGED".yellow().bold()
            };
            println!("{} {} project(s) in catalog", headline, cache.get_projects().len());
            for slug in &report.updated {
                println!("  {} {}", "~".green(), slug);
            }
            for slug in &report.removed {
                println!("  {} {}", "-".red(), slug);
            }
            for (slug, reason) in &report.failed {
                println!("  {} {}: {}", "!".red().bold(), slug, reason);
            }
            for path in &report.ignored {
                println!("  {} {}", "?".dimmed(), path);
            }
        }
    }
    Ok(())
}
