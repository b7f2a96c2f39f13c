use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use extlint::{Engine, Kind, Manifest, Severity, DEFAULT_MANIFEST_PATH};

mod deprecations;
mod links;
mod scan;
mod validate;

#[derive(Parser)]
#[command(
    name = "extlint",
    version,
    about = "Validator for agent extensions: skills, agents, commands, plugins, and hooks"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Version manifest with schemas and deprecation rules
    #[arg(
        long,
        global = true,
        env = "EXTLINT_MANIFEST",
        default_value = DEFAULT_MANIFEST_PATH
    )]
    manifest: PathBuf,

    /// Show project information
    #[arg(long)]
    about: bool,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON document on stdout
    Json,
}

/// Extension kind, overriding inference from the path.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Skill,
    Agent,
    Command,
    Plugin,
    Hooks,
}

impl From<KindArg> for Kind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Skill => Kind::Skill,
            KindArg::Agent => Kind::Agent,
            KindArg::Command => Kind::Command,
            KindArg::Plugin => Kind::Plugin,
            KindArg::Hooks => Kind::Hooks,
        }
    }
}

/// Severity filter for deprecation output.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeverityArg {
    Error,
    Warning,
}

impl From<SeverityArg> for Severity {
    fn from(s: SeverityArg) -> Self {
        match s {
            SeverityArg::Error => Severity::Error,
            SeverityArg::Warning => Severity::Warning,
        }
    }
}

#[derive(Subcommand)]
#[command(next_display_order = None)]
enum Commands {
    /// Check header fields and JSON structure against the schemas
    Validate {
        /// Extension files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Treat every path as this kind instead of inferring it
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Check internal links and reference mentions
    Links {
        /// Markdown files, skill directories, or plugin directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// List every link, not only broken ones
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Detect deprecated patterns listed in the manifest
    Deprecations {
        /// Files, skill directories, or plugin directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Only show matches of this severity
        #[arg(long, value_enum)]
        severity: Option<SeverityArg>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Run every check and report a single verdict
    Scan {
        /// Extension files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Treat every path as this kind instead of inferring it
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

pub fn run(cli: Cli) {
    if cli.about {
        print_about();
        return;
    }

    let Some(command) = cli.command else {
        eprintln!("Usage: extlint <command> [args]");
        eprintln!("Run `extlint --help` for details.");
        std::process::exit(2);
    };

    let engine = Engine::new(&Manifest::load_or_default(&cli.manifest));

    match command {
        Commands::Validate {
            paths,
            kind,
            format,
        } => validate::run(&engine, &paths, kind, format),
        Commands::Links {
            paths,
            verbose,
            format,
        } => links::run(&paths, verbose, format),
        Commands::Deprecations {
            paths,
            severity,
            format,
        } => deprecations::run(&engine, &paths, severity, format),
        Commands::Scan {
            paths,
            kind,
            format,
        } => scan::run(&engine, &paths, kind, format),
    }
}

fn print_about() {
    println!(
        "extlint: agent extension validator\n\
         ├─ version:    {}\n\
         ├─ author:     {}\n\
         ├─ source:     {}\n\
         └─ licence:    {} https://www.apache.org/licenses/LICENSE-2.0",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_LICENSE"),
    );
}

/// Exit with a usage error unless every path exists.
fn require_existing(paths: &[PathBuf]) {
    let missing: Vec<&PathBuf> = paths.iter().filter(|p| !p.exists()).collect();
    if missing.is_empty() {
        return;
    }
    for path in missing {
        eprintln!("error: path not found: {}", path.display());
    }
    std::process::exit(2);
}

/// Pair each path with its kind, from `--kind` or by naming convention.
/// Exits with a usage error when a path exists but its kind cannot be
/// inferred.
fn resolve_inputs(paths: &[PathBuf], kind: Option<KindArg>) -> Vec<(PathBuf, Kind)> {
    require_existing(paths);
    let mut inputs = Vec::with_capacity(paths.len());
    let mut unknown = Vec::new();
    for path in paths {
        match kind.map(Kind::from).or_else(|| Kind::infer(path)) {
            Some(k) => inputs.push((path.clone(), k)),
            None => unknown.push(path),
        }
    }
    if !unknown.is_empty() {
        for path in unknown {
            eprintln!(
                "error: cannot infer extension kind for {}; pass --kind",
                path.display()
            );
        }
        std::process::exit(2);
    }
    inputs
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: cannot serialize results: {e}");
            std::process::exit(1);
        }
    }
}
