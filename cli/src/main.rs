use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use vk_dispatch_core::{DependencyExpr, ExtensionSelection, Selection, VersionCeiling};
use vk_dispatch_registry::{
    GeneratorConfig, OutputFormat, ResolutionReport, Resolver, Specification, format_features,
    format_report, list_features,
};

#[derive(Debug, Parser)]
#[command(name = "dispatch-table-generator")]
#[command(about = "Resolve Vulkan dispatch table command sets from the XML registry")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short = 'V', long, global = true)]
    verbose: bool,
    /// Do not print resolution warnings.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the command set for a selection and print a report.
    Resolve(ResolveArgs),
    /// List core versions and extensions with their selection state.
    Features(FeaturesArgs),
    /// Compile a dependency expression to a preprocessor guard.
    Guard(GuardArgs),
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Path to vk.xml (searched for when omitted).
    #[arg(long)]
    specification_path: Option<PathBuf>,
    /// API to generate for (default: vulkan).
    #[arg(long)]
    api: Option<String>,
    /// Highest core version to enable, or "latest" (default: latest).
    #[arg(long)]
    api_version: Option<String>,
    /// Comma-separated extensions to enable, or "all" (default: all).
    #[arg(long)]
    extensions: Option<String>,
    /// Disable deprecated extensions.
    #[arg(long)]
    no_enable_deprecated: bool,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Write output to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output format (default: json).
    #[arg(long)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    #[command(flatten)]
    output: OutputArgs,
    /// Fixed generation timestamp for reproducible reports.
    #[arg(long)]
    generated_at: Option<String>,
}

#[derive(Debug, Args)]
struct FeaturesArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct GuardArgs {
    /// Dependency expression, e.g. "(VK_KHR_a,VK_VERSION_1_1)+VK_KHR_b".
    expression: String,
    /// Comma-separated active names to evaluate the expression against.
    #[arg(long)]
    check: Option<String>,
}

/// Settings after applying flags over the configuration file.
struct Settings {
    selection: Selection,
    config: GeneratorConfig,
    specification_path: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(args, cli.quiet),
        Command::Features(args) => run_features(args),
        Command::Guard(args) => run_guard(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();

    debug!("Logging initialized (verbose={verbose})");
}

fn run_resolve(args: ResolveArgs, quiet: bool) -> Result<(), String> {
    check_output_path(args.output.output.as_deref())?;
    let settings = load_settings(&args.selection)?;
    let format = output_format(&args.output, &settings.config);
    let mut specification = load_specification(&settings)?;

    let resolution = Resolver::new(settings.selection.clone())
        .resolve(&mut specification)
        .map_err(|err| err.to_string())?;

    if !quiet {
        for warning in resolution.warnings() {
            warn!("{warning}");
        }
    }

    let mut report = ResolutionReport::new(&specification, &settings.selection, &resolution);
    if let Some(generated_at) = args.generated_at {
        report = report.with_generated_at(generated_at);
    }
    let text = format_report(&report, format)?;
    emit(&text, args.output.output.as_deref())
}

fn run_features(args: FeaturesArgs) -> Result<(), String> {
    check_output_path(args.output.output.as_deref())?;
    let settings = load_settings(&args.selection)?;
    let format = output_format(&args.output, &settings.config);
    let mut specification = load_specification(&settings)?;

    Resolver::new(settings.selection).select(&mut specification);
    let text = format_features(&list_features(&specification), format)?;
    emit(&text, args.output.output.as_deref())
}

fn run_guard(args: GuardArgs) -> Result<(), String> {
    let expression = DependencyExpr::parse(&args.expression)
        .map_err(|err| format!("invalid dependency expression \"{}\": {err}", args.expression))?;

    let guard = expression.to_guard();
    if guard.is_empty() {
        println!("1");
    } else {
        println!("{guard}");
    }

    if let Some(check) = args.check {
        let active = parse_csv_list(&check);
        let satisfied = expression.is_satisfied_by(&active);
        println!("satisfied: {satisfied}");
    }
    Ok(())
}

fn load_settings(args: &SelectionArgs) -> Result<Settings, String> {
    let config = match args.config {
        Some(ref path) => GeneratorConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    let mut selection = config.selection.clone();
    if let Some(ref api) = args.api {
        selection.api = api.clone();
    }
    if let Some(ref version) = args.api_version {
        selection.api_version = version
            .parse::<VersionCeiling>()
            .map_err(|err| format!("invalid --api-version '{version}': {err}"))?;
    }
    if let Some(ref extensions) = args.extensions {
        selection.extensions = ExtensionSelection::parse_list(extensions);
    }
    if args.no_enable_deprecated {
        selection.allow_deprecated = false;
    }

    let specification_path = args
        .specification_path
        .clone()
        .or_else(|| config.specification_path.clone());

    debug!(
        api = %selection.api,
        api_version = %selection.api_version,
        extensions = %selection.extensions,
        allow_deprecated = selection.allow_deprecated,
        "selection"
    );

    Ok(Settings {
        selection,
        config,
        specification_path,
    })
}

fn load_specification(settings: &Settings) -> Result<Specification, String> {
    Specification::load_or_locate(
        settings.specification_path.as_deref(),
        &settings.selection.api,
        &settings.config.rules,
    )
    .map_err(|err| err.to_string())
}

fn output_format(args: &OutputArgs, config: &GeneratorConfig) -> OutputFormat {
    args.format.or(config.format).unwrap_or_default()
}

fn check_output_path(output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(path) if path.exists() && !path.is_file() => Err(format!(
            "the output path \"{}\" exists and is not a regular file",
            path.display()
        )),
        _ => Ok(()),
    }
}

fn emit(text: &str, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(path) => {
            let mut contents = text.to_string();
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            fs::write(path, contents)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))
        }
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

fn parse_csv_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
