use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mig_core::{BuildValidator, MigrationConfig, Orchestrator, OutputLayout};
use mig_index::IndexBackend;
use mig_model::{Architecture, ServiceType};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("proc-migrate")
        .version(mig_core::VERSION)
        .about("Migrate legacy integration processes to Spring-style projects")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Run a full migration")
                .args(source_args())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .required_unless_present("config")
                        .help("Output root"),
                )
                .arg(
                    Arg::new("package")
                        .long("package")
                        .help("Root Java package of generated code"),
                )
                .arg(
                    Arg::new("architecture")
                        .long("architecture")
                        .value_parser(["layered", "hexagonal"])
                        .help("Target architecture"),
                )
                .arg(
                    Arg::new("service-type")
                        .long("service-type")
                        .value_parser(["rest", "soap", "combined"])
                        .help("Service type for hexagonal output"),
                )
                .arg(
                    Arg::new("sequential")
                        .long("sequential")
                        .action(ArgAction::SetTrue)
                        .help("Process units one at a time"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .short('j')
                        .value_parser(value_parser!(usize))
                        .help("Maximum concurrent units"),
                )
                .arg(
                    Arg::new("per-unit")
                        .long("per-unit")
                        .action(ArgAction::SetTrue)
                        .help("Give each unit its own subtree of the output root"),
                )
                .arg(
                    Arg::new("index")
                        .long("index")
                        .value_parser(["embedding", "none"])
                        .help("Similarity index backend"),
                )
                .arg(
                    Arg::new("gateway")
                        .long("gateway")
                        .action(ArgAction::SetTrue)
                        .help("Emit an API gateway routing every generated service"),
                )
                .arg(
                    Arg::new("no-validate")
                        .long("no-validate")
                        .action(ArgAction::SetTrue)
                        .help("Skip build validation"),
                )
                .args(build_args()),
        )
        .subcommand(
            Command::new("discover")
                .about("List the units an input root contains")
                .args(source_args()),
        )
        .subcommand(
            Command::new("validate")
                .about("Build every project under a directory and print the results as JSON")
                .arg(
                    Arg::new("root")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory holding generated projects"),
                )
                .arg(
                    Arg::new("depth")
                        .long("depth")
                        .default_value("2")
                        .value_parser(value_parser!(usize))
                        .help("How deep below the root to look for projects"),
                )
                .args(build_args()),
        )
}

fn source_args() -> [Arg; 2] {
    [
        Arg::new("input")
            .long("input")
            .short('i')
            .value_parser(value_parser!(PathBuf))
            .required_unless_present("config")
            .help("Directory whose subdirectories are legacy units"),
        Arg::new("config")
            .long("config")
            .short('c')
            .value_parser(value_parser!(PathBuf))
            .help("TOML configuration file; flags override its values"),
    ]
}

fn build_args() -> [Arg; 2] {
    [
        Arg::new("build-tool")
            .long("build-tool")
            .help("Build tool executable [default: mvn]"),
        Arg::new("build-timeout")
            .long("build-timeout")
            .value_parser(value_parser!(u64))
            .help("Per-project build timeout in seconds [default: 300]"),
    ]
}

fn init_tracing(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Merge the optional config file with command-line overrides
fn load_config(args: &ArgMatches) -> Result<MigrationConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => MigrationConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MigrationConfig::default(),
    };

    if let Some(input) = args.get_one::<PathBuf>("input") {
        config.input_root.clone_from(input);
    }
    if let Ok(Some(output)) = args.try_get_one::<PathBuf>("output") {
        config.output_root.clone_from(output);
    }
    if let Ok(Some(package)) = args.try_get_one::<String>("package") {
        config = config.with_package(package.as_str());
    }
    if let Ok(Some(architecture)) = args.try_get_one::<String>("architecture") {
        config = config.with_architecture(architecture.parse::<Architecture>()?);
    }
    if let Ok(Some(service_type)) = args.try_get_one::<String>("service-type") {
        config = config.with_service_type(service_type.parse::<ServiceType>()?);
    }
    if flag(args, "sequential") {
        config = config.with_parallel(false);
    }
    if let Ok(Some(workers)) = args.try_get_one::<usize>("workers") {
        config = config.with_max_workers(*workers);
    }
    if flag(args, "per-unit") {
        config = config.with_output_layout(OutputLayout::PerUnit);
    }
    if let Ok(Some(index)) = args.try_get_one::<String>("index") {
        let backend = index.parse::<IndexBackend>().map_err(anyhow::Error::msg)?;
        config = config.with_index_backend(backend);
    }
    if flag(args, "gateway") {
        config = config.with_gateway(true);
    }
    if flag(args, "no-validate") {
        config = config.with_validation(false);
    }
    if let Ok(Some(tool)) = args.try_get_one::<String>("build-tool") {
        config = config.with_build_tool(tool.as_str());
    }
    if let Ok(Some(secs)) = args.try_get_one::<u64>("build-timeout") {
        config = config.with_build_timeout_secs(*secs);
    }

    config.validate()?;
    Ok(config)
}

fn flag(args: &ArgMatches, id: &str) -> bool {
    matches!(args.try_get_one::<bool>(id), Ok(Some(true)))
}

async fn migrate(args: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(args)?;
    let report_path = config.report_path();
    let report = Orchestrator::new(config)?.execute().await?;

    println!(
        "{} units ({} failed), {} files, {} archives",
        report.processed_units.len(),
        report.failures.len(),
        report.generated_files.len(),
        report.archives.len()
    );
    for (unit, reason) in &report.failures {
        println!("  failed {}: {reason}", unit.display());
    }
    for (project, result) in &report.validation {
        let status = match (result.skipped, result.tool_found, result.compiled) {
            (true, ..) => "skipped",
            (_, false, _) => "tool unavailable",
            (_, _, true) => "compiled",
            _ => "failed",
        };
        println!("  {}: {status}", project.display());
    }
    println!("report: {}", report_path.display());
    Ok(ExitCode::SUCCESS)
}

fn discover(args: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(args)?;
    let units = Orchestrator::new(config)?.discover()?;
    for unit in &units {
        println!("{}\t{} artifacts", unit.path().display(), unit.artifacts().len());
    }
    tracing::info!(units = units.len(), "discovery finished");
    Ok(ExitCode::SUCCESS)
}

async fn validate(args: &ArgMatches) -> Result<ExitCode> {
    let Some(root) = args.get_one::<PathBuf>("root") else {
        bail!("missing project root");
    };
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let defaults = MigrationConfig::default();
    let tool = args
        .get_one::<String>("build-tool")
        .cloned()
        .unwrap_or(defaults.build_tool);
    let timeout = args
        .get_one::<u64>("build-timeout")
        .copied()
        .unwrap_or(defaults.build_timeout_secs);
    let depth = args.get_one::<usize>("depth").copied().unwrap_or(2);

    let validator = BuildValidator::maven(tool, Duration::from_secs(timeout)).with_search_depth(depth);
    let results = validator.validate_all(root).await;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"), matches.get_flag("json-logs"));

    let outcome = match matches.subcommand() {
        Some(("migrate", args)) => migrate(args).await,
        Some(("discover", args)) => discover(args),
        Some(("validate", args)) => validate(args).await,
        _ => Ok(ExitCode::from(2)),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "migration aborted");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
