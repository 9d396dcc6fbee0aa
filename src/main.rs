use anyhow::{Context, Result};
use clap::Parser;
use pkgmap::analyzer::Analyzer;
use pkgmap::application::{AnalyzeAction, CheckAction, CheckOutcome, PassConfig, ResolveAction};
use pkgmap::package::ScanOptions;
use pkgmap::resolve::{Conflicts, render_map};
use pkgmap::runtime::RealRuntime;
use std::path::PathBuf;
use std::process::ExitCode;

/// pkgmap - package source-path reconciler
///
/// Walks a multi-package source tree, reconciles competing claims about
/// where each package's source code lives, and points a static analyzer
/// at the result.
///
/// Exit codes: 0 on success, 2 when conflicting package paths are found.
///
/// Examples:
///   pkgmap check .                      # report conflicting package paths
///   pkgmap resolve . -o packages.json   # emit the resolved map
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGMAP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Managed tree root used to classify conflicts (defaults to the scan root)
    #[arg(
        long = "home-root",
        env = "PKGMAP_HOME_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub home_root: Option<PathBuf>,

    /// Package name whose local override assertions are exempted
    #[arg(
        long = "self-package",
        env = "PKGMAP_SELF_PACKAGE",
        value_name = "NAME",
        global = true
    )]
    pub self_package: Option<String>,

    /// Directory name to skip while scanning (glob, repeatable)
    #[arg(long = "exclude", value_name = "GLOB", global = true)]
    pub excludes: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Resolve every package to a single source path and emit the map
    Resolve(ResolveArgs),

    /// Report whether any package has conflicting source paths
    Check(CheckArgs),

    /// Resolve, then run a static analyzer with the resolved map
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Root directory of the source tree
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Write the map to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit paths relative to the output file's directory
    #[arg(long, requires = "output")]
    pub relative: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Root directory of the source tree
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Root directory of the source tree
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Static analyzer executable to invoke
    #[arg(long, value_name = "BIN")]
    pub analyzer: PathBuf,

    /// Extra argument passed through to the analyzer (repeatable)
    #[arg(long = "analyzer-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub analyzer_args: Vec<String>,

    /// Where to write the resolution map handed to the analyzer
    #[arg(long, value_name = "FILE", default_value = "packages.json")]
    pub map: PathBuf,

    /// Analysis targets passed to the analyzer
    #[arg(value_name = "TARGET")]
    pub targets: Vec<PathBuf>,
}

const CONFLICT_EXIT: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            if let Some(conflicts) = err.downcast_ref::<Conflicts>() {
                report_conflicts(conflicts)
            } else {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let runtime = RealRuntime;
    let excludes = cli
        .excludes
        .iter()
        .map(|raw| glob::Pattern::new(raw).with_context(|| format!("Invalid exclude glob '{}'", raw)))
        .collect::<Result<Vec<_>>>()?;

    let home_root = cli.home_root;
    let self_package = cli.self_package;
    let config = move |root: PathBuf| PassConfig {
        root,
        home_root,
        scan: ScanOptions {
            self_package,
            excludes,
        },
    };

    match cli.command {
        Commands::Resolve(args) => {
            let action = ResolveAction::new(&runtime, config(args.root));
            match &args.output {
                Some(output) => {
                    let resolution = action.resolve_to_file(output, args.relative)?;
                    eprintln!("resolved {} packages to {}", resolution.len(), output.display());
                }
                None => {
                    let resolution = action.resolve()?;
                    print!("{}", render_map(&resolution, None)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let action = CheckAction::new(&runtime, config(args.root));
            match action.check()? {
                CheckOutcome::Clean { package_count } => {
                    println!("ok: {} package(s) resolve to a single location", package_count);
                    Ok(ExitCode::SUCCESS)
                }
                CheckOutcome::Conflicting(conflicts) => Ok(report_conflicts(&conflicts)),
            }
        }
        Commands::Analyze(args) => {
            let analyzer = Analyzer::new(args.analyzer).with_args(args.analyzer_args);
            let action = AnalyzeAction::new(&runtime, config(args.root), analyzer, args.map);
            action.analyze(&args.targets)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report_conflicts(conflicts: &Conflicts) -> ExitCode {
    eprintln!("conflicting package source paths:");
    eprint!("{}", conflicts.report);
    if conflicts.affects_managed_tree {
        eprintln!("Conflicting definitions implicate the managed tree; re-sync its dependencies and re-run.");
    } else {
        eprintln!("All conflicting claims come from outside the managed tree; correct the named override files by hand.");
    }
    ExitCode::from(CONFLICT_EXIT)
}
