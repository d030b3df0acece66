use anyhow::{bail, Context, Result};
use calltrail_analyzer::{
    read_graph, write_analysis, AnalyzerConfig, HandlerContext, OutputFormat, ProjectAnalyzer,
    ScanReport,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "calltrail")]
#[command(about = "Method-level call graphs for Java projects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for results)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project and write the call graph, snippets and endpoints
    Analyze(AnalyzeArgs),

    /// List the methods a signature calls, directly or transitively
    Callees(CalleesArgs),

    /// List the methods that call a signature
    Callers(CallersArgs),

    /// Print a method's source and the source of the methods it calls
    Context(ContextArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Project root to scan for .java files
    root: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Library source directory or .jar used for symbol resolution (repeatable)
    #[arg(long = "lib", value_name = "PATH")]
    libs: Vec<PathBuf>,

    /// Call graph format (json|yaml)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Skip writing code.json
    #[arg(long)]
    no_snippets: bool,

    /// Skip writing api_endpoints.json
    #[arg(long)]
    no_endpoints: bool,

    /// Config file (defaults to calltrail.toml in the project root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the scan report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CalleesArgs {
    /// Call graph written by `analyze` (.json or .yaml)
    graph: PathBuf,

    /// Caller signature, e.g. `com.acme.Foo.run(java.lang.String)`
    signature: String,

    /// Follow calls up to this many hops
    #[arg(long, default_value_t = 1)]
    depth: usize,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CallersArgs {
    /// Call graph written by `analyze` (.json or .yaml)
    graph: PathBuf,

    /// Callee signature
    signature: String,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ContextArgs {
    /// Output directory written by `analyze`
    out_dir: PathBuf,

    /// Method signature, e.g. an endpoint's `methodMetadata`
    signature: String,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Callees(args) => run_callees(args),
        Commands::Callers(args) => run_callers(args),
        Commands::Context(args) => run_context(args),
    }
}

/// File config first, flags on top
fn load_config(args: &AnalyzeArgs, root: &Path) -> Result<AnalyzerConfig> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalyzerConfig::discover(root).context("Failed to load project config")?,
    };

    config.library_paths.extend(args.libs.iter().cloned());
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if args.no_snippets {
        config.output.snippets = false;
    }
    if args.no_endpoints {
        config.output.endpoints = false;
    }

    Ok(config)
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("Invalid project root {}", args.root.display()))?;
    let config = load_config(&args, &root)?;

    let analyzer = ProjectAnalyzer::new(&root, config.clone())?;
    let analysis = analyzer
        .analyze()
        .with_context(|| format!("Analysis of {} failed", root.display()))?;

    let written = write_analysis(&analysis, &args.output, &config.output)
        .with_context(|| format!("Failed to write results to {}", args.output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis.report)?);
    } else {
        print_summary(&analysis.report, &written);
    }
    Ok(())
}

fn print_summary(report: &ScanReport, written: &[PathBuf]) {
    eprintln!(
        "Analyzed {} of {} files: {} methods, {} calls, {} unresolved",
        report.units_analyzed,
        report.files_scanned,
        report.methods,
        report.calls,
        report.unresolved_calls
    );
    if report.failed_files() > 0 {
        eprintln!("Skipped {} files (run with --verbose for details)", report.failed_files());
    }
    for path in written {
        eprintln!("Wrote {}", path.display());
    }
}

fn run_callees(args: CalleesArgs) -> Result<()> {
    if args.depth == 0 {
        bail!("--depth must be at least 1");
    }
    let graph = read_graph(&args.graph)
        .with_context(|| format!("Failed to read call graph {}", args.graph.display()))?;

    if args.depth == 1 {
        let callees = graph
            .callees(&args.signature)
            .with_context(|| format!("Unknown caller {}", args.signature))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(callees)?);
        } else {
            for callee in callees {
                println!("{callee}");
            }
        }
        return Ok(());
    }

    let reached = graph.transitive_callees(&args.signature, args.depth)?;
    if args.json {
        let rows: Vec<serde_json::Value> = reached
            .iter()
            .map(|(signature, depth)| serde_json::json!({ "signature": signature, "depth": depth }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for (signature, depth) in reached {
            println!("{depth}\t{signature}");
        }
    }
    Ok(())
}

fn run_callers(args: CallersArgs) -> Result<()> {
    let graph = read_graph(&args.graph)
        .with_context(|| format!("Failed to read call graph {}", args.graph.display()))?;

    let callers = graph.callers(&args.signature);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&callers)?);
    } else {
        for caller in callers {
            println!("{caller}");
        }
    }
    Ok(())
}

fn run_context(args: ContextArgs) -> Result<()> {
    let context = HandlerContext::load(&args.out_dir, &args.signature).with_context(|| {
        format!("Failed to load {} from {}", args.signature, args.out_dir.display())
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        println!("{}", context.code);
        println!();
        println!("{}", serde_json::to_string_pretty(&context.dependencies)?);
    }
    Ok(())
}
