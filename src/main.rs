use anyhow::Result;
use clap::{Parser, Subcommand};
use perfcheck::config::{ColorChoice, OutputFormat, CONFIG_FILE_NAME};
use perfcheck::{Config, Engine, RuleCatalog, RuleRecord};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "perfcheck")]
#[command(about = "Performance-by-default detectors for typed Go syntax trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory or unit file to analyze (defaults to current directory)
    path: Option<PathBuf>,

    /// Output format (overrides perfcheck.toml)
    #[arg(short, long, global = true)]
    format: Option<Format>,

    /// Specific rules to run (comma-separated)
    #[arg(long, global = true, value_delimiter = ',')]
    rules: Vec<String>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log debug detail to stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze syntax-tree units (default)
    Check {
        /// Directory or unit file to analyze
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// List catalogued rules
    Rules {
        /// Only rules tagged for this language (e.g., "go")
        #[arg(long)]
        lang: Option<String>,
    },
    /// Explain a specific rule in detail
    Explain {
        /// Rule ID to explain (e.g., "perf_regex_compile_once")
        rule_id: String,
    },
    /// Initialize perfcheck.toml config
    Init {
        /// Directory to write the config into
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Format {
    Console,
    Json,
    Sarif,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Console => OutputFormat::Console,
            Format::Json => OutputFormat::Json,
            Format::Sarif => OutputFormat::Sarif,
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    match cli.command {
        Some(Commands::Check { path }) => run_check(&path, cli.format, &cli.rules),
        None => {
            let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
            run_check(&path, cli.format, &cli.rules)
        }
        Some(Commands::Rules { lang }) => run_list_rules(lang.as_deref()),
        Some(Commands::Explain { rule_id }) => run_explain(&rule_id),
        Some(Commands::Init { path }) => run_init(&path),
    }
}

/// `--debug` > `--verbose` > `RUST_LOG` > `warn`
fn init_tracing(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Configured bundle or the embedded one, failing fast on a broken catalog.
fn load_catalog(config: &Config) -> Result<CatalogSource> {
    let source = match config.custom_catalog()? {
        Some(catalog) => CatalogSource::Custom(catalog),
        None => CatalogSource::Embedded(RuleCatalog::embedded()?),
    };
    source.get().verify_codes()?;
    debug!(rules = source.get().len(), "rule catalog loaded");
    Ok(source)
}

enum CatalogSource {
    Embedded(&'static RuleCatalog),
    Custom(RuleCatalog),
}

impl CatalogSource {
    fn get(&self) -> &RuleCatalog {
        match self {
            CatalogSource::Embedded(catalog) => catalog,
            CatalogSource::Custom(catalog) => catalog,
        }
    }
}

fn apply_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
}

fn run_check(path: &Path, format: Option<Format>, rules: &[String]) -> Result<()> {
    let config = Config::load_or_default(path)?;
    apply_color(config.output.color);
    let catalog = load_catalog(&config)?;

    let mut engine = Engine::new(catalog.get());
    if !rules.is_empty() {
        engine = engine.restrict_to(rules)?;
    }
    let diagnostics = engine.analyze_path(path)?;

    // Findings are reported, never turned into a failing exit status.
    match format.map(OutputFormat::from).unwrap_or(config.output.format) {
        OutputFormat::Console => perfcheck::reporter::console::report(&diagnostics),
        OutputFormat::Json => perfcheck::reporter::json::report(&diagnostics)?,
        OutputFormat::Sarif => perfcheck::reporter::sarif::report(&diagnostics, catalog.get())?,
    }

    Ok(())
}

fn run_init(path: &Path) -> Result<()> {
    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }
    std::fs::write(&config_path, Config::default_toml())?;
    println!("Created {}", config_path.display());
    Ok(())
}

fn run_list_rules(lang: Option<&str>) -> Result<()> {
    let config = Config::load_or_default(Path::new("."))?;
    let catalog = load_catalog(&config)?;
    let catalog = catalog.get();

    let rules = match lang {
        Some(lang) => catalog.rules_for_language(lang),
        None => catalog.all_rules(),
    };

    println!("Available rules:\n");
    for rule in &rules {
        println!(
            "  {:<34} {:#010x}  [{}] {}",
            rule.id,
            rule.code,
            rule.severity_level(),
            rule.description
        );
    }
    println!("\nUse `perfcheck explain <rule-id>` for detailed information.");
    Ok(())
}

fn run_explain(rule_id: &str) -> Result<()> {
    use colored::Colorize;

    let config = Config::load_or_default(Path::new("."))?;
    let catalog = load_catalog(&config)?;
    let catalog = catalog.get();

    let Some(rule) = catalog.rule_by_id(rule_id) else {
        eprintln!("{} Unknown rule: {}", "error:".red().bold(), rule_id);
        eprintln!("\nAvailable rules:");
        for r in catalog.all_rules() {
            eprintln!("  {}", r.id);
        }
        anyhow::bail!("Unknown rule: {}", rule_id);
    };

    print_rule(&rule);
    Ok(())
}

fn print_rule(rule: &RuleRecord) {
    use colored::Colorize;

    println!("{}", rule.description.bold().underline());
    println!("Rule ID:   {}", rule.id.cyan());
    println!("Code:      {:#010x}", rule.code);
    println!("Severity:  {}", rule.severity_level());
    println!("Category:  {}", rule.category);
    println!("Languages: {}", rule.langs.join(", "));
    println!();
    println!("{}", "Why it matters:".yellow().bold());
    println!("  {}", rule.summary);
    println!();
    println!("{}", "Fix:".green().bold());
    println!("  {}", rule.fix_hint);
}
