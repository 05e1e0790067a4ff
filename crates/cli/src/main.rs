mod echo;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use pagebind_core::{ConversionRequest, Converter, HttpFetcher, Settings, write_epub};
use tracing_subscriber::EnvFilter;

use crate::echo::{ConsoleObserver, print_banner, print_book_summary, print_error, print_info, print_success};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Turn a web page into an EPUB with its images embedded
#[derive(Parser, Debug)]
#[command(name = "pagebind")]
#[command(version)]
#[command(about = "Turn a web page into an EPUB", long_about = None)]
struct Args {
    /// Page URL or local HTML file (prompted for when omitted on a terminal)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Output EPUB file (default: derived from the page title)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Cover image URL, absolute or relative to the page
    #[arg(short, long, value_name = "URL")]
    cover: Option<String>,

    /// Settings file (default: <config dir>/pagebind/settings.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Language tag for the book, e.g. "en" or "fr"
    #[arg(long, value_name = "TAG")]
    lang: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Prompt for URL, cover and output name
    #[arg(short, long)]
    interactive: bool,

    /// Print the page metadata as JSON instead of building a book
    #[arg(short, long)]
    metadata: bool,

    /// Generate shell completion script
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "pagebind", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `-v`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).try_init();
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let settings = load_settings(&args)?;

    let interactive = args.interactive || (args.url.is_none() && io::stdin().is_terminal());
    let mut url = args.url;
    let mut cover = args.cover;
    let mut output = args.output;

    if interactive {
        if url.is_none() {
            url = Some(prompt("Page URL or file:")?);
        }
        if cover.is_none() && !args.metadata {
            cover = Some(prompt("Cover image URL (leave empty for none):")?);
        }
        if output.is_none() && !args.metadata {
            let name = prompt("Output EPUB file (leave empty to use the title):")?;
            output = (!name.is_empty()).then(|| PathBuf::from(name));
        }
    }

    let request =
        ConversionRequest::new(url.as_deref().unwrap_or_default(), cover.as_deref()).context("Invalid input")?;

    let fetcher = HttpFetcher::new(settings.fetch.clone()).context("Failed to set up HTTP client")?;
    let observer = ConsoleObserver { verbose: args.verbose };
    let converter = Converter::new(settings, &fetcher).with_observer(&observer);

    if args.metadata {
        let metadata = converter.metadata(&request).context("Failed to fetch page")?;
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    let book = converter.convert(&request).with_context(|| format!("Failed to convert {}", request.page_url))?;

    let path = output.unwrap_or_else(|| PathBuf::from(converter.settings().output_file_name(&book.metadata.title)));
    write_epub(&book, &path).with_context(|| format!("Failed to write EPUB to {}", path.display()))?;

    if args.verbose {
        eprintln!();
        print_book_summary(&book);
    }
    print_success(&format!("EPUB written to {}", path.display().bright_white()));

    Ok(())
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;

    if let Some(lang) = &args.lang {
        settings.set_language(lang);
    }
    if let Some(timeout) = args.timeout {
        settings.fetch.timeout = timeout;
    }
    if let Some(user_agent) = &args.user_agent {
        settings.fetch.user_agent = user_agent.clone();
    }

    tracing::debug!(language = %settings.language, timeout = settings.fetch.timeout, "settings loaded");
    Ok(settings)
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{} ", label.bold());
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line).context("Failed to read from stdin")?;

    Ok(line.trim().to_string())
}
