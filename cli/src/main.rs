//! aifixer CLI - cleanup tool for AI-generated rich text
//!
//! Detects and strips stray formatting, links and dividers from HTML
//! pasted out of chat assistants.

use aifixer::detect::{count_dividers, DividerCounts};
use aifixer::{
    BusyIndicator, CleanupOptions, FeatureVector, HtmlDocumentExporter, Notifier, ParseOptions,
    Session, SessionOptions, Severity, StripTarget, TextStats,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Formatting cleanup for AI-generated rich text
#[derive(Parser)]
#[command(
    name = "aifixer",
    version,
    about = "Strip AI formatting artifacts from HTML",
    long_about = "aifixer - cleanup tool for AI-generated rich text.\n\n\
                  Detects bold, italic, links, source URLs and dividers, and strips them.\n\n\
                  Usage:\n  \
                  aifixer detect <file>          List the detected features\n  \
                  aifixer strip --all <file>     Strip everything, then clean\n  \
                  aifixer clean <file> -o out    Fix dashes and whitespace\n\n\
                  Use '-' as the file to read from stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print the action history after running
    #[arg(long, global = true)]
    history: bool,

    /// Fail on malformed markup instead of repairing it
    #[arg(long, global = true)]
    strict: bool,

    /// Maximum input size in megabytes
    #[arg(long, global = true)]
    limit_mb: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the formatting features found in a document
    Detect {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output JSON instead of labels
        #[arg(long)]
        json: bool,
    },

    /// Normalize dashes and whitespace
    Clean {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cleanup preset
        #[arg(long, default_value = "standard")]
        mode: CleanupMode,
    },

    /// Strip formatting features, then clean
    Strip {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Feature to strip (repeatable)
        #[arg(short, long = "target", value_enum)]
        targets: Vec<TargetArg>,

        /// Strip every feature
        #[arg(long, conflicts_with = "targets")]
        all: bool,

        /// Skip the final clean pass
        #[arg(long)]
        no_clean: bool,
    },

    /// Wrap matches in highlight markers
    Highlight {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Text or pattern to find
        pattern: String,

        /// Treat the pattern as a regular expression
        #[arg(short, long)]
        regex: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace matches in the document text
    Replace {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Text or pattern to find
        pattern: String,

        /// Replacement text ($1 expands groups in regex mode)
        replacement: String,

        /// Treat the pattern as a regular expression
        #[arg(short, long)]
        regex: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the visible text
    Text {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show document statistics and detected features
    Info {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Export as a standalone HTML document
    Export {
        /// Input file path ('-' for stdin)
        input: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "cleaned.html")]
        output: PathBuf,

        /// Document title
        #[arg(long)]
        title: Option<String>,
    },

    /// Show version information
    Version,
}

impl Commands {
    /// Input path of document commands.
    fn input(&self) -> Option<&PathBuf> {
        match self {
            Commands::Detect { input, .. }
            | Commands::Clean { input, .. }
            | Commands::Strip { input, .. }
            | Commands::Highlight { input, .. }
            | Commands::Replace { input, .. }
            | Commands::Text { input, .. }
            | Commands::Info { input, .. }
            | Commands::Export { input, .. } => Some(input),
            Commands::Version => None,
        }
    }
}

/// Feature to strip
#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    /// Bold tags and font weights
    Bold,
    /// Italic tags and font styles
    Italic,
    /// Anchor elements (text is kept)
    Links,
    /// URL-shaped text
    Sources,
    /// Rules, empty blocks and punctuation runs
    Dividers,
}

impl From<TargetArg> for StripTarget {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Bold => StripTarget::Bold,
            TargetArg::Italic => StripTarget::Italic,
            TargetArg::Links => StripTarget::Hyperlinks,
            TargetArg::Sources => StripTarget::SourceLinks,
            TargetArg::Dividers => StripTarget::Dividers,
        }
    }
}

/// Cleanup preset
#[derive(Clone, ValueEnum)]
enum CleanupMode {
    /// Whitespace and Unicode normalization only
    Minimal,
    /// Also rewrite em and en dashes (default)
    Standard,
}

impl From<CleanupMode> for CleanupOptions {
    fn from(mode: CleanupMode) -> Self {
        match mode {
            CleanupMode::Minimal => CleanupOptions::minimal(),
            CleanupMode::Standard => CleanupOptions::default(),
        }
    }
}

/// Prints session notifications to stderr so stdout stays pipeable.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        log::debug!("[{}] {}", severity, message);
        match severity {
            Severity::Info => eprintln!("{} {}", "✓".green().bold(), message),
            Severity::Warning => eprintln!("{} {}", "!".yellow().bold(), message),
            Severity::Error => eprintln!("{} {}", "✗".red().bold(), message),
        }
    }
}

/// Shows a spinner while the session reports busy.
struct SpinnerBusy {
    message: &'static str,
    bar: Option<ProgressBar>,
}

impl SpinnerBusy {
    fn new(message: &'static str) -> Self {
        Self { message, bar: None }
    }
}

impl BusyIndicator for SpinnerBusy {
    fn set_busy(&mut self, busy: bool) {
        if busy {
            self.bar.get_or_insert_with(|| create_spinner(self.message));
        } else if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[derive(Serialize)]
struct DocumentInfo {
    stats: TextStats,
    features: FeatureVector,
    labels: Vec<&'static str>,
    dividers: DividerCounts,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        // Session failures were already reported by the notifier
        if e.downcast_ref::<aifixer::Error>().is_none() {
            eprintln!("{}: {}", "Error".red().bold(), e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(input) = cli.command.input() else {
        print_version();
        return Ok(());
    };

    let mut parse = ParseOptions::default();
    if cli.strict {
        parse = parse.strict();
    }
    if let Some(mb) = cli.limit_mb {
        parse = parse.with_limit_mb(mb);
    }
    let mut options = SessionOptions::default().with_parse_options(parse);
    if let Commands::Clean { mode, .. } = &cli.command {
        options = options.with_cleanup(mode.clone().into());
    }

    let html = read_input(input)?;
    let mut session = Session::with_options(options, ConsoleNotifier);
    session.load_html(&html)?;

    match cli.command {
        Commands::Detect { json, .. } => {
            let features = session.features();
            if json {
                println!("{}", serde_json::to_string_pretty(&features)?);
            } else if features.is_clean() {
                println!("{} No formatting features detected", "✓".green().bold());
            } else {
                for label in features.labels() {
                    println!("  {} {}", "●".yellow(), label);
                }
            }
        }

        Commands::Clean { output, .. } => {
            session.clean();
            write_output(output.as_ref(), &session.html())?;
        }

        Commands::Strip {
            output,
            targets,
            all,
            no_clean,
            ..
        } => {
            let targets: Vec<StripTarget> = if all {
                StripTarget::ALL.to_vec()
            } else {
                targets.into_iter().map(StripTarget::from).collect()
            };
            if targets.is_empty() {
                println!(
                    "{} Nothing to strip (use --target or --all)",
                    "!".yellow().bold()
                );
            }
            for target in targets {
                session.strip(target)?;
            }
            if !no_clean {
                session.clean();
            }
            write_output(output.as_ref(), &session.html())?;
        }

        Commands::Highlight {
            pattern,
            regex,
            output,
            ..
        } => {
            session.highlight(&pattern, regex)?;
            write_output(output.as_ref(), &session.html())?;
        }

        Commands::Replace {
            pattern,
            replacement,
            regex,
            output,
            ..
        } => {
            session.replace(&pattern, &replacement, regex)?;
            write_output(output.as_ref(), &session.html())?;
        }

        Commands::Text { output, .. } => {
            write_output(output.as_ref(), &session.plain_text())?;
        }

        Commands::Info { input, json } => {
            let features = session.features();
            let info = DocumentInfo {
                stats: session.stats(),
                features,
                labels: features.labels(),
                dividers: count_dividers(session.tree()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", "Document Information".cyan().bold());
                println!("{}", "─".repeat(40));
                println!(
                    "{}: {}",
                    "File".bold(),
                    input.file_name().unwrap_or_default().to_string_lossy()
                );
                println!("{}: {}", "Words".bold(), info.stats.words);
                println!("{}: {}", "Characters".bold(), info.stats.characters);

                println!("\n{}", "Detected Features".cyan().bold());
                println!("{}", "─".repeat(40));
                if info.labels.is_empty() {
                    println!("  {} none", "✓".green());
                }
                for label in &info.labels {
                    println!("  {} {}", "●".yellow(), label);
                }

                if info.dividers.total() > 0 {
                    println!("\n{}", "Dividers".cyan().bold());
                    println!("{}", "─".repeat(40));
                    println!("{}: {}", "Empty blocks".bold(), info.dividers.empty_blocks);
                    println!("{}: {}", "Rules".bold(), info.dividers.rules);
                    println!("{}: {}", "Double breaks".bold(), info.dividers.double_breaks);
                    println!("{}: {}", "Punctuation runs".bold(), info.dividers.punctuation_runs);
                    println!("{}: {}", "Decorated".bold(), info.dividers.decorated);
                }
            }
        }

        Commands::Export { output, title, .. } => {
            let mut exporter = HtmlDocumentExporter::new();
            if let Some(title) = title {
                exporter = exporter.with_title(title);
            }
            let mut busy = SpinnerBusy::new("Exporting document...");
            let bytes = session.export_with(&mut exporter, &mut busy)?;
            fs::write(&output, &bytes)?;
            println!("{} Written to {}", "✓".green().bold(), output.display());
        }

        Commands::Version => {}
    }

    if cli.history {
        print_history(&session);
    }

    Ok(())
}

fn read_input(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut html = String::new();
        io::stdin().lock().read_to_string(&mut html)?;
        Ok(html)
    } else {
        fs::read_to_string(path)
    }
}

fn print_history<N: Notifier>(session: &Session<N>) {
    let history = session.history();
    eprintln!("\n{}", "History".cyan().bold());
    eprintln!("{}", "─".repeat(40));
    if history.is_empty() {
        eprintln!("  (empty)");
    }
    for (index, entry) in history.newest_first() {
        eprintln!(
            "  {} {} {}",
            format!("[{}]", index).dimmed(),
            entry.timestamp.dimmed(),
            entry.action
        );
    }
}

fn print_version() {
    println!("{} {}", "aifixer".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Cleanup for AI-generated rich text");
    println!();
    println!("Detects: bold, italic, underline, hyperlinks, source links, dividers");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_strip_targets_parse() {
        let cli = Cli::try_parse_from(["aifixer", "strip", "in.html", "-t", "bold", "-t", "sources"])
            .unwrap();
        match cli.command {
            Commands::Strip { targets, all, .. } => {
                assert!(!all);
                let targets: Vec<StripTarget> = targets.into_iter().map(Into::into).collect();
                assert_eq!(targets, vec![StripTarget::Bold, StripTarget::SourceLinks]);
            }
            _ => panic!("expected strip"),
        }
    }

    #[test]
    fn test_all_conflicts_with_targets() {
        assert!(Cli::try_parse_from(["aifixer", "strip", "in.html", "--all", "-t", "bold"]).is_err());
    }

    #[test]
    fn test_spinner_busy_toggles() {
        let mut busy = SpinnerBusy::new("working");
        busy.set_busy(true);
        assert!(busy.bar.is_some());
        busy.set_busy(false);
        assert!(busy.bar.is_none());
    }
}
