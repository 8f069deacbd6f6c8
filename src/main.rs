use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::error::{ContextKind, ContextValue};
use silverchain::error::OptionError;
use silverchain::{Config, DEFAULT_MAX_FILE_COUNT, Result, compile, read_input, save};

const HELP: &str = "\
Usage: silverchain [options]

options:
  -h, --help                Show this message and exit
  -v, --version             Show version and exit
  -i, --input <path>        Input grammar file
  -o, --output <path>       Output directory
  -l, --language <lang>     Output language
  -m, --max-file-count <n>  Maximum number of generated files
";

#[derive(Parser, Debug)]
#[command(name = "silverchain", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    #[arg(short, long)]
    help: bool,

    #[arg(short, long)]
    version: bool,

    /// Read standard input when absent
    #[arg(short, long, value_name = "path")]
    input: Option<PathBuf>,

    #[arg(short, long, value_name = "path", default_value = ".")]
    output: PathBuf,

    #[arg(short, long, value_name = "lang", default_value = "java")]
    language: String,

    #[arg(short, long, value_name = "n", default_value_t = DEFAULT_MAX_FILE_COUNT)]
    max_file_count: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    if let Err(err) = run(&args) {
        let message = err.to_string();
        if !message.is_empty() {
            eprintln!("{message}");
        }
        process::exit(err.exit_code());
    }
}

fn run(args: &[String]) -> Result<()> {
    let cli = Cli::try_parse_from(args).map_err(|e| option_error(args, &e))?;

    if cli.help {
        print!("{HELP}");
        return Ok(());
    }
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config {
        language: cli.language.parse()?,
        max_file_count: cli.max_file_count,
    };
    let source = read_input(cli.input.as_deref())?;
    let files = compile(&source, &config)?;
    save(&files, &cli.output)?;
    Ok(())
}

/// Report the whole command-line word clap choked on, e.g. `-foo` rather
/// than the `-f` it stopped at.
fn option_error(args: &[String], error: &clap::Error) -> OptionError {
    let words = || args.iter().skip(1);
    let word = match error.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => words()
            .find(|word| word.starts_with(arg.as_str()))
            .cloned()
            .unwrap_or_else(|| arg.clone()),
        _ => words()
            .find(|word| word.starts_with('-'))
            .cloned()
            .unwrap_or_default(),
    };
    OptionError(word)
}
