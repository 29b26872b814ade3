use anyhow::Context;
use clap::Parser;
use is_terminal::IsTerminal;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

use pglogfmt::logging::init_logging;
use pglogfmt::{ErrorStrategy, InputFormat, LogPipeline, PipelineConfig, RenderConfig};

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Parser)]
#[command(name = "pglogfmt")]
#[command(about = "Pretty-print PostgreSQL query logs as colorized SQL")]
#[command(version)]
struct Args {
    /// Input file (default: stdin)
    #[arg(short = 'i', long = "input")]
    input_file: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Log format of the input
    #[arg(long, value_enum, default_value = "csvlog")]
    input_format: InputFormat,

    /// When to color the output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Keep comments and line breaks in statements
    #[arg(long)]
    no_shorten: bool,

    /// Text written for NULL and unbound parameters
    #[arg(long, default_value = "NULL")]
    null_literal: String,

    /// Idle time before a separator line is printed
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    gap: Duration,

    /// Never print separator lines
    #[arg(long)]
    no_separator: bool,

    /// Skip records that fail to parse instead of stopping
    #[arg(long)]
    skip_errors: bool,

    /// Print final statistics to stderr
    #[arg(long)]
    stats: bool,

    /// More diagnostics on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors on stderr
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Read buffer size
    #[arg(long, default_value = "65536")] // 64KB
    buffer_size: usize,
}

impl Args {
    fn use_colors(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.output_file.is_none() && io::stdout().is_terminal(),
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            error_strategy: if self.skip_errors {
                ErrorStrategy::Skip
            } else {
                ErrorStrategy::FailFast
            },
            input_format: self.input_format,
            render: RenderConfig {
                shorten: !self.no_shorten,
                null_literal: self.null_literal.clone(),
                use_colors: self.use_colors(),
                ..RenderConfig::default()
            },
            separator_gap: (!self.no_separator).then_some(self.gap),
            ..PipelineConfig::default()
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose, args.quiet) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.pipeline_config();
    tracing::debug!(?config, "starting");

    let input: Box<dyn BufRead> = if let Some(input_path) = &args.input_file {
        let file = File::open(input_path)
            .with_context(|| format!("Failed to open input file '{}'", input_path.display()))?;
        Box::new(BufReader::with_capacity(args.buffer_size, file))
    } else {
        Box::new(BufReader::with_capacity(args.buffer_size, io::stdin()))
    };

    let mut output: Box<dyn Write> = if let Some(output_path) = &args.output_file {
        let file = File::create(output_path).with_context(|| {
            format!("Failed to create output file '{}'", output_path.display())
        })?;
        Box::new(io::BufWriter::new(file))
    } else {
        Box::new(io::stdout().lock())
    };

    let mut pipeline = LogPipeline::new(config);
    let stats = pipeline
        .process(input, &mut output)
        .context("Processing failed")?;

    if let Err(e) = output.flush() {
        if e.kind() != io::ErrorKind::BrokenPipe {
            return Err(e.into());
        }
    }

    if args.stats {
        eprintln!("Final statistics:");
        eprintln!("  Records read: {}", stats.records_read);
        eprintln!("  Statements rendered: {}", stats.statements_rendered);
        eprintln!("  Records ignored: {}", stats.records_ignored);
        eprintln!("  Errors: {}", stats.errors);
        eprintln!("  Separators: {}", stats.separators);
        eprintln!("  Processing time: {:?}", stats.processing_time);
    }

    Ok(())
}
