//! loctree - Concurrent Line Counter
//!
//! A cross-platform CLI that counts lines of text across a directory tree
//! using a recursive fan-out/fan-in walker (at most four concurrent
//! branches per directory level), with a colored tree snapshot and an
//! in-place progress loader.

pub mod cli;
pub mod config;
pub mod counter;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod signal;
pub mod tree;

use std::sync::{Arc, Mutex};

use anyhow::Result;

use cli::{Cli, Commands, CountArgs, OutputFormat};
use counter::CountConfig;
use error::ExitCode;
use progress::TreeReporter;
use tree::FileTree;

/// Run the application after CLI parsing. Returns the exit code on success.
///
/// # Errors
///
/// Returns the first fatal error of the run: invalid root, traversal I/O
/// failure, or interruption.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }
    let handler = signal::install_handler()?;

    match cli.command {
        Commands::Count(ref args) => run_count_command(&cli, args, &handler),
    }
}

fn run_count_command(
    cli: &Cli,
    args: &CountArgs,
    handler: &signal::ShutdownHandler,
) -> Result<ExitCode> {
    let mut ignore = cli::parse_ignore_list(&args.ignore);
    for token in config::Config::load().ignore {
        if !ignore.contains(&token) {
            ignore.push(token);
        }
    }

    let text_output = args.output == OutputFormat::Text;
    if text_output && !cli.quiet {
        println!("Counting lines at repo \"{}\"...", args.repo.display());
    }

    let tree = FileTree::build(&args.repo, &ignore, args.recursive)?;
    log::debug!(
        "snapshot built: {} files, {} directories",
        tree.file_count(),
        tree.dir_count()
    );
    if text_output && !cli.quiet {
        println!("{}", tree.rendered());
    }

    let tree = Arc::new(Mutex::new(tree));
    let reporter = Arc::new(TreeReporter::new(
        Arc::clone(&tree),
        cli.quiet || !text_output,
    ));

    let count_config = CountConfig::new(&args.repo)
        .with_ignore_tokens(ignore)
        .with_recursive(args.recursive)
        .with_include_blanks(args.blanks)
        .with_include_comments(args.comments)
        .with_shutdown_flag(handler.get_flag())
        .with_observer(Arc::clone(&reporter) as Arc<dyn progress::CountObserver>);

    let outcome = counter::run_count(&count_config)?;
    reporter.finish();

    match args.output {
        OutputFormat::Text => println!("{}", output::render_text(&outcome.totals)),
        OutputFormat::Json => println!("{}", output::render_json(&outcome.totals)?),
    }
    Ok(ExitCode::Success)
}
