//! loctree - Concurrent Line Counter
//!
//! Entry point for the loctree CLI application.

use clap::Parser;
use loctree::{
    cli::Cli,
    counter::CountError,
    error::{ExitCode, StructuredError},
};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();
    loctree::logging::init_logging(cli.verbose, cli.quiet);
    let json_errors = cli.json_errors;

    // Run the application logic
    match loctree::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            // Determine appropriate exit code for errors
            let exit_code = if err
                .downcast_ref::<CountError>()
                .is_some_and(|e| matches!(e, CountError::Interrupted))
            {
                ExitCode::Interrupted
            } else {
                ExitCode::GeneralError
            };

            // Report the error
            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{json}");
                } else {
                    eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
