/*!
 * Command-line interface for marktree
 */

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use marktree::clipboard::copy_to_clipboard;
use marktree::config::{Args, Commands, Config, Destination};
use marktree::logger::setup_logger;
use marktree::worker::{process_json, Worker};
use marktree::{CopyReport, Reporter, Result};

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "marktree", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = setup_logger(args.verbose) {
        eprintln!("Warning: Failed to initialise logging: {}", e);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    if let Some(Commands::Request { file }) = &args.command {
        return serve_requests(file);
    }

    let config = Config::from_args(args)?;
    let request = config.to_request()?;
    let kind = request.kind();
    info!(
        "Running {} in workspace {}",
        kind.as_ref(),
        config.workspace_root.display()
    );

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(format!("Running {}...", kind));
    progress.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let result = Worker::spawn(request).and_then(|handle| handle.wait());
    progress.finish_and_clear();
    let response = result?;
    let duration = start.elapsed();

    deliver(&response.markdown, &config.destination)?;

    if !config.quiet {
        let report = CopyReport {
            kind,
            destination: config.destination.to_string(),
            duration,
            markdown_bytes: response.markdown.len(),
            files_count: response.files_count,
            stats: response.stats,
        };
        eprintln!("\n{}", Reporter::render(&report));
    }

    Ok(())
}

/// Send the Markdown to its destination
fn deliver(markdown: &str, destination: &Destination) -> Result<()> {
    match destination {
        Destination::Clipboard => copy_to_clipboard(markdown)?,
        Destination::File(path) => fs::write(path, markdown)?,
        Destination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(markdown.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Answer JSON requests, one outcome line per request line
fn serve_requests(file: &str) -> Result<()> {
    let input = if file == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(file)?
    };

    let mut stdout = io::stdout().lock();
    for line in input.lines().filter(|line| !line.trim().is_empty()) {
        let outcome = process_json(line);
        if outcome.starts_with("{\"error\"") {
            warn!("Request failed: {}", outcome);
        }
        writeln!(stdout, "{}", outcome)?;
    }
    Ok(())
}
