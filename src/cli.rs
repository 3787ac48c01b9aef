//! Command line surface: `serve` runs the proxy, `check` is the terminal view.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use grammar_checker::client::clipboard;
use grammar_checker::client::{ClientError, DownloadTarget, HttpTransport, Phase, Session};
use grammar_checker::config::Config;
use grammar_checker::locale::{Locale, Notice};
use grammar_checker::server;
use grammar_checker::theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "grammar-checker", version, about = "Correct grammar with a chat-completion model")]
pub struct Cli {
    /// Path to grammar-checker.toml (defaults to ./grammar-checker.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the correction proxy
    Serve(ServeArgs),
    /// Correct a text and reveal the result progressively
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Text to correct
    pub text: Option<String>,

    /// Load the text from a .txt or .html file
    #[arg(long, short, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Correction endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Directory to write input.txt and output.txt into
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Copy the corrected text to the clipboard
    #[arg(long)]
    pub copy: bool,

    #[arg(long)]
    pub theme: Option<Theme>,

    #[arg(long)]
    pub locale: Option<Locale>,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).context("loading configuration"),
        None => Ok(Config::load_from_default()),
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve(args) => {
            if let Some(bind) = args.bind {
                config.server.bind = bind;
            }
            server::serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(args) => check(config, args).await,
    }
}

async fn check(mut config: Config, args: CheckArgs) -> Result<ExitCode> {
    if let Some(endpoint) = args.endpoint {
        config.client.endpoint_url = endpoint;
    }
    let theme = args.theme.unwrap_or(config.client.theme);
    let locale = args.locale.unwrap_or(config.client.locale);

    let transport = HttpTransport::new(config.client.endpoint_url.clone());
    let mut session = Session::new(transport, config.client.reveal_delay());

    let loaded = match (&args.file, args.text) {
        (Some(path), _) => session.load_input_file(path),
        (None, Some(text)) => {
            session.set_input(text);
            Ok(())
        }
        (None, None) => Ok(()),
    };
    if let Err(e) = loaded {
        return Ok(report(theme, locale, &e));
    }

    let mut updates = session.subscribe();
    eprintln!("{}", theme.notice(locale.text(Notice::Checking)));
    if let Err(e) = session.submit().await {
        return Ok(report(theme, locale, &e));
    }

    println!("{}", theme.heading(locale.text(Notice::ResultHeading)));
    let mut stdout = io::stdout();
    let mut printed = String::new();
    loop {
        let snapshot = updates.borrow_and_update().clone();
        print_delta(&mut stdout, theme, &mut printed, &snapshot.output_text)?;
        if snapshot.phase != Phase::Revealing {
            break;
        }
        if updates.changed().await.is_err() {
            break;
        }
    }
    session.finish_reveal().await;
    print_delta(&mut stdout, theme, &mut printed, &session.output())?;
    writeln!(stdout)?;

    if let Some(dir) = &args.save_dir {
        for target in [DownloadTarget::Input, DownloadTarget::Output] {
            let path = match session.save(dir, target) {
                Ok(path) => path,
                Err(e) => return Ok(report(theme, locale, &e)),
            };
            eprintln!(
                "{} {}",
                theme.notice(locale.text(Notice::Saved)),
                path.display()
            );
        }
    }

    if args.copy {
        clipboard::copy_to_terminal(&mut stdout, &session.output())?;
        eprintln!("{}", theme.notice(locale.text(Notice::Copied)));
    }

    Ok(ExitCode::SUCCESS)
}

/// Print whatever `current` adds to what has already been printed
fn print_delta<W: Write>(out: &mut W, theme: Theme, printed: &mut String, current: &str) -> io::Result<()> {
    if let Some(delta) = current.strip_prefix(printed.as_str()) {
        if !delta.is_empty() {
            write!(out, "{}", theme.body(delta))?;
            out.flush()?;
            printed.push_str(delta);
        }
    }
    Ok(())
}

/// Message shown for a client failure, localized when the error has a notice
fn report_message(locale: Locale, error: &ClientError) -> String {
    match error.notice() {
        Some(notice) => locale.text(notice).to_string(),
        None => error.to_string(),
    }
}

/// Print the failure once and turn it into the process exit status
fn report(theme: Theme, locale: Locale, error: &ClientError) -> ExitCode {
    eprintln!("{}", theme.error(&report_message(locale, error)));
    ExitCode::FAILURE
}
