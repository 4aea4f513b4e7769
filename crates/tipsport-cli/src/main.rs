use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tipsport_streams::{
    CompetitionGroup, Credentials, Match, QualityPreference, SessionStore, SiteVariant,
    StreamResolver, TipsportError, client::default_client, report::send_crash_report,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Betting site account name
    #[arg(long, env = "TIPSPORT_USERNAME")]
    username: String,

    /// Betting site account password
    #[arg(long, env = "TIPSPORT_PASSWORD", hide_env_values = true)]
    password: String,

    /// Site variant: cz-tipsport, cz-chance or sk-tipsport
    #[arg(long, default_value = "cz-tipsport")]
    site: SiteVariant,

    /// Stream quality: highest, lowest, or an exact label like 1280x720
    #[arg(long, default_value = "highest")]
    quality: QualityPreference,

    /// Output the result in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the matches of one competition group
    Matches {
        /// CZ_TIPSPORT, CZ_CHANCE or SK_TIPSPORT
        group: CompetitionGroup,
    },
    /// Resolve the playable stream link of a match page URL
    Play { url: String },
    /// Log in from scratch and verify the session works
    CheckLogin,
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_strings(&["▹▹▹▹▹", "▸▹▹▹▹", "▹▸▹▹▹", "▹▹▸▹▹", "▹▹▹▸▹", "▹▹▹▹▸", "▪▪▪▪▪"]),
    );
    pb.set_message(message);
    pb
}

/// Reuses the persisted session when it belongs to the requested account and
/// site, logs in otherwise. The
/// freshly created resolver is saved immediately so a crash later in the
/// invocation does not cost the login.
async fn load_or_login(
    store: &SessionStore,
    key: &str,
    credentials: Credentials,
) -> Result<StreamResolver, TipsportError> {
    if let Some(state) = store.load(key)? {
        let resolver = StreamResolver::from_state(state);
        let saved = resolver.credentials();
        if saved.site == credentials.site && saved.username == credentials.username {
            return Ok(resolver);
        }
        // The stored session belongs to another account or site variant.
        store.clear(key)?;
    }
    let pb = spinner("Logging in...");
    let resolver = StreamResolver::login(credentials).await;
    pb.finish_and_clear();
    let resolver = resolver?;
    store.save(key, &resolver.state())?;
    Ok(resolver)
}

fn print_matches(matches: &[Match], json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(matches).unwrap());
        return;
    }
    if matches.is_empty() {
        println!("{}", "No matches are scheduled today.".yellow());
        return;
    }
    for m in matches {
        let state = if m.started {
            format!("{} {}", m.score, m.status).trim().to_string()
        } else {
            match m.start_time_label() {
                Some(time) => format!("starts at {time}"),
                None => "not started".to_string(),
            }
        };
        let playable = if m.stream_enabled {
            "▶".green().to_string()
        } else {
            "✗".red().to_string()
        };
        println!(
            "{playable} {} {}\n    {}",
            m.name.cyan().bold(),
            format!("({state})").yellow(),
            m.url.blue()
        );
    }
}

async fn run(args: Args) -> Result<(), TipsportError> {
    let credentials = Credentials::new(args.username, args.password, args.quality, args.site);
    let store = SessionStore::new();
    let key = SessionStore::default_key();

    match args.command {
        Command::Matches { group } => {
            let mut resolver = load_or_login(&store, &key, credentials).await?;
            let pb = spinner("Fetching match listing...");
            let matches = resolver.get_matches(group).await;
            pb.finish_and_clear();
            let matches = matches?;
            store.save(&key, &resolver.state())?;
            print_matches(&matches, args.json);
        }
        Command::Play { url } => {
            let mut resolver = load_or_login(&store, &key, credentials).await?;
            let pb = spinner("Resolving stream...");
            let handle = resolver.get_stream(&url).await;
            pb.finish_and_clear();
            let handle = handle?;
            store.save(&key, &resolver.state())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&handle).unwrap());
            } else {
                println!("{} {}", "Stream link:".green().bold(), handle.link.blue());
            }
        }
        Command::CheckLogin => {
            // The connection test always authenticates from scratch.
            let pb = spinner("Testing login...");
            let resolver = StreamResolver::login(credentials).await;
            pb.finish_and_clear();
            let mut resolver = resolver?;
            resolver.check_login().await?;
            store.save(&key, &resolver.state())?;
            println!("{}", "Login and connection OK.".green().bold());
        }
    }
    Ok(())
}

/// The notification table of the host: one stable notice per error kind,
/// site messages verbatim, unclassified failures reported best-effort.
async fn render_failure(err: TipsportError) {
    let notice = match &err {
        TipsportError::NoInternetConnection(_) => "No internet connection.",
        TipsportError::LoginFailed => "Login failed, check your username and password.",
        TipsportError::UnableGetStreamMetadata => "Unable to get stream metadata.",
        TipsportError::UnableParseStreamMetadata => "Unable to parse stream metadata.",
        TipsportError::UnsupportedStreamFormat(_) => "Stream format is not supported.",
        TipsportError::UnableDetectScriptSessionId => "Unable to detect stream session.",
        TipsportError::UnableGetStreamNumber => "Unable to get stream number.",
        TipsportError::UnableGetStreamList => "Unable to get stream list.",
        TipsportError::StreamHasNotStarted => "The stream has not started yet.",
        TipsportError::SiteMessage(message) => {
            eprintln!("{} {}", "Tipsport:".yellow().bold(), message);
            return;
        }
        TipsportError::Other(detail) => {
            let reported = send_crash_report(
                &default_client(),
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                detail,
            )
            .await;
            if reported {
                eprintln!("{}", "Unexpected error, a report was sent.".red());
            } else {
                tracing::error!(detail, "unexpected error");
                eprintln!("{}", "Unexpected error.".red());
            }
            return;
        }
    };

    if err.is_informational() {
        eprintln!("{} {notice}", "Note:".yellow().bold());
    } else {
        eprintln!("{} {notice}", "Error:".red().bold());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let informational = err.is_informational();
            render_failure(err).await;
            if informational {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
