//! Command-line surface over the feed repository contract.
//!
//! Store coordinates come from the environment (`GITHUB_TOKEN`,
//! `GITHUB_REPO_OWNER`, `GITHUB_REPO_NAME`, `GITHUB_FILE_PATH`,
//! `GITHUB_BRANCH`); their absence is fatal before any network call.
mod logging;

use std::io::Read;

use clap::{Parser, Subcommand};

use feedvault_core::ChannelId;
use feedvault_engine::{
    FeedRepository, GithubFileStore, PageScrapeResolver, ResolveSettings, StoreConfig,
};

#[derive(Parser)]
#[command(name = "feedvault", about = "Manage YouTube feed subscriptions stored in a GitHub repo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all stored feeds.
    List,
    /// Print the raw stored file content.
    Raw,
    /// Resolve a feed URL, channel URL, handle, video URL or raw channel
    /// id and add a feed for it.
    Add { input: String },
    /// Delete the feeds behind the given feed URLs.
    Delete { urls: Vec<String> },
    /// Replace the whole file with JSON from a file path, or stdin for "-".
    Replace { source: String },
    /// Set the Discord notification channel for a stored channel.
    /// Accepts a numeric id, "0" to unset, or the "#name-id" display form.
    SetChannel {
        channel_id: ChannelId,
        target: String,
    },
}

#[tokio::main]
async fn main() {
    logging::initialize();
    let cli = Cli::parse();
    if let Err(message) = run(cli).await {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    let store = GithubFileStore::new(config).map_err(|err| err.to_string())?;
    let resolver = PageScrapeResolver::new(ResolveSettings::default())
        .map_err(|err| err.to_string())?;
    let repo = FeedRepository::new(store, Box::new(resolver));

    match cli.command {
        Command::List => {
            for item in repo.list_feeds().await.map_err(|err| err.to_string())? {
                println!(
                    "{}\t{}\t{}\t{}",
                    item.channel_id, item.name, item.discord_channel, item.url
                );
            }
        }
        Command::Raw => {
            println!("{}", repo.raw_content().await.map_err(|err| err.to_string())?);
        }
        Command::Add { input } => {
            let item = repo.add_feed(&input).await.map_err(|err| err.to_string())?;
            println!("added {} ({})", item.channel_id, item.name);
            println!("{}", item.url);
        }
        Command::Delete { urls } => {
            let removed = repo.delete_feeds(&urls).await.map_err(|err| err.to_string())?;
            println!("removed {removed} feed(s)");
        }
        Command::Replace { source } => {
            let content = read_source(&source)?;
            repo.replace_raw(&content).await.map_err(|err| err.to_string())?;
            println!("replaced store contents");
        }
        Command::SetChannel { channel_id, target } => {
            let item = repo
                .set_notification_target(&channel_id, &target)
                .await
                .map_err(|err| err.to_string())?;
            println!("{} -> {}", item.channel_id, item.discord_channel);
        }
    }
    Ok(())
}

fn read_source(source: &str) -> Result<String, String> {
    if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| err.to_string())?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(source).map_err(|err| format!("{source}: {err}"))
    }
}
