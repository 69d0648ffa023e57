//! photomgr CLI
//!
//! Interactive board browser: list pages, search, and download a post's
//! images into its own folder.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use photomgr::{
    error::Result,
    models::Config,
    services::{BoardCrawler, DownloadStatus},
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// photomgr - forum board image downloader
#[derive(Parser, Debug)]
#[command(
    name = "photomgr",
    version,
    about = "Browse forum boards and download post images"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Site profile to browse
    #[arg(short, long, default_value = "ptt")]
    site: String,

    /// Number of download workers (default from config)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Download directory (default from config)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Next,
    Prev,
    Top,
    Find(String),
    More(usize),
    Open,
    Download(usize),
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let cmd = parts.next()?;
        let rest: Vec<&str> = parts.collect();

        let command = match cmd {
            "n" => Self::Next,
            "p" => Self::Prev,
            "s" => Self::Top,
            "o" => Self::Open,
            "quit" | "q" => Self::Quit,
            "f" if !rest.is_empty() => Self::Find(rest.join(" ")),
            "m" => match rest.first().and_then(|n| n.parse().ok()) {
                Some(count) => Self::More(count),
                None => Self::Unknown("usage: m <count>".to_string()),
            },
            "d" => match rest.first().and_then(|n| n.parse().ok()) {
                Some(index) => Self::Download(index),
                None => Self::Unknown("usage: d <index>, e.g. 'd 1'".to_string()),
            },
            other => Self::Unknown(format!("unrecognized command: {other}")),
        };
        Some(command)
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_posts(crawler: &BoardCrawler) {
    for (i, post) in crawler.session().posts().iter().enumerate() {
        println!("{i}:{}", post.format("[{score}★]{title}"));
    }
    println!("(o: open folder, s: top page, n: next, p: prev, f <keyword>: search, m <count>: list at least, d <index>: download, quit: quit)");
}

fn prompt(label: &str) {
    print!("{label}:> ");
    let _ = std::io::stdout().flush();
}

async fn download(crawler: &BoardCrawler, index: usize, workers: usize) {
    let Some(post) = crawler.session().get(index) else {
        println!("Invalid index");
        return;
    };
    if !crawler.has_valid_url(&post.url) {
        println!("Unsupported url: {}", post.url);
        return;
    }

    match crawler.download_post(&post.url, workers).await {
        Ok(DownloadStatus::Completed { dir, report }) => println!(
            "Done! {} saved, {} too small, {} failed -> {}",
            report.saved(),
            report.too_small(),
            report.failed(),
            dir.display()
        ),
        Ok(DownloadStatus::AlreadyDownloaded(dir)) => {
            println!("Already downloaded: {}", dir.display())
        }
        Ok(DownloadStatus::NoArticle) => println!("Could not read post: {}", post.url),
        Err(e) => println!("Download failed: {e}"),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if dotenvy::dotenv().is_ok() {
        log::debug!("Loaded environment from .env");
    }

    let mut config = Config::load_or_default(&cli.config);
    if let Some(dir) = cli.dir {
        config.download.base_dir = dir;
    }
    if let Some(workers) = cli.workers {
        config.download.workers = workers;
    }
    config.validate()?;

    let mut crawler = BoardCrawler::from_config(&config, &cli.site)?;
    let label = crawler.site().label.clone();
    let workers = config.download.workers;

    let mut page = 0u32;
    crawler.list_page(page, true).await;
    print_posts(&crawler);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&label);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Next => {
                page += 1;
                crawler.list_page(page, true).await;
                print_posts(&crawler);
            }
            Command::Prev => {
                page = page.saturating_sub(1);
                crawler.list_page(page, true).await;
                print_posts(&crawler);
            }
            Command::Top => {
                page = 0;
                crawler.list_page(page, true).await;
                print_posts(&crawler);
            }
            Command::Find(keyword) => {
                crawler.list_by_keyword(&keyword).await;
                print_posts(&crawler);
            }
            Command::More(count) => {
                crawler.list_at_least(count, page).await;
                print_posts(&crawler);
            }
            Command::Open => {
                let dir = crawler.base_dir().to_path_buf();
                if let Err(e) = tokio::fs::create_dir_all(&dir).await {
                    println!("Cannot create {}: {e}", dir.display());
                } else if let Err(e) = open::that(&dir) {
                    println!("Cannot open {}: {e}", dir.display());
                }
            }
            Command::Download(index) => download(&crawler, index, workers).await,
            Command::Unknown(message) => println!("{message}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("n"), Some(Command::Next));
        assert_eq!(Command::parse("  p  "), Some(Command::Prev));
        assert_eq!(Command::parse("d 3"), Some(Command::Download(3)));
        assert_eq!(Command::parse("m 40"), Some(Command::More(40)));
        assert_eq!(
            Command::parse("f cute cat"),
            Some(Command::Find("cute cat".to_string()))
        );
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_parse_bad_arguments() {
        assert!(matches!(Command::parse("d"), Some(Command::Unknown(_))));
        assert!(matches!(Command::parse("d x"), Some(Command::Unknown(_))));
        assert!(matches!(Command::parse("f"), Some(Command::Unknown(_))));
        assert!(matches!(Command::parse("zz"), Some(Command::Unknown(_))));
    }
}
