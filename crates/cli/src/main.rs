//! `feedline` command line.
//!
//! - `seed`: write demo posts for a term into the configured database
//! - `tail`: follow an archive page through the feed loader

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use feedline_client::fetch::canonicalize;
use feedline_client::{FeedLoader, FetchClient, FetchConfig, LoaderOptions, LoaderState, card_title};
use feedline_core::db::NewPost;
use feedline_core::{AppConfig, BucketStore, Db};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "feedline", about = "Category archive feeds with incremental loading", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a term (if needed) and add demo posts to it.
    Seed {
        /// Term slug, e.g. `news`.
        #[arg(long)]
        term: String,

        /// Number of posts to add.
        #[arg(long, default_value_t = 25)]
        count: u32,

        #[arg(long, default_value = "category")]
        taxonomy: String,
    },

    /// Load an archive page and keep appending pages until the feed ends.
    Tail {
        /// Archive page URL, e.g. `http://127.0.0.1:8080/category/news`.
        url: String,

        /// Stop after this many loaded pages.
        #[arg(long)]
        pages: Option<u32>,

        /// Do not persist fetched pages in the database.
        #[arg(long)]
        memory_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Seed { term, count, taxonomy } => seed(&config, &taxonomy, &term, count).await,
        Commands::Tail { url, pages, memory_only } => tail(&config, &url, pages, memory_only).await,
    }
}

async fn open_db(config: &AppConfig) -> Result<Db> {
    Db::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open database {}", config.db_path.display()))
}

async fn seed(config: &AppConfig, taxonomy: &str, slug: &str, count: u32) -> Result<()> {
    let db = open_db(config).await?;
    let name = slug.replace(['-', '_'], " ");
    let term = db.upsert_term(taxonomy, slug, &name).await?;

    let now = chrono::Utc::now();
    for n in 1..=count {
        let published = now - chrono::Duration::minutes(i64::from(count - n));
        let post = NewPost {
            title: format!("{name} #{n}"),
            excerpt: format!("Demo post {n} of {count} in {name}."),
            permalink: format!("/{slug}/{n}/"),
            author: "feedline".into(),
            published_at: published.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        };
        db.insert_post(&post, &[term.id]).await?;
    }

    tracing::info!(taxonomy, slug, term_id = term.id, count, "seeded posts");
    println!("seeded {count} posts into {taxonomy}/{slug} (term {})", term.id);
    Ok(())
}

async fn tail(config: &AppConfig, url: &str, pages: Option<u32>, memory_only: bool) -> Result<()> {
    let page_url = canonicalize(url).with_context(|| format!("invalid archive url {url}"))?;
    let client = FetchClient::new(FetchConfig::from(config))?;
    let html = client.fetch_html(&page_url).await?;

    let store = if memory_only {
        None
    } else {
        let db: Arc<dyn BucketStore> = Arc::new(open_db(config).await?);
        Some(db)
    };
    let loader = FeedLoader::from_host_page(page_url, &html, Arc::new(client), store, LoaderOptions::default()).await;

    let mut shown = 0;
    print_new(&loader.cards().await, &mut shown);

    let mut loaded = 0;
    let state = loop {
        if pages.is_some_and(|max| loaded >= max) {
            break loader.state().await;
        }
        let state = loader.on_intersect().await;
        print_new(&loader.cards().await, &mut shown);

        match state {
            LoaderState::Idle => loaded += 1,
            LoaderState::Complete | LoaderState::Error => break state,
            LoaderState::Loading => {}
        }
    };
    loader.wait_prefetch().await;

    println!("{shown} cards, state: {state}");
    if state == LoaderState::Error {
        bail!("feed stopped on a failed page");
    }
    Ok(())
}

fn print_new(cards: &[String], shown: &mut usize) {
    for card in cards.iter().skip(*shown) {
        println!("{}", card_title(card).unwrap_or_else(|| "(untitled)".to_string()));
    }
    *shown = cards.len();
}
