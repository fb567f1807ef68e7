//! item-search: run one index-backed search against a YAML catalog
//!
//! This is the main entry point for the application.

use anyhow::{bail, Context, Result};
use clap::Parser;
use item_search::{
    catalog::Catalog,
    config::{self, Settings},
    index::MemoryIndexProvider,
    items::{ItemId, ItemRepository, MemoryRepository},
    search::{ContentSearch, IndexSwitchTracker, Language, SearchArgs, SearchMode},
    DisplayEntry,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Search a content catalog the way the index-backed search box does
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text to search for
    query: String,

    /// Path to settings.yml
    #[arg(short, long, env = "ITEM_SEARCH_SETTINGS_PATH")]
    config: Option<PathBuf>,

    /// Catalog of items to search
    #[arg(long, env = "ITEM_SEARCH_CATALOG", default_value = "catalog.yml")]
    catalog: PathBuf,

    /// Preferred content language
    #[arg(short, long)]
    lang: Option<String>,

    /// Restrict the search to the subtree under this item
    #[arg(long)]
    root: Option<ItemId>,

    /// Search mode: classic, content-editor or default
    #[arg(long, default_value = "default")]
    mode: SearchMode,

    /// Maximum number of results
    #[arg(long)]
    limit: Option<usize>,

    /// Include hidden items
    #[arg(long)]
    show_hidden: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let settings_path = config::locate(args.config.clone());
    let settings = config::load(settings_path.as_deref())?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(&settings)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Starting item-search v{}", item_search::VERSION);
    match settings_path {
        Some(ref path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }

    let catalog = Catalog::from_file(&args.catalog)
        .with_context(|| format!("failed to load catalog {}", args.catalog.display()))?;
    let repository = catalog.repository();
    let search = build_search(&settings, &catalog, &repository);

    let mut search_args = SearchArgs::new(args.query.clone())
        .with_mode(args.mode)
        .with_limit(args.limit.unwrap_or(settings.search.default_limit))
        .with_hidden_items(args.show_hidden || settings.search.show_hidden_items);
    if let Some(lang) = args.lang {
        search_args = search_args.with_language(Language::new(lang));
    }
    if let Some(root) = args.root {
        match repository.resolve(&root)? {
            Some(item) => search_args = search_args.with_root(item),
            None => bail!("root item {} is not part of the catalog", root),
        }
    }

    let mut entries: Vec<DisplayEntry> = Vec::new();
    let outcome = search.process(&search_args, &mut entries);
    info!("Search finished: {}", outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{}\t{}\t{}", entry.label, entry.icon, entry.address);
        }
    }

    Ok(())
}

/// Log filter from settings, `debug` forcing the debug level
fn log_directive(settings: &Settings) -> String {
    if settings.general.debug {
        "debug".to_string()
    } else {
        settings.general.log_level.clone()
    }
}

/// Wire the catalog into a search executor with one index per configured index
fn build_search(settings: &Settings, catalog: &Catalog, repository: &MemoryRepository) -> ContentSearch {
    let shared: Arc<dyn ItemRepository> = Arc::new(repository.clone());
    let mut provider =
        MemoryIndexProvider::new(shared.clone()).with_max_depth(settings.search.max_ancestor_depth);

    for index_config in &settings.indexes {
        let Some(root) = index_config.root.or_else(|| catalog.root_id()) else {
            warn!("Index {} has no root, skipping", index_config.name);
            continue;
        };
        let index = catalog.index(
            &index_config.name,
            root,
            settings.index_settings(index_config),
            repository,
        );
        info!("Loaded index {} with {} documents", index_config.name, index.len());
        provider.register(root, Arc::new(index));
    }

    let toggles = Arc::new(IndexSwitchTracker::from_settings(settings));
    ContentSearch::new(shared, Arc::new(provider), toggles).with_settings(&settings.search)
}
