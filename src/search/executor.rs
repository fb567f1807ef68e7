//! Search execution: gatekeeping, index lookup, reduction and projection

use super::models::{SearchArgs, SearchMode, SearchOutcome};
use super::strategy::SearchStrategy;
use super::toggles::FeatureToggles;
use crate::cache::SettingsCache;
use crate::config::SearchSettings;
use crate::display::{DisplayProjector, ResultSink};
use crate::index::{CandidateStream, IndexError, IndexProvider, PredicateBuilder, ScopeFilter, SearchContext};
use crate::items::{Item, ItemRepository, RepositoryError, VisibilityCheck, DEFAULT_MAX_ANCESTOR_DEPTH};
use crate::results::{MergePolicy, Reducer, ResultSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Faults that abort a search invocation
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("content tree has no root item")]
    MissingRoot,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Index-backed item search
pub struct ContentSearch {
    repository: Arc<dyn ItemRepository>,
    indexes: Arc<dyn IndexProvider>,
    toggles: Arc<dyn FeatureToggles>,
    /// Tried first for every mode except content-editor
    primary: Option<Arc<dyn SearchStrategy>>,
    predicates: PredicateBuilder,
    settings_cache: SettingsCache,
    max_ancestor_depth: usize,
}

impl ContentSearch {
    /// Create a new search executor
    pub fn new(
        repository: Arc<dyn ItemRepository>,
        indexes: Arc<dyn IndexProvider>,
        toggles: Arc<dyn FeatureToggles>,
    ) -> Self {
        Self {
            repository,
            indexes,
            toggles,
            primary: None,
            predicates: PredicateBuilder::default(),
            settings_cache: SettingsCache::default(),
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
        }
    }

    /// Apply search settings
    pub fn with_settings(mut self, settings: &SearchSettings) -> Self {
        self.predicates = PredicateBuilder::new(settings.exact_match_languages.iter().cloned());
        self.settings_cache = SettingsCache::new(settings.settings_cache_capacity);
        self.max_ancestor_depth = settings.max_ancestor_depth;
        self
    }

    /// Set the primary search strategy
    pub fn with_primary_strategy(mut self, strategy: Arc<dyn SearchStrategy>) -> Self {
        self.primary = Some(strategy);
        self
    }

    pub fn settings_cache(&self) -> &SettingsCache {
        &self.settings_cache
    }

    /// Run one search, writing display entries to `sink`.
    ///
    /// Faults never escape: they are logged and reported as [`SearchOutcome::Failed`]
    /// with nothing written to the sink.
    pub fn process(&self, args: &SearchArgs, sink: &mut dyn ResultSink) -> SearchOutcome {
        if args.use_legacy_search_engine || !self.toggles.content_search_enabled() {
            debug!("Content search disabled, using the legacy search engine");
            return SearchOutcome::LegacyEngine;
        }
        if !self.toggles.is_on() {
            debug!("Index provider is switched off");
            return SearchOutcome::ProviderOff;
        }

        let root = match self.root_item(args) {
            Ok(root) => root,
            Err(e) => {
                error!("Cannot search for '{}': {}", args.text_query, e);
                return SearchOutcome::Failed;
            }
        };

        if args.is_empty() {
            return SearchOutcome::EmptyQuery;
        }

        let index = match self.indexes.index_for(&root) {
            Ok(index) => index,
            Err(IndexError::NotFound(_)) => {
                warn!("No index found for {}", root.id);
                return SearchOutcome::NoIndex;
            }
            Err(e) => {
                error!("Failed to locate index for {}: {}", root.id, e);
                return SearchOutcome::Failed;
            }
        };

        if !self.toggles.is_index_on(index.name()) {
            debug!("Index {} is switched off", index.name());
            return SearchOutcome::ProviderOff;
        }

        let index_settings = self.settings_cache.get_or_load(index.as_ref());

        let results = {
            let context = match index.create_search_context() {
                Ok(context) => context,
                Err(e) => {
                    error!("Invalid search query: {} ({})", args.text_query, e);
                    return SearchOutcome::Failed;
                }
            };

            match self.run_query(args, context.as_ref()) {
                Ok(results) => results,
                Err(e) => {
                    error!("Invalid search query: {} ({})", args.text_query, e);
                    return SearchOutcome::Failed;
                }
            }
        };

        let projector = DisplayProjector::new(self.repository.as_ref(), &index_settings);
        let emitted = projector.project(&results, sink);

        info!(
            "Search '{}' on {} accepted {} results, emitted {}",
            args.text_query,
            index.name(),
            results.len(),
            emitted
        );

        SearchOutcome::Completed { emitted }
    }

    fn root_item(&self, args: &SearchArgs) -> Result<Item, SearchError> {
        if let Some(ref root) = args.root {
            return Ok(root.clone());
        }
        self.repository.root_item()?.ok_or(SearchError::MissingRoot)
    }

    /// Resolve the candidate stream and reduce it into a result set
    fn run_query(&self, args: &SearchArgs, context: &dyn SearchContext) -> Result<ResultSet, SearchError> {
        let scope = ScopeFilter::for_args(args);

        let stream = match self.primary_stream(args, context)? {
            Some(stream) => scope.apply(stream),
            None => {
                let predicate = self.predicates.build(args);
                debug!("Using fallback predicate {:?}", predicate);
                context.lookup(&predicate, &scope)?
            }
        };

        let policy = MergePolicy::new(args.preferred_language(), args.mode);
        let mut reducer = Reducer::new(args.limit, policy);
        if !args.show_hidden_items {
            reducer = reducer.with_visibility(
                VisibilityCheck::new(self.repository.as_ref()).with_max_depth(self.max_ancestor_depth),
            );
        }

        Ok(reducer.reduce(stream)?)
    }

    /// Stream from the primary strategy, or `None` when the fallback should run
    fn primary_stream<'a>(
        &self,
        args: &SearchArgs,
        context: &'a dyn SearchContext,
    ) -> Result<Option<CandidateStream<'a>>, IndexError> {
        if args.mode == SearchMode::ContentEditor {
            return Ok(None);
        }
        let Some(ref primary) = self.primary else {
            return Ok(None);
        };
        let Some(stream) = primary.search(args, context)? else {
            return Ok(None);
        };

        let mut stream = stream.peekable();
        if stream.peek().is_none() {
            debug!("Primary strategy returned no results");
            return Ok(None);
        }
        Ok(Some(Box::new(stream)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexSettings, MemoryIndex, MemoryIndexProvider, Predicate, SearchIndex};
    use crate::items::{ItemId, ItemUri, MemoryRepository};
    use crate::results::{CandidateMatch, DisplayEntry};
    use crate::search::{IndexSwitchTracker, Language};
    use crate::testing::capture_logs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::Level;

    const INDEX: &str = "master_index";

    struct Fixture {
        repo: MemoryRepository,
        root: ItemId,
        content: ItemId,
        documents: Vec<CandidateMatch>,
    }

    impl Fixture {
        fn new() -> Self {
            let root = ItemId::random();
            let content = ItemId::random();
            let mut repo = MemoryRepository::new();
            repo.insert(Item::new(root, "sitecore"));
            repo.insert(Item::new(content, "content").with_parent(root));
            repo.set_root(root);

            Self {
                repo,
                root,
                content,
                documents: Vec::new(),
            }
        }

        /// Add an item under `content` and return its id
        fn item(&mut self, name: &str) -> ItemId {
            let id = ItemId::random();
            self.repo.insert(Item::new(id, name).with_parent(self.content));
            id
        }

        fn version(&mut self, id: ItemId, name: &str, language: &str, version: u32) {
            let lineage = self.repo.lineage(&id);
            self.documents.push(
                CandidateMatch::new(id, name, language, version)
                    .with_paths(lineage)
                    .with_uri(ItemUri::new("master", id, language, version)),
            );
        }

        fn index(&self) -> Arc<MemoryIndex> {
            Arc::new(
                MemoryIndex::new(INDEX)
                    .with_settings(IndexSettings {
                        default_icon: Some("Applications/16x16/document.png".to_string()),
                    })
                    .with_documents(self.documents.clone()),
            )
        }

        fn search_with(&self, index: Arc<dyn SearchIndex>, toggles: Arc<IndexSwitchTracker>) -> ContentSearch {
            let repo: Arc<dyn ItemRepository> = Arc::new(self.repo.clone());
            let provider = MemoryIndexProvider::new(repo.clone()).with_index(self.root, index);
            ContentSearch::new(repo, Arc::new(provider), toggles)
        }

        fn search(&self) -> ContentSearch {
            self.search_with(self.index(), Arc::new(IndexSwitchTracker::default()))
        }
    }

    fn run(search: &ContentSearch, args: &SearchArgs) -> (SearchOutcome, Vec<DisplayEntry>) {
        let mut sink = Vec::new();
        let outcome = search.process(args, &mut sink);
        (outcome, sink)
    }

    fn labels(entries: &[DisplayEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_capacity_bounds_results() {
        let mut fx = Fixture::new();
        for name in ["sample x", "sample y", "sample z"] {
            let id = fx.item(name);
            fx.version(id, name, "en", 1);
        }

        let (outcome, entries) = run(&fx.search(), &SearchArgs::new("sample").with_limit(2));
        assert_eq!(outcome, SearchOutcome::Completed { emitted: 2 });
        assert_eq!(outcome.emitted(), 2);
        assert_eq!(labels(&entries), vec!["sample x", "sample y"]);
    }

    #[test]
    fn test_classic_mode_keeps_duplicates() {
        let mut fx = Fixture::new();
        let id = fx.item("sample");
        fx.version(id, "sample", "en", 1);
        fx.version(id, "sample", "en", 2);

        let args = SearchArgs::new("sample").with_mode(SearchMode::Classic);
        let (_, entries) = run(&fx.search(), &args);
        assert_eq!(entries.len(), 2);

        let (_, entries) = run(&fx.search(), &SearchArgs::new("sample"));
        assert_eq!(entries.len(), 1);
        assert!(entries[0].address.ends_with("ver=2"));
    }

    #[test]
    fn test_language_preference() {
        let mut fx = Fixture::new();
        let id = fx.item("sample");
        fx.version(id, "sample", "fr", 5);
        fx.version(id, "sample", "en", 1);

        let args = SearchArgs::new("sample").with_language(Language::new("en"));
        let (_, entries) = run(&fx.search(), &args);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].address.contains("lang=en"));
        assert!(entries[0].address.ends_with("ver=1"));
    }

    #[test]
    fn test_hidden_items_filtered() {
        let mut fx = Fixture::new();
        let folder = fx.item("system");
        fx.repo.insert(Item::new(folder, "system").with_parent(fx.content).hidden());
        let buried = ItemId::random();
        fx.repo.insert(Item::new(buried, "sample settings").with_parent(folder));
        fx.version(buried, "sample settings", "en", 1);
        let visible = fx.item("sample page");
        fx.version(visible, "sample page", "en", 1);

        let (_, entries) = run(&fx.search(), &SearchArgs::new("sample"));
        assert_eq!(labels(&entries), vec!["sample page"]);

        let args = SearchArgs::new("sample").with_hidden_items(true);
        let (_, entries) = run(&fx.search(), &args);
        assert_eq!(labels(&entries), vec!["sample settings", "sample page"]);
    }

    #[test]
    fn test_root_scope_restricts_subtree() {
        let mut fx = Fixture::new();
        let site = fx.item("site");
        let inside = ItemId::random();
        fx.repo.insert(Item::new(inside, "sample inside").with_parent(site));
        fx.version(inside, "sample inside", "en", 1);
        let outside = fx.item("sample outside");
        fx.version(outside, "sample outside", "en", 1);

        let site_item = fx.repo.resolve(&site).unwrap().unwrap();
        let args = SearchArgs::new("sample").with_root(site_item.clone());
        let (_, entries) = run(&fx.search(), &args);
        assert_eq!(labels(&entries), vec!["sample inside"]);

        // content-editor searches ignore the subtree restriction
        let editor = args.with_mode(SearchMode::ContentEditor);
        let (_, entries) = run(&fx.search(), &editor);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_query_fault_discards_results_and_logs_error() {
        struct FaultyIndex {
            open: Arc<AtomicUsize>,
        }
        struct FaultyContext {
            open: Arc<AtomicUsize>,
        }

        impl SearchContext for FaultyContext {
            fn lookup<'a>(
                &'a self,
                _predicate: &Predicate,
                _scope: &ScopeFilter,
            ) -> Result<CandidateStream<'a>, IndexError> {
                let good = CandidateMatch::new(ItemId::random(), "sample", "en", 1);
                Ok(Box::new(
                    vec![Ok(good), Err(IndexError::Query("unbalanced quote".to_string()))].into_iter(),
                ))
            }
        }

        impl Drop for FaultyContext {
            fn drop(&mut self) {
                self.open.fetch_sub(1, Ordering::SeqCst);
            }
        }

        impl SearchIndex for FaultyIndex {
            fn name(&self) -> &str {
                INDEX
            }
            fn settings(&self) -> IndexSettings {
                IndexSettings::default()
            }
            fn create_search_context(&self) -> Result<Box<dyn SearchContext + '_>, IndexError> {
                self.open.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FaultyContext {
                    open: self.open.clone(),
                }))
            }
        }

        let fx = Fixture::new();
        let open = Arc::new(AtomicUsize::new(0));
        let index = Arc::new(FaultyIndex { open: open.clone() });
        let search = fx.search_with(index, Arc::new(IndexSwitchTracker::default()));

        let (logs, (outcome, entries)) = capture_logs(|| run(&search, &SearchArgs::new("\"sample")));
        assert_eq!(outcome, SearchOutcome::Failed);
        assert!(entries.is_empty());
        assert_eq!(open.load(Ordering::SeqCst), 0);

        let errors = logs.at(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("\"sample"));
    }

    #[test]
    fn test_context_released_when_primary_strategy_fails() {
        struct FailingStrategy;

        impl SearchStrategy for FailingStrategy {
            fn search<'a>(
                &self,
                _args: &SearchArgs,
                _context: &'a dyn SearchContext,
            ) -> Result<Option<CandidateStream<'a>>, IndexError> {
                Err(IndexError::Query("strategy unavailable".to_string()))
            }
        }

        let mut fx = Fixture::new();
        let id = fx.item("sample");
        fx.version(id, "sample", "en", 1);

        let index = fx.index();
        let search = fx
            .search_with(index.clone(), Arc::new(IndexSwitchTracker::default()))
            .with_primary_strategy(Arc::new(FailingStrategy));

        let (logs, (outcome, entries)) = capture_logs(|| run(&search, &SearchArgs::new("sample")));
        assert_eq!(outcome, SearchOutcome::Failed);
        assert_eq!(outcome.emitted(), 0);
        assert!(entries.is_empty());
        assert_eq!(index.open_contexts(), 0);
        assert_eq!(logs.at(Level::ERROR).len(), 1);
    }

    #[test]
    fn test_missing_index_logs_warning() {
        let fx = Fixture::new();
        let repo: Arc<dyn ItemRepository> = Arc::new(fx.repo.clone());
        let provider = MemoryIndexProvider::new(repo.clone());
        let search = ContentSearch::new(repo, Arc::new(provider), Arc::new(IndexSwitchTracker::default()));

        let (logs, (outcome, entries)) = capture_logs(|| run(&search, &SearchArgs::new("sample")));
        assert_eq!(outcome, SearchOutcome::NoIndex);
        assert!(entries.is_empty());
        assert_eq!(logs.at(Level::WARN).len(), 1);
        assert!(logs.at(Level::ERROR).is_empty());
    }

    #[test]
    fn test_toggles_short_circuit() {
        let mut fx = Fixture::new();
        let id = fx.item("sample");
        fx.version(id, "sample", "en", 1);
        let args = SearchArgs::new("sample");

        let toggles = Arc::new(IndexSwitchTracker::new(false));
        let (outcome, entries) = run(&fx.search_with(fx.index(), toggles.clone()), &args);
        assert_eq!(outcome, SearchOutcome::LegacyEngine);
        assert!(entries.is_empty());

        toggles.set_content_search_enabled(true);
        toggles.turn_off_index(INDEX);
        let (outcome, _) = run(&fx.search_with(fx.index(), toggles.clone()), &args);
        assert_eq!(outcome, SearchOutcome::ProviderOff);

        toggles.turn_on_index(INDEX);
        toggles.turn_off();
        let (outcome, _) = run(&fx.search_with(fx.index(), toggles.clone()), &args);
        assert_eq!(outcome, SearchOutcome::ProviderOff);

        let (outcome, _) = run(&fx.search(), &args.clone().with_legacy_engine(true));
        assert_eq!(outcome, SearchOutcome::LegacyEngine);
    }

    #[test]
    fn test_empty_query() {
        let fx = Fixture::new();
        let (outcome, entries) = run(&fx.search(), &SearchArgs::new(""));
        assert_eq!(outcome, SearchOutcome::EmptyQuery);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let repo: Arc<dyn ItemRepository> = Arc::new(MemoryRepository::new());
        let provider = MemoryIndexProvider::new(repo.clone());
        let search = ContentSearch::new(repo, Arc::new(provider), Arc::new(IndexSwitchTracker::default()));

        let (outcome, _) = run(&search, &SearchArgs::new("sample"));
        assert_eq!(outcome, SearchOutcome::Failed);
    }

    #[test]
    fn test_context_released_after_search() {
        let mut fx = Fixture::new();
        let id = fx.item("sample");
        fx.version(id, "sample", "en", 1);

        let index = fx.index();
        let search = fx.search_with(index.clone(), Arc::new(IndexSwitchTracker::default()));
        run(&search, &SearchArgs::new("sample"));
        assert_eq!(index.open_contexts(), 0);

        let settings = search.settings_cache().get(INDEX).unwrap();
        assert_eq!(
            settings.default_icon.as_deref(),
            Some("Applications/16x16/document.png")
        );
    }

    struct FixedStrategy {
        documents: Vec<CandidateMatch>,
        calls: AtomicUsize,
    }

    impl SearchStrategy for FixedStrategy {
        fn search<'a>(
            &self,
            _args: &SearchArgs,
            _context: &'a dyn SearchContext,
        ) -> Result<Option<CandidateStream<'a>>, IndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Box::new(self.documents.clone().into_iter().map(Ok::<_, IndexError>))))
        }
    }

    #[test]
    fn test_primary_strategy_preferred() {
        let mut fx = Fixture::new();
        let indexed = fx.item("sample indexed");
        fx.version(indexed, "sample indexed", "en", 1);
        let primary_item = fx.item("primary hit");

        let strategy = Arc::new(FixedStrategy {
            documents: vec![CandidateMatch::new(primary_item, "primary hit", "en", 1)
                .with_paths(fx.repo.lineage(&primary_item))],
            calls: AtomicUsize::new(0),
        });
        let search = fx.search().with_primary_strategy(strategy.clone());

        let (_, entries) = run(&search, &SearchArgs::new("sample"));
        assert_eq!(labels(&entries), vec!["primary hit"]);

        // content-editor mode skips the primary strategy
        let editor = SearchArgs::new("sample").with_mode(SearchMode::ContentEditor);
        let (_, entries) = run(&search, &editor);
        assert_eq!(labels(&entries), vec!["sample indexed"]);
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_primary_falls_back() {
        let mut fx = Fixture::new();
        let id = fx.item("sample");
        fx.version(id, "sample", "en", 1);

        let strategy = Arc::new(FixedStrategy {
            documents: Vec::new(),
            calls: AtomicUsize::new(0),
        });
        let search = fx.search().with_primary_strategy(strategy.clone());

        let (_, entries) = run(&search, &SearchArgs::new("sample"));
        assert_eq!(labels(&entries), vec!["sample"]);
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_primary_results_respect_root_scope() {
        let mut fx = Fixture::new();
        let site = fx.item("site");
        let elsewhere = fx.item("elsewhere");

        let strategy = Arc::new(FixedStrategy {
            documents: vec![CandidateMatch::new(elsewhere, "elsewhere", "en", 1)
                .with_paths(fx.repo.lineage(&elsewhere))],
            calls: AtomicUsize::new(0),
        });
        let search = fx.search().with_primary_strategy(strategy);

        let site_item = fx.repo.resolve(&site).unwrap().unwrap();
        let (outcome, entries) = run(&search, &SearchArgs::new("elsewhere").with_root(site_item));
        assert_eq!(outcome, SearchOutcome::Completed { emitted: 0 });
        assert!(entries.is_empty());
    }
}
