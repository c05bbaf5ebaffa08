use std::{sync::Arc, time::Duration};

use super::{configured, library, searcher, FakeTransport, Reply};
use crate::{
    ai::{AiError, AiSearchOutcome, AiSettings},
    bookmarks::{ScoredBookmark, SearchType},
    search::{
        self, local_search, HybridOptions, LocalSearchOptions, MergeStrategy, Orchestrator,
        SearchHistory, SearchOptions, SearchService, SmartOptions, SuggestionKind,
    },
    storage::MemoryKeyValueStore,
};

fn ids(results: &[ScoredBookmark]) -> Vec<&str> {
    results.iter().map(|r| r.id()).collect()
}

async fn service(transport: Arc<FakeTransport>) -> SearchService {
    let history = SearchHistory::load(Arc::new(MemoryKeyValueStore::new()))
        .await
        .unwrap();
    SearchService::new(Orchestrator::new(searcher(transport)), history)
}

fn step_by_step() -> SmartOptions {
    SmartOptions {
        use_hybrid: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn unconfigured_smart_search_equals_local() {
    let transport = FakeTransport::content("[\"4\"]");
    let orchestrator = Orchestrator::new(searcher(transport.clone()));
    let records = library();

    for query in ["frontend", "tag:rust", "\"composition api\"", "react 排除:vue"] {
        let smart = orchestrator
            .smart_search(query, &records, &AiSettings::Unconfigured, &SmartOptions::default())
            .await;
        let local = local_search(&records, query, LocalSearchOptions::default());
        assert_eq!(smart, local, "query {query:?}");
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn hybrid_union_puts_ai_first() {
    let orchestrator = Orchestrator::new(searcher(FakeTransport::content("[\"2\", \"1\"]")));

    let results = orchestrator
        .hybrid_search("frontend", &library(), &configured(), &HybridOptions::default())
        .await;

    assert_eq!(ids(&results), vec!["2", "1", "3"]);
    assert_eq!(results[0].search_type, Some(SearchType::Ai));
    assert_eq!(results[1].search_type, Some(SearchType::Ai));
    assert_eq!(results[2].search_type, Some(SearchType::Local));
}

#[tokio::test]
async fn hybrid_intersect_keeps_local_order() {
    let orchestrator = Orchestrator::new(searcher(FakeTransport::content("[\"3\", \"2\"]")));
    let opts = HybridOptions {
        merge_strategy: MergeStrategy::Intersect,
        ..Default::default()
    };

    let results = orchestrator
        .hybrid_search("frontend", &library(), &configured(), &opts)
        .await;
    assert_eq!(ids(&results), vec!["3"]);
}

#[tokio::test(start_paused = true)]
async fn hybrid_timeout_returns_local() {
    let orchestrator = Orchestrator::new(searcher(FakeTransport::new(Reply::Hang)))
        .with_timeout(Duration::from_secs(1));
    let records = library();

    let results = orchestrator
        .hybrid_search("frontend", &records, &configured(), &HybridOptions::default())
        .await;

    assert_eq!(
        results,
        local_search(&records, "frontend", LocalSearchOptions::default())
    );
}

#[tokio::test]
async fn blank_query_is_empty_everywhere() {
    let transport = FakeTransport::content("[\"1\"]");
    let orchestrator = Orchestrator::new(searcher(transport.clone()));

    let hybrid = orchestrator
        .hybrid_search("   ", &library(), &configured(), &HybridOptions::default())
        .await;
    assert!(hybrid.is_empty());

    let smart = orchestrator
        .smart_search("", &library(), &configured(), &step_by_step())
        .await;
    assert!(smart.is_empty());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn threshold_escalates_to_ai() {
    let transport = FakeTransport::content("[\"3\"]");
    let orchestrator = Orchestrator::new(searcher(transport.clone()));

    // two local hits, below the default threshold of five
    let results = orchestrator
        .smart_search("frontend", &library(), &configured(), &step_by_step())
        .await;
    assert_eq!(ids(&results), vec!["3"]);
    assert_eq!(transport.calls(), 1);

    let opts = SmartOptions {
        ai_threshold: 2,
        ..step_by_step()
    };
    let results = orchestrator
        .smart_search("frontend", &library(), &configured(), &opts)
        .await;
    assert_eq!(ids(&results), vec!["1", "3"]);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn threshold_keeps_local_when_ai_finds_nothing() {
    let orchestrator = Orchestrator::new(searcher(FakeTransport::content("[]")));

    let results = orchestrator
        .smart_search("frontend", &library(), &configured(), &step_by_step())
        .await;
    assert_eq!(ids(&results), vec!["1", "3"]);
}

#[tokio::test]
async fn prefer_ai_returns_ai_even_when_empty() {
    let opts = SmartOptions {
        prefer_ai: true,
        ..step_by_step()
    };

    let orchestrator = Orchestrator::new(searcher(FakeTransport::content("[]")));
    let results = orchestrator
        .smart_search("frontend", &library(), &configured(), &opts)
        .await;
    assert!(results.is_empty());

    let orchestrator =
        Orchestrator::new(searcher(FakeTransport::new(Reply::Error("down".to_string()))));
    let results = orchestrator
        .smart_search("frontend", &library(), &configured(), &opts)
        .await;
    assert_eq!(ids(&results), vec!["1", "3"]);
}

#[tokio::test]
async fn empty_search_leaves_history_alone() {
    let transport = FakeTransport::content("[\"1\"]");
    let mut service = service(transport.clone()).await;

    let response = service
        .search("  ", &library(), &configured(), SearchOptions::default())
        .await;

    assert!(response.results.is_empty());
    assert!(response.suggestions.is_empty());
    assert_eq!(response.stats.total, 0);
    assert_eq!(response.stats.matched, 0);
    assert!(service.history().entries().is_empty());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn search_records_history_and_stats() {
    let transport = FakeTransport::content("[\"2\"]");
    let mut service = service(transport.clone()).await;
    let records = library();

    let opts = SearchOptions {
        use_ai: false,
        ..Default::default()
    };
    let response = service.search("tag:frontend", &records, &configured(), opts).await;

    assert_eq!(ids(&response.results), vec!["1", "3"]);
    assert_eq!(response.stats.total, 4);
    assert_eq!(response.stats.matched, 2);
    assert_eq!(response.stats.query, "tag:frontend");
    assert!(response.stats.has_advanced);
    assert!(response.stats.timestamp > 0);
    assert_eq!(service.history().entries(), ["tag:frontend"]);
    assert_eq!(transport.calls(), 0);

    let opts = SearchOptions {
        history: false,
        ..Default::default()
    };
    let response = service.search("rust", &records, &configured(), opts).await;
    assert!(!response.stats.has_advanced);
    assert_eq!(service.history().entries(), ["tag:frontend"]);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn search_attaches_suggestions() {
    let mut service = service(FakeTransport::content("[]")).await;
    let records = library();
    let opts = SearchOptions {
        use_ai: false,
        ..Default::default()
    };

    service.search("react hooks", &records, &AiSettings::Unconfigured, opts).await;
    let response = service.search("react", &records, &AiSettings::Unconfigured, opts).await;

    let history: Vec<&str> = response
        .suggestions
        .iter()
        .filter(|s| s.kind == SuggestionKind::History)
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(history, vec!["react", "react hooks"]);
    assert!(response
        .suggestions
        .iter()
        .any(|s| s.kind == SuggestionKind::Tag && s.text == "react"));
}

#[tokio::test]
async fn ai_suggestions_are_tagged() {
    let service = service(FakeTransport::content("[\"react router\"]")).await;

    let list = service.ai_suggestions("react", &configured()).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].kind, SuggestionKind::Ai);
    assert_eq!(list[0].text, "react router");
}

#[tokio::test(start_paused = true)]
async fn ai_suggestions_respect_configured_timeout() {
    let slow = FakeTransport::delayed(
        Reply::Content("[\"react router\"]".to_string()),
        Duration::from_secs(2),
    );
    let history = SearchHistory::load(Arc::new(MemoryKeyValueStore::new()))
        .await
        .unwrap();
    let orchestrator = Orchestrator::new(searcher(slow)).with_timeout(Duration::from_secs(1));
    let service = SearchService::new(orchestrator, history);
    assert!(service.ai_suggestions("react", &configured()).await.is_empty());

    let history = SearchHistory::load(Arc::new(MemoryKeyValueStore::new()))
        .await
        .unwrap();
    let orchestrator = Orchestrator::new(searcher(FakeTransport::delayed(
        Reply::Content("[\"react router\"]".to_string()),
        Duration::from_secs(2),
    )))
    .with_timeout(Duration::from_secs(3));
    let service = SearchService::new(orchestrator, history);
    assert_eq!(service.ai_suggestions("react", &configured()).await.len(), 1);
}

#[tokio::test]
async fn ai_search_fails_only_when_strict() {
    let service = service(FakeTransport::new(Reply::Error("503".to_string()))).await;

    let outcome = service.ai_search("react", &library(), &configured(), true).await;
    assert!(matches!(outcome, AiSearchOutcome::Deferred));

    let outcome = service.ai_search("react", &library(), &configured(), false).await;
    assert!(matches!(outcome, AiSearchOutcome::Failed(AiError::Transport(_))));

    let outcome = service
        .ai_search("react", &library(), &AiSettings::Unconfigured, false)
        .await;
    assert!(matches!(outcome, AiSearchOutcome::Failed(AiError::NotConfigured)));
}

#[tokio::test]
async fn clear_history_forgets_cached_rankings() {
    let transport = FakeTransport::content("[\"2\"]");
    let mut service = service(transport.clone()).await;
    let records = library();

    service.search("rust", &records, &configured(), SearchOptions::default()).await;
    service.ai_search("rust", &records, &configured(), true).await;
    let before = transport.calls();

    service.clear_history().await.unwrap();
    assert!(service.history().entries().is_empty());

    service.ai_search("rust", &records, &configured(), true).await;
    assert_eq!(transport.calls(), before + 1);
}

#[test]
fn quick_and_advanced_limits() {
    let records: Vec<_> = (0..150)
        .map(|i| super::bookmark(&i.to_string(), &format!("rust note {i}"), "https://x.dev", &["rust"]))
        .collect();

    assert_eq!(search::quick_search("rust", &records).len(), 20);
    assert_eq!(search::advanced_search("rust", &records).len(), 50);
    assert_eq!(search::advanced_search("tag:rust", &records).len(), 100);
}
