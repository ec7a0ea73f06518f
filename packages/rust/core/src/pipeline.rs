//! End-to-end `import` pipeline: knowledge model + graph → crawl → replies document.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use kmimport_crawler::{CrawlSummary, Crawler};
use kmimport_graph::ntriples;
use kmimport_km::KnowledgeModel;
use kmimport_replies::{RepliesDocument, ReplyStore};
use kmimport_shared::{CrawlConfig, Result};

/// Configuration for the `import` pipeline.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Knowledge model JSON document.
    pub km_path: PathBuf,
    /// N-Triples / N-Quads graph.
    pub graph_path: PathBuf,
    /// Where to write the replies document; `None` keeps it in memory only.
    pub output: Option<PathBuf>,
    /// Annotation keys and prefixes.
    pub crawl: CrawlConfig,
    /// Pretty-print the replies JSON.
    pub pretty: bool,
}

/// Result of the `import` pipeline.
#[derive(Debug)]
pub struct ImportResult {
    /// Replies produced by the crawl.
    pub document: RepliesDocument,
    /// Crawl counters.
    pub summary: CrawlSummary,
    /// Statements in the parsed graph.
    pub statements: usize,
    /// Path the document was written to, if any.
    pub output: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &ImportResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &ImportResult) {}
}

/// Run the full `import` pipeline.
///
/// 1. Load the knowledge model
/// 2. Parse the graph
/// 3. Crawl the model against the graph into a [`ReplyStore`]
/// 4. Write the replies document (when an output path is set)
#[instrument(skip_all, fields(km = %config.km_path.display(), graph = %config.graph_path.display()))]
pub fn import(config: &ImportConfig, progress: &dyn ProgressReporter) -> Result<ImportResult> {
    let start = Instant::now();

    // --- Phase 1: Knowledge model ---
    progress.phase("Loading knowledge model");
    let km = KnowledgeModel::load_from(&config.km_path)?;

    let missing = km.missing_references();
    if !missing.is_empty() {
        warn!(
            count = missing.len(),
            first = %missing[0],
            "knowledge model references entities it does not define; they will be skipped"
        );
    }

    // --- Phase 2: Graph ---
    progress.phase("Parsing graph");
    let graph = ntriples::read_file(&config.graph_path)?;

    // --- Phase 3: Crawl ---
    progress.phase("Matching graph to questions");
    let mut store = ReplyStore::new();
    let summary = Crawler::new(&km, &graph, config.crawl.clone()).crawl(&mut store)?;
    let document = store.document(km.uuid);

    // --- Phase 4: Output ---
    if let Some(path) = &config.output {
        progress.phase("Writing replies");
        document.write_to(path, config.pretty)?;
        info!(path = %path.display(), replies = document.replies.len(), "replies written");
    }

    let result = ImportResult {
        document,
        summary,
        statements: graph.len(),
        output: config.output.clone(),
        elapsed: start.elapsed(),
    };

    info!(
        statements = result.statements,
        items = result.summary.items_created,
        replies = result.summary.replies_set,
        elapsed_ms = result.elapsed.as_millis(),
        "import completed"
    );
    progress.done(&result);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use kmimport_shared::{ImportError, ReplyValue};
    use uuid::Uuid;

    const KM_FIXTURE: &str = "../../../fixtures/km/persons.km.json";
    const GRAPH_FIXTURE: &str = "../../../fixtures/rdf/persons.nt";

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn fixture_config(output: Option<PathBuf>) -> ImportConfig {
        ImportConfig {
            km_path: PathBuf::from(KM_FIXTURE),
            graph_path: PathBuf::from(GRAPH_FIXTURE),
            output,
            crawl: CrawlConfig::default(),
            pretty: true,
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn done(&self, _result: &ImportResult) {
            self.phases.lock().unwrap().push("done".into());
        }
    }

    #[test]
    fn import_fixture_in_memory() {
        let result = import(&fixture_config(None), &SilentProgress).expect("import");

        assert_eq!(result.statements, 8);
        assert_eq!(result.document.knowledge_model_uuid, id(0));
        assert_eq!(
            result.summary,
            CrawlSummary {
                chapters: 2,
                // persons list, 3 templates × 2 people, title, license, upload
                questions_visited: 10,
                items_created: 2,
                // alice: name, smokes, languages; title; license
                replies_set: 5,
            }
        );

        let replies = &result.document.replies;
        let persons_key = format!("{}.{}", id(1), id(0x10));
        let Some(ReplyValue::ItemList(items)) = replies.get(&persons_key) else {
            panic!("missing persons item list");
        };
        assert_eq!(items.len(), 2);

        let alice = format!("{persons_key}.{}", items[0]);
        assert_eq!(
            replies.get(&format!("{alice}.{}", id(0x11))),
            Some(&ReplyValue::String("Alice".into()))
        );
        assert_eq!(
            replies.get(&format!("{alice}.{}", id(0x12))),
            Some(&ReplyValue::Answer(id(0x31)))
        );
        assert_eq!(
            replies.get(&format!("{alice}.{}", id(0x13))),
            Some(&ReplyValue::MultiChoice(vec![id(0x40), id(0x41)]))
        );

        let bob = format!("{persons_key}.{}", items[1]);
        assert!(!replies.keys().any(|k| k.starts_with(&format!("{bob}."))));

        assert_eq!(
            replies.get(&format!("{}.{}", id(2), id(0x20))),
            Some(&ReplyValue::String("Open Data Pilot".into()))
        );
        assert_eq!(
            replies.get(&format!("{}.{}", id(2), id(0x21))),
            Some(&ReplyValue::String(
                "https://creativecommons.org/licenses/by/4.0/".into()
            ))
        );
        assert!(!replies.contains_key(&format!("{}.{}", id(2), id(0x22))));
    }

    #[test]
    fn import_writes_output_file() {
        let tmp_dir = std::env::temp_dir().join(format!("kmimport-pipeline-{}", Uuid::now_v7()));
        let out = tmp_dir.join("replies.json");
        let progress = RecordingProgress::default();

        let result = import(&fixture_config(Some(out.clone())), &progress).expect("import");
        assert_eq!(result.output.as_deref(), Some(out.as_path()));

        let written = std::fs::read_to_string(&out).expect("read output");
        let parsed: RepliesDocument = serde_json::from_str(&written).expect("parse output");
        assert_eq!(parsed.replies.len(), result.document.replies.len());

        let phases = progress.phases.lock().unwrap();
        assert_eq!(phases.first().map(String::as_str), Some("Loading knowledge model"));
        assert_eq!(phases.last().map(String::as_str), Some("done"));
        assert!(phases.iter().any(|p| p == "Writing replies"));

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[test]
    fn malformed_graph_aborts_import() {
        let tmp_dir = std::env::temp_dir().join(format!("kmimport-badgraph-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let graph_path = tmp_dir.join("broken.nt");
        std::fs::write(&graph_path, "<http://ex/s> <http://ex/p> .\n").unwrap();

        let mut config = fixture_config(None);
        config.graph_path = graph_path;

        let err = import(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, ImportError::Parse { line: 1, .. }));

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[test]
    fn missing_km_file_is_io_error() {
        let mut config = fixture_config(None);
        config.km_path = PathBuf::from("../../../fixtures/km/does-not-exist.json");

        let err = import(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
