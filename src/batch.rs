//! Batch driver
//!
//! Loads every document named in a list file, learns abbreviations from all
//! of them, then resolves the documents concurrently on a bounded pool of
//! blocking workers. A failing document is recorded and skipped; it never
//! stops the others and never leaves a partial response file behind.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::markup::RootElement;
use crate::pipeline::{CorefPipeline, Document};
use crate::ResolverConfig;

/// A document that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Input path, or the document identifier for in-memory documents
    pub source: PathBuf,
    pub error: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Response files written, in completion order
    pub written: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, source: PathBuf, err: &Error) {
        warn!(source = %source.display(), error = %err, "document failed");
        self.failed.push(BatchFailure {
            source,
            error: err.to_string(),
        });
    }
}

/// Resolves many documents and writes one response file per document
pub struct BatchResolver {
    config: ResolverConfig,
    root: RootElement,
}

impl BatchResolver {
    /// Create a batch resolver
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: ResolverConfig) -> Result<Self> {
        // Reject unusable strategies before any file is touched
        crate::resolver::Resolver::new(config.strategy)?;
        let root = RootElement::new(config.root_element.clone())?;

        Ok(Self { config, root })
    }

    /// Paths named in a list file, one per line, blank lines skipped
    ///
    /// # Errors
    ///
    /// Returns an error if the list file cannot be read
    pub async fn read_list(list_file: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let list_file = list_file.as_ref();
        let contents = tokio::fs::read_to_string(list_file)
            .await
            .map_err(|e| Error::file(list_file, e))?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    /// Resolve every document named in `list_file` into `output_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the list file cannot be read or the output
    /// directory cannot be created. Per-document failures are reported in
    /// the returned [`BatchReport`] instead.
    pub async fn run(&self, list_file: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<BatchReport> {
        let paths = Self::read_list(list_file).await?;
        info!(documents = paths.len(), "loading batch");

        let mut report = BatchReport::default();
        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            match Document::load(&path).await {
                Ok(document) => loaded.push((path, document)),
                Err(e) => report.fail(path, &e),
            }
        }

        self.resolve_loaded(loaded, output_dir.as_ref(), report).await
    }

    /// Resolve documents already in memory into `output_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created
    pub async fn resolve_documents(
        &self,
        documents: Vec<Document>,
        output_dir: impl AsRef<Path>,
    ) -> Result<BatchReport> {
        let loaded = documents
            .into_iter()
            .map(|document| (PathBuf::from(&document.id), document))
            .collect();

        self.resolve_loaded(loaded, output_dir.as_ref(), BatchReport::default())
            .await
    }

    async fn resolve_loaded(
        &self,
        loaded: Vec<(PathBuf, Document)>,
        output_dir: &Path,
        mut report: BatchReport,
    ) -> Result<BatchReport> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::file(output_dir, e))?;

        let mut abbreviations = self.config.base_abbreviations();
        let learned: usize = loaded
            .iter()
            .map(|(_, document)| abbreviations.learn_from_decoded(&document.decoded_text(&self.root)))
            .sum();
        debug!(learned, total = abbreviations.len(), "abbreviation set frozen");

        let pipeline = Arc::new(CorefPipeline::with_abbreviations(&self.config, abbreviations)?);
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut sources = Vec::with_capacity(loaded.len());

        for (index, (source, document)) in loaded.into_iter().enumerate() {
            let pipeline = Arc::clone(&pipeline);
            let semaphore = Arc::clone(&semaphore);
            let target = self.response_path(output_dir, &document.id);

            sources.push(Some(source));
            tasks.spawn(async move { (index, process(pipeline, semaphore, document, target).await) });
        }

        collect_outcomes(tasks, sources, &mut report).await;

        if report.is_success() {
            info!(written = report.written.len(), "batch complete");
        } else {
            error!(
                written = report.written.len(),
                failed = report.failed.len(),
                "batch complete with failures"
            );
        }

        Ok(report)
    }

    /// `<output_dir>/<id>.<extension>`
    #[must_use]
    pub fn response_path(&self, output_dir: &Path, id: &str) -> PathBuf {
        let extension = self.config.response_extension.trim_start_matches('.');
        if extension.is_empty() {
            output_dir.join(id)
        } else {
            output_dir.join(format!("{id}.{extension}"))
        }
    }
}

/// Drain every task into `report`
///
/// A task that dies without reporting back is charged to one of the sources
/// that never reported, in spawn order.
async fn collect_outcomes(
    mut tasks: JoinSet<(usize, Result<PathBuf>)>,
    mut sources: Vec<Option<PathBuf>>,
    report: &mut BatchReport,
) {
    let mut lost = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                let source = sources.get_mut(index).and_then(Option::take).unwrap_or_default();
                match outcome {
                    Ok(path) => report.written.push(path),
                    Err(e) => report.fail(source, &e),
                }
            }
            Err(e) => lost.push(Error::from(e)),
        }
    }

    let unreported = sources.into_iter().flatten();
    for (source, err) in unreported.zip(lost) {
        report.fail(source, &err);
    }
}

async fn process(
    pipeline: Arc<CorefPipeline>,
    semaphore: Arc<Semaphore>,
    document: Document,
    target: PathBuf,
) -> Result<PathBuf> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| Error::Batch(format!("worker pool closed: {e}")))?;

    let resolved = tokio::task::spawn_blocking(move || pipeline.resolve(&document)).await??;
    write_atomically(&target, &resolved.text).await?;

    debug!(document = %resolved.id, path = %target.display(), "response written");
    Ok(target)
}

/// Write `contents` to a hidden sibling of `target`, then rename it into place
///
/// # Errors
///
/// Returns an error naming the file that could not be written or renamed
pub async fn write_atomically(target: &Path, contents: &str) -> Result<()> {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{file_name}.tmp"));

    if let Err(e) = tokio::fs::write(&temp, contents).await {
        tokio::fs::remove_file(&temp).await.ok();
        return Err(Error::file(temp, e));
    }
    if let Err(e) = tokio::fs::rename(&temp, target).await {
        tokio::fs::remove_file(&temp).await.ok();
        return Err(Error::file(target, e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StrategyKind;

    #[test]
    fn test_response_path() {
        let batch = BatchResolver::new(ResolverConfig::default()).unwrap();
        assert_eq!(
            batch.response_path(Path::new("out"), "doc1"),
            PathBuf::from("out/doc1.response")
        );

        let batch =
            BatchResolver::new(ResolverConfig::new().with_response_extension(".coref")).unwrap();
        assert_eq!(
            batch.response_path(Path::new("out"), "doc1"),
            PathBuf::from("out/doc1.coref")
        );
    }

    #[test]
    fn test_rejects_unimplemented_strategy() {
        let config = ResolverConfig::new().with_strategy(StrategyKind::Centering);
        assert!(matches!(BatchResolver::new(config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_read_list_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("files.list");
        tokio::fs::write(&list, "a.input\n\n  b.input  \n").await.unwrap();

        let paths = BatchResolver::read_list(&list).await.unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.input"), PathBuf::from("b.input")]);
    }

    #[tokio::test]
    async fn test_missing_list_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.list");

        let result = BatchResolver::read_list(&missing).await;
        assert!(matches!(result, Err(Error::File { .. })));
    }

    #[tokio::test]
    async fn test_write_atomically_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("d.response");

        write_atomically(&target, "<TXT>x</TXT>\n").await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&target).await.unwrap(), "<TXT>x</TXT>\n");
        assert!(!dir.path().join(".d.response.tmp").exists());
    }

    fn dies() -> (usize, Result<PathBuf>) {
        panic!("worker died")
    }

    #[tokio::test]
    async fn test_failed_task_does_not_stop_siblings() {
        let mut tasks: JoinSet<(usize, Result<PathBuf>)> = JoinSet::new();
        tasks.spawn(async { (0, Ok(PathBuf::from("out/a.response"))) });
        tasks.spawn(async { dies() });
        tasks.spawn(async {
            (
                2,
                Err(Error::Annotation("tagger unavailable".to_string())),
            )
        });

        let sources = vec![
            Some(PathBuf::from("a.input")),
            Some(PathBuf::from("b.input")),
            Some(PathBuf::from("c.input")),
        ];
        let mut report = BatchReport::default();
        collect_outcomes(tasks, sources, &mut report).await;

        assert_eq!(report.written, vec![PathBuf::from("out/a.response")]);
        assert_eq!(report.failed.len(), 2);

        let mut failed: Vec<&Path> = report.failed.iter().map(|f| f.source.as_path()).collect();
        failed.sort();
        assert_eq!(failed, vec![Path::new("b.input"), Path::new("c.input")]);
    }

    #[tokio::test]
    async fn test_resolve_documents_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BatchResolver::new(ResolverConfig::new().with_max_concurrency(2)).unwrap();

        let documents = vec![
            Document::new("one", r#"<TXT><COREF ID="A1">The bank</COREF> failed.</TXT>"#),
            Document::new("two", r#"<TXT>A dog barked.</TXT>"#),
        ];

        let report = batch.resolve_documents(documents, dir.path()).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.written.len(), 2);
        let two = tokio::fs::read_to_string(dir.path().join("two.response")).await.unwrap();
        assert_eq!(two, "<TXT><COREF ID=\"X1\">A dog</COREF> barked .</TXT>\n");
    }
}
