//! Batch fan-out over every discovered email.
//!
//! Emails are split into chunks of `workers` items. Each chunk runs on the
//! blocking thread pool (rendering is synchronous file and CPU work) and up
//! to `workers` chunks run at once. Items of one chunk are processed in
//! discovery order; there is no ordering between chunks.

use futures::{StreamExt, stream};
use std::sync::Arc;
use tracing::{error, info};

use super::EmailPipeline;
use super::report::{BatchReport, ItemReport, Outcome};
use crate::config::Settings;
use crate::core::Result;
use crate::models::Email;
use crate::utils::fs::{discovery, remove_dir_all};
use crate::utils::progress::MarkerProgress;
use crate::validator::ExpectedCountsCache;

/// Render every email selected by `settings`.
///
/// Without an `exclusive` filter the destination directory is wiped first.
/// Per-item failures never abort the batch; check [`BatchReport::success`].
///
/// # Errors
///
/// Returns configuration errors (invalid pattern or exclusive glob) and a
/// failure to clear the destination directory.
pub async fn run_batch(
    settings: Arc<Settings>,
    expected: Arc<ExpectedCountsCache>,
    progress: &MarkerProgress,
) -> Result<BatchReport> {
    let emails = discovery::batch_emails(&settings)?;
    progress.set_length(emails.len() as u64);
    if settings.exclusive.is_none() {
        remove_dir_all(&settings.destination_dir())?;
    }

    let workers = settings.workers.max(1);
    info!("Rendering {} emails with {} workers", emails.len(), workers);

    let pipeline = EmailPipeline::new(Arc::clone(&settings), expected);
    let chunks: Vec<Vec<Email>> = emails.chunks(workers).map(<[Email]>::to_vec).collect();

    let mut results = stream::iter(chunks)
        .map(|chunk| {
            let pipeline = pipeline.clone();
            async move {
                let emails = chunk.clone();
                match tokio::task::spawn_blocking(move || process_chunk(&pipeline, &chunk)).await {
                    Ok(reports) => reports,
                    Err(join_error) => {
                        error!("Render worker panicked: {}", join_error);
                        emails
                            .into_iter()
                            .map(|email| ItemReport {
                                email,
                                outcome: Outcome::Failed {
                                    reason: format!("render worker panicked: {join_error}"),
                                },
                                warnings: Vec::new(),
                            })
                            .collect()
                    }
                }
            }
        })
        .buffer_unordered(workers);

    let mut items = Vec::new();
    while let Some(reports) = results.next().await {
        for report in &reports {
            progress.mark(report.marker());
        }
        items.extend(reports);
    }
    progress.finish();

    let report = BatchReport::new(items);
    info!(
        "Rendered {} emails: {} substituted, {} failed",
        report.items.len(),
        report.substituted_count(),
        report.failed_count()
    );
    Ok(report)
}

fn process_chunk(pipeline: &EmailPipeline, chunk: &[Email]) -> Vec<ItemReport> {
    chunk.iter().map(|email| pipeline.process(email)).collect()
}
