use std::path::Path;
use std::time::Duration;

use eyre::Result;
use log::{info, warn};

use crate::ResultRecord;
use crate::output::write_csv;
use crate::pipeline::{CaptionSource, ModelClient, PipelineOptions, VideoFailure, analyse_video};

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One per successful video, in input order
    pub records: Vec<ResultRecord>,
    /// Skipped videos, in input order
    pub failures: Vec<VideoFailure>,
}

/// Batch-level knobs
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub pipeline: PipelineOptions,
    /// Pause between consecutive videos
    pub pacing: Duration,
    pub excel_bom: bool,
}

/// Per-video events reported while a batch runs
#[derive(Debug)]
pub enum Progress<'a> {
    Started { index: usize, total: usize, link: &'a str },
    Finished { record: &'a ResultRecord },
    Skipped { failure: &'a VideoFailure },
}

/// Process every link in order, then write the CSV once.
///
/// Per-video errors are collected, not returned. The pause follows every
/// video except the last, whatever its outcome. Only a failure to write the
/// output file is an error.
pub async fn run<C, M, F>(
    links: &[String],
    output: &Path,
    captions: &C,
    model: &M,
    opts: &BatchOptions,
    mut on_progress: F,
) -> Result<BatchReport>
where
    C: CaptionSource + ?Sized,
    M: ModelClient + ?Sized,
    F: FnMut(Progress<'_>),
{
    let mut report = BatchReport::default();
    let total = links.len();

    for (idx, link) in links.iter().enumerate() {
        on_progress(Progress::Started {
            index: idx + 1,
            total,
            link,
        });

        match analyse_video(link, captions, model, &opts.pipeline).await {
            Ok(record) => {
                on_progress(Progress::Finished { record: &record });
                report.records.push(record);
            }
            Err(failure) => {
                warn!("Skipping video [{}]: {failure}", failure.error.kind());
                on_progress(Progress::Skipped { failure: &failure });
                report.failures.push(failure);
            }
        }

        if idx + 1 < total && !opts.pacing.is_zero() {
            tokio::time::sleep(opts.pacing).await;
        }
    }

    write_csv(output, &report.records, opts.excel_bom)?;
    info!(
        "Wrote {} rows to {} ({} skipped)",
        report.records.len(),
        output.display(),
        report.failures.len()
    );
    Ok(report)
}
