//! Parallel rendering of many posts.

use crate::error::ContentError;
use crate::store::{ContentKind, ContentStore};
use blogmark_core::split_document;
use blogmark_render::{EnhancedPost, Pipeline};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// One source to render.
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Identifier echoed in the result (typically the slug or path).
    pub id: String,
    /// Full source, front-matter included.
    pub source: String,
}

/// Outcome for one input.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Identifier of the input.
    pub id: String,
    /// Rendered post, on success.
    pub post: Option<EnhancedPost>,
    /// Error message, on failure.
    pub error: Option<String>,
}

/// Counters for a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Inputs submitted.
    pub total: u32,
    /// Inputs rendered.
    pub succeeded: u32,
    /// Inputs that failed.
    pub failed: u32,
    /// Wall-clock time in milliseconds.
    pub processing_time_ms: f64,
}

/// Batch behaviour.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker threads. Defaults to the global rayon pool.
    pub max_threads: Option<usize>,
    /// Keep going after a failure. When false inputs run sequentially and stop at the first error.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_threads: None,
            continue_on_error: true,
        }
    }
}

/// Results in input order, plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// One entry per processed input.
    pub results: Vec<BatchResult>,
    /// Counters.
    pub stats: BatchStats,
}

/// Renders every input with `pipeline`.
///
/// Rendering itself cannot fail; an input fails when its front-matter is malformed.
pub fn render_batch(
    pipeline: &Pipeline,
    inputs: Vec<BatchInput>,
    options: &BatchOptions,
) -> BatchReport {
    let entries = inputs
        .into_iter()
        .map(|input| (input.id, Ok(input.source)))
        .collect();
    run_batch(pipeline, entries, options)
}

/// A source, or the reason it could not be read.
type BatchEntry = (String, Result<String, String>);

fn run_batch(
    pipeline: &Pipeline,
    entries: Vec<BatchEntry>,
    options: &BatchOptions,
) -> BatchReport {
    let start = Instant::now();

    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("Falling back to the global thread pool: {}", err))
            .ok()
    });

    let total = entries.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_entry = |(id, source): BatchEntry| -> BatchResult {
        let rendered = source.and_then(|source| {
            split_document(&source)
                .map(|split| pipeline.enhance(split.meta, split.body))
                .map_err(|err| err.to_string())
        });
        match rendered {
            Ok(post) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id,
                    post: Some(post),
                    error: None,
                }
            }
            Err(error) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("Failed to render {}: {}", id, error);
                BatchResult {
                    id,
                    post: None,
                    error: Some(error),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if options.continue_on_error {
        match pool {
            Some(pool) => pool.install(|| entries.into_par_iter().map(process_entry).collect()),
            None => entries.into_par_iter().map(process_entry).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let result = process_entry(entry);
            let stop = result.error.is_some();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    BatchReport {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    }
}

impl ContentStore {
    /// Reads every post of `kind` and renders them as one batch, ids being slugs.
    ///
    /// A post that cannot be read is reported as a failed result; only a
    /// failure to list the directory is an error.
    pub fn render_all(
        &self,
        kind: ContentKind,
        options: &BatchOptions,
    ) -> Result<BatchReport, ContentError> {
        let entries = self
            .slugs(kind)?
            .into_iter()
            .filter_map(|slug| {
                let path = self.path_for(&slug, kind)?;
                let source = fs::read_to_string(&path)
                    .map_err(|source| ContentError::Io { path, source }.to_string());
                Some((slug, source))
            })
            .collect();
        Ok(run_batch(self.pipeline(), entries, options))
    }
}
