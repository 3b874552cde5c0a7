//! Bounded-width batch scheduling.
//!
//! The input is cut into consecutive chunks of [`batch_width`] services.
//! Chunks run one after another; the members of a chunk run concurrently and
//! all of them settle before the next chunk starts. A slow member therefore
//! holds back the following chunk, in exchange for a hard concurrency ceiling.

use std::thread::available_parallelism;

use futures_util::future::join_all;

use brusync_core::{Config, Parallelism, ServiceDescriptor, SyncOutcome};

use crate::converter::Converter;
use crate::orchestrator::{sync_one, SyncOptions};

/// Width used when neither the config nor the platform gives one.
pub const FALLBACK_WIDTH: usize = 4;

/// Configured parallelism, else detected hardware concurrency, else
/// [`FALLBACK_WIDTH`].
pub fn batch_width(config: &Config) -> usize {
    batch_width_from(
        config.parallelism(),
        available_parallelism().ok().map(|n| n.get()),
    )
}

pub(crate) fn batch_width_from(parallelism: Parallelism, detected: Option<usize>) -> usize {
    match parallelism {
        Parallelism::Fixed(n) if n > 0 => n,
        _ => detected.filter(|n| *n > 0).unwrap_or(FALLBACK_WIDTH),
    }
}

/// Sync every service and return exactly one outcome per input, in input
/// order. Individual failures never stop siblings or later chunks.
pub async fn sync_many(
    services: &[ServiceDescriptor],
    config: &Config,
    converter: &dyn Converter,
    options: SyncOptions<'_>,
) -> Vec<SyncOutcome> {
    let width = batch_width(config);
    let mut outcomes = Vec::with_capacity(services.len());

    for (index, chunk) in services.chunks(width).enumerate() {
        let names: Vec<&str> = chunk.iter().map(|s| s.acronym.as_str()).collect();
        tracing::debug!("batch {} (width {width}): {}", index + 1, names.join(", "));

        let batch = chunk
            .iter()
            .map(|service| sync_one(service, config, converter, options));
        outcomes.extend(join_all(batch).await);
    }

    outcomes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
