//! Mini-batch partitioning.
//!
//! Examples are split into contiguous column ranges. Each [`Batch`] borrows its
//! columns of the feature and label matrices (no copy) and owns the layer caches for
//! its example count. Batches are created once per training run and visited in the
//! same order on every iteration; there is no shuffling.

use std::ops::Range;

use crate::mlp::{LayerCache, layer_caches};
use crate::{Dataset, HyperParameters, MatrixView, Result};

/// Column ranges of each mini-batch, in visiting order.
///
/// `mini_batch_size == 0` or `>= example_count` yields a single full batch; otherwise
/// every batch has `mini_batch_size` examples except the last, which holds the
/// remainder.
pub fn batch_ranges(example_count: usize, mini_batch_size: usize) -> Vec<Range<usize>> {
    if example_count == 0 {
        return Vec::new();
    }
    if mini_batch_size == 0 || mini_batch_size >= example_count {
        return vec![0..example_count];
    }

    (0..example_count)
        .step_by(mini_batch_size)
        .map(|start| start..(start + mini_batch_size).min(example_count))
        .collect()
}

/// A column-range view of the training data paired with its own caches.
#[derive(Debug)]
pub(crate) struct Batch<'a> {
    pub range: Range<usize>,
    pub features: MatrixView<'a>,
    pub labels: MatrixView<'a>,
    pub caches: Vec<LayerCache>,
}

impl Batch<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }
}

pub(crate) fn partition<'a>(hp: &HyperParameters, data: &'a Dataset) -> Result<Vec<Batch<'a>>> {
    let feature_count = data.feature_count();

    batch_ranges(data.example_count(), hp.mini_batch_size())
        .into_iter()
        .map(|range| {
            Ok(Batch {
                features: data.features().columns(range.clone())?,
                labels: data.labels().columns(range.clone())?,
                caches: layer_caches(hp, feature_count, range.len(), true),
                range,
            })
        })
        .collect()
}
