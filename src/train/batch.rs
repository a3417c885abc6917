//! Batch data structures and sources

use crate::error::{AdversarioError, Result};
use crate::Tensor;

/// Reserved label marking a batch as unlabeled.
///
/// The first entry of a batch's target vector is compared against this
/// sentinel per batch; it is the sole discriminant of labeled vs unlabeled.
pub const NO_LABEL: f32 = -1.0;

/// A training batch: flattened inputs and one class index per example.
#[derive(Clone)]
pub struct Batch {
    /// Input features, `[batch_size × input_width]` row-major.
    pub inputs: Tensor,
    /// Class indices as `f32`, or `NO_LABEL` sentinels.
    pub targets: Tensor,
}

impl Batch {
    /// Create a new batch.
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Self { inputs, targets }
    }

    /// Number of examples in the batch.
    pub fn size(&self) -> usize {
        self.targets.len()
    }

    /// True when the sentinel check marks this batch as labeled.
    pub fn is_labeled(&self) -> bool {
        self.targets.data()[0] != NO_LABEL
    }
}

/// An iterable source of equally sized batches.
///
/// Two sources are consumed in positional lockstep by the epoch driver;
/// sources must therefore be re-iterable across epochs.
pub trait BatchSource {
    /// Size of every batch this source yields.
    fn batch_size(&self) -> usize;

    /// Iterate over one epoch's worth of batches.
    fn iter(&self) -> impl Iterator<Item = &Batch>;
}

/// An in-memory batch source backed by a `Vec`.
pub struct SliceSource {
    batches: Vec<Batch>,
    batch_size: usize,
}

impl SliceSource {
    /// Wrap a non-empty vector of equally sized batches.
    pub fn new(batches: Vec<Batch>) -> Result<Self> {
        let first = batches
            .first()
            .ok_or(AdversarioError::InvalidDimension { name: "batch count", value: 0 })?;
        let batch_size = first.size();
        if batch_size == 0 {
            return Err(AdversarioError::InvalidDimension { name: "batch_size", value: 0 });
        }
        for batch in &batches {
            if batch.size() != batch_size {
                return Err(AdversarioError::RaggedSource {
                    first: batch_size,
                    offending: batch.size(),
                });
            }
        }
        Ok(Self { batches, batch_size })
    }

    /// Number of batches per epoch.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True if the source holds no batches.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl BatchSource for SliceSource {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(labels: &[f32]) -> Batch {
        let n = labels.len();
        Batch::new(Tensor::from_vec(vec![0.5; n * 4], false), Tensor::from_vec(labels.to_vec(), false))
    }

    #[test]
    fn sentinel_marks_unlabeled() {
        assert!(batch(&[0.0, 1.0]).is_labeled());
        assert!(!batch(&[NO_LABEL, NO_LABEL]).is_labeled());
    }

    #[test]
    fn source_reports_batch_size_and_reiterates() {
        let source = SliceSource::new(vec![batch(&[0.0, 1.0]), batch(&[1.0, 0.0])])
            .expect("uniform batches");
        assert_eq!(source.batch_size(), 2);
        assert_eq!(source.iter().count(), 2);
        assert_eq!(source.iter().count(), 2);
    }

    #[test]
    fn source_rejects_empty_and_ragged_input() {
        assert!(SliceSource::new(vec![]).is_err());
        assert!(SliceSource::new(vec![batch(&[0.0]), batch(&[0.0, 1.0])]).is_err());
    }
}
