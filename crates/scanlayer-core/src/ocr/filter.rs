//! Confidence gating of OCR regions.

use tracing::trace;

use super::Region;

/// Lazy, order-preserving filter over an OCR result.
///
/// Yields a region iff its confidence is strictly greater than the
/// threshold. Single pass: the underlying iterator is consumed as the
/// filter is driven.
pub struct RegionFilter<I> {
    regions: I,
    min_confidence: f32,
    seen: usize,
    kept: usize,
}

impl<I: Iterator<Item = Region>> RegionFilter<I> {
    /// Wrap a region sequence with a confidence threshold.
    pub fn new(regions: I, min_confidence: f32) -> Self {
        Self {
            regions,
            min_confidence,
            seen: 0,
            kept: 0,
        }
    }

    /// Regions pulled from the source so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Regions yielded so far.
    pub fn kept(&self) -> usize {
        self.kept
    }
}

impl<I: Iterator<Item = Region>> RegionFilter<I> {
    /// Next kept region with its position in the source sequence.
    pub fn next_indexed(&mut self) -> Option<(usize, Region)> {
        for region in self.regions.by_ref() {
            let index = self.seen;
            self.seen += 1;
            // NaN confidence compares false and is dropped
            if region.confidence > self.min_confidence {
                self.kept += 1;
                return Some((index, region));
            }
            trace!(
                "Dropping region {:?} (confidence {:.3} <= {:.3})",
                region.text,
                region.confidence,
                self.min_confidence
            );
        }
        None
    }
}

impl<I: Iterator<Item = Region>> Iterator for RegionFilter<I> {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        self.next_indexed().map(|(_, region)| region)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.regions.size_hint().1)
    }
}

/// Filter regions by confidence.
pub fn filter_regions<I>(regions: I, min_confidence: f32) -> RegionFilter<I::IntoIter>
where
    I: IntoIterator<Item = Region>,
{
    RegionFilter::new(regions.into_iter(), min_confidence)
}
