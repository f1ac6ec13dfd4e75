use serde::{Deserialize, Serialize};

use crate::math::IntervalIndex;

/// Operator-marked artefact span `[start, end)` within one channel.
///
/// Bounds are sample positions and cannot precede sample 0. They are not
/// checked against the recording length. Sessions clamp negative bounds to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct RejectRange {
    pub start: usize,
    pub end: usize,
}

impl RejectRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<(usize, usize)> for RejectRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<RejectRange> for (usize, usize) {
    fn from(range: RejectRange) -> Self {
        (range.start, range.end)
    }
}

/// Which detected point set an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    Peaks,
    Troughs,
}

impl PointKind {
    pub fn label(self) -> &'static str {
        match self {
            PointKind::Peaks => "peaks",
            PointKind::Troughs => "troughs",
        }
    }

    pub(crate) fn detection_operation(self) -> &'static str {
        match self {
            PointKind::Peaks => "detect_peaks",
            PointKind::Troughs => "detect_troughs",
        }
    }
}

/// Pre-existing annotations supplied at construction. Absent entries start empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointMetadata {
    pub peaks: Option<Vec<Vec<usize>>>,
    pub troughs: Option<Vec<Vec<usize>>>,
    pub reject: Option<Vec<Vec<RejectRange>>>,
}

/// Per-channel annotation storage owned by a container.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Annotations {
    pub peaks: Vec<Vec<usize>>,
    pub troughs: Vec<Vec<usize>>,
    pub reject: Vec<Vec<RejectRange>>,
}

impl Annotations {
    pub fn empty(nchannels: usize) -> Self {
        Self {
            peaks: vec![Vec::new(); nchannels],
            troughs: vec![Vec::new(); nchannels],
            reject: vec![Vec::new(); nchannels],
        }
    }

    pub fn points(&self, kind: PointKind) -> &[Vec<usize>] {
        match kind {
            PointKind::Peaks => &self.peaks,
            PointKind::Troughs => &self.troughs,
        }
    }

    pub fn points_mut(&mut self, kind: PointKind) -> &mut Vec<Vec<usize>> {
        match kind {
            PointKind::Peaks => &mut self.peaks,
            PointKind::Troughs => &mut self.troughs,
        }
    }

    /// Raw indices of every channel paired with their rejection mask.
    pub fn masked(&self, kind: PointKind) -> Vec<MaskedPoints> {
        self.points(kind)
            .iter()
            .zip(&self.reject)
            .map(|(raw, ranges)| {
                let rejected =
                    IntervalIndex::from_spans(ranges.iter().map(|range| (range.start, range.end)));
                let mask = raw.iter().map(|&index| rejected.contains(index)).collect();
                MaskedPoints {
                    indices: raw.clone(),
                    mask,
                }
            })
            .collect()
    }
}

/// Detected indices of one channel with a parallel mask that is `true` where
/// the index falls inside a rejected range. Masked entries stay in `indices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedPoints {
    indices: Vec<usize>,
    mask: Vec<bool>,
}

impl MaskedPoints {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices outside every rejected range.
    pub fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices
            .iter()
            .zip(&self.mask)
            .filter(|&(_, &masked)| !masked)
            .map(|(&index, _)| index)
    }

    /// Indices hidden by a rejected range.
    pub fn masked(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices
            .iter()
            .zip(&self.mask)
            .filter(|&(_, &masked)| masked)
            .map(|(&index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masking_flags_points_inside_reject_ranges() {
        let mut annotations = Annotations::empty(1);
        annotations.peaks[0] = vec![5, 12, 20];
        annotations.reject[0] = vec![RejectRange::new(10, 15)];

        let view = annotations.masked(PointKind::Peaks);
        assert_eq!(view[0].indices(), &[5, 12, 20]);
        assert_eq!(view[0].mask(), &[false, true, false]);
        assert_eq!(view[0].visible().collect::<Vec<_>>(), vec![5, 20]);
        assert_eq!(view[0].masked().collect::<Vec<_>>(), vec![12]);
        assert_eq!(annotations.peaks[0], vec![5, 12, 20]);
    }

    #[test]
    fn channels_mask_independently() {
        let mut annotations = Annotations::empty(2);
        annotations.troughs = vec![vec![3, 7], vec![3, 7]];
        annotations.reject[1] = vec![RejectRange::new(0, 4)];

        let view = annotations.masked(PointKind::Troughs);
        assert_eq!(view[0].mask(), &[false, false]);
        assert_eq!(view[1].mask(), &[true, false]);
    }

    #[test]
    fn reject_range_serializes_as_pair() {
        let json = serde_json::to_string(&RejectRange::new(2, 9)).unwrap();
        assert_eq!(json, "[2,9]");
        let parsed: RejectRange = serde_json::from_str("[4,6]").unwrap();
        assert_eq!(parsed, RejectRange::new(4, 6));
    }
}
