/// Sorted, merged set of half-open `[start, end)` spans answering membership
/// queries by binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalIndex {
    spans: Vec<(usize, usize)>,
}

impl IntervalIndex {
    pub fn from_spans<I>(spans: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut sorted: Vec<(usize, usize)> =
            spans.into_iter().filter(|&(start, end)| end > start).collect();
        sorted.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(sorted.len());
        for (start, end) in sorted {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        Self { spans: merged }
    }

    pub fn contains(&self, index: usize) -> bool {
        let after = self.spans.partition_point(|&(start, _)| start <= index);
        after > 0 && index < self.spans[after - 1].1
    }

    pub fn spans(&self) -> &[(usize, usize)] {
        &self.spans
    }

    /// Number of distinct indices covered.
    pub fn covered(&self) -> usize {
        self.spans.iter().map(|&(start, end)| end - start).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
