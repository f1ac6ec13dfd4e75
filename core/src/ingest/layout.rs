use serde::{Deserialize, Serialize};

/// Figure width used when the caller gives none: a 1920 px display at
/// 100 px per plot unit, truncated.
pub const DEFAULT_FIGURE_WIDTH: f64 = 19.0;

const WIDTH_PER_ROW_DIVISOR: f64 = 16.0;
const ROW_FILL: f64 = 0.9;

/// Caller-supplied figure size. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutHint {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// One subplot row, drawing column `row` of the normalized matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubplotSlot {
    pub row: usize,
    pub title: String,
}

/// Single-column grid of subplots sharing the x axis, one row per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    pub width: f64,
    pub height: f64,
    pub slots: Vec<SubplotSlot>,
}

impl FigureLayout {
    pub fn for_channels(titles: Vec<String>, hint: &LayoutHint) -> Self {
        let rows = titles.len();
        let width = hint.width.unwrap_or(DEFAULT_FIGURE_WIDTH);
        let height = hint
            .height
            .unwrap_or_else(|| rows as f64 * (width / WIDTH_PER_ROW_DIVISOR) * ROW_FILL);
        let slots = titles
            .into_iter()
            .enumerate()
            .map(|(row, title)| SubplotSlot { row, title })
            .collect();

        Self {
            width,
            height,
            slots,
        }
    }

    pub fn rows(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(count: usize) -> Vec<String> {
        (1..=count).map(|n| format!("Channel {}", n)).collect()
    }

    #[test]
    fn default_height_scales_with_channels() {
        let one = FigureLayout::for_channels(titles(1), &LayoutHint::default());
        let four = FigureLayout::for_channels(titles(4), &LayoutHint::default());
        assert_eq!(one.width, DEFAULT_FIGURE_WIDTH);
        assert!((four.height - 4.0 * one.height).abs() < 1e-9);
        assert_eq!(four.rows(), 4);
        assert_eq!(four.slots[3].title, "Channel 4");
    }

    #[test]
    fn explicit_hint_wins() {
        let hint = LayoutHint {
            width: Some(8.0),
            height: Some(3.0),
        };
        let layout = FigureLayout::for_channels(titles(2), &hint);
        assert_eq!((layout.width, layout.height), (8.0, 3.0));
    }

    #[test]
    fn height_follows_explicit_width() {
        let hint = LayoutHint {
            width: Some(16.0),
            height: None,
        };
        let layout = FigureLayout::for_channels(titles(3), &hint);
        assert!((layout.height - 2.7).abs() < 1e-9);
    }
}
