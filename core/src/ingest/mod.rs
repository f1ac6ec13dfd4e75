pub mod layout;
pub mod pipeline;
pub mod reader;
pub mod source;

pub use layout::{FigureLayout, LayoutHint, SubplotSlot, DEFAULT_FIGURE_WIDTH};
pub use pipeline::{ingest, IngestOutput, IngestPipeline, IngestRequest};
pub use reader::{read_table, Delimiter};
pub use source::WaveformSource;
