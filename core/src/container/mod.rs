pub mod history;
pub mod metadata;
pub mod session;
pub mod waveform;

pub use history::{HistoryParams, HistoryRecord};
pub use metadata::{MaskedPoints, PointKind, PointMetadata, RejectRange};
pub use session::ContainerSession;
pub use waveform::{ContainerOptions, SampleRate, WaveformContainer};
