pub mod intervals;
pub mod matrix;

pub use intervals::IntervalIndex;
pub use matrix::MatrixHelper;
