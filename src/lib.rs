//! detpost turns raw object-detector output into a short, ranked list of
//! labeled boxes.
//!
//! The pipeline filters anchor-free rows
//! (`[cx, cy, w, h, objectness, class_probs...]`) by objectness, picks a
//! label per row, maps boxes into view coordinates, and runs greedy IoU
//! non-maximum suppression. Row decoding can optionally run on a rayon pool
//! via the `rayon` feature.

pub mod candidate;
pub mod decode;
pub mod geometry;
pub mod labels;
pub mod lowlevel;
pub mod mapping;
pub mod pipeline;
pub mod tensor;
mod trace;
pub mod util;

pub use candidate::nms::SuppressionMode;
pub use candidate::Detection;
pub use geometry::{iou, Rect};
pub use labels::LabelTable;
pub use mapping::CoordParams;
pub use pipeline::{detect, DetectConfig, Detector};
pub use tensor::{FlatTensor, NestedTensor, TensorLayout, TensorSource, TransposedTensor};
pub use util::{DetpostError, DetpostResult};
