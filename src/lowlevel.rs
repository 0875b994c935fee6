//! Individual pipeline stages for callers assembling their own flow.
//!
//! Most users should call [`detect`](crate::detect) or hold a
//! [`Detector`](crate::Detector); these exports expose each stage on its own,
//! e.g. to suppress detections merged from several heads.

pub use crate::candidate::nms::{nms, NmsParams};
pub use crate::decode::{decode, select_class};
#[cfg(feature = "rayon")]
pub use crate::decode::rayon::decode_par;
pub use crate::tensor::{COL_CX, COL_CY, COL_FIRST_CLASS, COL_H, COL_OBJECTNESS, COL_W};
