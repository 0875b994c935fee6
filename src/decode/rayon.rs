//! Rayon-parallel decoding (feature-gated).
//!
//! Rows are independent, so the tensor is split across the pool and the
//! results are gathered back in row order. The output is identical to
//! [`decode`](super::decode).

use crate::candidate::Detection;
use crate::decode::{check_inputs, decode_row};
use crate::labels::LabelTable;
use crate::tensor::TensorSource;
use crate::trace::{enter_stage, stage_output};
use crate::util::DetpostResult;
use rayon::prelude::*;

/// Row-parallel variant of [`decode`](super::decode).
pub fn decode_par<S: TensorSource + Sync + ?Sized>(
    source: &S,
    labels: &LabelTable,
    confidence_threshold: f32,
) -> DetpostResult<Vec<Detection>> {
    let layout = source.layout();
    check_inputs(layout, labels, confidence_threshold)?;

    let _stage = enter_stage("decode_par", layout.num_rows);

    let out: Vec<Detection> = (0..layout.num_rows)
        .into_par_iter()
        .filter_map(|row| {
            decode_row(source, layout, row, labels, confidence_threshold).transpose()
        })
        .collect::<DetpostResult<Vec<_>>>()?;

    stage_output("decode_par", out.len());
    Ok(out)
}
