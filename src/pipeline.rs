//! Decode, map, and suppress in one call.
//!
//! [`detect`] is a pure function of its inputs. [`Detector`] bundles the
//! inputs that stay fixed for a model (labels, layout, thresholds, coordinate
//! transform) so a per-frame call only supplies the tensor.

use crate::candidate::nms::{nms, NmsParams, SuppressionMode};
use crate::candidate::order::keep_top;
use crate::candidate::Detection;
use crate::decode::decode;
use crate::labels::LabelTable;
use crate::mapping::CoordParams;
use crate::tensor::{TensorLayout, TensorSource};
use crate::trace::{enter_stage, stage_output, trace_note};
use crate::util::{DetpostError, DetpostResult};

/// Tunable thresholds for one detection pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectConfig {
    /// Rows whose objectness is not strictly above this are dropped.
    pub confidence_threshold: f32,
    /// Overlap above which a lower-ranked box is suppressed.
    pub iou_threshold: f32,
    /// Maximum number of detections returned.
    pub limit: usize,
    /// Class interaction policy during suppression.
    pub mode: SuppressionMode,
    /// Keep only this many top-confidence candidates before suppression.
    pub max_candidates: Option<usize>,
    /// Decode rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.30,
            iou_threshold: 0.30,
            limit: 15,
            mode: SuppressionMode::ClassAgnostic,
            max_candidates: None,
            parallel: false,
        }
    }
}

impl DetectConfig {
    /// Checks that the thresholds are usable numbers and that the IoU
    /// threshold lies in `[0, 1]`.
    pub fn validate(&self) -> DetpostResult<()> {
        if self.confidence_threshold.is_nan() {
            return Err(DetpostError::InvalidConfig("confidence threshold is NaN"));
        }
        if self.iou_threshold.is_nan() {
            return Err(DetpostError::InvalidConfig("iou threshold is NaN"));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DetpostError::InvalidConfig("iou threshold must lie in [0, 1]"));
        }
        Ok(())
    }

    /// Suppression parameters derived from this config.
    pub fn nms_params(&self) -> NmsParams {
        NmsParams {
            limit: self.limit,
            iou_threshold: self.iou_threshold,
            mode: self.mode,
        }
    }
}

/// Runs the full post-processing pass over one tensor.
///
/// Rows are decoded against `labels`, each surviving box is moved through
/// `coords`, and the result is suppressed down to at most `config.limit`
/// detections in descending confidence order.
pub fn detect<S: TensorSource + Sync + ?Sized>(
    source: &S,
    labels: &LabelTable,
    config: &DetectConfig,
    coords: &CoordParams,
) -> DetpostResult<Vec<Detection>> {
    config.validate()?;
    coords.validate()?;

    let _stage = enter_stage("detect", source.layout().num_rows);

    let decoded = decode_with(source, labels, config)?;
    let mut mapped: Vec<Detection> = decoded
        .into_iter()
        .map(|det| det.mapped(coords))
        .collect();

    if let Some(max) = config.max_candidates {
        if mapped.len() > max {
            trace_note!("capping {} candidates to {max}", mapped.len());
            keep_top(&mut mapped, max);
        }
    }

    let out = nms(mapped, config.nms_params());
    stage_output("detect", out.len());
    Ok(out)
}

#[cfg(feature = "rayon")]
fn decode_with<S: TensorSource + Sync + ?Sized>(
    source: &S,
    labels: &LabelTable,
    config: &DetectConfig,
) -> DetpostResult<Vec<Detection>> {
    if config.parallel {
        crate::decode::rayon::decode_par(source, labels, config.confidence_threshold)
    } else {
        decode(source, labels, config.confidence_threshold)
    }
}

#[cfg(not(feature = "rayon"))]
fn decode_with<S: TensorSource + Sync + ?Sized>(
    source: &S,
    labels: &LabelTable,
    config: &DetectConfig,
) -> DetpostResult<Vec<Detection>> {
    if config.parallel {
        trace_note!("parallel decode requested without the rayon feature");
    }
    decode(source, labels, config.confidence_threshold)
}

/// Post-processor for one model: labels, tensor shape, and thresholds fixed
/// up front, tensors supplied per call.
#[derive(Clone, Debug)]
pub struct Detector {
    labels: LabelTable,
    layout: TensorLayout,
    config: DetectConfig,
    coords: CoordParams,
}

impl Detector {
    /// Creates a detector, checking that `labels` covers every class slot.
    pub fn new(labels: LabelTable, layout: TensorLayout) -> DetpostResult<Self> {
        labels.check_matches(layout.num_classes)?;
        Ok(Self {
            labels,
            layout,
            config: DetectConfig::default(),
            coords: CoordParams::identity(),
        })
    }

    /// Replaces the thresholds.
    pub fn with_config(mut self, config: DetectConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default coordinate transform.
    pub fn with_coords(mut self, coords: CoordParams) -> Self {
        self.coords = coords;
        self
    }

    /// Returns the label table.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Returns the expected tensor layout.
    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Returns the active thresholds.
    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Returns the default coordinate transform.
    pub fn coords(&self) -> &CoordParams {
        &self.coords
    }

    /// Post-processes `source` with the configured transform.
    pub fn detect<S: TensorSource + Sync + ?Sized>(
        &self,
        source: &S,
    ) -> DetpostResult<Vec<Detection>> {
        self.detect_with_coords(source, &self.coords)
    }

    /// Post-processes `source` with a per-call transform, e.g. when the
    /// destination view changed size.
    pub fn detect_with_coords<S: TensorSource + Sync + ?Sized>(
        &self,
        source: &S,
        coords: &CoordParams,
    ) -> DetpostResult<Vec<Detection>> {
        let got = source.layout();
        if got != self.layout {
            return Err(DetpostError::LayoutMismatch {
                expected: self.layout,
                got,
            });
        }
        detect(source, &self.labels, &self.config, coords)
    }
}
