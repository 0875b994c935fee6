//! Per-stage tracing for the post-processing pipeline.
//!
//! Every stage (`detect`, `decode`, `nms`) opens one span tagged with the
//! stage name and its input size, and reports its output size on the way
//! out. Without the `tracing` feature the guard is a unit struct and the
//! helpers compile away.

/// Guard returned by [`enter_stage`]; the span closes when it drops.
#[cfg(feature = "tracing")]
pub(crate) type StageGuard = tracing::span::EnteredSpan;

#[cfg(not(feature = "tracing"))]
pub(crate) struct StageGuard;

/// Enters the span for `stage`, recording how many items it consumes.
#[inline]
pub(crate) fn enter_stage(stage: &'static str, items: usize) -> StageGuard {
    #[cfg(feature = "tracing")]
    {
        tracing::info_span!("stage", stage, items).entered()
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = (stage, items);
        StageGuard
    }
}

/// Reports how many items `stage` produced.
#[inline]
pub(crate) fn stage_output(stage: &'static str, count: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(stage, count, "stage output");
    #[cfg(not(feature = "tracing"))]
    let _ = (stage, count);
}

/// Debug note for inputs that are accepted but handled specially.
#[cfg(feature = "tracing")]
macro_rules! trace_note {
    ($($arg:tt)+) => {
        tracing::debug!($($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_note {
    ($($arg:tt)+) => {};
}

pub(crate) use trace_note;
