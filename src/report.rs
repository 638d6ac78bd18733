use crate::error::{Stage, UnpackError};

/// Receives hard failures as they abort an unpack.
///
/// Reporting never changes the outcome: the error is still returned to the
/// caller afterwards. Closures of the shape `Fn(Stage, &UnpackError)` can be
/// used directly.
pub trait Reporter {
    fn report(&self, stage: Stage, error: &UnpackError);
}

/// Forwards failures to the [`log`] facade at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, stage: Stage, error: &UnpackError) {
        match error {
            UnpackError::CorruptedPayload {
                grammar: Some(grammar),
                ..
            } => log::error!("p.a.c.k.e.r. {stage} stage failed ({grammar} grammar): {error}"),
            _ => log::error!("p.a.c.k.e.r. {stage} stage failed: {error}"),
        }
    }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _stage: Stage, _error: &UnpackError) {}
}

impl<F> Reporter for F
where
    F: Fn(Stage, &UnpackError),
{
    fn report(&self, stage: Stage, error: &UnpackError) {
        self(stage, error)
    }
}
