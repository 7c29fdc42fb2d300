//! Progress reporting over a channel.

use std::sync::mpsc::Sender;

/// An optional sink for progress fractions in `0.0..=1.0`.
///
/// Sending never blocks and a disconnected receiver is ignored,
/// so reporting progress can never fail or stop a computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress<'a>(Option<&'a Sender<f64>>);

impl<'a> Progress<'a> {
    /// A [`Progress`] that discards every report.
    pub const NONE: Self = Self(None);

    /// Creates a [`Progress`] that sends each report to `sender`.
    #[must_use]
    pub const fn new(sender: &'a Sender<f64>) -> Self {
        Self(Some(sender))
    }

    /// Reports that `done` out of `total` steps have finished.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn report(self, done: usize, total: usize) {
        if let Some(sender) = self.0 {
            let fraction = if total == 0 { 1.0 } else { (done as f64 / total as f64).clamp(0.0, 1.0) };
            let _ = sender.send(fraction);
        }
    }
}

impl<'a> From<Option<&'a Sender<f64>>> for Progress<'a> {
    fn from(sender: Option<&'a Sender<f64>>) -> Self {
        Self(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn reports_fractions() {
        let (tx, rx) = mpsc::channel();
        let progress = Progress::new(&tx);
        progress.report(1, 4);
        progress.report(5, 4);
        progress.report(0, 0);
        drop(tx);
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![0.25, 1.0, 1.0]);
    }

    #[test]
    fn ignores_disconnected_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        Progress::new(&tx).report(1, 2);
        Progress::NONE.report(1, 2);
    }
}
