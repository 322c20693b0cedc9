//! Side channel for load progress.
//!
//! The loader reports `(current, max)` pairs; whether anyone listens has no
//! effect on the load itself.

use crossbeam::channel::Sender;

pub trait ProgressSink {
    fn report(&self, current: usize, max: usize);
}

/// Sink that discards all updates.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _current: usize, _max: usize) {}
}

/// Sink forwarding updates over a crossbeam channel.
///
/// Uses `try_send`, so a full or disconnected channel never blocks or
/// fails the loader.
pub struct ChannelProgress {
    sender: Sender<(usize, usize)>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<(usize, usize)>) -> ChannelProgress {
        ChannelProgress { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, current: usize, max: usize) {
        let _ = self.sender.try_send((current, max));
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn disconnected_channel_is_ignored() {
        let (sender, receiver) = crossbeam::channel::bounded(1);
        drop(receiver);

        let sink = ChannelProgress::new(sender);
        sink.report(1, 10);
        sink.report(2, 10);
    }

    #[test]
    fn full_channel_drops_updates() {
        let (sender, receiver) = crossbeam::channel::bounded(1);
        let sink = ChannelProgress::new(sender);

        sink.report(1, 2);
        sink.report(2, 2);

        assert_eq!(receiver.try_recv(), Ok((1, 2)));
        assert!(receiver.try_recv().is_err());
    }
}
