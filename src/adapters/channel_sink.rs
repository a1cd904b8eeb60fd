//! Channel-backed event sink.
//!
//! Queues [`AppEvent`]s on an `embassy_sync` channel so another task of the
//! same executor can consume them (display, telemetry uplink). The poll loop
//! is single-threaded, hence [`NoopRawMutex`]. A full channel drops the
//! event and counts it; the producer never blocks.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Sender};
use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Channel type the sink writes into.
pub type EventChannel<const N: usize> = Channel<NoopRawMutex, AppEvent, N>;

pub struct ChannelEventSink<'ch, const N: usize> {
    sender: Sender<'ch, NoopRawMutex, AppEvent, N>,
    dropped: u32,
}

impl<'ch, const N: usize> ChannelEventSink<'ch, N> {
    pub fn new(channel: &'ch EventChannel<N>) -> Self {
        Self {
            sender: channel.sender(),
            dropped: 0,
        }
    }

    /// Events discarded because the channel was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> EventSink for ChannelEventSink<'_, N> {
    fn emit(&mut self, event: &AppEvent) {
        if self.sender.try_send(event.clone()).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            warn!("Event channel full, dropped {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::PropertyChanged;

    fn change(v: f32) -> AppEvent {
        AppEvent::PropertyChanged(PropertyChanged {
            name: "minTemperature",
            label: "Min Temperature",
            old_value: 0.0,
            new_value: v,
        })
    }

    #[test]
    fn events_arrive_in_order() {
        let channel = EventChannel::<4>::new();
        let mut sink = ChannelEventSink::new(&channel);
        sink.emit(&change(1.0));
        sink.emit(&AppEvent::Published { count: 1 });

        assert_eq!(channel.try_receive().ok(), Some(change(1.0)));
        assert_eq!(
            channel.try_receive().ok(),
            Some(AppEvent::Published { count: 1 })
        );
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn full_channel_drops_and_counts() {
        let channel = EventChannel::<2>::new();
        let mut sink = ChannelEventSink::new(&channel);
        for v in 0..3 {
            sink.emit(&change(v as f32));
        }
        assert_eq!(sink.dropped(), 1);
        assert_eq!(channel.try_receive().ok(), Some(change(0.0)));
    }
}
