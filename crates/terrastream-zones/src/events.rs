//! Zone transition events.
//!
//! The lifecycle records every transition into a [`ZoneEventBuffer`] so hosts
//! can react (spawn props, update minimaps, collect stats) without polling the
//! grid.

use crate::coord::TileCoord;

/// A single observable transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZoneEvent {
    /// The zone's surface is live and stitched.
    Loaded(TileCoord),
    /// The zone's surface was released.
    Unloaded(TileCoord),
    /// A load was refused because another zone was still loading.
    LoadRejected {
        requested: TileCoord,
        in_flight: TileCoord,
    },
    /// The source failed; the zone is back to `Unloaded`.
    LoadFailed { coord: TileCoord, reason: String },
}

/// Double-buffered event storage.
///
/// Events written during a tick are readable during that tick and the next.
/// After two [`swap`](ZoneEventBuffer::swap) calls they are dropped.
#[derive(Debug, Default)]
pub struct ZoneEventBuffer {
    prev: Vec<ZoneEvent>,
    current: Vec<ZoneEvent>,
}

impl ZoneEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, event: ZoneEvent) {
        self.current.push(event);
    }

    /// Previous tick's events followed by this tick's.
    pub fn read(&self) -> impl Iterator<Item = &ZoneEvent> {
        self.prev.iter().chain(self.current.iter())
    }

    /// Only the events sent since the last swap.
    pub fn current(&self) -> &[ZoneEvent] {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.prev.len() + self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance one tick: drop the previous events, current become previous.
    pub fn swap(&mut self) {
        self.prev.clear();
        std::mem::swap(&mut self.prev, &mut self.current);
    }

    pub fn clear(&mut self) {
        self.prev.clear();
        self.current.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_survive_one_swap() {
        let mut buffer = ZoneEventBuffer::new();
        buffer.send(ZoneEvent::Loaded(TileCoord::new(1, 1)));
        assert_eq!(buffer.len(), 1);

        buffer.swap();
        assert_eq!(buffer.len(), 1, "event should still be readable after one swap");
        assert!(buffer.current().is_empty());

        buffer.swap();
        assert!(buffer.is_empty(), "event should be dropped after two swaps");
    }

    #[test]
    fn test_read_orders_previous_before_current() {
        let mut buffer = ZoneEventBuffer::new();
        buffer.send(ZoneEvent::Loaded(TileCoord::new(0, 0)));
        buffer.swap();
        buffer.send(ZoneEvent::Unloaded(TileCoord::new(0, 0)));

        let events: Vec<_> = buffer.read().cloned().collect();
        assert_eq!(
            events,
            vec![
                ZoneEvent::Loaded(TileCoord::new(0, 0)),
                ZoneEvent::Unloaded(TileCoord::new(0, 0)),
            ]
        );
    }

    #[test]
    fn test_clear() {
        let mut buffer = ZoneEventBuffer::new();
        buffer.send(ZoneEvent::Unloaded(TileCoord::new(2, 2)));
        buffer.swap();
        buffer.send(ZoneEvent::Unloaded(TileCoord::new(3, 2)));
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
