use crate::frame::Frame;

/// An event stamped with the frame it was raised in.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub frame_index: u64,
    pub payload: E,
}

/// Typed queue of events raised during a frame and drained by the owner.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, payload: E) {
        self.events.push(Event {
            frame_index: frame.index,
            payload,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use crate::frame::Frame;

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Hello(&'static str),
    }

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        let f = Frame::new(2, 0.1);
        bus.emit(f, Ping::Hello("a"));
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.events()[0].payload, Ping::Hello("a"));
    }

    #[test]
    fn drain_preserves_order_and_clears() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(0, 1.0), Ping::Hello("first"));
        bus.emit(Frame::new(0, 1.0), Ping::Hello("second"));
        let drained: Vec<_> = bus.drain().into_iter().map(|e| e.payload).collect();
        assert_eq!(drained, vec![Ping::Hello("first"), Ping::Hello("second")]);
        assert!(bus.is_empty());
    }
}
