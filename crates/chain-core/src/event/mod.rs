//! Trail de eventos por run (append-only).

mod sink;
mod types;

pub use sink::{EventSink, InMemoryEventSink, NoopEventSink};
pub use types::{event_variants, ChainEvent, ChainEventKind};
