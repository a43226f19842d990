use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{ChainEvent, ChainEventKind};

/// Destino de eventos append-only, compartible entre el executor y el caller.
pub trait EventSink: Send + Sync {
    /// Registra un evento a partir de su kind y devuelve el evento completo
    /// (con seq y ts asignados).
    fn record(&self, run_id: Uuid, kind: ChainEventKind) -> ChainEvent;
    /// Lista los eventos de un run (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<ChainEvent>;
}

/// Sink en memoria: un vector de eventos por run.
#[derive(Default)]
pub struct InMemoryEventSink {
    inner: DashMap<Uuid, Vec<ChainEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&self, run_id: Uuid, kind: ChainEventKind) -> ChainEvent {
        let mut entry = self.inner.entry(run_id).or_default();
        let seq = entry.len() as u64;
        let ev = ChainEvent { seq, run_id, kind, ts: Utc::now() };
        entry.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<ChainEvent> {
        self.inner.get(&run_id).map(|v| v.value().clone()).unwrap_or_default()
    }
}

/// Sink que descarta todo: para runs que no necesitan trail.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, run_id: Uuid, kind: ChainEventKind) -> ChainEvent {
        ChainEvent { seq: 0, run_id, kind, ts: Utc::now() }
    }

    fn list(&self, _run_id: Uuid) -> Vec<ChainEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_run_append_order() {
        let sink = InMemoryEventSink::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let e0 = sink.record(a, ChainEventKind::RunStarted { step_count: 2 });
        let e1 = sink.record(a, ChainEventKind::StepStarted { step: 0 });
        let f0 = sink.record(b, ChainEventKind::RunStarted { step_count: 0 });
        assert_eq!((e0.seq, e1.seq, f0.seq), (0, 1, 0));
        assert_eq!(sink.list(a).len(), 2);
        assert_eq!(sink.list(b).len(), 1);
    }

    #[test]
    fn noop_sink_keeps_nothing() {
        let sink = NoopEventSink;
        let run = Uuid::new_v4();
        sink.record(run, ChainEventKind::RunCompleted);
        assert!(sink.list(run).is_empty());
    }
}
