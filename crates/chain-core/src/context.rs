//! Contexto de ejecución compartido por todos los nodos de un run.
//!
//! El contexto es propiedad del caller, no de la cadena: se crea uno nuevo
//! inmediatamente antes de cada run y se descarta después. El core sólo
//! define la señal de cancelación, el mapa de valores auxiliares y el set de
//! marcas "este step ya continuó la cadena"; los campos de dominio viven en
//! el mapa de valores, definidos por el caller.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::event::{ChainEvent, ChainEventKind, EventSink, NoopEventSink};
use crate::step::StepToken;

/// Estado mutable de un único run de la cadena.
///
/// Runs concurrentes de la misma `Chain` construida requieren contextos
/// independientes: las marcas de continuación y los valores auxiliares no
/// deben compartirse entre runs.
pub struct ChainContext {
    run_id: Uuid,
    cancellation: CancellationToken,
    values: DashMap<String, Value>,
    continued: DashSet<StepToken>,
    sink: Arc<dyn EventSink>,
}

impl ChainContext {
    /// Crea un contexto con sink silencioso (sin trail de eventos).
    pub fn new() -> Self {
        Self::with_sink(Arc::new(NoopEventSink))
    }

    /// Crea un contexto que registra su trail de eventos en el sink dado.
    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self { run_id: Uuid::new_v4(),
               cancellation: CancellationToken::new(),
               values: DashMap::new(),
               continued: DashSet::new(),
               sink }
    }

    /// Identificador del run al que pertenece este contexto.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Señal cooperativa: el executor la consulta una vez por nodo.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Token subyacente, por si el caller quiere enlazar timeouts externos.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Inserta (o reemplaza) un valor auxiliar bajo la clave dada.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Lee una copia del valor auxiliar bajo la clave dada.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|v| v.value().clone())
    }

    /// Marca que el step identificado por `token` invocó explícitamente su
    /// continuación durante este run. La marca persiste hasta el final del
    /// run (el contexto se descarta con él, no hay reset).
    pub(crate) fn mark_continued(&self, token: StepToken) {
        self.continued.insert(token);
    }

    pub(crate) fn has_continued(&self, token: StepToken) -> bool {
        self.continued.contains(&token)
    }

    /// Registra un evento en el sink del run.
    pub(crate) fn emit(&self, kind: ChainEventKind) -> ChainEvent {
        self.sink.record(self.run_id, kind)
    }

    /// Trail de eventos acumulado para este run.
    pub fn events(&self) -> Vec<ChainEvent> {
        self.sink.list(self.run_id)
    }
}

impl Default for ChainContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn markers_are_per_context() {
        let a = ChainContext::new();
        let b = ChainContext::new();
        a.mark_continued(0);
        assert!(a.has_continued(0));
        assert!(!b.has_continued(0));
    }

    #[test]
    fn values_round_trip() {
        let ctx = ChainContext::new();
        ctx.insert("trail", json!("a"));
        assert_eq!(ctx.get("trail"), Some(json!("a")));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn cancel_is_sticky() {
        let ctx = ChainContext::new();
        assert!(!ctx.is_cancelled());
        ctx.cancel();
        assert!(ctx.is_cancelled());
        ctx.cancel();
        assert!(ctx.is_cancelled());
    }
}
