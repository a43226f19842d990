//! Tipos de evento del run y estructura `ChainEvent`.
//!
//! Rol en la cadena:
//! - Cada run de `Chain::execute` registra eventos en un `EventSink`
//!   append-only asociado al contexto.
//! - El trail permite observar el ciclo de vida del run (Running →
//!   Completed | Cancelled | Failed) sin tocar el estado del executor.
//! - El enum `ChainEventKind` es el contrato observable y estable del core.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ExecutionError;

/// Eventos emitidos durante un run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChainEventKind {
    /// Primer evento de todo run: fija la cantidad de nodos de la cadena.
    RunStarted { step_count: usize },
    /// El executor invocó el callable del nodo `step`. No implica éxito.
    StepStarted { step: usize },
    /// El callable del nodo `step` retornó sin error.
    StepFinished { step: usize },
    /// El callable del nodo `step` falló; el run no continúa
    /// (fail-fast, sin reintentos).
    StepFailed { step: usize, error: ExecutionError },
    /// La señal de cancelación se observó antes de invocar el nodo `step`.
    RunCancelled { step: usize },
    /// El puntero de nodo llegó al final: run completado.
    RunCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEvent {
    pub seq: u64, // asignado por el sink (orden de append dentro del run)
    pub run_id: Uuid,
    pub kind: ChainEventKind,
    pub ts: DateTime<Utc>,
}

/// Variante compacta del trail, útil en asserts de tests.
pub fn event_variants(events: &[ChainEvent]) -> Vec<&'static str> {
    events.iter()
          .map(|e| match e.kind {
              ChainEventKind::RunStarted { .. } => "I",
              ChainEventKind::StepStarted { .. } => "S",
              ChainEventKind::StepFinished { .. } => "F",
              ChainEventKind::StepFailed { .. } => "X",
              ChainEventKind::RunCancelled { .. } => "K",
              ChainEventKind::RunCompleted => "C",
          })
          .collect()
}
