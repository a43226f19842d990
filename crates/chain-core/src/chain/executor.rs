//! Executor de la cadena: recorrido secuencial con resolución de la doble
//! semántica de continuación.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::chain::ChainNode;
use crate::context::ChainContext;
use crate::errors::ExecutionError;
use crate::event::ChainEventKind;

/// Cadena construida: referencia al nodo head (ninguno si está vacía).
///
/// Inmutable una vez construida: ejecutar nunca muta la cadena, sólo el
/// contexto del run. Reutilizable a través de muchos runs independientes;
/// runs concurrentes son seguros siempre que cada uno use su propio
/// `ChainContext`.
pub struct Chain {
    head: Option<Arc<ChainNode>>,
    len: usize,
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("len", &self.len).finish()
    }
}

impl Chain {
    pub(crate) fn new(head: Option<Arc<ChainNode>>, len: usize) -> Self {
        Self { head, len }
    }

    /// Cantidad de nodos de la cadena.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ejecuta la cadena contra el contexto dado.
    ///
    /// Recorrido: head → ... → None, invocando el callable de cada nodo en
    /// orden. Antes de cada invocación se consulta la señal de cancelación
    /// (una vez por nodo, nunca a mitad de un handler). Un error de un
    /// handler se propaga de inmediato sin envolver: fail-fast, sin
    /// reintentos ni continuación parcial.
    ///
    /// Avance: si el step recién invocado marcó en el contexto que él mismo
    /// invocó su continuación, el nodo siguiente ya corrió; el executor
    /// salta hacia adelante — propagando la consumición a través de
    /// delegaciones multinivel — hasta el primer nodo no consumido o el
    /// final. Si no hay marca, avanza exactamente un enlace (garantía de
    /// avance automático: un step que ignora "next" no corta la cadena).
    pub async fn execute(&self, ctx: Arc<ChainContext>) -> Result<(), ExecutionError> {
        ctx.emit(ChainEventKind::RunStarted { step_count: self.len });
        debug!(run_id = %ctx.run_id(), steps = self.len, "chain run started");

        let mut current = self.head.clone();
        while let Some(node) = current {
            if ctx.is_cancelled() {
                ctx.emit(ChainEventKind::RunCancelled { step: node.token() });
                debug!(run_id = %ctx.run_id(), step = node.token(), "chain run cancelled");
                return Err(ExecutionError::Cancelled);
            }

            trace!(run_id = %ctx.run_id(), step = node.token(), "invoking node");
            ctx.emit(ChainEventKind::StepStarted { step: node.token() });
            match node.call(ctx.clone()).await {
                Ok(()) => {
                    ctx.emit(ChainEventKind::StepFinished { step: node.token() });
                }
                Err(error) => {
                    ctx.emit(ChainEventKind::StepFailed { step: node.token(),
                                                          error: error.clone() });
                    debug!(run_id = %ctx.run_id(), step = node.token(), %error, "chain run failed");
                    return Err(error);
                }
            }

            current = Self::advance(&ctx, &node);
        }

        ctx.emit(ChainEventKind::RunCompleted);
        debug!(run_id = %ctx.run_id(), "chain run completed");
        Ok(())
    }

    /// Calcula el próximo nodo a invocar después de `node`.
    ///
    /// Un nodo está "consumido" cuando su predecesor invocó la continuación
    /// explícita (marca en el contexto). La marca del propio nodo dice, a
    /// su vez, si el nodo que le sigue también quedó consumido — así la
    /// consumición se propaga a través de cadenas de delegación.
    fn advance(ctx: &ChainContext, node: &Arc<ChainNode>) -> Option<Arc<ChainNode>> {
        if !ctx.has_continued(node.token()) {
            // Avance automático: el handler retornó sin continuar.
            return node.next().cloned();
        }

        // El handler ya corrió el nodo siguiente él mismo: saltar por lo
        // menos dos enlaces, y seguir mientras los nodos intermedios hayan
        // continuado también.
        let mut consumed = node.next().cloned();
        while let Some(n) = consumed {
            if ctx.has_continued(n.token()) {
                consumed = n.next().cloned();
            } else {
                return n.next().cloned();
            }
        }
        None
    }
}
