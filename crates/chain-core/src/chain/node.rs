//! Nodo de ejecución: elemento de la lista enlazada construida en build.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::ChainContext;
use crate::errors::ExecutionError;
use crate::step::StepToken;

pub type NodeFuture = BoxFuture<'static, Result<(), ExecutionError>>;

/// Callable normalizado: todo el cableado de "next" quedó capturado en
/// build-time vía closures; en invocación sólo viaja el contexto.
pub type NodeCallable = Arc<dyn Fn(Arc<ChainContext>) -> NodeFuture + Send + Sync>;

/// Un eslabón de la cadena: callable normalizado, referencia al siguiente
/// nodo (o ninguno, si es terminal) y el token de identidad del step que lo
/// originó.
///
/// Invariante: la cadena es una lista forward simple y acíclica; ningún
/// nodo aparece dos veces. Inmutable después de la construcción, por lo que
/// runs concurrentes pueden compartirla sin locks.
pub struct ChainNode {
    callable: NodeCallable,
    next: Option<Arc<ChainNode>>,
    token: StepToken,
}

impl ChainNode {
    pub(crate) fn new(callable: NodeCallable, next: Option<Arc<ChainNode>>, token: StepToken) -> Self {
        Self { callable, next, token }
    }

    /// Invoca el callable normalizado del nodo.
    pub(crate) fn call(&self, ctx: Arc<ChainContext>) -> NodeFuture {
        (self.callable)(ctx)
    }

    pub(crate) fn next(&self) -> Option<&Arc<ChainNode>> {
        self.next.as_ref()
    }

    pub(crate) fn token(&self) -> StepToken {
        self.token
    }
}
