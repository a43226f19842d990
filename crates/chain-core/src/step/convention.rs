//! Handlers por convención: firma declarada como datos.
//!
//! Rust no tiene reflexión en runtime, así que el descubrimiento por
//! convención se expresa como inspección de capacidades en build-time: el
//! handler declara sus métodos (`MethodSpec`) y el normalizador compila esa
//! declaración una sola vez en un plan de binding de aridad fija. En
//! ejecución no se re-inspecciona nada; el despacho llega por
//! `ConventionHandler::invoke` con los argumentos ya ligados.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ChainContext;
use crate::errors::ExecutionError;
use crate::step::Next;

/// Nombres de método reconocidos por la convención.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodName {
    Handle,
    HandleAsync,
}

impl MethodName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodName::Handle => "handle",
            MethodName::HandleAsync => "handle_async",
        }
    }
}

/// Forma de un parámetro declarado, en orden posicional.
///
/// `Context` y `Continuation` son los dos parámetros reservados (orden
/// independiente, a lo sumo uno de cada uno); `Value` recibe los argumentos
/// extra del step, distribuidos primero y en orden. La etiqueta de `Value`
/// es sólo para diagnósticos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    Context,
    Continuation,
    Value(&'static str),
}

/// Forma del retorno declarado. `Unit` (síncrono fire-and-forget) y
/// `Completion` (asíncrono) son las únicas formas soportadas; declarar
/// `Value` es un `BuildError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    Unit,
    Completion,
    Value(&'static str),
}

/// Firma de un método handler declarada por el tipo.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub name: MethodName,
    pub params: Vec<ParamShape>,
    pub returns: ReturnShape,
}

impl MethodSpec {
    /// Firma síncrona `handle(...)`.
    pub fn handle(params: Vec<ParamShape>) -> Self {
        Self { name: MethodName::Handle,
               params,
               returns: ReturnShape::Unit }
    }

    /// Firma asíncrona `handle_async(...)`.
    pub fn handle_async(params: Vec<ParamShape>) -> Self {
        Self { name: MethodName::HandleAsync,
               params,
               returns: ReturnShape::Completion }
    }

    /// Cantidad de slots `Value` declarados.
    pub fn value_slots(&self) -> usize {
        self.params.iter().filter(|p| matches!(p, ParamShape::Value(_))).count()
    }
}

/// Un argumento ya ligado, listo para el despacho.
pub enum BoundArg {
    Context(Arc<ChainContext>),
    Continuation(Next),
    Value(Value),
}

impl std::fmt::Debug for BoundArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundArg::Context(_) => f.write_str("Context"),
            BoundArg::Continuation(_) => f.write_str("Continuation"),
            BoundArg::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

impl BoundArg {
    pub fn context(&self) -> Option<&Arc<ChainContext>> {
        match self {
            BoundArg::Context(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn continuation(&self) -> Option<&Next> {
        match self {
            BoundArg::Continuation(next) => Some(next),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            BoundArg::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Handler descubierto por convención de nombre.
///
/// `methods()` se consulta una vez, al crear el nodo; `invoke()` recibe los
/// argumentos en el mismo orden posicional que la firma declarada.
#[async_trait]
pub trait ConventionHandler: Send + Sync {
    fn methods(&self) -> Vec<MethodSpec>;

    async fn invoke(&self, method: MethodName, args: Vec<BoundArg>) -> Result<(), ExecutionError>;
}
