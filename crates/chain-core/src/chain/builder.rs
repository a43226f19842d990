//! Builder de la cadena.
//!
//! Acumula `StepDescriptor`s en orden de registro y construye cadenas
//! independientes a partir de la misma lista: `build` recibe el resolver
//! por referencia, no consume ni muta los descriptores, y puede llamarse
//! varias veces contra resolvers distintos.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::chain::{Chain, ChainNode};
use crate::context::ChainContext;
use crate::errors::{BuildError, ExecutionError};
use crate::resolver::{FromResolver, Resolver};
use crate::step::descriptor::{InlineCtxFn, InlineNextFn};
use crate::step::{ChainHandler, ConventionHandler, Next, StepDescriptor};

/// Acumulador ordenado de descriptores de step.
#[derive(Default)]
pub struct ChainBuilder {
    steps: Vec<StepDescriptor>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un handler tipado de contrato explícito.
    pub fn add_handler<H>(mut self) -> Self
        where H: ChainHandler + FromResolver + 'static
    {
        self.steps.push(StepDescriptor::explicit::<H>());
        self
    }

    /// Registra un handler tipado por convención, con sus argumentos extra.
    pub fn add_step<H>(mut self, args: Vec<Value>) -> Self
        where H: ConventionHandler + FromResolver + 'static
    {
        self.steps.push(StepDescriptor::convention::<H>(args));
        self
    }

    /// Registra un handler por convención ya construido (valor).
    pub fn add_step_value<H>(mut self, handler: H, args: Vec<Value>) -> Self
        where H: ConventionHandler + 'static
    {
        self.steps.push(StepDescriptor::convention_value(handler, args));
        self
    }

    /// Registra un callable inline de un argumento `(ctx)`.
    pub fn add_fn<F, Fut>(mut self, f: F) -> Self
        where F: Fn(Arc<ChainContext>) -> Fut + Send + Sync + 'static,
              Fut: Future<Output = Result<(), ExecutionError>> + Send + 'static
    {
        let f: InlineCtxFn = Arc::new(move |ctx| Box::pin(f(ctx)));
        self.steps.push(StepDescriptor::inline(f));
        self
    }

    /// Registra un callable inline de dos argumentos `(ctx, next)`.
    pub fn add_fn_with_next<F, Fut>(mut self, f: F) -> Self
        where F: Fn(Arc<ChainContext>, Option<Next>) -> Fut + Send + Sync + 'static,
              Fut: Future<Output = Result<(), ExecutionError>> + Send + 'static
    {
        let f: InlineNextFn = Arc::new(move |ctx, next| Box::pin(f(ctx, next)));
        self.steps.push(StepDescriptor::inline_with_next(f));
        self
    }

    /// Cantidad de steps registrados.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Construye la cadena: una pasada inversa sobre los descriptores, de
    /// modo que cada nodo capture al "next" ya construido. Fail-fast: el
    /// primer `BuildError` aborta el build completo. Una lista vacía
    /// produce una cadena válida sin head (ejecutarla es un no-op exitoso).
    pub fn build(&self, resolver: &dyn Resolver) -> Result<Chain, BuildError> {
        let mut next: Option<Arc<ChainNode>> = None;
        for (token, descriptor) in self.steps.iter().enumerate().rev() {
            let node = descriptor.create(resolver, next.take(), token)?;
            next = Some(Arc::new(node));
        }
        Ok(Chain::new(next, self.steps.len()))
    }
}
