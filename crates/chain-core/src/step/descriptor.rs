//! Descripción inmutable de una etapa de la cadena.

use std::any::type_name;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::binding;
use crate::chain::ChainNode;
use crate::context::ChainContext;
use crate::errors::{BuildError, ExecutionError};
use crate::resolver::{FromResolver, Resolver};
use crate::step::{ChainHandler, ConventionHandler, Next, StepToken};

pub(crate) type ExplicitFactory =
    Arc<dyn Fn(&dyn Resolver) -> Result<Arc<dyn ChainHandler>, BuildError> + Send + Sync>;
pub(crate) type ConventionFactory =
    Arc<dyn Fn(&dyn Resolver) -> Result<Arc<dyn ConventionHandler>, BuildError> + Send + Sync>;
pub(crate) type InlineNextFn =
    Arc<dyn Fn(Arc<ChainContext>, Option<Next>) -> BoxFuture<'static, Result<(), ExecutionError>> + Send + Sync>;
pub(crate) type InlineCtxFn =
    Arc<dyn Fn(Arc<ChainContext>) -> BoxFuture<'static, Result<(), ExecutionError>> + Send + Sync>;

/// Las tres formas de handler soportadas, en orden de prioridad de
/// despacho: contrato explícito, convención, callable inline.
pub(crate) enum HandlerKind {
    Explicit(ExplicitFactory),
    Convention(ConventionFactory),
    ConventionValue(Arc<dyn ConventionHandler>),
    InlineWithNext(InlineNextFn),
    InlineContextOnly(InlineCtxFn),
}

/// Descripción inmutable de un step: identidad del handler más los
/// argumentos extra de invocación. No ejecuta nada: es una fábrica que el
/// builder consume (en modo lectura) una vez por build.
pub struct StepDescriptor {
    pub(crate) kind: HandlerKind,
    pub(crate) args: Vec<Value>,
    pub(crate) handler_name: &'static str,
}

impl StepDescriptor {
    /// Handler tipado de contrato explícito, construido vía resolver.
    pub fn explicit<H>() -> Self
        where H: ChainHandler + FromResolver + 'static
    {
        let factory: ExplicitFactory =
            Arc::new(|resolver| Ok(Arc::new(H::from_resolver(resolver)?) as Arc<dyn ChainHandler>));
        Self { kind: HandlerKind::Explicit(factory),
               args: Vec::new(),
               handler_name: type_name::<H>() }
    }

    /// Handler tipado por convención, construido vía resolver.
    pub fn convention<H>(args: Vec<Value>) -> Self
        where H: ConventionHandler + FromResolver + 'static
    {
        let factory: ConventionFactory =
            Arc::new(|resolver| Ok(Arc::new(H::from_resolver(resolver)?) as Arc<dyn ConventionHandler>));
        Self { kind: HandlerKind::Convention(factory),
               args,
               handler_name: type_name::<H>() }
    }

    /// Handler por convención registrado como valor ya construido.
    pub fn convention_value<H>(handler: H, args: Vec<Value>) -> Self
        where H: ConventionHandler + 'static
    {
        Self { kind: HandlerKind::ConventionValue(Arc::new(handler)),
               args,
               handler_name: type_name::<H>() }
    }

    /// Callable inline con la forma canónica de dos argumentos `(ctx, next)`.
    pub fn inline_with_next(f: InlineNextFn) -> Self {
        Self { kind: HandlerKind::InlineWithNext(f),
               args: Vec::new(),
               handler_name: "inline" }
    }

    /// Callable inline con la forma canónica de un argumento `(ctx)`.
    pub fn inline(f: InlineCtxFn) -> Self {
        Self { kind: HandlerKind::InlineContextOnly(f),
               args: Vec::new(),
               handler_name: "inline" }
    }

    /// Nombre del tipo del handler, para diagnósticos.
    pub fn handler_name(&self) -> &'static str {
        self.handler_name
    }

    /// Produce el nodo de ejecución para este step.
    ///
    /// `next` es el nodo ya construido que sigue a este step (`None` si es
    /// el último). Garantiza un nodo no nulo cuyo callable hace el trabajo
    /// del step y — según la política de continuación — invoca `next` él
    /// mismo o delega el avance automático al executor. Falla con
    /// `BuildError` cuando el handler no puede construirse o no calza con
    /// ninguna forma soportada.
    pub(crate) fn create(&self,
                         resolver: &dyn Resolver,
                         next: Option<Arc<ChainNode>>,
                         token: StepToken)
                         -> Result<ChainNode, BuildError> {
        binding::normalize(self, resolver, next, token)
    }
}
