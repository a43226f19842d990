//! chain-core: cadena de ejecución in-process estilo middleware.
//!
//! Un conjunto heterogéneo de descriptores de step (handlers de contrato
//! explícito, handlers por convención, callables inline) se normaliza en
//! nodos uniformes, se enlaza en build-time y se recorre secuencialmente
//! contra un contexto mutable compartido, resolviendo correctamente la
//! continuación explícita ("next") frente al avance automático.
pub mod binding;
pub mod chain;
pub mod context;
pub mod errors;
pub mod event;
pub mod resolver;
pub mod step;

pub use chain::{Chain, ChainBuilder, ChainNode};
pub use context::ChainContext;
pub use errors::{BuildError, ExecutionError};
pub use event::{event_variants, ChainEvent, ChainEventKind, EventSink, InMemoryEventSink, NoopEventSink};
pub use resolver::{FromResolver, InMemoryResolver, ResolveError, Resolver, ResolverExt};
pub use step::{BoundArg, ChainHandler, ContinuationFn, ConventionHandler, MethodName, MethodSpec, Next,
               ParamShape, ReturnShape, StepDescriptor, StepToken};
