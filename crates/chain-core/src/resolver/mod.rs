//! Puerto de resolución de dependencias (build-time).

mod types;

pub use types::{FromResolver, InMemoryResolver, ResolveError, Resolver, ResolverExt};
