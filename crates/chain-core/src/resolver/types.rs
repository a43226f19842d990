//! Puerto de resolución: el core depende sólo de `resolve(type) -> instancia`,
//! nunca de un framework de inyección concreto.
//!
//! El normalizador lo consulta una vez por handler tipado por creación de
//! nodo. La ausencia de una dependencia requerida es un `BuildError`, no un
//! null silencioso; múltiples providers registrados para el mismo tipo hacen
//! ese tipo ambiguo.
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::BuildError;

/// Resultado crudo del puerto, previo a su traducción a `BuildError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// Ningún provider registrado para el tipo pedido.
    Missing,
    /// Más de un provider registrado para el tipo pedido.
    Ambiguous,
}

/// Capacidad abstracta "construye una instancia del tipo T".
pub trait Resolver: Send + Sync {
    fn resolve(&self, ty: TypeId) -> Result<Arc<dyn Any + Send + Sync>, ResolveError>;
}

/// Azúcar tipada sobre `Resolver::resolve`, con errores ya en términos de
/// construcción de la cadena.
pub trait ResolverExt {
    fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, BuildError>;
}

impl<R: Resolver + ?Sized> ResolverExt for R {
    fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, BuildError> {
        match self.resolve(TypeId::of::<T>()) {
            Ok(any) => any.downcast::<T>().map_err(|_| {
                                              BuildError::Internal(format!("provider for `{}` stored the wrong type",
                                                                           type_name::<T>()))
                                          }),
            Err(ResolveError::Missing) => Err(BuildError::UnresolvedDependency(type_name::<T>().to_string())),
            Err(ResolveError::Ambiguous) => Err(BuildError::AmbiguousProvider(type_name::<T>().to_string())),
        }
    }
}

/// Constructor único de un handler tipado: toma sus dependencias del
/// resolver. Los argumentos del step quedan reservados para el método
/// handler, nunca para la construcción.
pub trait FromResolver: Sized {
    fn from_resolver(resolver: &dyn Resolver) -> Result<Self, BuildError>;
}

/// Registro en memoria de instancias compartidas, indexadas por `TypeId`.
#[derive(Default)]
pub struct InMemoryResolver {
    providers: HashMap<TypeId, Vec<Arc<dyn Any + Send + Sync>>>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una instancia como provider del tipo `T`.
    pub fn provide<T: Any + Send + Sync>(self, value: T) -> Self {
        self.provide_arc(Arc::new(value))
    }

    /// Variante que recibe la instancia ya compartida.
    pub fn provide_arc<T: Any + Send + Sync>(mut self, value: Arc<T>) -> Self {
        self.providers.entry(TypeId::of::<T>()).or_default().push(value);
        self
    }
}

impl Resolver for InMemoryResolver {
    fn resolve(&self, ty: TypeId) -> Result<Arc<dyn Any + Send + Sync>, ResolveError> {
        match self.providers.get(&ty).map(|v| v.as_slice()) {
            None | Some([]) => Err(ResolveError::Missing),
            Some([single]) => Ok(single.clone()),
            Some(_) => Err(ResolveError::Ambiguous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Config(&'static str);

    #[test]
    fn resolves_single_provider() {
        let resolver = InMemoryResolver::new().provide(Config("dev"));
        let got: Arc<Config> = resolver.get::<Config>().expect("config should resolve");
        assert_eq!(*got, Config("dev"));
    }

    #[test]
    fn missing_provider_is_a_build_error() {
        let resolver = InMemoryResolver::new();
        match resolver.get::<Config>() {
            Err(BuildError::UnresolvedDependency(name)) => assert!(name.contains("Config")),
            other => panic!("expected UnresolvedDependency, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_providers_are_ambiguous() {
        let resolver = InMemoryResolver::new().provide(Config("a")).provide(Config("b"));
        match resolver.get::<Config>() {
            Err(BuildError::AmbiguousProvider(name)) => assert!(name.contains("Config")),
            other => panic!("expected AmbiguousProvider, got {:?}", other),
        }
    }
}
