//! Handlers concretos para pipelines de request en memoria.
//!
//! Cada handler muestra una de las formas de registro soportadas por el
//! core; ninguno hace IO externo, todo el estado viaja en el `ChainContext`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use chain_core::{BoundArg, BuildError, ChainContext, ChainHandler, ConventionHandler,
                 ExecutionError, FromResolver, MethodName, MethodSpec, Next, ParamShape, Resolver,
                 ResolverExt};

/// Handler de contrato explícito: traza la entrada del request y delega
/// al resto de la cadena. No muta el contexto.
#[derive(Default)]
pub struct RequestLogger;

impl FromResolver for RequestLogger {
    fn from_resolver(_resolver: &dyn Resolver) -> Result<Self, BuildError> {
        Ok(Self)
    }
}

#[async_trait]
impl ChainHandler for RequestLogger {
    async fn handle(&self, ctx: Arc<ChainContext>, next: Option<Next>) -> Result<(), ExecutionError> {
        info!(run_id = %ctx.run_id(), "request entrante");
        match next {
            Some(next) => next.invoke(ctx).await,
            None => Ok(()),
        }
    }
}

/// Handler por convención que corta el run cuando el contexto no trae un
/// usuario autenticado. No invoca la continuación: si el usuario está
/// presente retorna Ok y el avance implícito sigue con el próximo nodo.
#[derive(Default)]
pub struct AuthGate;

impl FromResolver for AuthGate {
    fn from_resolver(_resolver: &dyn Resolver) -> Result<Self, BuildError> {
        Ok(Self)
    }
}

#[async_trait]
impl ConventionHandler for AuthGate {
    fn methods(&self) -> Vec<MethodSpec> {
        vec![MethodSpec::handle(vec![ParamShape::Context])]
    }

    async fn invoke(&self, _method: MethodName, args: Vec<BoundArg>) -> Result<(), ExecutionError> {
        let ctx = args[0].context().cloned()
                         .ok_or_else(|| ExecutionError::Internal("AuthGate sin contexto ligado".into()))?;
        match ctx.get("user") {
            Some(Value::String(user)) if !user.is_empty() => Ok(()),
            _ => Err(ExecutionError::Step("request sin usuario autenticado".into())),
        }
    }
}

/// Handler por convención con argumento extra posicional: agrega la etiqueta
/// recibida al array `tags` del contexto (lo crea si no existe).
#[derive(Default)]
pub struct TagAppender;

impl FromResolver for TagAppender {
    fn from_resolver(_resolver: &dyn Resolver) -> Result<Self, BuildError> {
        Ok(Self)
    }
}

#[async_trait]
impl ConventionHandler for TagAppender {
    fn methods(&self) -> Vec<MethodSpec> {
        vec![MethodSpec::handle_async(vec![ParamShape::Value("tag"), ParamShape::Context])]
    }

    async fn invoke(&self, _method: MethodName, args: Vec<BoundArg>) -> Result<(), ExecutionError> {
        let tag = args[0].value().cloned()
                         .ok_or_else(|| ExecutionError::Internal("TagAppender sin argumento tag".into()))?;
        let ctx = args[1].context().cloned()
                         .ok_or_else(|| ExecutionError::Internal("TagAppender sin contexto ligado".into()))?;
        let mut tags = match ctx.get("tags") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        tags.push(tag);
        ctx.insert("tags", Value::Array(tags));
        Ok(())
    }
}

/// Configuración compartida de saludo, registrada como provider del
/// resolver. Los handlers la reciben ya construida (`Arc`).
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Greeting {
    pub template: String,
}

impl Greeting {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }
}

/// Handler por convención con dependencia: toma el `Greeting` del resolver
/// en build-time y en ejecución escribe el saludo bajo `greeting`.
pub struct Greeter {
    greeting: Arc<Greeting>,
}

impl FromResolver for Greeter {
    fn from_resolver(resolver: &dyn Resolver) -> Result<Self, BuildError> {
        Ok(Self { greeting: resolver.get::<Greeting>()? })
    }
}

#[async_trait]
impl ConventionHandler for Greeter {
    fn methods(&self) -> Vec<MethodSpec> {
        vec![MethodSpec::handle_async(vec![ParamShape::Context, ParamShape::Continuation])]
    }

    async fn invoke(&self, _method: MethodName, args: Vec<BoundArg>) -> Result<(), ExecutionError> {
        let ctx = args[0].context().cloned()
                         .ok_or_else(|| ExecutionError::Internal("Greeter sin contexto ligado".into()))?;
        let next = args[1].continuation().cloned()
                          .ok_or_else(|| ExecutionError::Internal("Greeter sin continuación ligada".into()))?;
        let user = match ctx.get("user") {
            Some(Value::String(u)) => u,
            _ => "anon".to_string(),
        };
        ctx.insert("greeting", json!(self.greeting.template.replace("{user}", &user)));
        // Delegación explícita: el resto de la cadena corre acá adentro.
        next.invoke(ctx).await
    }
}
