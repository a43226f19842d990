//! Contrato explícito y wrapper de continuación.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::chain::ChainNode;
use crate::context::ChainContext;
use crate::errors::ExecutionError;
use crate::step::StepToken;

/// Forma funcional de la continuación: cualquier callable que acepte el
/// contexto y devuelva una completion asíncrona califica como "next".
pub type ContinuationFn =
    Arc<dyn Fn(Arc<ChainContext>) -> BoxFuture<'static, Result<(), ExecutionError>> + Send + Sync>;

/// El resto de la cadena después del step actual, ofrecido al handler como
/// un callable que puede invocar (o ignorar).
///
/// `Next` es el wrapper marcador: al invocarlo ejecuta el callable del nodo
/// siguiente (o completa de inmediato si el step es terminal) y — con éxito
/// o fallo — registra en el contexto que el step dueño invocó su
/// continuación explícitamente. Esa marca es lo que permite al executor
/// distinguir "el handler decidió cuándo continuar" de "el handler retornó
/// sin continuar, el executor continúa por él", sin ejecutar dos veces el
/// step siguiente.
#[derive(Clone)]
pub struct Next {
    node: Option<Arc<ChainNode>>,
    token: StepToken,
}

impl Next {
    pub(crate) fn new(node: Option<Arc<ChainNode>>, token: StepToken) -> Self {
        Self { node, token }
    }

    /// Ejecuta el resto de la cadena y registra la continuación explícita.
    pub async fn invoke(&self, ctx: Arc<ChainContext>) -> Result<(), ExecutionError> {
        let result = match &self.node {
            Some(node) => node.call(ctx.clone()).await,
            None => Ok(()),
        };
        // La marca se registra también cuando el resto de la cadena falló:
        // el step siguiente ya corrió (o empezó a correr) una vez.
        ctx.mark_continued(self.token);
        result
    }

    /// Representación funcional, para callers que declaran su continuación
    /// como un callable propio en lugar del tipo canónico.
    pub fn as_fn(&self) -> ContinuationFn {
        let this = self.clone();
        Arc::new(move |ctx| {
            let this = this.clone();
            Box::pin(async move { this.invoke(ctx).await })
        })
    }
}

/// Contrato explícito de handler: método dedicado de dos argumentos.
///
/// Un handler reconocido por este contrato se despacha directamente, sin
/// inspección de firma. `next` es `None` cuando el step es el último de la
/// cadena.
#[async_trait]
pub trait ChainHandler: Send + Sync {
    async fn handle(&self, ctx: Arc<ChainContext>, next: Option<Next>) -> Result<(), ExecutionError>;
}
