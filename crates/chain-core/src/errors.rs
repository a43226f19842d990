//! Errores del core: construcción vs ejecución (taxonomías separadas).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errores detectados al construir la cadena (`ChainBuilder::build`).
///
/// La construcción es fail-fast: el primer error aborta el build completo,
/// nunca se omite silenciosamente un step ofensivo.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum BuildError {
    #[error("no handling method declared by handler `{0}`")] NoHandlingMethod(String),
    #[error("ambiguous handling method on handler `{0}`")] AmbiguousHandlingMethod(String),
    #[error("handler `{0}` declares unsupported return shape `{1}`")] InvalidReturnShape(String, String),
    #[error("parameter mismatch on handler `{handler}`: {detail}")] ParameterMismatch { handler: String, detail: String },
    #[error("cannot resolve dependency `{0}`")] UnresolvedDependency(String),
    #[error("multiple providers registered for `{0}`")] AmbiguousProvider(String),
    #[error("internal: {0}")] Internal(String),
}

/// Errores observados durante `Chain::execute`.
///
/// `Step` transporta sin envolver el fallo propio de un handler; el run pasa
/// a Failed y no se ejecutan más nodos. `Cancelled` es un desenlace distinto
/// de un error ordinario y se propaga apenas se observa en frontera de nodo.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum ExecutionError {
    #[error("execution cancelled")] Cancelled,
    #[error("parameter mismatch on step {step}: expected {expected} argument(s), {supplied} supplied")]
    ParameterMismatch { step: usize, expected: usize, supplied: usize },
    #[error("step failed: {0}")] Step(String),
    #[error("internal: {0}")] Internal(String),
}
