//! Definiciones relacionadas a Steps.
//!
//! Un step es una etapa de la cadena descrita por un `StepDescriptor`, que
//! es una fábrica: no ejecuta nada por sí mismo. Este módulo define:
//! - `ChainHandler`: contrato explícito `handle(ctx, next)`.
//! - `ConventionHandler`: handlers descubiertos por convención de nombre,
//!   con firma declarada como datos (`MethodSpec`).
//! - `Next`: el wrapper marcador de continuación.
//! - `StepDescriptor`: la descripción inmutable de una etapa.

pub mod convention;
pub mod descriptor;
pub mod handler;

/// Identidad estable de un step dentro de una cadena construida: índice
/// secuencial asignado al crear el nodo. Único por cadena; no se necesita
/// ningún contador global.
pub type StepToken = usize;

pub use convention::{BoundArg, ConventionHandler, MethodName, MethodSpec, ParamShape, ReturnShape};
pub use descriptor::StepDescriptor;
pub use handler::{ChainHandler, ContinuationFn, Next};
