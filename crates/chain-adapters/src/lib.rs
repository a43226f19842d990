//! chain-adapters: handlers de ejemplo sobre chain-core.
//!
//! Este crate provee:
//! - `RequestLogger`: handler de contrato explícito que traza y delega.
//! - `AuthGate`: handler por convención que corta el run con error cuando
//!   el contexto no trae usuario autenticado.
//! - `TagAppender`: handler por convención con argumento extra posicional.
//! - `Greeter`: handler por convención con dependencia construida vía
//!   resolver (`Greeting`).
//!
//! Nota: el core sólo conoce contexto, continuación y argumentos JSON; las
//! claves de dominio ("user", "tags", "greeting") viven acá, del lado del
//! caller.

pub mod handlers;

pub use handlers::{AuthGate, Greeter, Greeting, RequestLogger, TagAppender};
