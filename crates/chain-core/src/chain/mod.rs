//! Construcción y ejecución de la cadena.
//!
//! El builder acumula descriptores y, dado un resolver, produce la cadena
//! enlazada de nodos en una sola pasada inversa (cada nodo captura al nodo
//! "next" ya construido). El executor camina la cadena de head a None
//! resolviendo la doble semántica de continuación (explícita vs automática).

pub mod builder;
pub mod executor;
pub mod node;

pub use builder::ChainBuilder;
pub use executor::Chain;
pub use node::{ChainNode, NodeCallable, NodeFuture};
