//! Binario de validación: ejercita la cadena completa (builder → executor)
//! con los handlers de chain-adapters y callables inline.

use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use chain_core::{event_variants, ChainBuilder, ChainContext, ExecutionError, InMemoryEventSink,
                 InMemoryResolver};

use chain_adapters::{AuthGate, Greeter, Greeting, RequestLogger, TagAppender};

fn demo_resolver() -> InMemoryResolver {
    InMemoryResolver::new().provide(Greeting::new("hola {user}"))
}

/// Validación 1: pipeline completo con las tres formas de handler.
async fn run_pipeline_validation() {
    let chain = ChainBuilder::new().add_handler::<RequestLogger>()
                                   .add_step::<AuthGate>(vec![])
                                   .add_step::<Greeter>(vec![])
                                   .add_step::<TagAppender>(vec![json!("audited")])
                                   .build(&demo_resolver())
                                   .expect("build ok");

    let sink = Arc::new(InMemoryEventSink::new());
    let ctx = Arc::new(ChainContext::with_sink(sink));
    ctx.insert("user", json!("ada"));

    chain.execute(ctx.clone()).await.expect("run ok");

    assert_eq!(ctx.get("greeting"), Some(json!("hola ada")), "Greeter debe saludar al usuario");
    assert_eq!(ctx.get("tags"), Some(json!(["audited"])), "TagAppender debe anotar el request");
    println!("[V1] run_id={} eventos={:?}", ctx.run_id(), event_variants(&ctx.events()));
    println!("!Validación 1: OK (pipeline de 4 steps ejecutado y completado)");
}

/// Validación 2: continuación explícita vs avance automático.
async fn run_continuation_validation() {
    // El primer step invoca "next" él mismo; el segundo lo ignora. Cada
    // step debe correr exactamente una vez.
    let chain = ChainBuilder::new()
        .add_fn_with_next(|ctx, next| async move {
            ctx.insert("order", json!(["head"]));
            match next {
                Some(next) => next.invoke(ctx).await,
                None => Ok(()),
            }
        })
        .add_fn(|ctx| async move {
            let mut order = match ctx.get("order") {
                Some(serde_json::Value::Array(items)) => items,
                _ => Vec::new(),
            };
            order.push(json!("tail"));
            ctx.insert("order", serde_json::Value::Array(order));
            Ok(())
        })
        .build(&InMemoryResolver::new())
        .expect("build ok");

    let ctx = Arc::new(ChainContext::new());
    chain.execute(ctx.clone()).await.expect("run ok");

    assert_eq!(ctx.get("order"), Some(json!(["head", "tail"])),
               "cada step corre una sola vez, en orden de registro");
    println!("!Validación 2: OK (doble semántica de continuación resuelta)");
}

/// Validación 3: fail-fast sin envolver el error del handler.
async fn run_failure_validation() {
    let chain = ChainBuilder::new().add_step::<AuthGate>(vec![])
                                   .add_step::<TagAppender>(vec![json!("never")])
                                   .build(&demo_resolver())
                                   .expect("build ok");

    let sink = Arc::new(InMemoryEventSink::new());
    let ctx = Arc::new(ChainContext::with_sink(sink));

    let err = chain.execute(ctx.clone()).await.expect_err("debe fallar sin usuario");
    assert!(matches!(err, ExecutionError::Step(_)), "el fallo del handler viaja sin envolver");
    assert_eq!(ctx.get("tags"), None, "los steps posteriores no deben correr");
    println!("[V3] eventos={:?}", event_variants(&ctx.events()));
    println!("!Validación 3: OK (fail-fast con traza I S X)");
}

/// Demo de cancelación cooperativa: steps lentos, cancelación desde otra
/// tarea, la cadena corta en la próxima frontera de nodo.
#[cfg(feature = "cancel_demo")]
async fn run_cancel_demo() {
    use std::time::Duration;

    let mut builder = ChainBuilder::new();
    for _ in 0..10 {
        builder = builder.add_fn(|ctx| async move {
            tokio::time::sleep(Duration::from_millis(25)).await;
            let done = ctx.get("done").and_then(|v| v.as_u64()).unwrap_or(0);
            ctx.insert("done", json!(done + 1));
            Ok(())
        });
    }
    let chain = builder.build(&InMemoryResolver::new()).expect("build ok");

    let ctx = Arc::new(ChainContext::new());
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        canceller.cancel();
    });

    let err = chain.execute(ctx.clone()).await.expect_err("debe cancelarse");
    assert_eq!(err, ExecutionError::Cancelled);
    let done = ctx.get("done").and_then(|v| v.as_u64()).unwrap_or(0);
    println!("[CANCEL DEMO] steps completados antes de cancelar: {}", done);
    assert!(done < 10, "la cancelación debe cortar antes del final");
    println!("!Demo cancelación: OK");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    println!("--- Iniciando validación 1 (pipeline) ---");
    run_pipeline_validation().await;
    println!("--- Iniciando validación 2 (continuación) ---");
    run_continuation_validation().await;
    println!("--- Iniciando validación 3 (fail-fast) ---");
    run_failure_validation().await;

    #[cfg(feature = "cancel_demo")]
    {
        println!("--- Iniciando demo de cancelación ---");
        run_cancel_demo().await;
    }
    #[cfg(not(feature = "cancel_demo"))]
    eprintln!("[CANCEL DEMO] omitido (compilar con --features cancel_demo para habilitarlo)");
}
