//! E2E del workspace: chain-core + chain-adapters desde el lado del caller.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_test::assert_ok;

use chain_core::{event_variants, ChainBuilder, ChainContext, ExecutionError, InMemoryEventSink,
                 InMemoryResolver};

use chain_adapters::{AuthGate, Greeter, Greeting, RequestLogger, TagAppender};

fn resolver() -> InMemoryResolver {
    InMemoryResolver::new().provide(Greeting::new("hola {user}"))
}

#[tokio::test]
async fn e2e_pipeline_completes_and_annotates() {
    let chain = ChainBuilder::new().add_handler::<RequestLogger>()
                                   .add_step::<AuthGate>(vec![])
                                   .add_step::<Greeter>(vec![])
                                   .add_step::<TagAppender>(vec![json!("audited")])
                                   .build(&resolver())
                                   .expect("build ok");

    let ctx = Arc::new(ChainContext::with_sink(Arc::new(InMemoryEventSink::new())));
    ctx.insert("user", json!("ada"));

    assert_ok!(chain.execute(ctx.clone()).await);
    assert_eq!(ctx.get("greeting"), Some(json!("hola ada")));
    assert_eq!(ctx.get("tags"), Some(json!(["audited"])));
    assert_eq!(event_variants(&ctx.events()).last(), Some(&"C"));
}

#[tokio::test]
async fn e2e_cancellation_cuts_the_run_at_a_node_boundary() {
    // Cadena de steps lentos; la cancelación llega desde otra tarea y el
    // executor corta antes de invocar el próximo nodo.
    let mut builder = ChainBuilder::new();
    for _ in 0..10 {
        builder = builder.add_fn(|ctx| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let done = ctx.get("done").and_then(|v| v.as_u64()).unwrap_or(0);
            ctx.insert("done", json!(done + 1));
            Ok(())
        });
    }
    let chain = builder.build(&InMemoryResolver::new()).expect("build ok");

    let ctx = Arc::new(ChainContext::with_sink(Arc::new(InMemoryEventSink::new())));
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = chain.execute(ctx.clone()).await.expect_err("debe cancelarse");
    assert_eq!(err, ExecutionError::Cancelled);

    let done = ctx.get("done").and_then(|v| v.as_u64()).unwrap_or(0);
    assert!(done < 10, "la cancelación debe llegar antes del final (done={done})");
    assert_eq!(event_variants(&ctx.events()).last(), Some(&"K"));
    // Ningún step quedó a medias: cada uno que empezó, terminó.
    let variants = event_variants(&ctx.events());
    let started = variants.iter().filter(|v| **v == "S").count();
    let finished = variants.iter().filter(|v| **v == "F").count();
    assert_eq!(started, finished);
}

#[tokio::test]
async fn e2e_short_circuit_leaves_partial_context() {
    let chain = ChainBuilder::new().add_step::<TagAppender>(vec![json!("pre")])
                                   .add_step::<AuthGate>(vec![])
                                   .add_step::<TagAppender>(vec![json!("post")])
                                   .build(&resolver())
                                   .expect("build ok");

    let ctx = Arc::new(ChainContext::new());
    let err = chain.execute(ctx.clone()).await.expect_err("sin usuario debe fallar");
    assert!(matches!(err, ExecutionError::Step(_)));
    // El primer step llegó a correr; el tercero no.
    assert_eq!(ctx.get("tags"), Some(json!(["pre"])));
}
