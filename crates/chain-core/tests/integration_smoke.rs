//! Smoke de integración: sink de eventos, resolver y reutilización de la
//! cadena a través de runs concurrentes.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use chain_core::{event_variants, BuildError, ChainBuilder, ChainContext, ChainEventKind,
                 EventSink, InMemoryEventSink, InMemoryResolver};

use chain_adapters::{Greeter, Greeting};

#[test]
fn sink_smoke_append_and_list() {
    let sink = InMemoryEventSink::new();
    let run_id = Uuid::new_v4();

    let ev = sink.record(run_id, ChainEventKind::RunStarted { step_count: 1 });
    assert_eq!(ev.seq, 0);
    sink.record(run_id, ChainEventKind::StepStarted { step: 0 });

    let events = sink.list(run_id);
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| matches!(e.kind, ChainEventKind::RunStarted { .. })),
            "RunStarted missing");
}

#[tokio::test]
async fn missing_provider_is_a_build_error() {
    // Greeter exige un Greeting en el resolver; sin provider el build
    // completo aborta.
    let err = ChainBuilder::new().add_step::<Greeter>(vec![])
                                 .build(&InMemoryResolver::new())
                                 .unwrap_err();
    assert!(matches!(err, BuildError::UnresolvedDependency(_)), "got {err:?}");
}

#[tokio::test]
async fn duplicate_providers_are_ambiguous() {
    let resolver = InMemoryResolver::new().provide(Greeting::new("hola {user}"))
                                          .provide(Greeting::new("buenas {user}"));
    let err = ChainBuilder::new().add_step::<Greeter>(vec![])
                                 .build(&resolver)
                                 .unwrap_err();
    assert!(matches!(err, BuildError::AmbiguousProvider(_)), "got {err:?}");
}

#[tokio::test]
async fn one_chain_many_independent_runs() {
    let resolver = InMemoryResolver::new().provide(Greeting::new("hola {user}"));
    let chain = Arc::new(ChainBuilder::new().add_step::<Greeter>(vec![])
                                            .build(&resolver)
                                            .expect("build ok"));

    let mut handles = Vec::new();
    for user in ["ada", "grace", "edsger"] {
        let chain = chain.clone();
        handles.push(tokio::spawn(async move {
            let ctx = Arc::new(ChainContext::with_sink(Arc::new(InMemoryEventSink::new())));
            ctx.insert("user", json!(user));
            chain.execute(ctx.clone()).await.expect("run ok");
            (ctx.get("greeting"), event_variants(&ctx.events()))
        }));
    }

    for (handle, user) in handles.into_iter().zip(["ada", "grace", "edsger"]) {
        let (greeting, variants) = handle.await.expect("join ok");
        assert_eq!(greeting, Some(json!(format!("hola {user}"))));
        assert_eq!(variants, vec!["I", "S", "F", "C"]);
    }
}
