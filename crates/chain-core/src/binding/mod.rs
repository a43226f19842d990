//! Normalizador de handlers: de las tres formas soportadas a un único
//! callable `(ctx) -> completion`.
//!
//! Toda la inspección ocurre acá, una sola vez por creación de nodo: se
//! valida el descubrimiento por convención, se compila el plan de binding y
//! se genera un closure de aridad fija. En ejecución no hay re-inspección
//! de firmas (análogo al patrón de inyección de parámetros determinista:
//! decidir el plan una vez, aplicarlo N veces).

use std::sync::Arc;

use crate::chain::{ChainNode, NodeCallable};
use crate::context::ChainContext;
use crate::errors::{BuildError, ExecutionError};
use crate::resolver::Resolver;
use crate::step::descriptor::{HandlerKind, InlineNextFn, StepDescriptor};
use crate::step::{BoundArg, ChainHandler, ConventionHandler, MethodName, MethodSpec, Next, ParamShape,
                  ReturnShape, StepToken};

/// Plan de binding compilado a partir de la firma declarada.
///
/// Decide una vez cómo se distribuyen los slots (contexto, continuación,
/// argumentos extra); en ejecución sólo se aplica.
#[derive(Debug, Clone)]
pub(crate) struct BindingPlan {
    method: MethodName,
    slots: Arc<Vec<ParamShape>>,
    value_slots: usize,
}

impl BindingPlan {
    /// Descubrimiento + validación build-time de la firma por convención.
    pub(crate) fn compile(mut methods: Vec<MethodSpec>, handler: &str) -> Result<Self, BuildError> {
        let spec = match methods.len() {
            0 => return Err(BuildError::NoHandlingMethod(handler.to_string())),
            1 => methods.remove(0),
            _ => return Err(BuildError::AmbiguousHandlingMethod(handler.to_string())),
        };

        if let ReturnShape::Value(ty) = spec.returns {
            return Err(BuildError::InvalidReturnShape(handler.to_string(), ty.to_string()));
        }

        if spec.params.is_empty() {
            return Err(BuildError::ParameterMismatch { handler: handler.to_string(),
                                                       detail: "handling method declares zero parameters".into() });
        }

        let context_slots = spec.params.iter().filter(|p| matches!(p, ParamShape::Context)).count();
        if context_slots > 1 {
            return Err(BuildError::ParameterMismatch { handler: handler.to_string(),
                                                       detail: format!("{} context parameters declared, at most one allowed",
                                                                       context_slots) });
        }

        let continuation_slots = spec.params.iter().filter(|p| matches!(p, ParamShape::Continuation)).count();
        if continuation_slots > 1 {
            return Err(BuildError::ParameterMismatch { handler: handler.to_string(),
                                                       detail: format!("{} continuation parameters declared, at most one allowed",
                                                                       continuation_slots) });
        }

        let value_slots = spec.value_slots();
        Ok(Self { method: spec.name,
                  slots: Arc::new(spec.params),
                  value_slots })
    }

    /// Distribuye los argumentos extra y los dos slots reservados.
    ///
    /// El conteo de argumentos sólo es comprobable contra el step concreto
    /// en invocación: un faltante o sobrante se reporta como error de
    /// ejecución al arrancar el run, no al construir.
    fn bind(&self,
            token: StepToken,
            args: &[serde_json::Value],
            ctx: &Arc<ChainContext>,
            next: &Next)
            -> Result<Vec<BoundArg>, ExecutionError> {
        if args.len() != self.value_slots {
            return Err(ExecutionError::ParameterMismatch { step: token,
                                                           expected: self.value_slots,
                                                           supplied: args.len() });
        }

        let mut values = args.iter();
        let bound = self.slots
                        .iter()
                        .map(|slot| match slot {
                            ParamShape::Context => BoundArg::Context(ctx.clone()),
                            ParamShape::Continuation => BoundArg::Continuation(next.clone()),
                            // el conteo ya se validó: siempre hay un valor
                            ParamShape::Value(_) => BoundArg::Value(values.next().cloned().unwrap_or_default()),
                        })
                        .collect();
        Ok(bound)
    }
}

/// Convierte un descriptor en su nodo de ejecución, enlazado a `next`.
pub(crate) fn normalize(desc: &StepDescriptor,
                        resolver: &dyn Resolver,
                        next: Option<Arc<ChainNode>>,
                        token: StepToken)
                        -> Result<ChainNode, BuildError> {
    let callable = match &desc.kind {
        HandlerKind::Explicit(factory) => explicit_callable(factory(resolver)?, next.clone(), token),
        HandlerKind::Convention(factory) => {
            convention_callable(factory(resolver)?, desc.handler_name, desc.args.clone(), next.clone(), token)?
        }
        HandlerKind::ConventionValue(handler) => {
            convention_callable(handler.clone(), desc.handler_name, desc.args.clone(), next.clone(), token)?
        }
        HandlerKind::InlineWithNext(f) => inline_next_callable(f.clone(), next.clone(), token),
        HandlerKind::InlineContextOnly(f) => f.clone(),
    };

    Ok(ChainNode::new(callable, next, token))
}

/// Contrato explícito: wrapping trivial, sin inspección. El handler recibe
/// `None` cuando el step es terminal.
fn explicit_callable(handler: Arc<dyn ChainHandler>, next: Option<Arc<ChainNode>>, token: StepToken) -> NodeCallable {
    let next = next.map(|node| Next::new(Some(node), token));
    Arc::new(move |ctx| {
        let handler = handler.clone();
        let next = next.clone();
        Box::pin(async move { handler.handle(ctx, next).await })
    })
}

/// Convención: compila el plan una vez y despacha con argumentos ligados.
/// La continuación ligada es siempre el wrapper marcador; en un step
/// terminal el wrapper completa de inmediato (y marca igual).
fn convention_callable(handler: Arc<dyn ConventionHandler>,
                       handler_name: &'static str,
                       args: Vec<serde_json::Value>,
                       next: Option<Arc<ChainNode>>,
                       token: StepToken)
                       -> Result<NodeCallable, BuildError> {
    let plan = BindingPlan::compile(handler.methods(), handler_name)?;
    let next = Next::new(next, token);
    Ok(Arc::new(move |ctx| {
        let handler = handler.clone();
        let plan = plan.clone();
        let args = args.clone();
        let next = next.clone();
        Box::pin(async move {
            let bound = plan.bind(token, &args, &ctx, &next)?;
            handler.invoke(plan.method, bound).await
        })
    }))
}

/// Inline de dos argumentos: recibe el wrapper marcador, `None` si terminal.
fn inline_next_callable(f: InlineNextFn, next: Option<Arc<ChainNode>>, token: StepToken) -> NodeCallable {
    let next = next.map(|node| Next::new(Some(node), token));
    Arc::new(move |ctx| f(ctx, next.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_async(params: Vec<ParamShape>) -> MethodSpec {
        MethodSpec::handle_async(params)
    }

    #[test]
    fn zero_methods_is_a_build_error() {
        let err = BindingPlan::compile(vec![], "H").unwrap_err();
        assert_eq!(err, BuildError::NoHandlingMethod("H".into()));
    }

    #[test]
    fn two_methods_are_ambiguous() {
        let methods = vec![MethodSpec::handle(vec![ParamShape::Context]),
                           spec_async(vec![ParamShape::Context])];
        let err = BindingPlan::compile(methods, "H").unwrap_err();
        assert_eq!(err, BuildError::AmbiguousHandlingMethod("H".into()));
    }

    #[test]
    fn value_return_shape_is_rejected() {
        let methods = vec![MethodSpec { name: MethodName::Handle,
                                        params: vec![ParamShape::Context],
                                        returns: ReturnShape::Value("String") }];
        let err = BindingPlan::compile(methods, "H").unwrap_err();
        assert_eq!(err, BuildError::InvalidReturnShape("H".into(), "String".into()));
    }

    #[test]
    fn zero_parameters_is_a_build_error() {
        let err = BindingPlan::compile(vec![spec_async(vec![])], "H").unwrap_err();
        assert!(matches!(err, BuildError::ParameterMismatch { .. }));
    }

    #[test]
    fn duplicate_reserved_slots_are_rejected() {
        let twice_ctx = vec![spec_async(vec![ParamShape::Context, ParamShape::Context])];
        assert!(matches!(BindingPlan::compile(twice_ctx, "H").unwrap_err(),
                         BuildError::ParameterMismatch { .. }));

        let twice_next = vec![spec_async(vec![ParamShape::Context,
                                              ParamShape::Continuation,
                                              ParamShape::Continuation])];
        assert!(matches!(BindingPlan::compile(twice_next, "H").unwrap_err(),
                         BuildError::ParameterMismatch { .. }));
    }

    #[test]
    fn arg_count_mismatch_surfaces_at_bind_time() {
        let plan = BindingPlan::compile(vec![spec_async(vec![ParamShape::Value("String"),
                                                             ParamShape::Context])],
                                        "H").expect("plan should compile");
        let ctx = Arc::new(ChainContext::new());
        let next = Next::new(None, 0);
        let err = plan.bind(0, &[], &ctx, &next).unwrap_err();
        assert_eq!(err,
                   ExecutionError::ParameterMismatch { step: 0,
                                                       expected: 1,
                                                       supplied: 0 });
    }

    #[test]
    fn extras_fill_value_slots_in_order() {
        let plan = BindingPlan::compile(vec![spec_async(vec![ParamShape::Value("String"),
                                                             ParamShape::Context,
                                                             ParamShape::Value("String")])],
                                        "H").expect("plan should compile");
        let ctx = Arc::new(ChainContext::new());
        let next = Next::new(None, 3);
        let args = vec![serde_json::json!("first"), serde_json::json!("second")];
        let bound = plan.bind(3, &args, &ctx, &next).expect("bind should succeed");
        assert_eq!(bound.len(), 3);
        assert_eq!(bound[0].value(), Some(&serde_json::json!("first")));
        assert!(bound[1].context().is_some());
        assert_eq!(bound[2].value(), Some(&serde_json::json!("second")));
    }
}
