//! Type-erased user callables.
//!
//! Handlers, guards and mapping functions are written against typed parameter
//! tuples but stored behind one non-generic contract: take a context and a
//! slice of boxed values, return a result either synchronously or as a
//! suspending future. Suspending calls race the caller's cancellation token.

use super::error::{HandlerError, MachineError};
use crate::core::{Params, Signature, State, Trigger, Value};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Return types accepted from lifecycle handlers: `()` or `Result<(), E>`.
pub trait Outcome {
    fn into_outcome(self) -> Result<(), HandlerError>;
}

impl Outcome for () {
    fn into_outcome(self) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<E: Into<HandlerError>> Outcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), HandlerError> {
        self.map_err(Into::into)
    }
}

/// Return types accepted from guards: `bool` or `Result<bool, E>`.
pub trait Verdict {
    fn into_verdict(self) -> Result<bool, HandlerError>;
}

impl Verdict for bool {
    fn into_verdict(self) -> Result<bool, HandlerError> {
        Ok(self)
    }
}

impl<E: Into<HandlerError>> Verdict for Result<bool, E> {
    fn into_verdict(self) -> Result<bool, HandlerError> {
        self.map_err(Into::into)
    }
}

/// Identifiers handed to state-change handlers.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Change<S, T> {
    pub(crate) from: S,
    pub(crate) trigger: T,
    pub(crate) to: S,
}

type SyncFn<C, R> = Arc<dyn Fn(&C, &[Value]) -> Result<R, MachineError> + Send + Sync>;

type SuspendingFn<C, R> = Arc<
    dyn Fn(&C, &[Value]) -> Result<BoxFuture<'static, Result<R, MachineError>>, MachineError>
        + Send
        + Sync,
>;

enum Invoke<C, R> {
    Sync(SyncFn<C, R>),
    Suspending(SuspendingFn<C, R>),
}

/// A stored callable together with the signature it reads.
pub(crate) struct Callback<C, R> {
    signature: Signature,
    invoke: Invoke<C, R>,
}

impl<C: Send + Sync + 'static, R: Send + 'static> Callback<C, R> {
    pub(crate) fn sync<F>(signature: Signature, f: F) -> Self
    where
        F: Fn(&C, &[Value]) -> Result<R, MachineError> + Send + Sync + 'static,
    {
        Self {
            signature,
            invoke: Invoke::Sync(Arc::new(f)),
        }
    }

    pub(crate) fn suspending<F>(signature: Signature, f: F) -> Self
    where
        F: Fn(&C, &[Value]) -> Result<BoxFuture<'static, Result<R, MachineError>>, MachineError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            signature,
            invoke: Invoke::Suspending(Arc::new(f)),
        }
    }

    pub(crate) fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke the callable. A suspending callable is abandoned as soon as
    /// `cancel` fires.
    pub(crate) async fn call(
        &self,
        context: &C,
        values: &[Value],
        cancel: &CancellationToken,
    ) -> Result<R, MachineError> {
        match &self.invoke {
            Invoke::Sync(f) => f(context, values),
            Invoke::Suspending(f) => {
                let pending = f(context, values)?;
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(MachineError::Cancelled),
                    result = pending => result,
                }
            }
        }
    }
}

impl Callback<(), ()> {
    pub(crate) fn handler<P, R, F>(f: F) -> Self
    where
        P: Params,
        R: Outcome,
        F: Fn(P) -> R + Send + Sync + 'static,
    {
        Self::sync(P::signature(), move |_, values| {
            let params = P::from_values(values)?;
            f(params).into_outcome().map_err(MachineError::Handler)
        })
    }

    pub(crate) fn handler_async<P, Fut, F>(f: F) -> Self
    where
        P: Params,
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        F: Fn(P) -> Fut + Send + Sync + 'static,
    {
        Self::suspending(P::signature(), move |_, values| {
            let pending = f(P::from_values(values)?);
            Ok(async move { pending.await.into_outcome().map_err(MachineError::Handler) }.boxed())
        })
    }
}

impl Callback<(), bool> {
    pub(crate) fn guard<P, V, F>(f: F) -> Self
    where
        P: Params,
        V: Verdict,
        F: Fn(&P) -> V + Send + Sync + 'static,
    {
        Self::sync(P::signature(), move |_, values| {
            let params = P::from_values(values)?;
            f(&params).into_verdict().map_err(MachineError::Handler)
        })
    }

    pub(crate) fn guard_async<P, Fut, F>(f: F) -> Self
    where
        P: Params,
        Fut: Future + Send + 'static,
        Fut::Output: Verdict,
        F: Fn(P) -> Fut + Send + Sync + 'static,
    {
        Self::suspending(P::signature(), move |_, values| {
            let pending = f(P::from_values(values)?);
            Ok(async move { pending.await.into_verdict().map_err(MachineError::Handler) }.boxed())
        })
    }
}

impl<S: State, T: Trigger> Callback<Change<S, T>, ()> {
    pub(crate) fn change_handler<P, R, F>(f: F) -> Self
    where
        P: Params,
        R: Outcome,
        F: Fn(&S, &T, &S, P) -> R + Send + Sync + 'static,
    {
        Self::sync(P::signature(), move |change, values| {
            let params = P::from_values(values)?;
            f(&change.from, &change.trigger, &change.to, params)
                .into_outcome()
                .map_err(MachineError::Handler)
        })
    }

    pub(crate) fn change_handler_async<P, Fut, F>(f: F) -> Self
    where
        P: Params,
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        F: Fn(S, T, S, P) -> Fut + Send + Sync + 'static,
    {
        Self::suspending(P::signature(), move |change, values| {
            let params = P::from_values(values)?;
            let pending = f(
                change.from.clone(),
                change.trigger.clone(),
                change.to.clone(),
                params,
            );
            Ok(async move { pending.await.into_outcome().map_err(MachineError::Handler) }.boxed())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ParameterError;
    use std::sync::Mutex;

    #[tokio::test]
    async fn sync_handler_receives_typed_parameters() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = Callback::handler(move |(n, s): (i32, String)| {
            sink.lock().unwrap().push(format!("{n}:{s}"));
        });

        let values = (7_i32, "seven".to_string()).into_values();
        handler
            .call(&(), &values, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["7:seven".to_string()]);
        assert_eq!(handler.signature(), &Signature::of::<(i32, String)>());
    }

    #[tokio::test]
    async fn handler_fault_is_reported_as_handler_error() {
        let handler = Callback::handler(|(): ()| Err::<(), _>("nope"));

        let result = handler.call(&(), &[], &CancellationToken::new()).await;

        assert!(matches!(result, Err(MachineError::Handler(e)) if e.to_string() == "nope"));
    }

    #[tokio::test]
    async fn handler_rejects_mistyped_values() {
        let handler = Callback::handler(|(_n,): (i32,)| {});

        let values = ("not a number".to_string(),).into_values();
        let result = handler.call(&(), &values, &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(MachineError::Parameter(ParameterError::TypeMismatch { index: 0, .. }))
        ));
    }

    #[tokio::test]
    async fn suspending_guard_resolves() {
        let guard = Callback::guard_async(|(n,): (u32,)| async move { n > 3 });

        let cancel = CancellationToken::new();
        let allowed = guard.call(&(), &(5_u32,).into_values(), &cancel).await.unwrap();
        let denied = guard.call(&(), &(1_u32,).into_values(), &cancel).await.unwrap();

        assert!(allowed);
        assert!(!denied);
    }

    #[tokio::test]
    async fn cancellation_aborts_suspending_call() {
        let handler = Callback::handler_async(|(): ()| std::future::pending::<()>());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = handler.call(&(), &[], &cancel).await;

        assert!(matches!(result, Err(MachineError::Cancelled)));
    }

    #[tokio::test]
    async fn change_handler_sees_identifiers() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let handler: Callback<Change<&'static str, &'static str>, ()> =
            Callback::change_handler(move |from, trigger, to, (): ()| {
                *sink.lock().unwrap() = Some(format!("{from}-{trigger}->{to}"));
            });

        let change = Change {
            from: "A",
            trigger: "go",
            to: "B",
        };
        handler
            .call(&change, &[], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("A-go->B"));
    }
}
