//! Mapping functions computing next-state parameters.
//!
//! A mapping reads the current state's parameters (followed by any trigger
//! arguments) and produces the parameters of the next state. Every
//! input/output arity combination shares one erased contract; `Same` and
//! `Empty` are the degenerate variants that carry parameters over unchanged
//! or drop them.

use super::callback::Callback;
use super::error::{HandlerError, MachineError};
use crate::core::{Params, Signature, Value};
use futures::future::FutureExt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub(crate) enum Mapping {
    /// Carry the first `arity` input values over unchanged.
    Same { arity: usize },
    /// The next state takes no parameters.
    Empty,
    Transform {
        output: Signature,
        callback: Callback<(), Vec<Value>>,
    },
}

impl Mapping {
    pub(crate) fn map<I, O, F>(f: F) -> Self
    where
        I: Params,
        O: Params,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Self::Transform {
            output: O::signature(),
            callback: Callback::sync(I::signature(), move |_, values| {
                let input = I::from_values(values)?;
                Ok(f(input).into_values())
            }),
        }
    }

    pub(crate) fn try_map<I, O, E, F>(f: F) -> Self
    where
        I: Params,
        O: Params,
        E: Into<HandlerError>,
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        Self::Transform {
            output: O::signature(),
            callback: Callback::sync(I::signature(), move |_, values| {
                let input = I::from_values(values)?;
                f(input)
                    .map(Params::into_values)
                    .map_err(|e| MachineError::Handler(e.into()))
            }),
        }
    }

    pub(crate) fn map_async<I, O, Fut, F>(f: F) -> Self
    where
        I: Params,
        O: Params,
        Fut: Future<Output = O> + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
    {
        Self::Transform {
            output: O::signature(),
            callback: Callback::suspending(I::signature(), move |_, values| {
                let pending = f(I::from_values(values)?);
                Ok(async move { Ok(pending.await.into_values()) }.boxed())
            }),
        }
    }

    pub(crate) fn try_map_async<I, O, E, Fut, F>(f: F) -> Self
    where
        I: Params,
        O: Params,
        E: Into<HandlerError>,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
    {
        Self::Transform {
            output: O::signature(),
            callback: Callback::suspending(I::signature(), move |_, values| {
                let pending = f(I::from_values(values)?);
                Ok(async move {
                    pending
                        .await
                        .map(Params::into_values)
                        .map_err(|e| MachineError::Handler(e.into()))
                }
                .boxed())
            }),
        }
    }

    /// Signature of the values this mapping produces for a source state
    /// declared with `source`.
    pub(crate) fn output(&self, source: &Signature) -> Signature {
        match self {
            Self::Same { .. } => source.clone(),
            Self::Empty => Signature::empty(),
            Self::Transform { output, .. } => output.clone(),
        }
    }

    /// Compute next-state parameters from `input`. The caller decides whether
    /// to commit the result; a failed mapping produces nothing.
    pub(crate) async fn apply(
        &self,
        input: &[Value],
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>, MachineError> {
        match self {
            Self::Same { arity } => Ok(input.iter().take(*arity).cloned().collect()),
            Self::Empty => Ok(Vec::new()),
            Self::Transform { callback, .. } => callback.call(&(), input, cancel).await,
        }
    }
}
