//! Handler adapters.
//!
//! Handlers are plain async functions. The first parameter is always the
//! per-request [`RequestContext`]; the remaining ones are bound positionally
//! from the request and must implement [`FromArg`]. The return value must
//! implement [`IntoReply`]: a [`Reply`], or a `Result<Reply, E>` whose error is
//! reported as a handler failure. A [`StoreError`] keeps its type.
//!
//! ```rust,ignore
//! async fn counter(ctx: Arc<RequestContext>) -> Reply {
//!     Reply::text("Counter: 0")
//! }
//!
//! async fn add_digit(ctx: Arc<RequestContext>, digit: i32) -> Result<Reply, StoreError> {
//!     // ...
//! }
//!
//! async fn mail(
//!     ctx: Arc<RequestContext>,
//!     name: String,
//!     address: String,
//!     subject: String,
//!     body: String,
//! ) -> Reply {
//!     // ...
//! }
//! ```
//!
//! Registration erases the handler into a [`BoxedHandler`] and records its
//! declared [`ParamType`]s, so the matcher never needs to know the concrete
//! function type.

use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use switchyard_core::StoreError;

use crate::binder::{ArgValue, FromArg, ParamType};
use crate::context::RequestContext;
use crate::error::InvokeError;
use crate::reply::Reply;

// ============================================================================
// IntoReply - handler return values
// ============================================================================

/// Types a handler may return.
pub trait IntoReply: Send {
    /// Converts the return value into a reply, or the handler's failure.
    fn into_reply(self) -> Result<Reply, InvokeError>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, InvokeError> {
        Ok(self)
    }
}

impl<E: Display + Send + 'static> IntoReply for Result<Reply, E> {
    fn into_reply(self) -> Result<Reply, InvokeError> {
        self.map_err(|e| {
            let message = e.to_string();
            match (Box::new(e) as Box<dyn Any>).downcast::<StoreError>() {
                Ok(store) => InvokeError::Store(*store),
                Err(_) => InvokeError::Failed(message),
            }
        })
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// A routable handler taking parameters `T`.
///
/// Implemented for async functions and closures of the form
/// `Fn(Arc<RequestContext>, T1, .., Tn) -> impl Future<Output = impl IntoReply>`
/// with up to eight bound parameters.
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Declared types of the bound parameters, in order.
    fn param_types() -> Vec<ParamType>;

    /// Invokes the handler with already-bound arguments.
    async fn call(self, ctx: Arc<RequestContext>, args: Vec<ArgValue>) -> Result<Reply, InvokeError>;
}

/// A type-erased handler stored in the registry.
pub type BoxedHandler = Arc<
    dyn Fn(Arc<RequestContext>, Vec<ArgValue>) -> BoxFuture<'static, Result<Reply, InvokeError>>
        + Send
        + Sync,
>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(move |ctx, args| handler.clone().call(ctx, args))
}

// ============================================================================
// Handler implementations for functions
// ============================================================================

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce(Arc<RequestContext>, $($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoReply + 'static,
            $( $ty: FromArg, )*
        {
            fn param_types() -> Vec<ParamType> {
                vec![$($ty::PARAM_TYPE,)*]
            }

            async fn call(
                self,
                ctx: Arc<RequestContext>,
                args: Vec<ArgValue>,
            ) -> Result<Reply, InvokeError> {
                let declared: &[ParamType] = &[$($ty::PARAM_TYPE,)*];
                if args.len() != declared.len() {
                    return Err(InvokeError::ArityMismatch {
                        expected: declared.len(),
                        got: args.len(),
                    });
                }

                let mut args = args.into_iter();
                let mut index = 0usize;
                $(
                    let $ty = args
                        .next()
                        .and_then($ty::from_arg)
                        .ok_or(InvokeError::TypeMismatch {
                            index,
                            expected: $ty::PARAM_TYPE,
                        })?;
                    index += 1;
                )*

                let res = (self)(ctx, $($ty,)*).await;
                res.into_reply()
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
