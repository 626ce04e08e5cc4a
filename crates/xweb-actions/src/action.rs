//! Actions and their registration metadata.
//!
//! An action is a type constructed fresh for every request. It receives the
//! [`RequestContext`] through [`Action::new`], may bind form values into its
//! fields, and exposes handler methods that take one `String` per pattern
//! capture and return something convertible with [`IntoActionOutput`].
//!
//! Lifecycle hooks are optional capabilities: an action opts in by
//! implementing [`Initializable`], [`BeforeHook`] or [`AfterHook`] and
//! returning itself from the matching `as_*` query.
//!
//! # Examples
//!
//! ```
//! use xweb_actions::action::{Action, ActionDescriptor};
//! use xweb_actions::context::RequestContext;
//!
//! struct UserAction {
//!     ctx: RequestContext,
//! }
//!
//! impl Action for UserAction {
//!     fn new(ctx: RequestContext) -> Self {
//!         Self { ctx }
//!     }
//!     fn context(&self) -> &RequestContext {
//!         &self.ctx
//!     }
//!     fn context_mut(&mut self) -> &mut RequestContext {
//!         &mut self.ctx
//!     }
//! }
//!
//! impl UserAction {
//!     fn show(&mut self, id: String) -> String {
//!         format!("user {id}")
//!     }
//! }
//!
//! let descriptor = ActionDescriptor::new("show", UserAction::show).methods(["GET"]);
//! assert_eq!(descriptor.action_name(), "UserAction");
//! assert_eq!(descriptor.arity(), 1);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use http::Method;

use crate::binding::FormValues;
use crate::context::RequestContext;

/// Error type accepted from handler methods.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A request handler type, instantiated once per request.
pub trait Action: 'static {
    /// Builds the action around the request context.
    fn new(ctx: RequestContext) -> Self
    where
        Self: Sized;

    /// Returns the request context.
    fn context(&self) -> &RequestContext;

    /// Returns the request context, mutably.
    fn context_mut(&mut self) -> &mut RequestContext;

    /// Copies form values into the action's fields. Does nothing by default.
    fn bind(&mut self, _form: &FormValues<'_>) {}

    /// Returns the init capability, if implemented.
    fn as_initializable(&mut self) -> Option<&mut dyn Initializable> {
        None
    }

    /// Returns the before-hook capability, if implemented.
    fn as_before_hook(&mut self) -> Option<&mut dyn BeforeHook> {
        None
    }

    /// Returns the after-hook capability, if implemented.
    fn as_after_hook(&mut self) -> Option<&mut dyn AfterHook> {
        None
    }
}

/// Runs before any hook or handler, after binding.
pub trait Initializable {
    /// Prepares the action.
    fn init(&mut self);
}

/// Runs right before the handler method.
pub trait BeforeHook {
    /// Called with the action type name and the handler method name.
    fn before(&mut self, action_name: &str, method_name: &str);
}

/// Runs after the handler method returned normally.
pub trait AfterHook {
    /// Called with the action type name, the handler method name, and the
    /// handler's result.
    fn after(&mut self, action_name: &str, method_name: &str, output: &ActionOutput);
}

/// The rendered result of a handler method.
#[derive(Debug)]
pub enum ActionOutput {
    /// Nothing returned; whatever the action wrote is the response.
    Empty,
    /// Text body.
    Text(String),
    /// Raw body bytes.
    Bytes(Vec<u8>),
    /// The handler reported an error.
    Failed(BoxError),
}

impl ActionOutput {
    /// Returns `true` for [`ActionOutput::Failed`].
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Conversion of handler return values into an [`ActionOutput`].
pub trait IntoActionOutput {
    /// Performs the conversion.
    fn into_action_output(self) -> ActionOutput;
}

impl IntoActionOutput for ActionOutput {
    fn into_action_output(self) -> ActionOutput {
        self
    }
}

impl IntoActionOutput for () {
    fn into_action_output(self) -> ActionOutput {
        ActionOutput::Empty
    }
}

impl IntoActionOutput for String {
    fn into_action_output(self) -> ActionOutput {
        ActionOutput::Text(self)
    }
}

impl IntoActionOutput for &'static str {
    fn into_action_output(self) -> ActionOutput {
        ActionOutput::Text(self.to_string())
    }
}

impl IntoActionOutput for Vec<u8> {
    fn into_action_output(self) -> ActionOutput {
        ActionOutput::Bytes(self)
    }
}

impl<T, E> IntoActionOutput for Result<T, E>
where
    T: IntoActionOutput,
    E: Into<BoxError>,
{
    fn into_action_output(self) -> ActionOutput {
        match self {
            Ok(value) => value.into_action_output(),
            Err(err) => ActionOutput::Failed(err.into()),
        }
    }
}

/// A handler method on action `A` taking `Args` string captures.
///
/// Implemented for functions `fn(&mut A, String, ...) -> R` with up to six
/// `String` parameters, where `R: IntoActionOutput`.
pub trait Handler<A, Args>: Send + Sync + 'static {
    /// Number of `String` parameters.
    const ARITY: usize;

    /// Calls the handler with the captures in order.
    fn call(&self, action: &mut A, captures: Vec<String>) -> ActionOutput;
}

macro_rules! impl_handler {
    (@count) => { 0 };
    (@count $head:ident $($tail:ident)*) => { 1 + impl_handler!(@count $($tail)*) };
    ($($arg:ident: $ty:ty),*) => {
        impl<A, F, R> Handler<A, ($($ty,)*)> for F
        where
            F: Fn(&mut A $(, $ty)*) -> R + Send + Sync + 'static,
            R: IntoActionOutput,
        {
            const ARITY: usize = impl_handler!(@count $($arg)*);

            #[allow(unused_mut, unused_variables)]
            fn call(&self, action: &mut A, captures: Vec<String>) -> ActionOutput {
                let mut captures = captures.into_iter();
                $(let $arg = captures.next().unwrap_or_default();)*
                (self)(action $(, $arg)*).into_action_output()
            }
        }
    };
}

impl_handler!();
impl_handler!(a: String);
impl_handler!(a: String, b: String);
impl_handler!(a: String, b: String, c: String);
impl_handler!(a: String, b: String, c: String, d: String);
impl_handler!(a: String, b: String, c: String, d: String, e: String);
impl_handler!(a: String, b: String, c: String, d: String, e: String, f: String);

/// Type-erased, per-request action instance driven by the dispatcher.
pub(crate) trait ActionInstance {
    fn bind(&mut self, form: &FormValues<'_>);
    fn init(&mut self);
    fn before(&mut self, action_name: &str, method_name: &str);
    fn invoke(&mut self, captures: Vec<String>) -> ActionOutput;
    fn after(&mut self, action_name: &str, method_name: &str, output: &ActionOutput);
    fn context_mut(&mut self) -> &mut RequestContext;
}

struct BoundAction<A, H, Args> {
    action: A,
    handler: Arc<H>,
    _args: PhantomData<fn() -> Args>,
}

impl<A, H, Args> ActionInstance for BoundAction<A, H, Args>
where
    A: Action,
    H: Handler<A, Args>,
{
    fn bind(&mut self, form: &FormValues<'_>) {
        self.action.bind(form);
    }

    fn init(&mut self) {
        if let Some(hook) = self.action.as_initializable() {
            hook.init();
        }
    }

    fn before(&mut self, action_name: &str, method_name: &str) {
        if let Some(hook) = self.action.as_before_hook() {
            hook.before(action_name, method_name);
        }
    }

    fn invoke(&mut self, captures: Vec<String>) -> ActionOutput {
        self.handler.call(&mut self.action, captures)
    }

    fn after(&mut self, action_name: &str, method_name: &str, output: &ActionOutput) {
        if let Some(hook) = self.action.as_after_hook() {
            hook.after(action_name, method_name, output);
        }
    }

    fn context_mut(&mut self) -> &mut RequestContext {
        self.action.context_mut()
    }
}

type Constructor = dyn Fn(RequestContext) -> Box<dyn ActionInstance> + Send + Sync;

/// Immutable registration metadata for one action route.
#[derive(Clone)]
pub struct ActionDescriptor {
    action_name: &'static str,
    method_name: String,
    allowed_methods: Option<HashSet<Method>>,
    arity: usize,
    construct: Arc<Constructor>,
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("action_name", &self.action_name)
            .field("method_name", &self.method_name)
            .field("allowed_methods", &self.allowed_methods)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl ActionDescriptor {
    /// Binds `handler`, a method of action `A`, under `method_name`.
    ///
    /// Every HTTP method is accepted until [`methods`](Self::methods) narrows it.
    pub fn new<A, Args, H>(method_name: impl Into<String>, handler: H) -> Self
    where
        A: Action,
        Args: 'static,
        H: Handler<A, Args>,
    {
        let handler = Arc::new(handler);
        let construct: Arc<Constructor> = Arc::new(move |ctx: RequestContext| {
            Box::new(BoundAction {
                action: A::new(ctx),
                handler: Arc::clone(&handler),
                _args: PhantomData,
            }) as Box<dyn ActionInstance>
        });

        Self {
            action_name: short_type_name::<A>(),
            method_name: method_name.into(),
            allowed_methods: None,
            arity: H::ARITY,
            construct,
        }
    }

    /// Restricts the route to the given HTTP methods.
    ///
    /// `HEAD` requests are matched as `GET`. Unknown method names are skipped.
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = methods
            .into_iter()
            .filter_map(|m| Method::from_bytes(m.as_ref().to_uppercase().as_bytes()).ok())
            .collect();
        self.allowed_methods = Some(set);
        self
    }

    /// Returns the action type name without its module path.
    pub const fn action_name(&self) -> &'static str {
        self.action_name
    }

    /// Returns the handler method name.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Returns the number of captures the handler expects.
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the allowed methods, or `None` when every method is allowed.
    pub const fn allowed_methods(&self) -> Option<&HashSet<Method>> {
        self.allowed_methods.as_ref()
    }

    /// Returns `true` if the (already normalized) method may use this route.
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods
            .as_ref()
            .map_or(true, |set| set.contains(method))
    }

    pub(crate) fn instantiate(&self, ctx: RequestContext) -> Box<dyn ActionInstance> {
        (self.construct)(ctx)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
