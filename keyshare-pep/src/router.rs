//! Message dispatch.

use std::collections::BTreeMap;
use std::fmt;

use keyshare_types::{Address, Height, Msg};

use crate::DispatchError;

/// Execution context handed to message handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecContext {
    pub chain_id: String,
    pub height: Height,
    pub creator: Address,
}

pub trait MsgRouter {
    fn dispatch(&mut self, ctx: &ExecContext, msg: &Msg) -> Result<(), DispatchError>;
}

type Handler = Box<dyn FnMut(&ExecContext, &serde_json::Value) -> Result<(), String> + Send>;

/// Routes messages to handlers registered by type URL.
#[derive(Default)]
pub struct Router {
    handlers: BTreeMap<String, Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler of a message type, replacing any previous one.
    pub fn route<S, F>(mut self, type_url: S, f: F) -> Self
    where
        S: Into<String>,
        F: FnMut(&ExecContext, &serde_json::Value) -> Result<(), String> + Send + 'static,
    {
        self.handlers.insert(type_url.into(), Box::new(f));
        self
    }

    pub fn has_route(&self, type_url: &str) -> bool {
        self.handlers.contains_key(type_url)
    }
}

impl MsgRouter for Router {
    fn dispatch(&mut self, ctx: &ExecContext, msg: &Msg) -> Result<(), DispatchError> {
        let h = self
            .handlers
            .get_mut(&msg.type_url)
            .ok_or_else(|| DispatchError::Unroutable(msg.type_url.clone()))?;
        h(ctx, &msg.value).map_err(|reason| DispatchError::Failed {
            type_url: msg.type_url.clone(),
            reason,
        })
    }
}

impl<T: MsgRouter + ?Sized> MsgRouter for &mut T {
    fn dispatch(&mut self, ctx: &ExecContext, msg: &Msg) -> Result<(), DispatchError> {
        (**self).dispatch(ctx, msg)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
