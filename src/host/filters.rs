//! Ordered `Router -> Router` transforms per filter hook.

use std::fmt;

use crate::host::FilterHook;
use crate::routing::Router;

type RouterFilter = Box<dyn Fn(Router) -> Router + Send + Sync>;

#[derive(Default)]
pub struct RouterFilters {
    created: Vec<RouterFilter>,
    configured: Vec<RouterFilter>,
}

impl RouterFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform; transforms run in the order added.
    pub fn add<F>(&mut self, hook: FilterHook, filter: F) -> &mut Self
    where
        F: Fn(Router) -> Router + Send + Sync + 'static,
    {
        self.list_mut(hook).push(Box::new(filter));
        self
    }

    pub fn apply(&self, hook: FilterHook, router: Router) -> Router {
        self.list(hook).iter().fold(router, |router, filter| filter(router))
    }

    pub fn len(&self, hook: FilterHook) -> usize {
        self.list(hook).len()
    }

    pub fn is_empty(&self, hook: FilterHook) -> bool {
        self.list(hook).is_empty()
    }

    fn list(&self, hook: FilterHook) -> &[RouterFilter] {
        match hook {
            FilterHook::RouterCreated => &self.created,
            FilterHook::RouterConfigured => &self.configured,
        }
    }

    fn list_mut(&mut self, hook: FilterHook) -> &mut Vec<RouterFilter> {
        match hook {
            FilterHook::RouterCreated => &mut self.created,
            FilterHook::RouterConfigured => &mut self.configured,
        }
    }
}

impl fmt::Debug for RouterFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterFilters")
            .field("created", &self.created.len())
            .field("configured", &self.configured.len())
            .finish()
    }
}
