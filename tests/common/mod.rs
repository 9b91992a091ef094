//! Shared utilities for integration tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use site_router::host::{Emitter, FilterHook, HookAction, Host};
use site_router::http::{Request, Response};
use site_router::routing::Router;

/// Host double that records every hook interaction.
#[allow(dead_code)]
pub struct RecordingHost {
    pub site_url: String,
    pub actions: Vec<(String, HookAction)>,
    pub filters_applied: Vec<FilterHook>,
    pub replace_on_configured: Option<Box<dyn Fn() -> Router>>,
}

#[allow(dead_code)]
impl RecordingHost {
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.to_string(),
            actions: Vec::new(),
            filters_applied: Vec::new(),
            replace_on_configured: None,
        }
    }

    pub fn count(&self, hook: FilterHook) -> usize {
        self.filters_applied.iter().filter(|h| **h == hook).count()
    }
}

impl Host for RecordingHost {
    fn site_url(&self) -> String {
        self.site_url.clone()
    }

    fn add_action(&mut self, event: &str, action: HookAction) {
        self.actions.push((event.to_string(), action));
    }

    fn apply_filters(&mut self, hook: FilterHook, router: Router) -> Router {
        self.filters_applied.push(hook);
        match (&self.replace_on_configured, hook) {
            (Some(replacement), FilterHook::RouterConfigured) => replacement(),
            _ => router,
        }
    }
}

/// Emitter that counts sends and keeps the last response.
#[derive(Default)]
#[allow(dead_code)]
pub struct CountingEmitter {
    pub sent: usize,
    pub last: Option<Response>,
}

impl Emitter for CountingEmitter {
    fn emit(&mut self, response: &Response) -> io::Result<()> {
        self.sent += 1;
        self.last = Some(response.clone());
        Ok(())
    }
}

/// A terminate capability that counts invocations.
#[allow(dead_code)]
pub fn counting_terminate() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    (calls, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[allow(dead_code)]
pub fn request(method: &str, uri: &str) -> Request {
    Request::create(method, uri).unwrap()
}
