//! Caller-supplied callbacks for result delivery.

use crate::error::SessionError;

type ResultFn = Box<dyn Fn(&str) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&SessionError) + Send + Sync>;
type ClearFn = Box<dyn Fn() + Send + Sync>;

/// Where recognized results go.
///
/// The result callback receives the formatted two-line string, at most once
/// per recognition event, never concurrently. The error callback (optional)
/// receives session failures that happen outside a call the caller made,
/// currently only device loss. The clear hook (optional) removes any
/// caller-rendered result UI; `resume` invokes it before re-enabling scanning.
pub struct ResultSink {
    on_result: ResultFn,
    on_error: Option<ErrorFn>,
    on_clear: Option<ClearFn>,
}

impl ResultSink {
    pub fn new(on_result: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            on_result: Box::new(on_result),
            on_error: None,
            on_clear: None,
        }
    }

    pub fn with_error_handler(mut self, on_error: impl Fn(&SessionError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    pub fn with_clear_hook(mut self, on_clear: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_clear = Some(Box::new(on_clear));
        self
    }

    pub(crate) fn result(&self, formatted: &str) {
        (self.on_result)(formatted);
    }

    pub(crate) fn error(&self, err: &SessionError) {
        if let Some(on_error) = &self.on_error {
            on_error(err);
        }
    }

    pub(crate) fn clear_results(&self) {
        if let Some(on_clear) = &self.on_clear {
            on_clear();
        }
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("has_error_handler", &self.on_error.is_some())
            .field("has_clear_hook", &self.on_clear.is_some())
            .finish()
    }
}
