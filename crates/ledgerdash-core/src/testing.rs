//! In-memory [`ProcessRunner`] for tests
//!
//! Answers every invocation through a closure and records the command lines
//! it was asked to run.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{CoreError, CoreResult};
use crate::invoke::{LedgerInvocation, ProcessRunner};

type Responder = dyn Fn(&LedgerInvocation) -> CoreResult<String> + Send + Sync;

pub struct FakeRunner {
    responder: Box<Responder>,
    calls: AtomicUsize,
    commands: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&LedgerInvocation) -> CoreResult<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        })
    }

    /// Same output for every command
    pub fn fixed(output: &str) -> Arc<Self> {
        let output = output.to_string();
        Self::new(move |_| Ok(output.clone()))
    }

    /// Every command fails with `message` as if ledger wrote it to stderr
    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(move |invocation| {
            Err(CoreError::ProcessError {
                command: invocation.command_line(),
                message: message.clone(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, invocation: &LedgerInvocation) -> CoreResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(invocation.command_line());
        // Let other tasks observe the in-flight call
        tokio::task::yield_now().await;
        (self.responder)(invocation)
    }
}
