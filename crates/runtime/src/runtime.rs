//! High-level runtime orchestrator.
//!
//! The runtime owns the step worker, wires up command/event channels, and
//! exposes a builder-based API for embedding the stack engine in an async
//! host.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use stack_core::StackConfig;

use crate::api::{Result, RuntimeError, StackHandle};
use crate::engine::StackEngine;
use crate::events::EventBus;
use crate::host::HostAdapter;
use crate::loot::{LootProvider, NoLoot};
use crate::scheduler::OffStepMode;
use crate::workers::{Command, StepWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub stack_config: StackConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Main step period. `None` steps only on explicit requests.
    pub step_interval: Option<Duration>,
}

impl RuntimeConfig {
    /// One host tick at 20 ticks per second.
    pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(50);
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_config: StackConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            step_interval: Some(Self::DEFAULT_STEP_INTERVAL),
        }
    }
}

/// Main runtime that drives the stack engine
///
/// Runtime owns the worker; [`StackHandle`] provides a cloneable façade for
/// clients.
pub struct Runtime {
    handle: StackHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder<H>() -> RuntimeBuilder<H>
    where
        H: HostAdapter + Send + 'static,
    {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> StackHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every outstanding [`StackHandle`] is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder<H> {
    config: RuntimeConfig,
    host: Option<H>,
    loot: Option<Arc<dyn LootProvider>>,
}

impl<H> RuntimeBuilder<H>
where
    H: HostAdapter + Send + 'static,
{
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            host: None,
            loot: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the stacking rules
    pub fn stack_config(mut self, stack_config: StackConfig) -> Self {
        self.config.stack_config = stack_config;
        self
    }

    /// Set the required host adapter
    pub fn host(mut self, host: H) -> Self {
        self.host = Some(host);
        self
    }

    /// Set the loot provider (default: no loot)
    pub fn loot(mut self, provider: impl LootProvider + 'static) -> Self {
        self.loot = Some(Arc::new(provider));
        self
    }

    /// Build the runtime
    ///
    /// Must be called inside a tokio runtime: loot is evaluated on its
    /// blocking pool.
    pub async fn build(self) -> Result<Runtime> {
        let host = self.host.ok_or(RuntimeError::MissingHost)?;
        let loot = self.loot.unwrap_or_else(|| Arc::new(NoLoot));

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = StackHandle::new(command_tx, event_bus.clone());

        let engine = StackEngine::new(
            host,
            self.config.stack_config,
            loot,
            OffStepMode::Blocking(tokio::runtime::Handle::current()),
        );
        let worker = StepWorker::new(engine, command_rx, event_bus, self.config.step_interval);

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
