use std::future::Future;

use crate::service::auto::{AutoController, Decision};
use crate::service::server::ControlServer;
use crate::service::state::Controller;

/// The cooperative control loop
///
/// Each iteration gives the auto-controller its chance to act, then waits
/// briefly for one control-plane connection. Everything runs on the caller's
/// task; any hold inside either step stalls the other.
pub struct Scheduler {
    controller: Controller,
    auto: AutoController,
    server: ControlServer,
}

impl Scheduler {
    pub fn new(controller: Controller, auto: AutoController, server: ControlServer) -> Self {
        Self {
            controller,
            auto,
            server,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// One loop iteration; returns whether a connection was serviced
    pub async fn step(&mut self) -> bool {
        if let Some(decision) = self.auto.tick(&mut self.controller).await {
            match decision {
                Decision::NoChange { percent } => {
                    tracing::debug!("Auto check: {}%, no change", percent)
                }
                Decision::Watered { percent, seconds } => {
                    tracing::info!("Auto cycle done: {}% -> watered {} s", percent, seconds)
                }
                Decision::ForcedOff { percent } => {
                    tracing::info!("Auto check: {}%, pump forced off", percent)
                }
            }
        }

        self.server.poll(&mut self.controller).await
    }

    /// Run until `shutdown` resolves, then make sure the pump is off
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Control loop started");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.step() => {}
            }
        }

        self.controller.pump.set_pump(false);
        tracing::info!("Control loop stopped, pump off");
    }
}
