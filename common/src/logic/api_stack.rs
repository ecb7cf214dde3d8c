use std::{sync::Arc, time::Duration};

use frontend_defs::{
    BackendError, FrontendError, StackBackend, StackDescriptor, StackPhase, StackRecord,
    StackStatus,
};
use log::{debug, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Drives a stack to a terminal state through a [`StackBackend`].
#[derive(Clone)]
pub struct StackConvergence {
    backend: Arc<dyn StackBackend>,
    poll_interval: Duration,
    max_poll_attempts: Option<u32>,
}

impl StackConvergence {
    pub fn new(backend: Arc<dyn StackBackend>) -> Self {
        StackConvergence {
            backend,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Bounds every poll loop. `None` polls until a terminal state is seen.
    pub fn with_max_poll_attempts(mut self, max_poll_attempts: Option<u32>) -> Self {
        self.max_poll_attempts = max_poll_attempts;
        self
    }

    /// Existence probe, any backend error counts as "does not exist".
    pub async fn stack_exists(&self, name: &str) -> bool {
        match self.backend.describe_stack(name).await {
            Ok(records) => !records.is_empty(),
            Err(e) => {
                debug!("Stack {} treated as absent: {}", name, e);
                false
            }
        }
    }

    /// Creates or updates the stack, then waits until it is complete.
    pub async fn converge(&self, descriptor: &StackDescriptor) -> Result<StackRecord, FrontendError> {
        if self.stack_exists(&descriptor.name).await {
            info!("Updating stack {}", descriptor.name);
            match self.backend.update_stack(descriptor).await {
                Ok(()) => {}
                Err(e) if e.is_no_op_update() => {
                    info!("Stack {} is up to date", descriptor.name);
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            info!("Creating stack {}", descriptor.name);
            self.backend.create_stack(descriptor).await?;
        }

        self.wait_for_terminal(&descriptor.name).await
    }

    /// Polls until the stack reports a completion status.
    ///
    /// Failure and rollback statuses end the wait with [`FrontendError::StackFailed`],
    /// everything else (including a missing status) keeps polling.
    pub async fn wait_for_terminal(&self, name: &str) -> Result<StackRecord, FrontendError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let records = self.backend.describe_stack(name).await?;
            let record = latest_record(name, records);
            let status = record.stack_status();

            match status.phase() {
                StackPhase::Success => {
                    info!("Stack {} reached {}", name, status);
                    return Ok(record);
                }
                StackPhase::Failure => return Err(stack_failed(name, &status, &record)),
                StackPhase::Transient => {
                    debug!("Stack {} is {}, polling again", name, status);
                }
            }

            self.check_poll_bound(name, attempts, &status)?;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Deletes the stack if it exists and waits until it is gone.
    ///
    /// Returns whether a delete was issued.
    pub async fn delete(&self, name: &str) -> Result<bool, FrontendError> {
        if !self.stack_exists(name).await {
            info!("Stack {} does not exist, nothing to delete", name);
            return Ok(false);
        }

        info!("Deleting stack {}", name);
        self.backend.delete_stack(name).await?;
        self.wait_for_deletion(name).await?;
        Ok(true)
    }

    async fn wait_for_deletion(&self, name: &str) -> Result<(), FrontendError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let records = match self.backend.describe_stack(name).await {
                Ok(records) => records,
                Err(BackendError::NotFound(_)) => break,
                Err(e) => return Err(e.into()),
            };
            if records.is_empty() {
                break;
            }

            let record = latest_record(name, records);
            let status = record.stack_status();
            match status.phase() {
                StackPhase::Success if status.as_str() == "DELETE_COMPLETE" => break,
                StackPhase::Failure => return Err(stack_failed(name, &status, &record)),
                _ => debug!("Stack {} is {}, waiting for deletion", name, status),
            }

            self.check_poll_bound(name, attempts, &status)?;
            tokio::time::sleep(self.poll_interval).await;
        }

        info!("Stack {} deleted", name);
        Ok(())
    }

    fn check_poll_bound(
        &self,
        name: &str,
        attempts: u32,
        status: &StackStatus,
    ) -> Result<(), FrontendError> {
        match self.max_poll_attempts {
            Some(max) if attempts >= max => Err(FrontendError::StackTimeout {
                stack: name.to_string(),
                attempts,
                status: status.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

// The backend returns the history oldest first, the last entry is current
fn latest_record(name: &str, records: Vec<StackRecord>) -> StackRecord {
    records.into_iter().last().unwrap_or_else(|| StackRecord {
        name: name.to_string(),
        ..Default::default()
    })
}

fn stack_failed(name: &str, status: &StackStatus, record: &StackRecord) -> FrontendError {
    FrontendError::StackFailed {
        stack: name.to_string(),
        status: status.to_string(),
        reason: record.reason().to_string(),
    }
}
