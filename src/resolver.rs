//! Turns interrupts into decisions.
//!
//! Each interrupt's JSON value is classified first. Authorization interrupts
//! block until the user finishes the consent flow in a browser;
//! human-in-the-loop interrupts ask a yes/no question at the console. Failures never escape: anything that goes wrong resolves to
//! [`Decision::deny`].

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::arcade::{AuthStatus, AuthorizationResponse};
use crate::console::Console;
use crate::constants::APPROVAL_QUESTION;
use crate::interrupt::{Decision, Interrupt, InterruptKind, ResumePayload};

/// Blocks until an authorization request reaches a final status.
#[async_trait::async_trait]
pub trait AuthorizationWaiter: Send + Sync {
    async fn wait_for_completion(&self, id: &str) -> Result<AuthorizationResponse>;
}

/// Resolves interrupt batches one interrupt at a time.
pub struct InterruptResolver {
    waiter: Arc<dyn AuthorizationWaiter>,
}

impl InterruptResolver {
    pub fn new(waiter: Arc<dyn AuthorizationWaiter>) -> Self {
        Self { waiter }
    }

    /// Resolves a single interrupt.
    pub async fn resolve(&self, interrupt: &Interrupt, console: &mut dyn Console) -> Decision {
        match interrupt.kind() {
            InterruptKind::Authorization { tool_name, request } => {
                console.status(&format!("Authorization required for tool call {}", tool_name));
                console.status(&format!(
                    "Please authorize in your browser {}",
                    request.url.as_deref().unwrap_or("")
                ));
                console.status("Waiting for you to complete authorization...");
                match self.waiter.wait_for_completion(&request.id).await {
                    Ok(response) if response.status == AuthStatus::Completed => {
                        debug!(tool = %tool_name, scopes = ?response.scopes, "authorization granted");
                        console.status("Authorization granted. Resuming execution...");
                        Decision::allow()
                    }
                    Ok(response) => {
                        warn!(tool = %tool_name, status = ?response.status, "authorization not completed");
                        console.status_error(&format!(
                            "Error waiting for authorization to complete: status {:?}",
                            response.status
                        ));
                        Decision::deny()
                    }
                    Err(e) => {
                        warn!(tool = %tool_name, error = %e, "authorization wait failed");
                        console.status_error(&format!(
                            "Error waiting for authorization to complete: {}",
                            e
                        ));
                        Decision::deny()
                    }
                }
            }
            InterruptKind::HumanApproval { tool_name, input } => {
                console.status(&format!("Human in the loop required for tool call {}", tool_name));
                console.status(&format!("Please approve the tool call {}", input));
                match console.confirm(APPROVAL_QUESTION) {
                    Ok(approved) => {
                        debug!(tool = %tool_name, approved, "approval answered");
                        Decision { authorized: approved }
                    }
                    Err(e) => {
                        warn!(tool = %tool_name, error = %e, "could not read approval");
                        Decision::deny()
                    }
                }
            }
            InterruptKind::Unrecognized { payload } => {
                warn!(id = %interrupt.id, %payload, "unrecognized interrupt");
                console.status(&format!(
                    "Unrecognized interrupt {}, treating it as not authorized",
                    interrupt.id
                ));
                Decision::deny()
            }
        }
    }

    /// Resolves a batch in order and packs the decisions.
    ///
    /// Returns `None` for an empty batch.
    pub async fn resolve_all(
        &self,
        interrupts: &[Interrupt],
        console: &mut dyn Console,
    ) -> Option<ResumePayload> {
        let mut decisions = Vec::with_capacity(interrupts.len());
        for interrupt in interrupts {
            decisions.push(self.resolve(interrupt, console).await);
        }
        ResumePayload::pack(decisions)
    }
}
