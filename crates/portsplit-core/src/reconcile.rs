// ── Reconcile workflow ──
//
// Drives one device through the full move: locate its reconcile configlet,
// build a plan, replace the tap/tool/shutdown automation configlets, then
// write the residual back into the reconcile configlet.
//
// Updates are sequential and fail-fast. There is no rollback: if the tool
// configlet update fails after the tap configlet was replaced, CVP is left
// with the tap change applied and the reconcile configlet untouched.

use serde::Serialize;
use tracing::{debug, info, warn};

use portsplit_api::{Configlet, CvpClient, Device};

use crate::classify::PortCategory;
use crate::config::ConnectionConfig;
use crate::error::CoreError;
use crate::plan::{Plan, PlanOptions};

/// Knobs for [`Reconciler::run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Resolve everything and render, but write nothing.
    pub dry_run: bool,
    pub plan: PlanOptions,
}

/// Outcome of one reconcile run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub device: String,
    pub device_mac: String,
    pub reconcile_configlet: String,
    pub dry_run: bool,
    /// Automation configlets replaced, in update order. Includes the
    /// reconcile configlet itself when it was written back.
    pub updated: Vec<String>,
    pub plan: Plan,
}

/// Executes reconcile plans against a CVP server.
#[derive(Debug)]
pub struct Reconciler {
    client: CvpClient,
}

impl Reconciler {
    /// Wrap an already-authenticated client.
    pub fn new(client: CvpClient) -> Self {
        Self { client }
    }

    /// Authenticate and probe the server.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, CoreError> {
        let client =
            CvpClient::connect(config.url.clone(), &config.credentials(), &config.transport())
                .await?;

        let server_info = client.cvp_info().await.map_err(|e| match CoreError::from(e) {
            err @ (CoreError::AuthenticationFailed { .. } | CoreError::Timeout) => err,
            other => CoreError::ConnectionFailed {
                url: config.url.to_string(),
                reason: format!("failed to get CVP info: {other}"),
            },
        })?;
        info!(
            url = %config.url,
            version = server_info.version.as_deref().unwrap_or("unknown"),
            "connected to CVP"
        );

        Ok(Self::new(client))
    }

    /// End the server session. Failures are logged, not returned.
    pub async fn disconnect(&self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout failed");
        }
    }

    /// Move the reconciled interfaces of `device` into its automation configlets.
    pub async fn run(
        &self,
        device: &str,
        options: ReconcileOptions,
    ) -> Result<ReconcileReport, CoreError> {
        let dev = self.find_device(device).await?;
        let reconcile = self.find_reconcile_configlet(&dev).await?;

        let plan = Plan::build(&reconcile.config, options.plan);
        info!(
            interfaces = plan.outcomes.len(),
            templated = plan.templated_count(),
            "parsed reconcile configlet"
        );

        let mut updated = Vec::new();

        for (category, body) in &plan.rendered {
            let target = self.find_automation_configlet(device, *category).await?;
            if options.dry_run {
                debug!(configlet = %target.name, "dry run: skipping update");
                continue;
            }
            info!(configlet = %target.name, "updating {category} ports automation configlet");
            self.client
                .update_configlet(body, &target.key, &target.name)
                .await
                .map_err(|e| update_error(&target.name, e))?;
            updated.push(target.name);
        }

        if options.dry_run {
            debug!(configlet = %reconcile.name, "dry run: skipping reconcile write-back");
        } else {
            info!(configlet = %reconcile.name, "updating reconcile configlet to remove interfaces");
            let residual = Configlet {
                config: plan.residual.clone(),
                reconciled: true,
                ..reconcile.clone()
            };
            self.client
                .update_reconcile_configlet(&dev.system_mac_address, &residual)
                .await
                .map_err(|e| update_error(&reconcile.name, e))?;
            updated.push(reconcile.name.clone());
        }

        Ok(ReconcileReport {
            device: dev.fqdn,
            device_mac: dev.system_mac_address,
            reconcile_configlet: reconcile.name,
            dry_run: options.dry_run,
            updated,
            plan,
        })
    }

    async fn find_device(&self, fqdn: &str) -> Result<Device, CoreError> {
        let device = self
            .client
            .device_by_fqdn(fqdn)
            .await?
            .ok_or_else(|| CoreError::DeviceNotFound { fqdn: fqdn.into() })?;
        info!(fqdn, mac = %device.system_mac_address, "found device info");
        Ok(device)
    }

    /// The last configlet flagged `reconciled` wins.
    async fn find_reconcile_configlet(&self, device: &Device) -> Result<Configlet, CoreError> {
        let configlets = self
            .client
            .configlets_by_device(&device.system_mac_address)
            .await?;
        if configlets.is_empty() {
            return Err(CoreError::NoConfiglets {
                device: device.fqdn.clone(),
            });
        }
        info!(count = configlets.len(), "found device configlets");

        let reconcile = configlets
            .into_iter()
            .rev()
            .find(|c| c.reconciled)
            .ok_or_else(|| CoreError::NoReconcileConfiglet {
                device: device.fqdn.clone(),
            })?;
        info!(configlet = %reconcile.name, "found device reconcile configlet");
        Ok(reconcile)
    }

    async fn find_automation_configlet(
        &self,
        device: &str,
        category: PortCategory,
    ) -> Result<Configlet, CoreError> {
        let name = category
            .configlet_name(device)
            .ok_or_else(|| CoreError::Internal(format!("{category} has no configlet")))?;
        let configlet = self.client.configlet_by_name(&name).await?;
        configlet.ok_or(CoreError::ConfigletNotFound { name })
    }
}

fn update_error(configlet: &str, err: portsplit_api::Error) -> CoreError {
    match err {
        portsplit_api::Error::EmptyResponse { .. } => CoreError::UpdateFailed {
            configlet: configlet.into(),
            reason: "no response".into(),
        },
        portsplit_api::Error::Api { message, .. } => CoreError::UpdateFailed {
            configlet: configlet.into(),
            reason: message,
        },
        other => other.into(),
    }
}
