// CVP configlet endpoints
//
// Lookup and wholesale replacement of configlets, plus the dedicated
// write-back path for a device's reconciliation configlet.

use tracing::debug;

use crate::client::CvpClient;
use crate::error::Error;
use crate::models::{
    Configlet, ConfigletList, ReconcileConfigletRequest, UpdateConfigletRequest, UpdateResponse,
};

impl CvpClient {
    /// List the configlets applied to a device.
    ///
    /// `GET /cvpservice/provisioning/getConfigletsByNetElementId.do?netElementId={mac}`
    pub async fn configlets_by_device(&self, mac: &str) -> Result<Vec<Configlet>, Error> {
        let url = self.service_url(
            "provisioning/getConfigletsByNetElementId.do",
            &[
                ("netElementId", mac),
                ("queryParam", ""),
                ("startIndex", "0"),
                ("endIndex", "0"),
            ],
        )?;
        debug!(mac, "listing device configlets");
        let list: ConfigletList = self.get(url).await?;
        Ok(list.configlet_list)
    }

    /// Fetch a configlet by name.
    ///
    /// `GET /cvpservice/configlet/getConfigletByName.do?name={name}`
    ///
    /// CVP reports a missing configlet as an error envelope; that case is
    /// returned as `Ok(None)`.
    pub async fn configlet_by_name(&self, name: &str) -> Result<Option<Configlet>, Error> {
        let url = self.service_url("configlet/getConfigletByName.do", &[("name", name)])?;
        debug!(name, "fetching configlet");
        match self.get(url).await {
            Ok(configlet) => Ok(Some(configlet)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace a configlet's content wholesale.
    ///
    /// `POST /cvpservice/configlet/updateConfiglet.do`
    ///
    /// Does not wait for the tasks CVP spawns for affected devices.
    pub async fn update_configlet(
        &self,
        config: &str,
        key: &str,
        name: &str,
    ) -> Result<UpdateResponse, Error> {
        let url = self.service_url("configlet/updateConfiglet.do", &[])?;
        debug!(name, key, bytes = config.len(), "updating configlet");
        let body = UpdateConfigletRequest {
            config,
            key,
            name,
            wait_for_task_ids: false,
            reconciled: false,
        };
        self.post(url, &body).await
    }

    /// Write new content into a device's reconciliation configlet.
    ///
    /// `POST /cvpservice/provisioning/updateReconcileConfiglet.do?netElementId={mac}`
    ///
    /// The configlet keeps its identity and stays marked as reconciled.
    pub async fn update_reconcile_configlet(
        &self,
        mac: &str,
        configlet: &Configlet,
    ) -> Result<UpdateResponse, Error> {
        let url = self.service_url(
            "provisioning/updateReconcileConfiglet.do",
            &[("netElementId", mac)],
        )?;
        debug!(mac, name = %configlet.name, "updating reconcile configlet");
        let body = ReconcileConfigletRequest {
            name: &configlet.name,
            config: &configlet.config,
            key: &configlet.key,
            reconciled: true,
        };
        self.post(url, &body).await
    }
}
