// CVP inventory endpoints
//
// Server info and device lookup. Devices are addressed by FQDN on the
// command line but by system MAC address in every provisioning call.

use tracing::debug;

use crate::client::CvpClient;
use crate::error::Error;
use crate::models::{CvpInfo, Device, TopologySearch};

impl CvpClient {
    /// Get server version information.
    ///
    /// `GET /cvpservice/cvpInfo/getCvpInfo.do`
    ///
    /// Used as a connectivity probe right after authentication.
    pub async fn cvp_info(&self) -> Result<CvpInfo, Error> {
        let url = self.service_url("cvpInfo/getCvpInfo.do", &[])?;
        debug!("fetching cvp info");
        self.get(url).await
    }

    /// Find a provisioned device by exact FQDN.
    ///
    /// `GET /cvpservice/provisioning/searchTopology.do?queryParam={fqdn}`
    ///
    /// The search is fuzzy server-side, so the result list is filtered to
    /// the entry whose `fqdn` matches exactly. Returns `Ok(None)` when
    /// nothing matches.
    pub async fn device_by_fqdn(&self, fqdn: &str) -> Result<Option<Device>, Error> {
        let url = self.service_url(
            "provisioning/searchTopology.do",
            &[("queryParam", fqdn), ("startIndex", "0"), ("endIndex", "0")],
        )?;
        debug!(fqdn, "searching topology");
        let search: TopologySearch = self.get(url).await?;
        Ok(search
            .net_element_list
            .into_iter()
            .find(|device| device.fqdn == fqdn))
    }
}
