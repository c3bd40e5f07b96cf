//! Node collection endpoint

use crate::JenkinsClient;
use crate::error::Result;
use vigil_core::domain::{ComputerSet, Overview};

const COMPUTER_API_JSON: [&str; 3] = ["computer", "api", "json"];

impl JenkinsClient {
    /// Get executor totals and every registered node
    ///
    /// # Returns
    /// The decoded `computer/api/json` document
    pub async fn get_computers(&self) -> Result<ComputerSet> {
        let url = self.endpoint(COMPUTER_API_JSON)?;
        self.get_json(url).await
    }

    /// Get only the busy/total executor counters
    ///
    /// Asks the server to trim the computer document with a `tree` query so
    /// the per-node monitors are not transferred twice per cycle.
    pub async fn get_overview(&self) -> Result<Overview> {
        let mut url = self.endpoint(COMPUTER_API_JSON)?;
        url.query_pairs_mut()
            .append_pair("tree", "busyExecutors,totalExecutors");
        let computers: ComputerSet = self.get_json(url).await?;
        Ok(computers.overview())
    }
}
