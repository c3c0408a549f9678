//! Report data structure (HTML is generated in the twolyp_hub_report crate).

use crate::bundle::MetricsBundle;
use serde::{Deserialize, Serialize};

/// Data passed to the HTML report generator: bundle + reproducibility hash.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportData {
    pub bundle: MetricsBundle,
    pub reproducibility_hash_sha256: String,
}
