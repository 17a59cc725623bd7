use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Everything a report run needs to know about its environment.
///
/// Built once by the caller and passed by reference to each pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    pub region: String,
    pub workgroup: String,
    pub database: String,
    pub catalog: String,
    /// S3 location for query results, needed when the workgroup does not
    /// enforce one (for example after the workgroup fallback).
    pub output_location: Option<String>,
    pub output_folder: PathBuf,
    pub config_file: PathBuf,
    pub required_role: String,
    /// Profile name used in the login remediation commands.
    pub profile: String,
    pub enforce_role: bool,
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            workgroup: "Production-caba-piba-athena-boti-group".to_string(),
            database: "caba-piba-consume-zone-db".to_string(),
            catalog: "AwsDataCatalog".to_string(),
            output_location: None,
            output_folder: PathBuf::from("output"),
            config_file: PathBuf::from("config_fechas.txt"),
            required_role: "PIBAConsumeBoti".to_string(),
            profile: "default".to_string(),
            enforce_role: true,
            poll_interval: Duration::from_millis(1000),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
