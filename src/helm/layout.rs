use super::HelmError;
use semver::Version;

/// First Velero chart release where backup storage locations are a list.
pub const INDEXED_STORAGE_LOCATIONS_SINCE: Version = Version::new(4, 0, 0);

/// Key-path layout used by the Velero chart for its backup storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocationLayout {
    /// `configuration.provider` + `configuration.backupStorageLocation.<field>`
    Legacy,
    /// `configuration.backupStorageLocation[0].<field>`
    Indexed,
}

impl StorageLocationLayout {
    /// Selects the layout for the given chart version, `None` meaning the latest chart.
    pub fn for_chart_version(chart_version: Option<&str>) -> Result<Self, HelmError> {
        let Some(raw) = chart_version else {
            return Ok(Self::Indexed);
        };
        let version = Version::parse(raw.trim().trim_start_matches('v')).map_err(|err| {
            HelmError::InvalidChartVersion {
                version: raw.to_string(),
                reason: err.to_string(),
            }
        })?;

        // pre-releases of the threshold (4.0.0-rc.1) already ship the new schema
        let threshold_base = Version::new(version.major, version.minor, version.patch);
        if threshold_base >= INDEXED_STORAGE_LOCATIONS_SINCE {
            Ok(Self::Indexed)
        } else {
            Ok(Self::Legacy)
        }
    }

    pub fn provider_key(&self) -> String {
        match self {
            Self::Legacy => "configuration.provider".to_string(),
            Self::Indexed => self.location_key("provider"),
        }
    }

    pub fn location_key(&self, field: &str) -> String {
        match self {
            Self::Legacy => format!("configuration.backupStorageLocation.{field}"),
            Self::Indexed => format!("configuration.backupStorageLocation[0].{field}"),
        }
    }
}
