use super::{HelmError, HelmImage, HelmInstall, HelmOverride, StorageLocationLayout};
use crate::image::ImageReference;

pub const VELERO_CHART_REPOSITORY: &str = "https://vmware-tanzu.github.io/helm-charts";
pub const VELERO_CHART: &str = "velero";
pub const VELERO_RELEASE: &str = "velero";
pub const VELERO_NAMESPACE: &str = "velero";

const AWS_PLUGIN_IMAGE: &str = "velero/velero-plugin-for-aws:v1.2.1";
const PLUGINS_VOLUME: &str = "plugins";
const PLUGINS_MOUNT_PATH: &str = "/target";

/// S3 compatible storage Velero writes its backups to.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectStorage {
    pub provider: String,
    pub bucket: String,
    pub region: String,
    pub s3_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl ObjectStorage {
    /// The Minio deployment shipped in the integration manifests.
    pub fn minio(namespace: &str) -> Self {
        Self {
            provider: "aws".to_string(),
            bucket: "velero".to_string(),
            region: "minio".to_string(),
            s3_url: format!("http://minio.{namespace}.svc:9000"),
            access_key_id: "minio".to_string(),
            secret_access_key: "minio123".to_string(),
        }
    }

    fn credentials(&self) -> String {
        format!(
            "\n[default]\naws_access_key_id = {}\naws_secret_access_key = {}\n",
            self.access_key_id, self.secret_access_key
        )
    }
}

/// Plugin image copied into the Velero pod through an init container.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInitContainer {
    pub name: String,
    pub image: String,
}

impl PluginInitContainer {
    pub fn aws() -> Self {
        Self {
            name: "velero-plugin-for-aws".to_string(),
            image: AWS_PLUGIN_IMAGE.to_string(),
        }
    }
}

/// Values for the Velero chart, rendered according to the schema of the requested chart version.
#[derive(Debug, Clone, PartialEq)]
pub struct VeleroChart {
    chart_version: Option<String>,
    velero_image: ImageReference,
    kubectl_image: Option<ImageReference>,
    storage: ObjectStorage,
    plugins: Vec<PluginInitContainer>,
}

impl VeleroChart {
    pub fn new(velero_image: ImageReference, storage: ObjectStorage) -> Self {
        Self {
            chart_version: None,
            velero_image,
            kubectl_image: None,
            storage,
            plugins: vec![PluginInitContainer::aws()],
        }
    }

    pub fn with_chart_version(mut self, chart_version: impl Into<String>) -> Self {
        self.chart_version = Some(chart_version.into());
        self
    }

    pub fn with_kubectl_image(mut self, image: ImageReference) -> Self {
        self.kubectl_image = Some(image);
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<PluginInitContainer>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn layout(&self) -> Result<StorageLocationLayout, HelmError> {
        StorageLocationLayout::for_chart_version(self.chart_version.as_deref())
    }

    pub fn overrides(&self) -> Result<Vec<HelmOverride>, HelmError> {
        let layout = self.layout()?;
        let storage = &self.storage;

        let mut overrides = vec![
            HelmOverride::new("credentials.secretContents.cloud", storage.credentials()),
            HelmOverride::new(layout.provider_key(), &storage.provider),
            HelmOverride::new(layout.location_key("bucket"), &storage.bucket),
            HelmOverride::new(layout.location_key("config.region"), &storage.region),
            HelmOverride::new(layout.location_key("config.s3ForcePathStyle"), "true"),
            HelmOverride::new(layout.location_key("config.s3Url"), &storage.s3_url),
            HelmOverride::new("snapshotsEnabled", "false"),
        ];
        for (i, plugin) in self.plugins.iter().enumerate() {
            let key = |field: &str| format!("initContainers[{i}].{field}");
            overrides.extend([
                HelmOverride::new(key("name"), &plugin.name),
                HelmOverride::new(key("image"), &plugin.image),
                HelmOverride::new(key("volumeMounts[0].mountPath"), PLUGINS_MOUNT_PATH),
                HelmOverride::new(key("volumeMounts[0].name"), PLUGINS_VOLUME),
            ]);
        }
        Ok(overrides)
    }

    pub fn install(&self) -> Result<HelmInstall, HelmError> {
        let mut install = HelmInstall::new(VELERO_RELEASE, VELERO_CHART, VELERO_NAMESPACE)
            .with_repository(VELERO_CHART_REPOSITORY)
            .with_image(HelmImage::new(self.velero_image.clone()));
        if let Some(kubectl) = &self.kubectl_image {
            install = install.with_image(HelmImage::with_prefix(kubectl.clone(), "kubectl"));
        }
        if let Some(version) = &self.chart_version {
            install = install.with_chart_version(version);
        }
        Ok(install.with_overrides(self.overrides()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn chart() -> VeleroChart {
        VeleroChart::new(
            ImageReference::from_str("ghcr.io/canonical/velero:1.13.2").unwrap(),
            ObjectStorage::minio("velero"),
        )
        .with_kubectl_image(ImageReference::from_str("ghcr.io/canonical/kubectl:1.30.2").unwrap())
    }

    fn has_set(argv: &[String], set: &str) -> bool {
        argv.windows(2)
            .any(|pair| pair[0] == "--set" && pair[1].starts_with(set))
    }

    #[test]
    fn indexed_provider_only_from_threshold_on() {
        let legacy = chart()
            .with_chart_version("3.9.9")
            .install()
            .unwrap()
            .argv(&["helm"])
            .unwrap();
        let indexed = chart()
            .with_chart_version("4.0.0")
            .install()
            .unwrap()
            .argv(&["helm"])
            .unwrap();

        assert!(!has_set(&legacy, "configuration.backupStorageLocation[0].provider="));
        assert!(has_set(&legacy, "configuration.provider=aws"));
        assert!(has_set(&legacy, "configuration.backupStorageLocation.bucket=velero"));

        assert!(has_set(&indexed, "configuration.backupStorageLocation[0].provider=aws"));
        assert!(!has_set(&indexed, "configuration.provider="));
    }

    #[test]
    fn pins_rock_images_and_plugins() {
        let argv = chart().install().unwrap().argv(&["helm"]).unwrap();

        assert!(has_set(&argv, "image.repository=ghcr.io/canonical/velero"));
        assert!(has_set(&argv, "image.tag=1.13.2"));
        assert!(has_set(&argv, "kubectl.image.repository=ghcr.io/canonical/kubectl"));
        assert!(has_set(&argv, "kubectl.image.tag=1.30.2"));
        assert!(has_set(&argv, "initContainers[0].name=velero-plugin-for-aws"));
        assert!(has_set(&argv, "initContainers[0].volumeMounts[0].mountPath=/target"));
        assert!(has_set(
            &argv,
            "configuration.backupStorageLocation[0].config.s3Url=http://minio.velero.svc:9000"
        ));
        assert!(has_set(&argv, "snapshotsEnabled=false"));
    }

    #[test]
    fn invalid_chart_version_is_reported() {
        assert!(chart().with_chart_version("latest").install().is_err());
    }
}
