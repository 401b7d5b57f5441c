use super::HelmError;
use crate::image::ImageReference;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const HELM_BINARY: &str = "helm";

/// A single `--set` override. Later duplicates of the same key win, as they do in Helm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HelmOverride {
    pub key: String,
    pub value: String,
}

impl HelmOverride {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Renders the override as accepted by `--set`, escaping the characters Helm would
    /// otherwise treat as value separators.
    pub(super) fn to_set_arg(&self) -> String {
        format!("{}={}", self.key, escape_set_value(&self.value))
    }
}

impl FromStr for HelmOverride {
    type Err = HelmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(HelmError::InvalidOverride(s.to_string())),
        }
    }
}

impl Display for HelmOverride {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An image the chart would otherwise pull by floating tag. Without prefix it targets the chart
/// default `image.*` values, with prefix `kubectl` it targets `kubectl.image.*`.
#[derive(Debug, Clone, PartialEq)]
pub struct HelmImage {
    image: ImageReference,
    prefix: Option<String>,
}

impl HelmImage {
    pub fn new(image: ImageReference) -> Self {
        Self {
            image,
            prefix: None,
        }
    }

    pub fn with_prefix(image: ImageReference, prefix: impl Into<String>) -> Self {
        Self {
            image,
            prefix: Some(prefix.into()),
        }
    }

    pub fn overrides(&self) -> Vec<HelmOverride> {
        let key = |field: &str| match &self.prefix {
            Some(prefix) => format!("{prefix}.image.{field}"),
            None => format!("image.{field}"),
        };

        let mut overrides = vec![HelmOverride::new(
            key("repository"),
            self.image.repository(),
        )];
        if let Some(tag) = self.image.tag() {
            overrides.push(HelmOverride::new(key("tag"), tag));
        }
        if let Some(digest) = self.image.digest() {
            overrides.push(HelmOverride::new(key("digest"), digest));
        }
        overrides
    }
}

/// Builder for `helm install` command lines.
#[derive(Debug, Clone, PartialEq)]
pub struct HelmInstall {
    release: String,
    chart: String,
    namespace: String,
    repository: Option<String>,
    chart_version: Option<String>,
    images: Vec<HelmImage>,
    overrides: Vec<HelmOverride>,
    run_as_user: Option<u32>,
}

impl HelmInstall {
    pub fn new(
        release: impl Into<String>,
        chart: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            release: release.into(),
            chart: chart.into(),
            namespace: namespace.into(),
            repository: None,
            chart_version: None,
            images: Vec::new(),
            overrides: Vec::new(),
            run_as_user: None,
        }
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Pins the chart release, the latest one is installed otherwise.
    pub fn with_chart_version(mut self, chart_version: impl Into<String>) -> Self {
        self.chart_version = Some(chart_version.into());
        self
    }

    pub fn with_image(mut self, image: HelmImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = HelmOverride>,
    {
        self.overrides.extend(overrides);
        self
    }

    /// Runs the chart pods as the given user, rocks ship a non root user.
    pub fn with_run_as_user(mut self, uid: u32) -> Self {
        self.run_as_user = Some(uid);
        self
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn chart_version(&self) -> Option<&str> {
        self.chart_version.as_deref()
    }

    /// All the overrides in the order they are passed to Helm: image pins first so explicit
    /// overrides can still replace them.
    pub fn effective_overrides(&self) -> Vec<HelmOverride> {
        let mut overrides: Vec<HelmOverride> =
            self.images.iter().flat_map(HelmImage::overrides).collect();
        if let Some(uid) = self.run_as_user {
            overrides.push(HelmOverride::new(
                "securityContext.runAsUser",
                uid.to_string(),
            ));
        }
        overrides.extend(self.overrides.iter().cloned());
        overrides
    }

    /// Arguments following the helm invocation, starting with `install`.
    pub fn args(&self) -> Result<Vec<String>, HelmError> {
        self.validate()?;

        let mut args = vec![
            "install".to_string(),
            self.release.clone(),
            self.chart.clone(),
            "--namespace".to_string(),
            self.namespace.clone(),
            "--create-namespace".to_string(),
        ];
        if let Some(repository) = &self.repository {
            args.extend(["--repo".to_string(), repository.clone()]);
        }
        if let Some(version) = &self.chart_version {
            args.extend(["--version".to_string(), version.clone()]);
        }
        for set in self.effective_overrides() {
            args.extend(["--set".to_string(), set.to_set_arg()]);
        }
        Ok(args)
    }

    /// Full command line using `helm` as invocation, e.g. `[k8s, helm]`.
    pub fn argv<S: AsRef<str>>(&self, helm: &[S]) -> Result<Vec<String>, HelmError> {
        let mut argv: Vec<String> = helm.iter().map(|s| s.as_ref().to_string()).collect();
        argv.extend(self.args()?);
        Ok(argv)
    }

    fn validate(&self) -> Result<(), HelmError> {
        if self.release.trim().is_empty() {
            return Err(HelmError::EmptyField("release"));
        }
        if self.chart.trim().is_empty() {
            return Err(HelmError::EmptyField("chart"));
        }
        if self.namespace.trim().is_empty() {
            return Err(HelmError::EmptyField("namespace"));
        }
        Ok(())
    }
}

/// Builds `helm install <release> <chart> --namespace <ns> ... --set k=v ...`.
pub fn build_install_command(
    release: &str,
    chart: &str,
    namespace: &str,
    repository_url: Option<&str>,
    chart_version: Option<&str>,
    images: &[HelmImage],
    overrides: &[HelmOverride],
) -> Result<Vec<String>, HelmError> {
    let mut install = HelmInstall::new(release, chart, namespace)
        .with_overrides(overrides.iter().cloned());
    install.images = images.to_vec();
    if let Some(repository) = repository_url {
        install = install.with_repository(repository);
    }
    if let Some(version) = chart_version {
        install = install.with_chart_version(version);
    }
    install.argv(&[HELM_BINARY])
}

fn escape_set_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ',') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(super) fn unescape_set_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            c => unescaped.push(c),
        }
    }
    unescaped
}
