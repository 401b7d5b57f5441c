use super::command::unescape_set_value;
use super::{HelmError, HelmOverride};
use std::str::FromStr;

/// A `helm install` command line read back into its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedInstall {
    pub release: String,
    pub chart: String,
    pub namespace: Option<String>,
    pub repository: Option<String>,
    pub chart_version: Option<String>,
    pub create_namespace: bool,
    pub overrides: Vec<HelmOverride>,
}

impl ParsedInstall {
    /// Parses a command line as built by [super::HelmInstall]. Anything before `install` is
    /// taken as the helm invocation and ignored.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Result<Self, HelmError> {
        let mut args = argv
            .iter()
            .map(|arg| -> &str { arg.as_ref() })
            .skip_while(|arg| *arg != "install");
        if args.next().is_none() {
            return Err(HelmError::InvalidCommand("missing `install`".to_string()));
        }

        let mut parsed = ParsedInstall::default();
        let mut positional = Vec::new();
        while let Some(arg) = args.next() {
            let mut value_of = |flag: &str| {
                args.next()
                    .map(str::to_string)
                    .ok_or_else(|| HelmError::InvalidCommand(format!("`{flag}` without value")))
            };
            match arg {
                "--namespace" | "-n" => parsed.namespace = Some(value_of(arg)?),
                "--repo" => parsed.repository = Some(value_of(arg)?),
                "--version" => parsed.chart_version = Some(value_of(arg)?),
                "--set" => {
                    let set = value_of(arg)?;
                    let HelmOverride { key, value } = HelmOverride::from_str(&set)?;
                    parsed
                        .overrides
                        .push(HelmOverride::new(key, unescape_set_value(&value)));
                }
                "--create-namespace" => parsed.create_namespace = true,
                flag if flag.starts_with('-') => {
                    return Err(HelmError::InvalidCommand(format!("unknown flag `{flag}`")))
                }
                value => positional.push(value.to_string()),
            }
        }

        match <[String; 2]>::try_from(positional) {
            Ok([release, chart]) => {
                parsed.release = release;
                parsed.chart = chart;
                Ok(parsed)
            }
            Err(positional) => Err(HelmError::InvalidCommand(format!(
                "expected release and chart, got {positional:?}"
            ))),
        }
    }
}
