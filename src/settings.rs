use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::mapper::Variant;

pub const ENV_PREFIX: &str = "MICROFILM";

/// Paths and rule set for one run. Environment first, then CLI flags on top.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub input: PathBuf,
    pub template: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    pub variant: Variant,
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub variant: Option<Variant>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX))
    }

    pub fn load_from(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("input", "microfilm.xml")?
            .set_default("template", "template.csv")?
            .set_default("variant", "b")?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn apply(mut self, o: Overrides) -> Self {
        if let Some(input) = o.input {
            self.input = input;
        }
        if let Some(template) = o.template {
            self.template = template;
        }
        if let Some(output) = o.output {
            self.output = Some(output);
        }
        if let Some(variant) = o.variant {
            self.variant = variant;
        }
        self
    }

    /// Explicit output path, else the variant's historical file name.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.variant.default_output()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn defaults_are_fixed_literals() {
        let s = Settings::load_from(env(&[])).unwrap();
        assert_eq!(s.input, PathBuf::from("microfilm.xml"));
        assert_eq!(s.template, PathBuf::from("template.csv"));
        assert_eq!(s.variant, Variant::B);
        assert_eq!(s.output_path(), PathBuf::from("output_accessions.csv"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let s = Settings::load_from(env(&[
            ("MICROFILM_INPUT", "export/list.xml"),
            ("MICROFILM_VARIANT", "a"),
        ]))
        .unwrap();
        assert_eq!(s.input, PathBuf::from("export/list.xml"));
        assert_eq!(s.variant, Variant::A);
        assert_eq!(s.output_path(), PathBuf::from("output.csv"));
    }

    #[test]
    fn flags_override_environment() {
        let s = Settings::load_from(env(&[("MICROFILM_OUTPUT", "env.csv")]))
            .unwrap()
            .apply(Overrides {
                output: Some("flag.csv".into()),
                variant: Some(Variant::A),
                ..Default::default()
            });
        assert_eq!(s.output_path(), PathBuf::from("flag.csv"));
        assert_eq!(s.variant, Variant::A);
        assert_eq!(s.template, PathBuf::from("template.csv"));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(Settings::load_from(env(&[("MICROFILM_VARIANT", "c")])).is_err());
    }
}
