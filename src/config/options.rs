// ABOUTME: Installation options and their three-stage resolver.
// ABOUTME: Flags, then interactive prompts, then computed defaults.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("unknown installation option: {0}")]
    UnknownOption(String),

    #[error("installation option {name} is a {actual}, not a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("installation option {0} has no value")]
    MissingValue(String),

    #[error("prompt failed: {0}")]
    Prompt(String),
}

/// Value of one installation option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
    Int(i64),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "boolean",
            OptionValue::Str(_) => "string",
            OptionValue::Int(_) => "integer",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Str(v) => write!(f, "{v}"),
            OptionValue::Int(v) => write!(f, "{v}"),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSource {
    Unset,
    Flag,
    Interactive,
    Default,
}

/// One installation option: name, type, default, current value, source.
#[derive(Debug, Clone)]
pub struct InstallationOption {
    pub name: &'static str,
    pub description: &'static str,
    pub default: OptionValue,
    pub value: Option<OptionValue>,
    pub source: OptionSource,
}

impl InstallationOption {
    fn new(name: &'static str, description: &'static str, default: OptionValue) -> Self {
        Self {
            name,
            description,
            default,
            value: None,
            source: OptionSource::Unset,
        }
    }
}

/// A resolution pass over the options. Each reader fills in values for
/// options that are still unset; `None` leaves an option for the next pass.
pub trait OptionsReader {
    fn read(&self, option: &InstallationOption) -> Result<Option<OptionValue>, OptionsError>;
}

/// Immutable snapshot of all installation options.
///
/// Resolution never mutates in place: [`populate`](InstallationOptions::populate)
/// consumes the snapshot and returns a new one, so a fully-resolved value can
/// only be produced by running the passes in order.
#[derive(Debug, Clone)]
pub struct InstallationOptions {
    options: Vec<InstallationOption>,
}

impl InstallationOptions {
    /// The full option catalog for a platform install.
    pub fn catalog() -> Self {
        Self {
            options: vec![
                InstallationOption::new(
                    "system_domain",
                    "DNS root all application routes live under; leave empty to derive \
                     a wildcard domain from the ingress load-balancer address",
                    OptionValue::Str(String::new()),
                ),
                InstallationOption::new(
                    "tls_issuer",
                    "certificate issuer used for application routes",
                    OptionValue::Str("self-signed".to_string()),
                ),
                InstallationOption::new(
                    "use_internal_registry_node_port",
                    "expose the internal container registry on a node port",
                    OptionValue::Bool(true),
                ),
                InstallationOption::new(
                    "loadbalancer_ip",
                    "expected ingress load-balancer address; when set, the system \
                     domain must resolve to it",
                    OptionValue::Str(String::new()),
                ),
                InstallationOption::new(
                    "s3_endpoint",
                    "object storage endpoint for build artifacts; leave empty to use \
                     the internal store",
                    OptionValue::Str(String::new()),
                ),
                InstallationOption::new(
                    "s3_access_key_id",
                    "object storage access key id",
                    OptionValue::Str(String::new()),
                ),
                InstallationOption::new(
                    "s3_secret_access_key",
                    "object storage secret access key",
                    OptionValue::Str(String::new()),
                ),
                InstallationOption::new(
                    "s3_bucket",
                    "object storage bucket holding uploaded sources",
                    OptionValue::Str(String::new()),
                ),
                InstallationOption::new(
                    "s3_location",
                    "object storage region or location hint",
                    OptionValue::Str(String::new()),
                ),
                InstallationOption::new(
                    "s3_use_ssl",
                    "whether to talk TLS to the object storage endpoint",
                    OptionValue::Bool(false),
                ),
            ],
        }
    }

    /// Run one resolution pass, returning a new snapshot. Options that
    /// already have a value are left untouched.
    pub fn populate<R: OptionsReader>(
        self,
        reader: &R,
        source: OptionSource,
    ) -> Result<Self, OptionsError> {
        let mut options = self.options;
        for option in &mut options {
            if option.value.is_some() {
                continue;
            }
            if let Some(value) = reader.read(option)? {
                if value.type_name() != option.default.type_name() {
                    return Err(OptionsError::TypeMismatch {
                        name: option.name.to_string(),
                        expected: option.default.type_name(),
                        actual: value.type_name(),
                    });
                }
                option.value = Some(value);
                option.source = source;
            }
        }
        Ok(Self { options })
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstallationOption> {
        self.options.iter()
    }

    fn get(&self, name: &str) -> Result<&InstallationOption, OptionsError> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .ok_or_else(|| OptionsError::UnknownOption(name.to_string()))
    }

    pub fn get_str(&self, name: &str) -> Result<&str, OptionsError> {
        let option = self.get(name)?;
        match option.value.as_ref() {
            Some(OptionValue::Str(v)) => Ok(v),
            Some(other) => Err(OptionsError::TypeMismatch {
                name: name.to_string(),
                expected: "string",
                actual: other.type_name(),
            }),
            None => Err(OptionsError::MissingValue(name.to_string())),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, OptionsError> {
        let option = self.get(name)?;
        match option.value.as_ref() {
            Some(OptionValue::Bool(v)) => Ok(*v),
            Some(other) => Err(OptionsError::TypeMismatch {
                name: name.to_string(),
                expected: "boolean",
                actual: other.type_name(),
            }),
            None => Err(OptionsError::MissingValue(name.to_string())),
        }
    }

    /// Whether the named option holds a non-empty value.
    pub fn is_set(&self, name: &str) -> bool {
        match self.get(name) {
            Ok(option) => match option.value.as_ref() {
                Some(OptionValue::Str(v)) => !v.is_empty(),
                Some(_) => true,
                None => false,
            },
            Err(_) => false,
        }
    }
}

/// Values taken from CLI flags. Only explicitly-passed flags participate.
pub struct FlagsReader {
    values: HashMap<&'static str, OptionValue>,
}

impl FlagsReader {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set_str(mut self, name: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.values.insert(name, OptionValue::Str(value));
        }
        self
    }

    pub fn set_bool(mut self, name: &'static str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.values.insert(name, OptionValue::Bool(value));
        }
        self
    }
}

impl Default for FlagsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsReader for FlagsReader {
    fn read(&self, option: &InstallationOption) -> Result<Option<OptionValue>, OptionsError> {
        Ok(self.values.get(option.name).cloned())
    }
}

/// Prompts the user for every option still unset.
pub struct InteractiveReader;

impl OptionsReader for InteractiveReader {
    fn read(&self, option: &InstallationOption) -> Result<Option<OptionValue>, OptionsError> {
        let prompt = format!("{} ({})", option.name, option.description);
        let value = match &option.default {
            OptionValue::Bool(default) => {
                let answer = dialoguer::Confirm::new()
                    .with_prompt(prompt)
                    .default(*default)
                    .interact()
                    .map_err(|e| OptionsError::Prompt(e.to_string()))?;
                OptionValue::Bool(answer)
            }
            OptionValue::Str(default) => {
                let answer: String = dialoguer::Input::new()
                    .with_prompt(prompt)
                    .default(default.clone())
                    .allow_empty(true)
                    .interact_text()
                    .map_err(|e| OptionsError::Prompt(e.to_string()))?;
                OptionValue::Str(answer)
            }
            OptionValue::Int(default) => {
                let answer: i64 = dialoguer::Input::new()
                    .with_prompt(prompt)
                    .default(*default)
                    .interact_text()
                    .map_err(|e| OptionsError::Prompt(e.to_string()))?;
                OptionValue::Int(answer)
            }
        };
        Ok(Some(value))
    }
}

/// Fills every remaining option with its computed default.
pub struct DefaultsReader;

impl OptionsReader for DefaultsReader {
    fn read(&self, option: &InstallationOption) -> Result<Option<OptionValue>, OptionsError> {
        Ok(Some(option.default.clone()))
    }
}
