use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use tracing::warn;

/// A resolved package, ready to be installed.
///
/// `id` is the name the package was looked up under and names its install
/// directory. `display_name` is whatever the thread document calls itself;
/// the two are allowed to differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub id: String,
    pub display_name: String,
    pub version: String,
    pub install_commands: String,
    pub artifact_url: String,
    pub dependencies: Vec<String>,
}

impl PackageManifest {
    /// Builds a manifest from thread document text. Never fails: text that is
    /// not a YAML mapping yields a manifest with every optional field empty.
    pub fn from_thread_yaml(id: &str, input: &str) -> Self {
        let document = match ThreadDocument::parse(input) {
            Ok(document) => document,
            Err(err) => {
                let detail = format!("{err:#}");
                warn!(
                    package = id,
                    error = %detail,
                    "thread document is not a mapping; using empty fields"
                );
                ThreadDocument::default()
            }
        };
        Self::from_thread_document(id, document)
    }

    pub fn from_thread_document(id: &str, document: ThreadDocument) -> Self {
        Self {
            id: id.to_string(),
            display_name: document.name.unwrap_or_default(),
            version: document.version.unwrap_or_default(),
            install_commands: document
                .install
                .and_then(|install| install.commands)
                .unwrap_or_default(),
            artifact_url: document
                .source
                .and_then(|source| source.package)
                .unwrap_or_default(),
            dependencies: document.dependencies.unwrap_or_default(),
        }
    }

    pub fn has_artifact(&self) -> bool {
        !self.artifact_url.trim().is_empty()
    }

    /// File name used for the downloaded archive inside the install dir.
    pub fn artifact_file_name(&self) -> String {
        if self.version.is_empty() {
            format!("{}.choco.pkg", self.id)
        } else {
            format!("{}-{}.choco.pkg", self.id, self.version)
        }
    }
}

/// The thread document schema. Every field is optional and every field
/// tolerates the wrong YAML shape by reading as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThreadDocument {
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub install: Option<InstallSection>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub source: Option<SourceSection>,
    #[serde(default, deserialize_with = "lenient_sequence")]
    pub dependencies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstallSection {
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub commands: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceSection {
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub package: Option<String>,
}

impl ThreadDocument {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(input).context("failed to parse thread document")
    }
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

fn lenient_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_mapping() {
        return Ok(None);
    }
    Ok(serde_yaml::from_value(value).ok())
}

fn lenient_sequence<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Sequence(items) = value else {
        return Ok(None);
    };

    Ok(Some(
        items
            .iter()
            .filter_map(scalar_text)
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect(),
    ))
}
