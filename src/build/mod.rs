//! # Build Record Model
//!
//! The shape of a completed build as handed over by the pipeline execution
//! engine. The layout follows the TaskRun document the engine emits:
//! `metadata.name`, `spec.params` and a `status` block carrying timestamps,
//! step records and results.
//!
//! Nothing in this module has behaviour beyond parsing and read-only
//! accessors; the provenance builder and the verifier both consume it.
//!
//! ## Examples
//!
//! ```
//! use chains_attest::build::{BuildObject, BuildRecord};
//!
//! let doc = r#"{
//!     "kind": "TaskRun",
//!     "metadata": {"name": "build-1"},
//!     "spec": {"params": [{"name": "CHAINS-GIT_COMMIT", "value": "abcd"}]},
//!     "status": {"taskResults": [{"name": "IMAGE_DIGEST", "value": "sha256:00"}]}
//! }"#;
//!
//! let obj = BuildObject::parse(doc).unwrap();
//! let record: &BuildRecord = obj.as_task_run().unwrap();
//! assert_eq!(record.name(), "build-1");
//! assert_eq!(record.results().len(), 1);
//! ```

use crate::error::{Error, Result};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Object kind accepted by the formatters.
pub const TASK_RUN_KIND: &str = "TaskRun";

/// A build-engine object handed to a formatter.
///
/// Only TaskRuns are understood; every other kind is carried through so the
/// formatter can reject it with a precise error.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildObject {
    TaskRun(Box<BuildRecord>),
    Other { kind: String },
}

impl BuildObject {
    /// Parses a JSON or YAML document, dispatching on its `kind` field.
    ///
    /// A document without `kind` is treated as a TaskRun.
    pub fn parse(contents: &str) -> Result<Self> {
        let value: serde_json::Value = if contents.trim_start().starts_with('{') {
            serde_json::from_str(contents)?
        } else {
            serde_yaml::from_str(contents)?
        };
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Validation(
                "build object must be a mapping".to_string(),
            ));
        }

        let kind = value
            .get("kind")
            .and_then(|k| k.as_str())
            .unwrap_or(TASK_RUN_KIND)
            .to_string();

        if kind != TASK_RUN_KIND {
            return Ok(BuildObject::Other { kind });
        }

        let record: BuildRecord = serde_json::from_value(value)?;
        Ok(BuildObject::TaskRun(Box::new(record)))
    }

    pub fn kind(&self) -> &str {
        match self {
            BuildObject::TaskRun(_) => TASK_RUN_KIND,
            BuildObject::Other { kind } => kind,
        }
    }

    pub fn as_task_run(&self) -> Option<&BuildRecord> {
        match self {
            BuildObject::TaskRun(record) => Some(record),
            BuildObject::Other { .. } => None,
        }
    }
}

impl From<BuildRecord> for BuildObject {
    fn from(record: BuildRecord) -> Self {
        BuildObject::TaskRun(Box::new(record))
    }
}

/// Immutable snapshot of one completed build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BuildSpec,
    #[serde(default)]
    pub status: BuildStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSpec {
    #[serde(default)]
    pub params: Vec<Param>,
}

/// The part of a build the pass-through formatter hands back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completion_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default, rename = "taskResults", alias = "results")]
    pub results: Vec<BuildResult>,
}

impl BuildRecord {
    pub fn new(name: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
            },
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn params(&self) -> &[Param] {
        &self.spec.params
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.status.steps
    }

    pub fn results(&self) -> &[BuildResult] {
        &self.status.results
    }

    pub fn with_param(mut self, name: &str, value: ParamValue) -> Self {
        self.spec.params.push(Param {
            name: name.to_string(),
            value,
        });
        self
    }

    pub fn with_step(mut self, step: StepRecord) -> Self {
        self.status.steps.push(step);
        self
    }

    pub fn with_result(mut self, name: &str, value: &str) -> Self {
        self.status.results.push(BuildResult {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }
}

/// A declared build parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::String(_) => "string",
            ParamValue::Array(_) => "array",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            ParamValue::Array(_) => None,
        }
    }
}

// Rendered as `NAME={TYPE STRING [ARRAY...]}` so a recipe argument keeps the
// name, the type and both value slots of the parameter.
impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (string_val, array_val) = match &self.value {
            ParamValue::String(s) => (s.as_str(), String::new()),
            ParamValue::Array(items) => ("", items.join(" ")),
        };
        write!(
            f,
            "{}={{{} {} [{}]}}",
            self.name,
            self.value.type_name(),
            string_val,
            array_val
        )
    }
}

/// A named result string produced by the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub name: String,
    pub value: String,
}

/// One executed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    #[serde(default)]
    pub entry_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<StepMetadata>,
}

impl StepRecord {
    pub fn new(container: &str, image: &str) -> Self {
        Self {
            entry_point: String::new(),
            environment: Some(StepMetadata::Structured(StepEnvironment {
                container: Some(container.into()),
                image: Some(image.into()),
            })),
        }
    }

    /// The environment mapping, if the recorded metadata has that shape.
    pub fn structured_environment(&self) -> Option<&StepEnvironment> {
        match &self.environment {
            Some(StepMetadata::Structured(env)) => Some(env),
            Some(StepMetadata::Opaque(_)) | None => None,
        }
    }
}

/// Execution-environment metadata recorded for a step.
///
/// Any mapping deserializes as `Structured`, whatever its `container` and
/// `image` values are; scalars and lists land in `Opaque`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepMetadata {
    Structured(StepEnvironment),
    Opaque(serde_json::Value),
}

impl<'de> Deserialize<'de> for StepMetadata {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        // a derived struct visitor would also accept sequences, so only
        // mappings are offered to it
        if value.is_object() {
            if let Ok(env) = serde_json::from_value::<StepEnvironment>(value.clone()) {
                return Ok(StepMetadata::Structured(env));
            }
        }
        Ok(StepMetadata::Opaque(value))
    }
}

/// The `container` and `image` entries of a step's environment mapping,
/// carried as recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepEnvironment {
    #[serde(default)]
    pub container: Option<serde_json::Value>,
    #[serde(default)]
    pub image: Option<serde_json::Value>,
}
