//! CloudFormation template model
//!
//! Only the sections the evaluator reads are modeled: `Resources`, `Parameters` and `Outputs`.
//! Expressions inside them are kept as raw [serde_json::Value] trees, evaluation happens later.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(default)]
    pub resources: IndexMap<String, ResourceDefinition>,
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterDefinition>,
    #[serde(default)]
    pub outputs: IndexMap<String, OutputDefinition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_new::new)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceDefinition {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[new(default)]
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: serde_json::Map<String, Value>,
    /// `DependsOn`, `Metadata`, `Condition` and the like
    #[new(default)]
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDefinition {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDefinition {
    pub value: Value,
}

/// A resource definition together with the logical id it is declared under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalResource {
    pub logical_id: String,
    #[serde(flatten)]
    pub definition: ResourceDefinition,
}

/// Tree of nested stacks, keyed by the logical id of the `AWS::CloudFormation::Stack` resource
///
/// `physical_name` is `None` for nested stacks that are about to be created and do not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NestedStackTemplates {
    #[serde(default)]
    pub physical_name: Option<String>,
    #[serde(default)]
    pub generated_template: Template,
    #[serde(default)]
    pub nested_stack_templates: IndexMap<String, NestedStackTemplates>,
}

/// Depth-first search for the nested stack declared under `logical_id`
pub fn find_nested_stack<'a>(
    logical_id: &str,
    nested_stacks: &'a IndexMap<String, NestedStackTemplates>,
) -> Option<&'a NestedStackTemplates> {
    for (nested_logical_id, nested_stack) in nested_stacks {
        if nested_logical_id == logical_id {
            return Some(nested_stack);
        }

        if let Some(found) = find_nested_stack(logical_id, &nested_stack.nested_stack_templates) {
            return Some(found);
        }
    }

    None
}

impl Template {
    pub fn resource(&self, logical_id: &str) -> Option<&ResourceDefinition> {
        self.resources.get(logical_id)
    }

    pub fn parameter_default(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).and_then(|p| p.default.as_ref())
    }

    pub fn output_value(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name).map(|output| &output.value)
    }
}

impl Template {
    pub fn from_path(file_path: &Path) -> Result<Self, LoadError> {
        load(file_path)
    }
}

/// Deserialize a JSON or YAML file, picked by file extension
pub fn load<T: serde::de::DeserializeOwned>(file_path: &Path) -> Result<T, LoadError> {
    let file_path = file_path.canonicalize()?;
    tracing::info!(path=%file_path.display(), "loading file");

    let file_contents = std::fs::read_to_string(&file_path)?;
    let extension = file_path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_str(&file_contents)?),
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&file_contents)?),
        _ => Err(LoadError::UnknownFormat(file_path)),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Unknown file format {0} (expected .json, .yaml or .yml)")]
    UnknownFormat(std::path::PathBuf),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse json file")]
    JsonParseFailed(#[from] serde_json::Error),
    #[error("Unable to parse yaml file")]
    YamlParseFailed(#[from] serde_yaml::Error),
}

impl TryFrom<Value> for Template {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

/// Utility macro to create a [Template] from a [serde_json::json] literal
///
/// ```
/// # use cfn_eval::template;
/// let template = template!({
///     "Resources": {
///         "Bucket": { "Type": "AWS::S3::Bucket" }
///     }
/// });
/// assert_eq!(template.resources.len(), 1);
/// ```
///
/// # Panic
/// Panics on input that is not template shaped
///
/// ```should_panic
/// # use cfn_eval::template;
/// template!({ "Resources": { "Bucket": "no type" } });
/// ```
#[macro_export]
macro_rules! template {
    ($($json:tt)+) => {
        $crate::template::Template::try_from(serde_json::json!($($json)+)).expect("template must parse")
    };
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sections() {
        let template = template!({
            "Parameters": {
                "Env": { "Type": "String", "Default": "dev" },
                "Required": { "Type": "String" }
            },
            "Resources": {
                "Bucket": { "Type": "AWS::S3::Bucket", "Properties": { "BucketName": "b" } }
            },
            "Outputs": {
                "BucketName": { "Value": { "Ref": "Bucket" } }
            }
        });

        assert_eq!(template.parameter_default("Env"), Some(&Value::from("dev")));
        assert_eq!(template.parameter_default("Required"), None);
        assert_eq!(
            template.resource("Bucket").map(|r| r.resource_type.as_str()),
            Some("AWS::S3::Bucket")
        );
        assert_eq!(
            template.output_value("BucketName"),
            Some(&serde_json::json!({ "Ref": "Bucket" }))
        );
    }

    #[test]
    fn new_resource_definition_serializes_type_only() {
        let mut definition = ResourceDefinition::new("AWS::S3::Bucket".into());
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            serde_json::json!({ "Type": "AWS::S3::Bucket" })
        );

        definition
            .attributes
            .insert("DependsOn".into(), serde_json::json!(["Role"]));
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            serde_json::json!({ "Type": "AWS::S3::Bucket", "DependsOn": ["Role"] })
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let template = template!({});
        assert!(template.resources.is_empty());
        assert!(template.parameters.is_empty());
        assert!(template.outputs.is_empty());
    }

    #[test]
    fn nested_stack_search_is_depth_first() {
        let mut grandchild = NestedStackTemplates::default();
        grandchild.physical_name = Some("grandchild-stack".into());

        let mut child = NestedStackTemplates::default();
        child.physical_name = Some("child-stack".into());
        child
            .nested_stack_templates
            .insert("GrandChild".into(), grandchild);

        let mut tree = IndexMap::new();
        tree.insert("Child".to_string(), child);
        tree.insert("Sibling".to_string(), NestedStackTemplates::default());

        let found = find_nested_stack("GrandChild", &tree).and_then(|s| s.physical_name.clone());
        assert_eq!(found.as_deref(), Some("grandchild-stack"));
        assert_eq!(
            find_nested_stack("Sibling", &tree).map(|s| s.physical_name.clone()),
            Some(None)
        );
        assert!(find_nested_stack("Unknown", &tree).is_none());
    }

    #[test]
    fn unknown_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join("cfn-eval-template-test.txt");
        std::fs::write(&path, "{}").unwrap();

        let err = Template::from_path(&path).expect_err("must error");
        assert!(matches!(err, LoadError::UnknownFormat(_)));

        std::fs::remove_file(path).unwrap();
    }
}
