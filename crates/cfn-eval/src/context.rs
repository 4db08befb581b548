//! evaluation context: where a template is evaluated and with which parameter values
use indexmap::IndexMap;
use serde_json::Value;

pub const ACCOUNT_ID: &str = "AWS::AccountId";
pub const REGION: &str = "AWS::Region";
pub const PARTITION: &str = "AWS::Partition";
pub const STACK_NAME: &str = "AWS::StackName";
pub const URL_SUFFIX: &str = "AWS::URLSuffix";

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    pub account: String,
    pub region: String,
    pub partition: String,
    /// user supplied parameter values, by parameter name
    pub parameters: IndexMap<String, Value>,
}

impl EvaluationContext {
    /// Context for `account` in `region`, the partition is derived from the region
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            account: account.into(),
            partition: partition_for_region(&region).to_string(),
            region,
            parameters: Default::default(),
        }
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Same account, region and partition but other parameters
    pub fn scoped(&self, parameters: IndexMap<String, Value>) -> Self {
        Self {
            account: self.account.clone(),
            region: self.region.clone(),
            partition: self.partition.clone(),
            parameters,
        }
    }

    /// Pseudo parameters of a stack called `stack_name` and the user parameters on top
    pub(crate) fn bindings(&self, stack_name: &str) -> IndexMap<String, Value> {
        let mut bindings: IndexMap<String, Value> = [
            (ACCOUNT_ID, self.account.as_str()),
            (REGION, self.region.as_str()),
            (PARTITION, self.partition.as_str()),
            (STACK_NAME, stack_name),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::from(value)))
        .collect();

        bindings.extend(self.parameters.clone());
        bindings
    }
}

pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("us-isob-") {
        "aws-iso-b"
    } else if region.starts_with("us-iso-") {
        "aws-iso"
    } else {
        "aws"
    }
}
