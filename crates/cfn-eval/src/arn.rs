//! resource attribute formatting
//!
//! ARN shapes differ between services and can't be derived from the resource type alone, so this
//! is an explicit table of `(resource type, attribute) -> format`. Resource types or attributes
//! missing from it are reported as unsupported.
use crate::error::EvaluationError;

/// Everything an attribute format may need
#[derive(Debug, Clone, PartialEq)]
pub struct ArnParts<'a> {
    pub partition: &'a str,
    pub service: String,
    pub region: &'a str,
    pub account: &'a str,
    pub resource_type: String,
    pub resource_name: &'a str,
}

/// `None` when the physical id lacks what the format extracts from it
type AttributeFormat = fn(&ArnParts) -> Option<String>;

fn attribute_format(resource_type: &str, attribute: &str) -> Option<Option<AttributeFormat>> {
    let format: Option<AttributeFormat> = match (resource_type, attribute) {
        ("AWS::IAM::Role" | "AWS::IAM::User" | "AWS::IAM::Group", "Arn") => Some(iam_arn),
        ("AWS::IAM::Role" | "AWS::IAM::User" | "AWS::IAM::Group", _) => None,

        ("AWS::S3::Bucket", "Arn") => Some(s3_arn),
        ("AWS::S3::Bucket", _) => None,

        ("AWS::Lambda::Function", "Arn") => Some(std_colon_resource_arn),
        ("AWS::Lambda::Function", _) => None,

        ("AWS::Events::EventBus", "Arn") => Some(std_slash_resource_arn),
        ("AWS::Events::EventBus", "Name") => Some(event_bus_name),
        ("AWS::Events::EventBus", _) => None,

        ("AWS::DynamoDB::Table" | "AWS::KMS::Key", "Arn") => Some(std_slash_resource_arn),
        ("AWS::DynamoDB::Table" | "AWS::KMS::Key", _) => None,

        ("AWS::AppSync::GraphQLApi", "ApiId") => Some(appsync_api_id),
        ("AWS::AppSync::GraphQLApi", _) => None,

        ("AWS::AppSync::FunctionConfiguration", "FunctionId") => Some(appsync_function_id),
        ("AWS::AppSync::FunctionConfiguration", _) => None,

        ("AWS::AppSync::DataSource", "Name") => Some(appsync_data_source_name),
        ("AWS::AppSync::DataSource", _) => None,

        _ => return None,
    };

    Some(format)
}

/// Resource types whose ARN resource segment is not the lower-cased last part of the type name
fn special_resource_type_arn_part(resource_type: &str) -> Option<&'static str> {
    match resource_type {
        "AWS::Events::EventBus" => Some("event-bus"),
        _ => None,
    }
}

/// `AWS::Lambda::Function` -> `lambda`
pub fn service_of(resource_type: &str) -> String {
    resource_type
        .split("::")
        .nth(1)
        .unwrap_or_default()
        .to_lowercase()
}

/// `AWS::Lambda::Function` -> `function`
pub fn resource_type_arn_part(resource_type: &str) -> String {
    if let Some(special) = special_resource_type_arn_part(resource_type) {
        return special.to_string();
    }

    resource_type
        .split("::")
        .nth(2)
        .unwrap_or_default()
        .to_lowercase()
}

/// Account, region and partition the formatted identifiers live in
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct ArnScope<'a> {
    pub partition: &'a str,
    pub region: &'a str,
    pub account: &'a str,
}

/// Format `attribute` of a deployed resource from its physical id
///
/// Without an attribute (a `Ref`) the physical id is returned unchanged. `Ok(None)` if the
/// physical id doesn't have the shape the attribute is extracted from.
pub fn format_resource_attribute(
    scope: ArnScope,
    resource_type: &str,
    physical_id: &str,
    attribute: Option<&str>,
) -> Result<Option<String>, EvaluationError> {
    let Some(attribute) = attribute else {
        return Ok(Some(physical_id.to_string()));
    };

    let format = attribute_format(resource_type, attribute)
        .ok_or_else(|| EvaluationError::UnsupportedResourceType(resource_type.to_string()))?
        .ok_or_else(|| EvaluationError::UnsupportedAttribute {
            resource_type: resource_type.to_string(),
            attribute: attribute.to_string(),
        })?;

    let parts = ArnParts {
        partition: scope.partition,
        service: service_of(resource_type),
        region: scope.region,
        account: scope.account,
        resource_type: resource_type_arn_part(resource_type),
        resource_name: physical_id,
    };

    Ok(format(&parts))
}

// IAM is global: no region in the ARN
fn iam_arn(parts: &ArnParts) -> Option<String> {
    Some(format!(
        "arn:{}:{}::{}:{}/{}",
        parts.partition, parts.service, parts.account, parts.resource_type, parts.resource_name
    ))
}

// bucket names are globally unique
fn s3_arn(parts: &ArnParts) -> Option<String> {
    Some(format!(
        "arn:{}:{}:::{}",
        parts.partition, parts.service, parts.resource_name
    ))
}

fn std_colon_resource_arn(parts: &ArnParts) -> Option<String> {
    Some(format!(
        "arn:{}:{}:{}:{}:{}:{}",
        parts.partition,
        parts.service,
        parts.region,
        parts.account,
        parts.resource_type,
        parts.resource_name
    ))
}

fn std_slash_resource_arn(parts: &ArnParts) -> Option<String> {
    Some(format!(
        "arn:{}:{}:{}:{}:{}/{}",
        parts.partition,
        parts.service,
        parts.region,
        parts.account,
        parts.resource_type,
        parts.resource_name
    ))
}

// the name of an event bus is its physical id
fn event_bus_name(parts: &ArnParts) -> Option<String> {
    Some(parts.resource_name.to_string())
}

fn path_segment(resource_name: &str, index: usize) -> Option<String> {
    resource_name
        .split('/')
        .nth(index)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

// arn:aws:appsync:us-east-1:111111111111:apis/<apiId>
fn appsync_api_id(parts: &ArnParts) -> Option<String> {
    path_segment(parts.resource_name, 1)
}

// arn:aws:appsync:us-east-1:111111111111:apis/<apiId>/functions/<functionId>
fn appsync_function_id(parts: &ArnParts) -> Option<String> {
    path_segment(parts.resource_name, 3)
}

// arn:aws:appsync:us-east-1:111111111111:apis/<apiId>/datasources/<datasourceName>
fn appsync_data_source_name(parts: &ArnParts) -> Option<String> {
    path_segment(parts.resource_name, 3)
}
