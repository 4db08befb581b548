use super::Visit;
use crate::template::ResourceDefinition;
use serde_json::Value;

/// Recursively visit all string leaves
pub trait VisitStrings {
    fn visit_strings(&self, visitor: &mut dyn Visit<str>);
}

impl VisitStrings for Value {
    fn visit_strings(&self, visitor: &mut dyn Visit<str>) {
        match self {
            Value::String(s) => visitor.visit(s),
            Value::Array(array) => {
                for value in array {
                    value.visit_strings(visitor);
                }
            }
            // keys are not visited, only values can hold references
            Value::Object(object) => {
                for value in object.values() {
                    value.visit_strings(visitor);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
}

impl VisitStrings for ResourceDefinition {
    fn visit_strings(&self, visitor: &mut dyn Visit<str>) {
        visitor.visit(&self.resource_type);
        for value in self.properties.values().chain(self.attributes.values()) {
            value.visit_strings(visitor);
        }
    }
}
