use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A capability schema advertised to a generation backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema for the arguments the tool accepts
    pub input_schema: Value,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A concrete invocation of a tool, as requested by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The arguments for the execution
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
