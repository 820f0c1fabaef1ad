//! Partial OpenAPI document model.
//!
//! Only the fields the preprocessor edits are typed. Everything else rides along in
//! flattened ordered mappings and is written back unchanged.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// HTTP methods whose operations are re-tagged.
pub const OPERATION_METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<ServerEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Mapping>,
    #[serde(flatten)]
    pub rest: Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(flatten)]
    pub rest: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
}

impl Info {
    /// A version counts as present unless it is null or an empty string.
    pub fn has_version(&self) -> bool {
        match &self.version {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub rest: Mapping,
}

impl Server {
    pub fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// One item of `servers`. Items that are not server objects are kept as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerEntry {
    Server(Server),
    Other(Value),
}

impl ServerEntry {
    pub fn as_server(&self) -> Option<&Server> {
        match self {
            ServerEntry::Server(server) => Some(server),
            ServerEntry::Other(_) => None,
        }
    }

    pub fn has_url(&self) -> bool {
        self.as_server().is_some_and(Server::has_url)
    }
}

impl OpenApiDocument {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file parses to null; treat it as an empty document.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// True when `paths` is a mapping with at least one entry.
    pub fn has_paths(&self) -> bool {
        self.paths.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Every operation mapping under every path item, in document order.
    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Mapping> {
        self.paths
            .iter_mut()
            .flat_map(|paths| paths.iter_mut())
            .filter_map(|(_, item)| item.as_mapping_mut())
            .flat_map(|item| {
                item.iter_mut().filter_map(|(key, op)| {
                    let is_method = key
                        .as_str()
                        .is_some_and(|k| OPERATION_METHODS.contains(&k));
                    if is_method {
                        op.as_mapping_mut()
                    } else {
                        None
                    }
                })
            })
    }

    /// Read-only view of every operation's `tags`, for assertions and reporting.
    pub fn operation_tags(&self) -> Vec<Option<&Value>> {
        let mut tags = Vec::new();
        if let Some(paths) = &self.paths {
            for (_, item) in paths {
                let Some(item) = item.as_mapping() else {
                    continue;
                };
                for method in OPERATION_METHODS {
                    if let Some(op) = item.get(method).and_then(Value::as_mapping) {
                        tags.push(op.get("tags"));
                    }
                }
            }
        }
        tags
    }
}
