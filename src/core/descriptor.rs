//! Wire structures of a scene snapshot.
//!
//! An [`InstanceDescriptor`] tree is what the client reconstructs the
//! scene from. Arrays never appear inline; they are referenced by hash
//! through [`ArrayDescriptor`]s and fetched separately.

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Prefix the client resolves to a previously described instance.
pub const INSTANCE_PREFIX: &str = "instance:";

/// Reference to another instance from inside a method call:
/// `instance:${<id>}`.
pub fn wrap_id(id: &str) -> String {
    format!("{}${{{}}}", INSTANCE_PREFIX, id)
}

/// Inverse of [`wrap_id`].
pub fn unwrap_id(reference: &str) -> Option<&str> {
    reference.strip_prefix(INSTANCE_PREFIX)?.strip_prefix("${")?.strip_suffix('}')
}

/// A call the client replays on an instance. Serialized as
/// `[method, [args...]]`.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self { method: method.into(), args }
    }

    /// Call taking a single instance reference.
    pub fn with_instance(method: impl Into<String>, id: &str) -> Self {
        Self::new(method, vec![Value::String(wrap_id(id))])
    }

    /// Instance id of the first argument, if it is a reference.
    pub fn instance_arg(&self) -> Option<&str> {
        self.args.first().and_then(Value::as_str).and_then(unwrap_id)
    }
}

impl Serialize for MethodCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.method, &self.args).serialize(serializer)
    }
}

/// Serialized form of one scene node.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct InstanceDescriptor {
    /// Instance id of the enclosing node, `0x0` at the root.
    pub parent: String,
    pub id: String,
    /// Class name of the node.
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: Map<String, Value>,
    pub calls: Vec<MethodCall>,
    pub dependencies: Vec<InstanceDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<u64>,
}

impl InstanceDescriptor {
    /// Build a descriptor. Non-object `properties` are treated as empty.
    pub fn new(parent: impl Into<String>, id: impl Into<String>, kind: impl Into<String>, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            parent: parent.into(),
            id: id.into(),
            kind: kind.into(),
            properties,
            calls: Vec::new(),
            dependencies: Vec::new(),
            mtime: None,
        }
    }

    pub fn with_calls(mut self, calls: Vec<MethodCall>) -> Self {
        self.calls = calls;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<InstanceDescriptor>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_mtime(mut self, mtime: u64) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Depth-first search for the descriptor with `id`.
    pub fn find(&self, id: &str) -> Option<&InstanceDescriptor> {
        if self.id == id {
            return Some(self);
        }
        self.dependencies.iter().find_map(|d| d.find(id))
    }

    /// All descriptors of the tree, pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &InstanceDescriptor> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.dependencies.iter().rev());
            Some(next)
        })
    }

    /// Hashes of every array referenced in the tree.
    pub fn array_hashes(&self) -> Vec<String> {
        let mut hashes = Vec::new();
        for node in self.iter() {
            for value in node.properties.values() {
                collect_hashes(value, &mut hashes);
            }
        }
        hashes.sort();
        hashes.dedup();
        hashes
    }

    pub fn to_json(&self) -> crate::util::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> crate::util::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn collect_hashes(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let (Some(Value::String(hash)), Some(_)) = (map.get("hash"), map.get("dataType")) {
                out.push(hash.clone());
            }
            map.values().for_each(|v| collect_hashes(v, out));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_hashes(v, out)),
        _ => {}
    }
}

/// Attribute association of a field array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldLocation {
    PointData,
    CellData,
}

/// Setter the client registers a field array through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Registration {
    SetScalars,
    SetNormals,
    SetTCoords,
}

/// Value range of one component, or of the magnitude.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RangeInfo {
    pub min: f64,
    pub max: f64,
    pub component: Option<String>,
}

/// Metadata of one array, referencing its content by hash.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayDescriptor {
    pub hash: String,
    pub vtk_class: String,
    pub name: Option<String>,
    /// Typed-array tag, e.g. `Float32Array`.
    pub data_type: String,
    pub number_of_components: usize,
    /// Total scalar count: tuples times components.
    pub size: usize,
    pub ranges: Vec<RangeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<FieldLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<Registration>,
}

impl ArrayDescriptor {
    pub fn at(mut self, location: FieldLocation, registration: Registration) -> Self {
        self.location = Some(location);
        self.registration = Some(registration);
        self
    }

    pub fn with_class(mut self, vtk_class: &str) -> Self {
        self.vtk_class = vtk_class.to_string();
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrap_id() {
        assert_eq!(wrap_id("00000000000000ab"), "instance:${00000000000000ab}");
        assert_eq!(unwrap_id("instance:${42}"), Some("42"));
        assert_eq!(unwrap_id("instance:42"), None);
        assert_eq!(unwrap_id("42"), None);
    }

    #[test]
    fn test_method_call_wire_shape() {
        let call = MethodCall::with_instance("addRenderer", "r1");
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value, json!(["addRenderer", ["instance:${r1}"]]));
        assert_eq!(call.instance_arg(), Some("r1"));
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let leaf = InstanceDescriptor::new("p", "c", "vtkCamera", json!({ "position": [0, 0, 1] }));
        let root = InstanceDescriptor::new("0x0", "p", "vtkRenderWindow", json!({}))
            .with_calls(vec![MethodCall::with_instance("addRenderer", "c")])
            .with_dependencies(vec![leaf])
            .with_mtime(7);

        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(value["type"], "vtkRenderWindow");
        assert_eq!(value["parent"], "0x0");
        assert_eq!(value["mtime"], 7);
        assert_eq!(value["dependencies"][0]["properties"]["position"], json!([0, 0, 1]));
        assert!(value["dependencies"][0].get("mtime").is_none());

        assert_eq!(root.find("c").map(|d| d.kind.as_str()), Some("vtkCamera"));
        assert_eq!(root.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["p", "c"]);
    }

    #[test]
    fn test_array_descriptor_fields() {
        let desc = ArrayDescriptor {
            hash: "abc_3f".into(),
            vtk_class: "vtkDataArray".into(),
            name: Some("Normals".into()),
            data_type: "Float32Array".into(),
            number_of_components: 3,
            size: 3,
            ranges: vec![RangeInfo { min: 0.0, max: 1.0, component: None }],
            location: None,
            registration: None,
        }
        .at(FieldLocation::PointData, Registration::SetNormals);

        let value = desc.to_value();
        assert_eq!(value["vtkClass"], "vtkDataArray");
        assert_eq!(value["numberOfComponents"], 3);
        assert_eq!(value["location"], "pointData");
        assert_eq!(value["registration"], "setNormals");
        assert_eq!(value["ranges"][0]["component"], Value::Null);

        let node = InstanceDescriptor::new("0x0", "d", "vtkPolyData", json!({ "points": value.clone(), "fields": [value] }));
        assert_eq!(node.array_hashes(), vec!["abc_3f".to_string()]);
    }
}
