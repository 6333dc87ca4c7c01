//! Part descriptors - one model asset with its placement and category

use glam::{Affine3A, EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// JSON vector record as found in configuration documents (`{x, y, z}`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl VectorRecord {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };
}

impl From<VectorRecord> for Vec3 {
    fn from(v: VectorRecord) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for VectorRecord {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

fn zero_vector() -> VectorRecord {
    VectorRecord::ZERO
}

fn unit_vector() -> VectorRecord {
    VectorRecord::ONE
}

/// Raw part record exactly as it appears in a configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    /// Location of the model asset (path or URL)
    pub file_path: String,
    /// Optional human readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Category for attachments; absent on the base part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "zero_vector")]
    pub position: VectorRecord,
    #[serde(default = "unit_vector")]
    pub scale: VectorRecord,
    /// Euler angles in degrees, applied X then Y then Z
    #[serde(default = "zero_vector")]
    pub rotation: VectorRecord,
}

/// Role a part plays within its configuration document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum PartRole {
    /// The mandatory base object, never removed by category exclusivity
    Base,
    /// Optional attachment; at most one per category is active
    Attachment { category: String },
}

impl PartRole {
    pub fn category(&self) -> Option<&str> {
        match self {
            PartRole::Base => None,
            PartRole::Attachment { category } => Some(category),
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, PartRole::Base)
    }
}

/// World-space placement of a part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartTransform {
    pub position: Vec3,
    pub scale: Vec3,
    /// Degrees about local X, Y, Z (applied in that order)
    pub rotation_degrees: Vec3,
}

impl Default for PartTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
        }
    }
}

impl PartTransform {
    /// Intrinsic X, then Y, then Z rotation
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_degrees.x.to_radians(),
            self.rotation_degrees.y.to_radians(),
            self.rotation_degrees.z.to_radians(),
        )
    }

    /// Scale, then rotate, then translate
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation(), self.position)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.to_affine().transform_point3(point)
    }
}

/// Parsed, in-memory part of a configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDescriptor {
    pub asset_reference: String,
    pub display_name: String,
    pub role: PartRole,
    pub transform: PartTransform,
}

impl PartDescriptor {
    /// Build a descriptor from its raw record and the role assigned by the document
    pub fn from_record(record: PartRecord, role: PartRole) -> Self {
        let display_name = record
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| file_stem(&record.file_path).to_string());

        Self {
            display_name,
            role,
            transform: PartTransform {
                position: record.position.into(),
                scale: record.scale.into(),
                rotation_degrees: record.rotation.into(),
            },
            asset_reference: record.file_path,
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.role.category()
    }

    pub fn is_base(&self) -> bool {
        self.role.is_base()
    }
}

/// Last path segment without its extension (`models/scope_a.glb` -> `scope_a`)
fn file_stem(reference: &str) -> &str {
    let name = reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_record_defaults() {
        let record: PartRecord = serde_json::from_str(r#"{"filePath": "models/rifle.glb"}"#).unwrap();
        assert_eq!(record.position, VectorRecord::ZERO);
        assert_eq!(record.scale, VectorRecord::ONE);
        assert_eq!(record.rotation, VectorRecord::ZERO);
        assert!(record.category.is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_file_stem() {
        let record: PartRecord =
            serde_json::from_str(r#"{"filePath": "https://cdn.example.com/parts/red_dot.v2.glb"}"#).unwrap();
        let part = PartDescriptor::from_record(record, PartRole::Base);
        assert_eq!(part.display_name, "red_dot.v2");

        let record: PartRecord =
            serde_json::from_str(r#"{"filePath": "grip.glb", "name": "  "}"#).unwrap();
        let part = PartDescriptor::from_record(record, PartRole::Base);
        assert_eq!(part.display_name, "grip");
    }

    #[test]
    fn test_transform_order_scale_rotate_translate() {
        let transform = PartTransform {
            position: Vec3::new(10.0, 0.0, 0.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
            rotation_degrees: Vec3::new(0.0, 0.0, 90.0),
        };
        // (1,0,0) -> scaled (2,0,0) -> rotated 90 deg about Z (0,2,0) -> moved (10,2,0)
        let p = transform.transform_point(Vec3::X);
        assert!(approx(p, Vec3::new(10.0, 2.0, 0.0)), "got {p:?}");
    }

    #[test]
    fn test_rotation_applies_x_before_y() {
        let transform = PartTransform {
            rotation_degrees: Vec3::new(90.0, 90.0, 0.0),
            ..Default::default()
        };
        // Intrinsic X then Y: the result equals Rx * Ry applied to the point
        let expected = Quat::from_rotation_x(90f32.to_radians())
            * Quat::from_rotation_y(90f32.to_radians())
            * Vec3::Z;
        assert!(approx(transform.transform_point(Vec3::Z), expected));
    }
}
