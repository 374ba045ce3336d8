/*!
Shape builder: declarative shape records → physics primitives.

A [`ShapeDef`] is the JSON-like record a map or entity definition carries. Building
it happens in two steps:

1. [`ShapeDef::scaled`] validates the `kind` and applies the world scale, producing
   a [`ScaledShape`] whose numbers are already in physics units.
2. [`ScaledShape::to_shared_shape`] turns that into a Rapier `SharedShape`.

[`build_shape`] runs both and pairs the result with the shape's local pose.

Scaling rules
- `box`: half-extents = (width, height, depth) / 2 × scale.
- `sphere`: radius × scale.
- `cylinder`: radii and height × scale; `segments` is a tessellation count and is not scaled.
  Tessellated into a convex hull so unequal top/bottom radii are supported.
- `trimesh`: every vertex component × scale; indices unchanged.
- `heightfield`: heights and `elementSize` are used unchanged (the element size is
  not scaled, see DESIGN.md).
*/

use std::f32::consts::TAU;

use rapier3d::na::{DMatrix, Point3};
use rapier3d::prelude::SharedShape;
use serde::{Deserialize, Serialize};

use crate::error::{CollisionError, Result};
use crate::types::{Quat, Vec3, resolve_orientation, scaled_vec3};

/// Raw, immutable shape record as authored.
///
/// Dimensions are optional at this level because the record is shared by every kind;
/// [`ShapeDef::scaled`] checks that the fields the `kind` needs are present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeDef {
    pub kind: String,

    pub width: Option<f32>,
    pub height: Option<f32>,
    pub depth: Option<f32>,

    pub radius: Option<f32>,
    pub radius_top: Option<f32>,
    pub radius_bottom: Option<f32>,
    pub segments: Option<u32>,

    /// Flat `[x0, y0, z0, x1, ...]` vertex buffer for trimeshes.
    pub vertices: Vec<f32>,
    /// Flat triangle index buffer for trimeshes.
    pub indices: Vec<u32>,

    /// Heightfield samples, `data[i][j]` with `i` along X and `j` along Z.
    pub data: Vec<Vec<f32>>,
    pub element_size: Option<f32>,

    pub offset: Option<[f32; 3]>,
    pub rotation_deg: Option<[f32; 3]>,
    /// `[x, y, z, w]`. Takes precedence over `rotation_deg`.
    pub quaternion: Option<[f32; 4]>,
    pub name: Option<String>,
}

impl ShapeDef {
    fn of_kind(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            depth: Some(depth),
            ..Self::of_kind("box")
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self {
            radius: Some(radius),
            ..Self::of_kind("sphere")
        }
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        Self {
            radius_top: Some(radius_top),
            radius_bottom: Some(radius_bottom),
            height: Some(height),
            segments: Some(segments),
            ..Self::of_kind("cylinder")
        }
    }

    pub fn trimesh(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            ..Self::of_kind("trimesh")
        }
    }

    pub fn heightfield(data: Vec<Vec<f32>>, element_size: f32) -> Self {
        Self {
            data,
            element_size: Some(element_size),
            ..Self::of_kind("heightfield")
        }
    }

    pub fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_rotation_deg(mut self, rotation_deg: [f32; 3]) -> Self {
        self.rotation_deg = Some(rotation_deg);
        self
    }

    pub fn with_quaternion(mut self, quaternion: [f32; 4]) -> Self {
        self.quaternion = Some(quaternion);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn require(&self, field: &str, value: Option<f32>) -> Result<f32> {
        value.ok_or_else(|| CollisionError::malformed(&self.kind, format!("missing `{field}`")))
    }

    /// Validate the kind and convert every linear dimension into physics units.
    pub fn scaled(&self, world_scale: f32) -> Result<ScaledShape> {
        match self.kind.as_str() {
            "box" => {
                let width = self.require("width", self.width)?;
                let height = self.require("height", self.height)?;
                let depth = self.require("depth", self.depth)?;
                Ok(ScaledShape::Cuboid {
                    half_extents: Vec3::new(
                        width / 2.0 * world_scale,
                        height / 2.0 * world_scale,
                        depth / 2.0 * world_scale,
                    ),
                })
            }
            "sphere" => Ok(ScaledShape::Sphere {
                radius: self.require("radius", self.radius)? * world_scale,
            }),
            "cylinder" => Ok(ScaledShape::Cylinder {
                radius_top: self.require("radiusTop", self.radius_top)? * world_scale,
                radius_bottom: self.require("radiusBottom", self.radius_bottom)? * world_scale,
                height: self.require("height", self.height)? * world_scale,
                segments: self.segments.unwrap_or(8),
            }),
            "trimesh" => {
                if self.vertices.len() % 3 != 0 {
                    return Err(CollisionError::malformed(
                        &self.kind,
                        "vertex buffer length is not a multiple of 3",
                    ));
                }
                if self.indices.len() % 3 != 0 {
                    return Err(CollisionError::malformed(
                        &self.kind,
                        "index buffer length is not a multiple of 3",
                    ));
                }
                Ok(ScaledShape::TriMesh {
                    vertices: self
                        .vertices
                        .chunks_exact(3)
                        .map(|v| Point3::new(v[0], v[1], v[2]) * world_scale)
                        .collect(),
                    indices: self
                        .indices
                        .chunks_exact(3)
                        .map(|t| [t[0], t[1], t[2]])
                        .collect(),
                })
            }
            "heightfield" => Ok(ScaledShape::HeightField {
                heights: self.data.clone(),
                element_size: self.require("elementSize", self.element_size)?,
            }),
            other => Err(CollisionError::UnsupportedShapeKind(other.to_string())),
        }
    }

    /// Local offset relative to the body frame, in physics units.
    pub fn local_offset(&self, world_scale: f32) -> Vec3 {
        scaled_vec3(self.offset, world_scale)
    }

    /// Local orientation relative to the body frame.
    pub fn local_orientation(&self) -> Quat {
        resolve_orientation(self.rotation_deg, self.quaternion)
    }
}

/// A shape whose dimensions are already in physics units.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaledShape {
    Cuboid {
        half_extents: Vec3,
    },
    Sphere {
        radius: f32,
    },
    /// Y-aligned, possibly tapered cylinder approximated by `segments` sides.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    TriMesh {
        vertices: Vec<Point3<f32>>,
        indices: Vec<[u32; 3]>,
    },
    /// `heights[i][j]` with `i` along X and `j` along Z, centered on the local origin.
    HeightField {
        heights: Vec<Vec<f32>>,
        element_size: f32,
    },
}

impl ScaledShape {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cuboid { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::TriMesh { .. } => "trimesh",
            Self::HeightField { .. } => "heightfield",
        }
    }

    /// Build the Rapier shape.
    pub fn to_shared_shape(&self) -> Result<SharedShape> {
        match self {
            Self::Cuboid { half_extents } => Ok(SharedShape::cuboid(
                half_extents.x,
                half_extents.y,
                half_extents.z,
            )),
            Self::Sphere { radius } => Ok(SharedShape::ball(*radius)),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => {
                if *segments < 3 {
                    return Err(CollisionError::malformed(
                        self.kind(),
                        "a cylinder needs at least 3 segments",
                    ));
                }
                let points = cylinder_points(*radius_top, *radius_bottom, *height, *segments);
                SharedShape::convex_hull(&points).ok_or_else(|| {
                    CollisionError::malformed(self.kind(), "degenerate convex hull")
                })
            }
            Self::TriMesh { vertices, indices } => {
                let vertex_count = vertices.len() as u32;
                if let Some(bad) = indices.iter().flatten().find(|&&i| i >= vertex_count) {
                    return Err(CollisionError::malformed(
                        self.kind(),
                        format!("index {bad} out of range for {vertex_count} vertices"),
                    ));
                }
                SharedShape::trimesh(vertices.clone(), indices.clone())
                    .map_err(|e| CollisionError::malformed(self.kind(), format!("{e:?}")))
            }
            Self::HeightField {
                heights,
                element_size,
            } => {
                let nx = heights.len();
                let nz = heights.first().map_or(0, Vec::len);
                if nx < 2 || nz < 2 {
                    return Err(CollisionError::malformed(
                        self.kind(),
                        "a heightfield needs at least 2x2 samples",
                    ));
                }
                if heights.iter().any(|column| column.len() != nz) {
                    return Err(CollisionError::malformed(self.kind(), "ragged height data"));
                }
                // Rapier rows run along Z and columns along X.
                let matrix = DMatrix::from_fn(nz, nx, |row, col| heights[col][row]);
                let scale = Vec3::new(
                    element_size * (nx - 1) as f32,
                    1.0,
                    element_size * (nz - 1) as f32,
                );
                Ok(SharedShape::heightfield(matrix, scale))
            }
        }
    }
}

/// Ring vertices for a tapered cylinder: bottom ring at `-height/2`, top ring at `+height/2`.
fn cylinder_points(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Vec<Point3<f32>> {
    let half = height / 2.0;
    let mut points = Vec::with_capacity(segments as usize * 2);
    for i in 0..segments {
        let theta = TAU * i as f32 / segments as f32;
        let (sin, cos) = theta.sin_cos();
        points.push(Point3::new(radius_bottom * cos, -half, radius_bottom * sin));
        points.push(Point3::new(radius_top * cos, half, radius_top * sin));
    }
    points
}

/// A physics shape together with its pose relative to the owning body.
#[derive(Clone)]
pub struct BuiltShape {
    pub shape: SharedShape,
    pub local_offset: Vec3,
    pub local_orientation: Quat,
    pub name: Option<String>,
}

impl std::fmt::Debug for BuiltShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltShape")
            .field("shape_type", &self.shape.shape_type())
            .field("local_offset", &self.local_offset)
            .field("local_orientation", &self.local_orientation)
            .field("name", &self.name)
            .finish()
    }
}

/// Build one shape record into a physics shape plus local pose.
pub fn build_shape(def: &ShapeDef, world_scale: f32) -> Result<BuiltShape> {
    let shape = def.scaled(world_scale)?.to_shared_shape()?;
    Ok(BuiltShape {
        shape,
        local_offset: def.local_offset(world_scale),
        local_orientation: def.local_orientation(),
        name: def.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rapier3d::prelude::ShapeType;

    #[test]
    fn box_half_extents_and_offset_are_scaled() {
        let def = ShapeDef::cuboid(40.0, 10.0, 128.0).with_offset([-20.0, -2.0, -64.0]);
        let built = build_shape(&def, 0.01).unwrap();

        let cuboid = built.shape.as_cuboid().expect("cuboid");
        assert_relative_eq!(cuboid.half_extents, Vec3::new(0.2, 0.05, 0.64), epsilon = 1.0e-6);
        assert_relative_eq!(built.local_offset, Vec3::new(-0.2, -0.02, -0.64), epsilon = 1.0e-6);
        assert_eq!(built.local_orientation, Quat::identity());
    }

    #[test]
    fn linear_dimensions_scale_exactly() {
        let scale = 0.25;

        let cuboid = ShapeDef::cuboid(8.0, 4.0, 2.0).scaled(scale).unwrap();
        assert_eq!(
            cuboid,
            ScaledShape::Cuboid {
                half_extents: Vec3::new(8.0 / 2.0 * scale, 4.0 / 2.0 * scale, 2.0 / 2.0 * scale)
            }
        );

        let sphere = ShapeDef::sphere(12.0).scaled(scale).unwrap();
        assert_eq!(sphere, ScaledShape::Sphere { radius: 12.0 * scale });

        let cylinder = ShapeDef::cylinder(3.0, 5.0, 20.0, 12).scaled(scale).unwrap();
        assert_eq!(
            cylinder,
            ScaledShape::Cylinder {
                radius_top: 3.0 * scale,
                radius_bottom: 5.0 * scale,
                height: 20.0 * scale,
                segments: 12,
            }
        );
    }

    #[test]
    fn sphere_builds_ball() {
        let built = build_shape(&ShapeDef::sphere(50.0), 0.01).unwrap();
        assert_relative_eq!(built.shape.as_ball().unwrap().radius, 0.5);
    }

    #[test]
    fn cylinder_builds_convex_hull_within_scaled_bounds() {
        let built = build_shape(&ShapeDef::cylinder(100.0, 100.0, 200.0, 16), 0.01).unwrap();
        assert_eq!(built.shape.shape_type(), ShapeType::ConvexPolyhedron);

        let hull = built.shape.as_convex_polyhedron().unwrap();
        for p in hull.points() {
            assert!(p.y.abs() <= 1.0 + 1.0e-5);
            assert!((p.x * p.x + p.z * p.z).sqrt() <= 1.0 + 1.0e-5);
        }
    }

    #[test]
    fn cylinder_with_too_few_segments_is_malformed() {
        let err = build_shape(&ShapeDef::cylinder(1.0, 1.0, 1.0, 2), 1.0).unwrap_err();
        assert!(matches!(err, CollisionError::MalformedShape { .. }));
    }

    #[test]
    fn trimesh_scales_vertices_and_keeps_indices() {
        let def = ShapeDef::trimesh(
            vec![0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0, 100.0],
            vec![0, 2, 1],
        );
        let scaled = def.scaled(0.01).unwrap();
        let ScaledShape::TriMesh { vertices, indices } = &scaled else {
            panic!("expected trimesh");
        };
        assert_relative_eq!(vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(vertices[2], Point3::new(0.0, 0.0, 1.0));
        assert_eq!(indices, &vec![[0, 2, 1]]);

        let shape = scaled.to_shared_shape().unwrap();
        assert_eq!(shape.as_trimesh().unwrap().indices().len(), 1);
    }

    #[test]
    fn trimesh_index_out_of_range_is_malformed() {
        let def = ShapeDef::trimesh(vec![0.0; 9], vec![0, 1, 7]);
        let err = build_shape(&def, 1.0).unwrap_err();
        assert!(matches!(err, CollisionError::MalformedShape { .. }));
    }

    #[test]
    fn heightfield_element_size_is_not_scaled() {
        let def = ShapeDef::heightfield(vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]], 10.0);
        let scaled = def.scaled(0.01).unwrap();
        assert_eq!(
            scaled,
            ScaledShape::HeightField {
                heights: vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]],
                element_size: 10.0,
            }
        );

        let shape = scaled.to_shared_shape().unwrap();
        assert_eq!(shape.shape_type(), ShapeType::HeightField);
    }

    #[test]
    fn ragged_heightfield_is_malformed() {
        let def = ShapeDef::heightfield(vec![vec![0.0, 1.0], vec![2.0]], 1.0);
        let err = build_shape(&def, 1.0).unwrap_err();
        assert!(matches!(err, CollisionError::MalformedShape { .. }));
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let def = ShapeDef {
            kind: "torus".to_string(),
            radius: Some(1.0),
            ..ShapeDef::default()
        };
        assert_eq!(
            build_shape(&def, 1.0).unwrap_err(),
            CollisionError::UnsupportedShapeKind("torus".to_string())
        );
    }

    #[test]
    fn missing_dimension_is_malformed() {
        let def = ShapeDef {
            kind: "box".to_string(),
            width: Some(1.0),
            ..ShapeDef::default()
        };
        assert!(matches!(
            build_shape(&def, 1.0),
            Err(CollisionError::MalformedShape { .. })
        ));
    }

    #[test]
    fn quaternion_overrides_rotation() {
        let def = ShapeDef::sphere(1.0)
            .with_rotation_deg([0.0, 90.0, 0.0])
            .with_quaternion([0.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(def.local_orientation().angle(), 0.0);
    }

    #[test]
    fn deserializes_ron_record() {
        let def: ShapeDef = ron::from_str(
            r#"#![enable(implicit_some)]
            (kind: "box", width: 40.0, height: 10.0, depth: 128.0,
             offset: (-20.0, -2.0, -64.0), rotationDeg: (0.0, 0.0, 0.0), name: "plank")"#,
        )
        .unwrap();
        assert_eq!(def.kind, "box");
        assert_eq!(def.offset, Some([-20.0, -2.0, -64.0]));
        assert_eq!(def.name.as_deref(), Some("plank"));
    }
}
