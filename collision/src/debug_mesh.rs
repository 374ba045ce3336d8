/*!
Debug meshes: renderable stand-ins for physics shapes.

The mesher maps each collider shape of a body back to plain geometry the render
collaborator can upload:

- cuboid → box mesh (half extents)
- ball → sphere mesh (radius)
- convex polyhedron → triangle fan per face
- heightfield → two triangles per grid cell
- trimesh → one triangle per index triple

All geometry is in physics units and relative to the body frame. Any other shape
type is rejected with `UnsupportedShapeKind` so a new shape in the builder cannot
silently vanish from the visualizer.
*/

use rapier3d::prelude::{SharedShape, TypedShape};

use crate::body::Body;
use crate::error::{CollisionError, Result};
use crate::model::MeshTransform;
use crate::shape::BuiltShape;
use crate::types::{Iso, Vec3, iso};

/// Renderable geometry for one shape.
#[derive(Clone, Debug, PartialEq)]
pub enum DebugGeometry {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    Triangles {
        positions: Vec<[f32; 3]>,
        indices: Vec<[u32; 3]>,
    },
}

/// UV tessellation renderers use for [`DebugGeometry::Sphere`].
pub const SPHERE_SECTORS: u32 = 24;
pub const SPHERE_STACKS: u32 = 16;

impl DebugGeometry {
    /// Triangles drawn for this part; spheres count their UV tessellation.
    pub fn triangle_count(&self) -> usize {
        match self {
            Self::Box { .. } => 12,
            // Poles are fans, every other stack is a quad strip.
            Self::Sphere { .. } => (SPHERE_SECTORS * (2 * SPHERE_STACKS - 2)) as usize,
            Self::Triangles { indices, .. } => indices.len(),
        }
    }
}

/// One shape's geometry, placed relative to the body frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugMeshPart {
    pub geometry: DebugGeometry,
    pub local_pose: Iso,
}

/// Group of parts visualizing one body. The group follows the body's pose.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugMesh {
    pub parts: Vec<DebugMeshPart>,
    /// Linear RGB in `[0, 1]`.
    pub color: [f32; 3],
    /// Trigger bodies are shown at their exact pose, without render smoothing.
    pub ignore_smoothing: bool,
    /// Latest pose copied from the body (physics units).
    pub pose: Iso,
}

impl DebugMesh {
    pub fn new(parts: Vec<DebugMeshPart>, color: [f32; 3]) -> Self {
        Self {
            parts,
            color,
            ignore_smoothing: false,
            pose: Iso::identity(),
        }
    }
}

impl MeshTransform for DebugMesh {
    fn set_pose(&mut self, pose: &Iso) {
        self.pose = *pose;
    }
}

/// Map a single physics shape to debug geometry.
pub fn debug_geometry(shape: &SharedShape) -> Result<DebugGeometry> {
    match shape.as_typed_shape() {
        TypedShape::Cuboid(cuboid) => Ok(DebugGeometry::Box {
            half_extents: cuboid.half_extents,
        }),
        TypedShape::Ball(ball) => Ok(DebugGeometry::Sphere {
            radius: ball.radius,
        }),
        TypedShape::ConvexPolyhedron(poly) => {
            let (points, indices) = poly.to_trimesh();
            Ok(triangles(points.iter().map(|p| [p.x, p.y, p.z]), indices))
        }
        TypedShape::HeightField(field) => {
            let (points, indices) = field.to_trimesh();
            Ok(triangles(points.iter().map(|p| [p.x, p.y, p.z]), indices))
        }
        TypedShape::TriMesh(mesh) => Ok(triangles(
            mesh.vertices().iter().map(|p| [p.x, p.y, p.z]),
            mesh.indices().to_vec(),
        )),
        _ => Err(CollisionError::UnsupportedShapeKind(format!(
            "{:?}",
            shape.shape_type()
        ))),
    }
}

fn triangles(positions: impl Iterator<Item = [f32; 3]>, indices: Vec<[u32; 3]>) -> DebugGeometry {
    DebugGeometry::Triangles {
        positions: positions.collect(),
        indices,
    }
}

fn debug_part(shape: &BuiltShape) -> Result<DebugMeshPart> {
    Ok(DebugMeshPart {
        geometry: debug_geometry(&shape.shape)?,
        local_pose: iso(shape.local_offset, shape.local_orientation),
    })
}

/// Build the debug mesh group for `body`, one part per shape in shape order.
pub fn debug_mesh_for_body(body: &Body, color: [f32; 3]) -> Result<DebugMesh> {
    let parts = body
        .shapes()
        .iter()
        .map(debug_part)
        .collect::<Result<Vec<_>>>()?;
    let mut mesh = DebugMesh::new(parts, color);
    mesh.ignore_smoothing = body.is_trigger();
    mesh.pose = body.initial_pose();
    Ok(mesh)
}

/// A random, reasonably bright colour so neighbouring bodies are easy to tell apart.
pub fn random_color() -> [f32; 3] {
    let [r, g, b]: [f32; 3] = rand::random();
    [0.25 + 0.75 * r, 0.25 + 0.75 * g, 0.25 + 0.75 * b]
}
