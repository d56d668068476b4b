/// Triangle meshes in homogeneous coordinates
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

use crate::transform::{self, point, radians, Transform};

/// A triangle with counter-clockwise winding seen from its outward face
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector4<f32>; 3],
    /// Normal supplied by a mesh file, only set when the loader trusts it
    pub facet_normal: Option<Vector4<f32>>,
}

impl Triangle {
    pub fn new(v0: Vector4<f32>, v1: Vector4<f32>, v2: Vector4<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
            facet_normal: None,
        }
    }

    /// Build from nine coordinates, three per vertex in winding order.
    #[allow(clippy::too_many_arguments)]
    pub fn from_coords(
        x1: f32, y1: f32, z1: f32,
        x2: f32, y2: f32, z2: f32,
        x3: f32, y3: f32, z3: f32,
    ) -> Self {
        Self::new(point(x1, y1, z1), point(x2, y2, z2), point(x3, y3, z3))
    }

    pub fn with_facet_normal(mut self, normal: Vector4<f32>) -> Self {
        self.facet_normal = Some(transform::normalize(&normal));
        self
    }

    /// Normal derived from the vertex winding
    pub fn winding_normal(&self) -> Vector4<f32> {
        let [v0, v1, v2] = &self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        transform::normalize(&transform::cross(&edge1, &edge2))
    }

    /// The normal used for culling: the trusted facet normal if present,
    /// otherwise the winding normal.
    pub fn normal(&self) -> Vector4<f32> {
        self.facet_normal.unwrap_or_else(|| self.winding_normal())
    }

    fn transformed(&self, m: &Matrix4<f32>, normal_matrix: Option<&Matrix3<f32>>) -> Self {
        let facet_normal = match (self.facet_normal, normal_matrix) {
            (Some(n), Some(nm)) => {
                let v = nm * n.xyz();
                Some(transform::normalize(&Vector4::new(v.x, v.y, v.z, 0.0)))
            }
            _ => None,
        };
        Self {
            vertices: self.vertices.map(|v| m * v),
            facet_normal,
        }
    }
}

/// Inverse-transpose of the linear part of `m`, used to carry normals
/// through non-uniform scaling.
fn normal_matrix(m: &Matrix4<f32>) -> Option<Matrix3<f32>> {
    let linear = Matrix3::from_fn(|r, c| m[(r, c)]);
    linear.try_inverse().map(|inv| inv.transpose())
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// New mesh with every vertex transformed by `m`.
    ///
    /// Winding normals follow the new vertices. Trusted facet normals go
    /// through the inverse-transpose and are dropped when `m` is singular.
    pub fn apply(&self, m: &Matrix4<f32>) -> Mesh {
        let nm = normal_matrix(m);
        Mesh {
            triangles: self
                .triangles
                .iter()
                .map(|t| t.transformed(m, nm.as_ref()))
                .collect(),
        }
    }

    /// Concatenate this mesh with `others`, preserving order.
    pub fn merge<'a, I>(&self, others: I) -> Mesh
    where
        I: IntoIterator<Item = &'a Mesh>,
    {
        let mut merged = self.clone();
        for other in others {
            merged.triangles.extend(other.triangles.iter().cloned());
        }
        merged
    }

    pub fn translate(&self, x: f32, y: f32, z: f32) -> Mesh {
        self.apply(&Transform::translation(x, y, z))
    }

    /// Rotate with `Transform::rotation` ordering (Z first on vertices).
    pub fn rotate(&self, x: f32, y: f32, z: f32) -> Mesh {
        self.apply(&Transform::rotation(x, y, z))
    }

    pub fn scale(&self, sx: f32, sy: f32, sz: f32) -> Mesh {
        self.apply(&Transform::scaling(sx, sy, sz))
    }

    /// Axis-aligned bounding box as `(min, max)`, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let mut vertices = self.triangles.iter().flat_map(|t| t.vertices.iter());
        let first = vertices.next()?.xyz();
        Some(vertices.fold((first, first), |(min, max), v| {
            let p = v.xyz();
            (min.inf(&p), max.sup(&p))
        }))
    }

    /// Recentre on the origin and scale so the largest extent is 1.
    ///
    /// STL parts come in arbitrary units; this makes them fit the default
    /// camera the same way the built-in cube does.
    pub fn normalized(&self) -> Mesh {
        let Some((min, max)) = self.bounds() else {
            return self.clone();
        };
        let center = (min + max) / 2.0;
        let extent = (max - min).max();
        let centered = self.translate(-center.x, -center.y, -center.z);
        if extent > 0.0 {
            centered.scale(1.0 / extent, 1.0 / extent, 1.0 / extent)
        } else {
            centered
        }
    }

    /// Cube centered at the origin.
    ///
    /// Built from the +z face and rotated copies of it, so every face keeps
    /// the counter-clockwise winding. Triangle pairs are ordered
    /// +z, -z, -y, +y, +x, -x.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let front = Mesh::from_triangles(vec![
            Triangle::from_coords(h, h, h, -h, h, h, -h, -h, h),
            Triangle::from_coords(-h, -h, h, h, -h, h, h, h, h),
        ]);

        front.merge(&[
            front.rotate(radians(180.0), 0.0, 0.0),
            front.rotate(radians(90.0), 0.0, 0.0),
            front.rotate(radians(-90.0), 0.0, 0.0),
            front.rotate(0.0, radians(90.0), 0.0),
            front.rotate(0.0, radians(-90.0), 0.0),
        ])
    }
}
