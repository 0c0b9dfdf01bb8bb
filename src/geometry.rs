//! CPU-side mesh data and the primitive constructors the worlds are built
//! from.
//!
//! Geometry is generated once during scene building and uploaded lazily by
//! the renderer. All constructors produce indexed triangle lists except the
//! line helpers, which produce line lists.

use std::collections::HashMap;

use cgmath::{InnerSpace, Vector3};

/// Vertex layout shared by every pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl MeshVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Primitive interpretation of the index list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    LineList,
}

#[derive(Clone, Debug)]
pub struct Geometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl Geometry {
    /// Axis-aligned box centered on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
        // (normal, tangent-u, tangent-v) per face
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let half = Vector3::new(hw, hh, hd);
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u_axis, v_axis) in faces {
            let n = Vector3::from(normal);
            let u = Vector3::from(u_axis);
            let v = Vector3::from(v_axis);
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = Vector3::new(
                    (n.x + u.x * su + v.x * sv) * half.x,
                    (n.y + u.y * su + v.y * sv) * half.y,
                    (n.z + u.z * su + v.z * sv) * half.z,
                );
                vertices.push(MeshVertex {
                    position: p.into(),
                    normal,
                    tex_coords: [(su + 1.0) / 2.0, (sv + 1.0) / 2.0],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self {
            vertices,
            indices,
            topology: Topology::TriangleList,
        }
    }

    /// Full uv-sphere.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::sphere_section(
            radius,
            width_segments,
            height_segments,
            0.0,
            std::f32::consts::TAU,
            0.0,
            std::f32::consts::PI,
        )
    }

    /// Partial uv-sphere; `theta` sweeps from the +Y pole so a half sweep of
    /// `PI / 2` yields the tank's dome.
    pub fn sphere_section(
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        phi_start: f32,
        phi_length: f32,
        theta_start: f32,
        theta_length: f32,
    ) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let theta_end = (theta_start + theta_length).min(std::f32::consts::PI);

        let mut vertices = Vec::new();
        let mut grid: Vec<Vec<u32>> = Vec::new();
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let mut row = Vec::new();
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = phi_start + u * phi_length;
                let theta = theta_start + v * theta_length;
                let position = Vector3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                row.push(vertices.len() as u32);
                vertices.push(MeshVertex {
                    position: position.into(),
                    normal: position.normalize().into(),
                    tex_coords: [u, 1.0 - v],
                });
            }
            grid.push(row);
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                // skip the degenerate triangle that collapses onto a pole
                if iy != 0 || theta_start > 0.0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 || theta_end < std::f32::consts::PI {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            vertices,
            indices,
            topology: Topology::TriangleList,
        }
    }

    /// Capped cylinder along the Y axis, centered on the origin.
    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Self {
        let radial_segments = radial_segments.max(3);
        let half_height = height / 2.0;
        let slope = (radius_bottom - radius_top) / height;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // torso: two rings of shared vertices
        let mut rings = [Vec::new(), Vec::new()];
        for (row, (y, radius)) in [(half_height, radius_top), (-half_height, radius_bottom)]
            .into_iter()
            .enumerate()
        {
            for ix in 0..=radial_segments {
                let u = ix as f32 / radial_segments as f32;
                let theta = u * std::f32::consts::TAU;
                let (sin, cos) = theta.sin_cos();
                let normal = Vector3::new(sin, slope, cos).normalize();
                rings[row].push(vertices.len() as u32);
                vertices.push(MeshVertex {
                    position: [radius * sin, y, radius * cos],
                    normal: normal.into(),
                    tex_coords: [u, 1.0 - row as f32],
                });
            }
        }
        for ix in 0..radial_segments as usize {
            let a = rings[0][ix];
            let b = rings[1][ix];
            let c = rings[1][ix + 1];
            let d = rings[0][ix + 1];
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        // caps as triangle fans
        for (y, radius, up) in [
            (half_height, radius_top, 1.0f32),
            (-half_height, radius_bottom, -1.0),
        ] {
            if radius <= 0.0 {
                continue;
            }
            let center = vertices.len() as u32;
            vertices.push(MeshVertex {
                position: [0.0, y, 0.0],
                normal: [0.0, up, 0.0],
                tex_coords: [0.5, 0.5],
            });
            let ring_start = vertices.len() as u32;
            for ix in 0..=radial_segments {
                let theta = ix as f32 / radial_segments as f32 * std::f32::consts::TAU;
                let (sin, cos) = theta.sin_cos();
                vertices.push(MeshVertex {
                    position: [radius * sin, y, radius * cos],
                    normal: [0.0, up, 0.0],
                    tex_coords: [(sin + 1.0) / 2.0, (cos + 1.0) / 2.0],
                });
            }
            for ix in 0..radial_segments {
                let a = ring_start + ix;
                let b = ring_start + ix + 1;
                if up > 0.0 {
                    indices.extend_from_slice(&[center, a, b]);
                } else {
                    indices.extend_from_slice(&[center, b, a]);
                }
            }
        }

        Self {
            vertices,
            indices,
            topology: Topology::TriangleList,
        }
    }

    /// Single quad in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let vertices = vec![
            MeshVertex {
                position: [-hw, -hh, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [0.0, 1.0],
            },
            MeshVertex {
                position: [hw, -hh, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [1.0, 1.0],
            },
            MeshVertex {
                position: [hw, hh, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [1.0, 0.0],
            },
            MeshVertex {
                position: [-hw, hh, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coords: [0.0, 0.0],
            },
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
            topology: Topology::TriangleList,
        }
    }

    /// Connected line segments through the given points, as a line list.
    pub fn polyline(points: &[Vector3<f32>]) -> Self {
        let vertices = points
            .iter()
            .map(|p| MeshVertex {
                position: (*p).into(),
                normal: [0.0, 0.0, 0.0],
                tex_coords: [0.0, 0.0],
            })
            .collect::<Vec<_>>();
        let mut indices = Vec::new();
        for i in 1..points.len() as u32 {
            indices.push(i - 1);
            indices.push(i);
        }
        Self {
            vertices,
            indices,
            topology: Topology::LineList,
        }
    }

    /// Disjoint line segments, one per consecutive pair of points.
    pub fn line_segments(points: &[Vector3<f32>]) -> Self {
        let mut geometry = Self::polyline(points);
        geometry.indices = (0..points.len() as u32 - points.len() as u32 % 2).collect();
        geometry
    }

    /// Extract the hard edges of a triangle mesh as a line list.
    ///
    /// An edge is kept when its two faces meet at more than `threshold_deg`
    /// degrees, or when it belongs to only one face. Vertex positions are
    /// quantized for the edge keys because flat-shaded meshes duplicate
    /// positions across faces.
    pub fn edges(&self, threshold_deg: f32) -> Geometry {
        assert_eq!(self.topology, Topology::TriangleList);
        let quantize = |p: [f32; 3]| {
            [
                (p[0] * 1e4).round() as i64,
                (p[1] * 1e4).round() as i64,
                (p[2] * 1e4).round() as i64,
            ]
        };
        let threshold_dot = threshold_deg.to_radians().cos();

        struct EdgeSlot {
            normal: Vector3<f32>,
            a: [f32; 3],
            b: [f32; 3],
            shared: bool,
            keep: bool,
        }
        let mut edge_map: HashMap<[[i64; 3]; 2], EdgeSlot> = HashMap::new();

        for tri in self.indices.chunks(3) {
            let p = [
                self.vertices[tri[0] as usize].position,
                self.vertices[tri[1] as usize].position,
                self.vertices[tri[2] as usize].position,
            ];
            let e1 = Vector3::from(p[1]) - Vector3::from(p[0]);
            let e2 = Vector3::from(p[2]) - Vector3::from(p[0]);
            let normal = e1.cross(e2).normalize();
            for i in 0..3 {
                let (a, b) = (p[i], p[(i + 1) % 3]);
                let (ka, kb) = (quantize(a), quantize(b));
                let key = if ka <= kb { [ka, kb] } else { [kb, ka] };
                match edge_map.get_mut(&key) {
                    Some(slot) => {
                        slot.shared = true;
                        slot.keep = slot.normal.dot(normal) <= threshold_dot;
                    }
                    None => {
                        edge_map.insert(
                            key,
                            EdgeSlot {
                                normal,
                                a,
                                b,
                                shared: false,
                                keep: false,
                            },
                        );
                    }
                }
            }
        }

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for slot in edge_map.values() {
            if slot.keep || !slot.shared {
                let base = vertices.len() as u32;
                for p in [slot.a, slot.b] {
                    vertices.push(MeshVertex {
                        position: p,
                        normal: [0.0, 0.0, 0.0],
                        tex_coords: [0.0, 0.0],
                    });
                }
                indices.push(base);
                indices.push(base + 1);
            }
        }
        Geometry {
            vertices,
            indices,
            topology: Topology::LineList,
        }
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounding_box(&self) -> (Vector3<f32>, Vector3<f32>) {
        let mut min = Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = -min;
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
        }
        (min, max)
    }

    /// Width/height/depth of the bounding box.
    pub fn bounding_dimensions(&self) -> Vector3<f32> {
        let (min, max) = self.bounding_box();
        max - min
    }
}
