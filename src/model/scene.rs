use anyhow::{Context, Result};
use glam::Vec3;
use tracing::info;

use crate::utils::{Mesh, MeshBuffer, Vertex};

/// Vertex color when the OBJ carries no usable material diffuse.
const FALLBACK_COLOR: [f32; 4] = [0.6, 0.6, 0.6, 1.0];

/// The loaded model, one mesh per OBJ group.
#[derive(Debug)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
}

impl Scene {
    /// Load an OBJ file, triangulated onto a single index per vertex.
    pub fn load(path: &str) -> Result<Self> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ignore_lines: true,
                ignore_points: true,
                ..Default::default()
            },
        )
        .with_context(|| format!("loading model {:?}", path))?;

        // A missing or broken MTL just leaves the fallback color in place
        let materials = materials.unwrap_or_default();

        let mut meshes = Vec::with_capacity(models.len());
        for model in &models {
            let mesh = &model.mesh;
            let color = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .and_then(|m| m.diffuse)
                .map(|kd| [kd[0], kd[1], kd[2], 1.0])
                .unwrap_or(FALLBACK_COLOR);

            let vertex_count = mesh.positions.len() / 3;
            let has_normals = mesh.normals.len() == mesh.positions.len();
            let has_uvs = mesh.texcoords.len() == vertex_count * 2;

            let mut vertices = Vec::with_capacity(vertex_count);
            for i in 0..vertex_count {
                let normal = if has_normals {
                    [
                        mesh.normals[i * 3],
                        mesh.normals[i * 3 + 1],
                        mesh.normals[i * 3 + 2],
                    ]
                } else {
                    [0.0, 0.0, 0.0]
                };
                let uv = if has_uvs {
                    [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };
                vertices.push(Vertex {
                    pos: [
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    ],
                    normal,
                    color,
                    uv,
                });
            }

            if !has_normals {
                reconstruct_normals(&mut vertices, &mesh.indices);
            }

            meshes.push(Mesh {
                vertices,
                indices: mesh.indices.clone(),
            });
        }

        let total_vertices: usize = meshes.iter().map(|m| m.vertices.len()).sum();
        let total_triangles: usize = meshes.iter().map(|m| m.indices.len() / 3).sum();
        info!(
            "loaded {:?}: {} meshes, {} vertices, {} triangles",
            path,
            meshes.len(),
            total_vertices,
            total_triangles
        );

        Ok(Scene { meshes })
    }

    pub fn upload(&self, device: &wgpu::Device) -> Vec<MeshBuffer> {
        self.meshes.iter().map(|m| m.upload(device)).collect()
    }
}

/// Accumulate area-weighted face normals into each vertex, then normalize.
fn reconstruct_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let pa = Vec3::from(vertices[a].pos);
        let pb = Vec3::from(vertices[b].pos);
        let pc = Vec3::from(vertices[c].pos);
        let face = (pb - pa).cross(pc - pa);
        for &i in &[a, b, c] {
            vertices[i].normal[0] += face.x;
            vertices[i].normal[1] += face.y;
            vertices[i].normal[2] += face.z;
        }
    }
    for v in vertices.iter_mut() {
        let n = Vec3::from(v.normal);
        v.normal = if n.length_squared() > 0.0 {
            n.normalize().to_array()
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_shipped_model() {
        let scene = Scene::load("assets/rocket.obj").unwrap();
        assert!(!scene.meshes.is_empty());
        for mesh in &scene.meshes {
            assert!(!mesh.is_empty());
            assert_eq!(mesh.indices.len() % 3, 0);
            let count = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < count));
            for v in &mesh.vertices {
                let len = Vec3::from(v.normal).length();
                assert!((len - 1.0).abs() < 1e-3, "normal length {}", len);
            }
        }
    }

    #[test]
    fn test_load_missing_model_is_an_error() {
        let err = Scene::load("assets/no-such-model.obj").unwrap_err();
        assert!(format!("{:#}", err).contains("no-such-model.obj"));
    }

    #[test]
    fn test_reconstruct_normals_single_triangle() {
        let mut vertices = vec![
            Vertex {
                pos: [0.0, 0.0, 0.0],
                normal: [0.0; 3],
                color: FALLBACK_COLOR,
                uv: [0.0, 0.0],
            },
            Vertex {
                pos: [1.0, 0.0, 0.0],
                normal: [0.0; 3],
                color: FALLBACK_COLOR,
                uv: [0.0, 0.0],
            },
            Vertex {
                pos: [0.0, 1.0, 0.0],
                normal: [0.0; 3],
                color: FALLBACK_COLOR,
                uv: [0.0, 0.0],
            },
        ];
        reconstruct_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert!((Vec3::from(v.normal) - Vec3::Z).length() < 1e-6);
        }
    }
}
