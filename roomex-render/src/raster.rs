use glam::{Mat4, Vec2, Vec3, Vec4};
use roomex_scene::{Light, SceneGraph, SceneNode, Shape, SurfaceKind};

const AMBIENT_WEIGHT: f32 = 0.45;
const POINT_WEIGHT: f32 = 0.35;
const POINT_FALLOFF: f32 = 0.05;
const MIN_SHADE: f32 = 0.15;

/// One projected, shaded polygon ready to fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub points: Vec<Vec2>,
    pub color: [u8; 4],
    /// Squared distance from the eye to the face centroid.
    pub depth: f32,
    /// Drawn in ascending layer order, then back to front.
    pub layer: u8,
}

// corner bits: 1 = +x, 2 = +y, 4 = +z
const CUBOID_FACES: [([usize; 4], Vec3); 6] = [
    ([0, 2, 6, 4], Vec3::NEG_X),
    ([1, 3, 7, 5], Vec3::X),
    ([0, 1, 5, 4], Vec3::NEG_Y),
    ([2, 3, 7, 6], Vec3::Y),
    ([0, 1, 3, 2], Vec3::NEG_Z),
    ([4, 5, 7, 6], Vec3::Z),
];

/// Projects the scene into screen space, culling back faces and anything
/// behind the near plane, and returns faces in paint order.
pub fn project_scene(graph: &SceneGraph, eye: Vec3, view_proj: Mat4, width: u32, height: u32) -> Vec<Face> {
    let viewport = Vec2::new(width as f32, height as f32);
    let mut faces = Vec::with_capacity(graph.nodes.len() * 3);
    for node in &graph.nodes {
        for (corners, normal) in node_polygons(node) {
            let centroid = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
            if normal.dot(eye - centroid) <= 0.0 {
                continue;
            }
            let Some(points) = project_polygon(&corners, view_proj, viewport) else {
                continue;
            };
            let factor = shade(graph, centroid, normal);
            faces.push(Face {
                points,
                color: shade_color(node.material.fallback_color, factor),
                depth: eye.distance_squared(centroid),
                layer: if node.kind == SurfaceKind::Ground { 0 } else { 1 },
            });
        }
    }
    faces.sort_by(|a, b| a.layer.cmp(&b.layer).then(b.depth.total_cmp(&a.depth)));
    faces
}

/// World-space outlines and outward normals of a node's visible surfaces.
pub fn node_polygons(node: &SceneNode) -> Vec<(Vec<Vec3>, Vec3)> {
    let world = node.world_matrix();
    let to_world_normal = |n: Vec3| world.transform_vector3(n).normalize_or_zero();
    match node.shape {
        Shape::Cuboid { size } => {
            let half = size * 0.5;
            let corners: [Vec3; 8] = std::array::from_fn(|i| {
                let sign = Vec3::new(
                    if i & 1 != 0 { 1.0 } else { -1.0 },
                    if i & 2 != 0 { 1.0 } else { -1.0 },
                    if i & 4 != 0 { 1.0 } else { -1.0 },
                );
                world.transform_point3(sign * half)
            });
            CUBOID_FACES
                .iter()
                .map(|(idx, n)| (idx.iter().map(|&i| corners[i]).collect(), to_world_normal(*n)))
                .collect()
        }
        Shape::Plane { size } => {
            let h = size * 0.5;
            let corners = [
                Vec3::new(-h.x, -h.y, 0.0),
                Vec3::new(h.x, -h.y, 0.0),
                Vec3::new(h.x, h.y, 0.0),
                Vec3::new(-h.x, h.y, 0.0),
            ]
            .map(|c| world.transform_point3(c));
            vec![(corners.to_vec(), to_world_normal(Vec3::Z))]
        }
    }
}

/// Clip-space near-plane clipping, then perspective divide and viewport
/// mapping. `None` when nothing is left in front of the camera.
pub fn project_polygon(corners: &[Vec3], view_proj: Mat4, viewport: Vec2) -> Option<Vec<Vec2>> {
    let clip: Vec<Vec4> = corners.iter().map(|c| view_proj * c.extend(1.0)).collect();
    let clipped = clip_near(&clip);
    if clipped.len() < 3 {
        return None;
    }
    let mut points = Vec::with_capacity(clipped.len());
    for v in clipped {
        if v.w <= f32::EPSILON {
            return None;
        }
        let ndc = v.truncate() / v.w;
        points.push(Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.x,
            (0.5 - ndc.y * 0.5) * viewport.y,
        ));
    }
    Some(points)
}

/// Sutherland-Hodgman against `z >= 0`, the near plane of a right-handed
/// zero-to-one depth projection.
pub fn clip_near(poly: &[Vec4]) -> Vec<Vec4> {
    let mut out = Vec::with_capacity(poly.len() + 2);
    for (i, &a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        let (a_in, b_in) = (a.z >= 0.0, b.z >= 0.0);
        if a_in {
            out.push(a);
        }
        if a_in != b_in {
            let t = a.z / (a.z - b.z);
            out.push(a + (b - a) * t);
        }
    }
    out
}

/// Flat Lambert shading from the scene lights, in `[MIN_SHADE, 1]`.
pub fn shade(graph: &SceneGraph, point: Vec3, normal: Vec3) -> f32 {
    let mut light = 0.0;
    for l in &graph.lights {
        match *l {
            Light::Ambient { intensity } => light += AMBIENT_WEIGHT * intensity,
            Light::Point { position, intensity } => {
                let to_light = position - point;
                let dist_sq = to_light.length_squared();
                let lambert = normal.dot(to_light.normalize_or_zero()).max(0.0);
                light += POINT_WEIGHT * intensity * lambert / (1.0 + POINT_FALLOFF * dist_sq);
            }
        }
    }
    light.clamp(MIN_SHADE, 1.0)
}

fn shade_color(color: [u8; 4], shade: f32) -> [u8; 4] {
    let s = |c: u8| (c as f32 * shade).round().clamp(0.0, 255.0) as u8;
    [s(color[0]), s(color[1]), s(color[2]), color[3]]
}
