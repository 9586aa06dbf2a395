use glam::Vec2;
use roomex_cache::{AssetId, intern_asset};

/// The PBR maps of one surface, as interned URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSet {
    pub base_color: AssetId,
    pub metallic_roughness: AssetId,
    pub normal: AssetId,
    pub occlusion: Option<AssetId>,
}

impl TextureSet {
    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        [self.base_color, self.metallic_roughness, self.normal]
            .into_iter()
            .chain(self.occlusion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub textures: TextureSet,
    /// Texture tiling across the surface.
    pub repeat: Vec2,
    pub metalness: f32,
    pub roughness: f32,
    pub normal_scale: f32,
    /// Drawn when textures are unavailable.
    pub fallback_color: [u8; 4],
}

struct GroundSet {
    dir: &'static str,
    prefix: &'static str,
    color: [u8; 4],
}

const GROUND_SETS: &[GroundSet] = &[GroundSet {
    dir: "wild_grass",
    prefix: "MI_Wild_Grass_pjwce0_4K_",
    color: [92, 128, 64, 255],
}];

const WALL_COLORS: &[[u8; 4]] = &[
    [214, 208, 196, 255],
    [188, 176, 160, 255],
    [170, 178, 184, 255],
    [204, 190, 170, 255],
];

const DOOR_COLOR: [u8; 4] = [124, 84, 52, 255];

pub const GROUND_REPEAT: f32 = 4000.0;
pub const WALL_REPEAT: f32 = 10.0;

/// Resolves texture-set URLs under the asset server root.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    base_url: String,
}

impl AssetCatalog {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> AssetId {
        intern_asset(&format!("{}/{}", self.base_url, path))
    }

    /// Unknown ground variants fall back to the first set; the ground is
    /// shared by every trial and must always exist.
    pub fn ground(&self, variant: usize) -> Material {
        let set = GROUND_SETS.get(variant).unwrap_or_else(|| {
            tracing::warn!(variant, "unknown ground variant, using the default set");
            &GROUND_SETS[0]
        });
        let map = |suffix: &str| self.url(&format!("{}/{}{}.png", set.dir, set.prefix, suffix));
        Material {
            textures: TextureSet {
                base_color: map("BaseColor"),
                metallic_roughness: map("MetallicRoughness"),
                normal: map("Normal"),
                occlusion: Some(map("Occlusion")),
            },
            repeat: Vec2::splat(GROUND_REPEAT),
            metalness: 0.4,
            roughness: 0.5,
            normal_scale: 2.0,
            fallback_color: set.color,
        }
    }

    /// Wall sets live in numbered directories starting at 1.
    pub fn wall(&self, variant: usize) -> Material {
        let dir = variant + 1;
        let map = |suffix: &str| self.url(&format!("wall/{dir}/wall_{suffix}.png"));
        Material {
            textures: TextureSet {
                base_color: map("BaseColor"),
                metallic_roughness: map("MetallicRoughness"),
                normal: map("Normal"),
                occlusion: Some(map("Occlusion")),
            },
            repeat: Vec2::splat(WALL_REPEAT),
            metalness: 0.4,
            roughness: 0.5,
            normal_scale: 2.0,
            fallback_color: WALL_COLORS[variant % WALL_COLORS.len()],
        }
    }

    pub fn door(&self) -> Material {
        Material {
            textures: TextureSet {
                base_color: self.url("door/door.png"),
                metallic_roughness: self.url("door/doorM.png"),
                normal: self.url("door/doorN.png"),
                occlusion: None,
            },
            repeat: Vec2::ONE,
            metalness: 0.4,
            roughness: 0.5,
            normal_scale: 1.0,
            fallback_color: DOOR_COLOR,
        }
    }
}
