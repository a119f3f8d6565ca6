//! Top-down canopy preview images

use std::path::Path;

use glam::IVec2;
use image::{Rgb, RgbImage};

use crate::core::Result;
use crate::voxel::{VoxelStore, VoxelWorld, CHUNK_SIZE};

/// Horizontal column range, `min` inclusive and `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnBounds {
    pub min: IVec2,
    pub max: IVec2,
}

impl ColumnBounds {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> IVec2 {
        (self.max - self.min).max(IVec2::ZERO)
    }
}

/// Column range covered by the world's loaded chunks
pub fn world_extent(world: &VoxelWorld) -> Option<ColumnBounds> {
    let mut coords = world.loaded_coords();
    let first = coords.next()?;
    let (mut min, mut max) = (IVec2::new(first.x, first.z), IVec2::new(first.x, first.z));
    for c in coords {
        min = min.min(IVec2::new(c.x, c.z));
        max = max.max(IVec2::new(c.x, c.z));
    }
    Some(ColumnBounds::new(min * CHUNK_SIZE, (max + IVec2::ONE) * CHUNK_SIZE))
}

/// One pixel per column, coloured by the topmost material and darkened with depth.
/// Pixel `(0, 0)` is column `bounds.min`; image x follows world x, image y follows world z.
pub fn render_canopy(store: &impl VoxelStore, bounds: ColumnBounds) -> Result<RgbImage> {
    let size = bounds.size();
    let (min_y, max_y) = store.height_bounds();
    let span = (max_y - min_y).max(1) as f32;
    let mut image = RgbImage::new(size.x as u32, size.y as u32);

    for px in 0..size.x {
        for pz in 0..size.y {
            let x = bounds.min.x + px;
            let z = bounds.min.y + pz;
            let column = store.column(x, z)?;
            let Some(top) = column.top_solid(&[]) else {
                continue;
            };
            let (r, g, b) = column.get(top).color();
            let shade = 0.35 + 0.65 * (top - min_y) as f32 / span;
            let scale = |c: u8| (c as f32 * shade).round().clamp(0.0, 255.0) as u8;
            image.put_pixel(px as u32, pz as u32, Rgb([scale(r), scale(g), scale(b)]));
        }
    }
    Ok(image)
}

/// Render the whole loaded world and write it as PNG
pub fn save_canopy(world: &VoxelWorld, path: &Path) -> Result<bool> {
    let Some(bounds) = world_extent(world) else {
        log::warn!("World is empty, no preview written");
        return Ok(false);
    };
    let image = render_canopy(world, bounds)?;
    image.save(path)?;
    log::info!(
        "Wrote {}x{} preview to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{Material, WorldBounds};
    use tempfile::TempDir;

    #[test]
    fn test_extent() {
        let mut world = VoxelWorld::new(WorldBounds::new(0, 16));
        assert!(world_extent(&world).is_none());
        world.set_material(-1, 0, 20, Material::Stone).unwrap();
        world.set_material(40, 0, 3, Material::Stone).unwrap();
        let extent = world_extent(&world).unwrap();
        assert_eq!(extent.min, IVec2::new(-16, 0));
        assert_eq!(extent.max, IVec2::new(48, 32));
    }

    #[test]
    fn test_colours_top_material() {
        let mut world = VoxelWorld::new(WorldBounds::new(0, 16));
        world.set_material(0, 2, 0, Material::GrassBlock).unwrap();
        world.set_material(0, 15, 1, Material::Leaves).unwrap();
        world.set_material(0, 10, 1, Material::Trunk).unwrap();

        let bounds = ColumnBounds::new(IVec2::ZERO, IVec2::new(2, 2));
        let image = render_canopy(&world, bounds).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));

        let expected = |material: Material, top: i32| {
            let shade = 0.35 + 0.65 * top as f32 / 16.0;
            let (r, g, b) = material.color();
            let scale = |c: u8| (c as f32 * shade).round() as u8;
            Rgb([scale(r), scale(g), scale(b)])
        };
        assert_eq!(image.get_pixel(0, 0), &expected(Material::GrassBlock, 2));
        assert_eq!(image.get_pixel(0, 1), &expected(Material::Leaves, 15));
    }

    #[test]
    fn test_save_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("canopy.png");
        let mut world = VoxelWorld::new(WorldBounds::new(0, 16));
        assert!(!save_canopy(&world, &path).unwrap());

        world.set_material(3, 5, 3, Material::Leaves).unwrap();
        assert!(save_canopy(&world, &path).unwrap());
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (16, 16));
    }
}
