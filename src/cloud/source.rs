//! Point sources: where tile points come from

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use las::Reader;

use crate::core::Result;
use super::point::RawPoint;
use super::transform::WorldTransform;

/// Yields classified points already expressed in world-grid coordinates.
pub trait PointSource {
    fn read_points(&mut self) -> Result<Vec<RawPoint>>;
}

/// Reads `.las`/`.laz` files, keeping only the requested classes.
pub struct LasPointSource {
    paths: Vec<PathBuf>,
    transform: WorldTransform,
    classes: Vec<u8>,
}

impl LasPointSource {
    pub fn new(paths: Vec<PathBuf>, transform: WorldTransform, classes: Vec<u8>) -> Self {
        Self {
            paths,
            transform,
            classes,
        }
    }

    /// Expand directories into the LAS/LAZ files they contain (sorted, non-recursive)
    pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in inputs {
            if input.is_dir() {
                let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|path| is_point_cloud_file(path))
                    .collect();
                found.sort();
                files.extend(found);
            } else {
                files.push(input.clone());
            }
        }
        Ok(files)
    }

    fn read_file(&self, path: &Path, seen: &mut HashSet<(i32, i32, i32, u8)>, out: &mut Vec<RawPoint>) -> Result<()> {
        let mut reader = Reader::from_path(path)?;
        log::info!(
            "Reading {} ({} points)",
            path.display(),
            reader.header().number_of_points()
        );

        let before = out.len();
        for point_result in reader.points() {
            let point = point_result?;
            let classification = u8::from(point.classification);
            if !self.classes.contains(&classification) {
                continue;
            }

            let (x, height, z) = self.transform.apply(point.x, point.y, point.z);
            if self.transform.deduplicates(classification) {
                let key = (x as i32, height as i32, z as i32, classification);
                if !seen.insert(key) {
                    continue;
                }
            }

            out.push(RawPoint {
                x,
                z,
                height,
                classification,
                color: point
                    .color
                    .map(|c| [(c.red >> 8) as u8, (c.green >> 8) as u8, (c.blue >> 8) as u8]),
            });
        }

        log::debug!("Kept {} points from {}", out.len() - before, path.display());
        Ok(())
    }
}

impl PointSource for LasPointSource {
    fn read_points(&mut self) -> Result<Vec<RawPoint>> {
        let mut points = Vec::new();
        let mut seen = HashSet::new();
        let mut last_error = None;
        let mut read = 0;
        for path in &self.paths {
            match self.read_file(path, &mut seen, &mut points) {
                Ok(()) => read += 1,
                Err(err) => {
                    log::warn!("Skipping {}: {}", path.display(), err);
                    last_error = Some(err);
                }
            }
        }
        // Only fail when nothing could be read at all
        match last_error {
            Some(err) if read == 0 => Err(err),
            _ => Ok(points),
        }
    }
}

fn is_point_cloud_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("las") || e.eq_ignore_ascii_case("laz"))
        .unwrap_or(false)
}
