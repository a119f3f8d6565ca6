//! Uniform hash grid for radius queries over a fixed point set

use std::collections::HashMap;

use glam::Vec3;

/// Buckets point indices by cell so radius queries only visit nearby cells.
///
/// Cells are as large as the query radius, so a query touches the 27 cells
/// around the query point.
pub struct PointGrid<'a> {
    points: &'a [Vec3],
    cell_size: f32,
    cells: HashMap<[i32; 3], Vec<usize>>,
}

impl<'a> PointGrid<'a> {
    /// Build a grid for radius queries of at most `radius`
    pub fn new(points: &'a [Vec3], radius: f32) -> Self {
        let cell_size = radius.max(f32::EPSILON);
        let mut cells: HashMap<[i32; 3], Vec<usize>> = HashMap::new();
        for (i, &p) in points.iter().enumerate() {
            cells.entry(cell_of(p, cell_size)).or_default().push(i);
        }
        Self {
            points,
            cell_size,
            cells,
        }
    }

    /// Indices of all points within `radius` of `center`, inclusive
    pub fn within(&self, center: Vec3, radius: f32) -> Vec<usize> {
        let mut found = Vec::new();
        self.for_each_within(center, radius, |i| found.push(i));
        found
    }

    /// Sum and count of the points within `radius` of `center`
    pub fn sum_within(&self, center: Vec3, radius: f32) -> (Vec3, usize) {
        let mut sum = Vec3::ZERO;
        let mut count = 0;
        self.for_each_within(center, radius, |i| {
            sum += self.points[i];
            count += 1;
        });
        (sum, count)
    }

    fn for_each_within(&self, center: Vec3, radius: f32, mut f: impl FnMut(usize)) {
        let r2 = radius * radius;
        let min = cell_of(center - Vec3::splat(radius), self.cell_size);
        let max = cell_of(center + Vec3::splat(radius), self.cell_size);
        for x in min[0]..=max[0] {
            for y in min[1]..=max[1] {
                for z in min[2]..=max[2] {
                    let Some(bucket) = self.cells.get(&[x, y, z]) else {
                        continue;
                    };
                    for &i in bucket {
                        if self.points[i].distance_squared(center) <= r2 {
                            f(i);
                        }
                    }
                }
            }
        }
    }
}

fn cell_of(p: Vec3, cell_size: f32) -> [i32; 3] {
    [
        (p.x / cell_size).floor() as i32,
        (p.y / cell_size).floor() as i32,
        (p.z / cell_size).floor() as i32,
    ]
}
