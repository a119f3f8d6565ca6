//! Integer line rasterization

use glam::IVec3;

/// Rasterize the segment `start → end` into voxel cells (both endpoints included).
///
/// Classic 3-D Bresenham: the axis with the largest delta drives the walk,
/// the other two axes step when their error terms go non-negative.
pub fn bresenham_3d(start: IVec3, end: IVec3) -> Vec<IVec3> {
    let delta = (end - start).abs();
    let step = IVec3::new(
        if end.x > start.x { 1 } else { -1 },
        if end.y > start.y { 1 } else { -1 },
        if end.z > start.z { 1 } else { -1 },
    );

    // Permute so that index 0 is the driving axis
    let axes: [usize; 3] = if delta.x >= delta.y && delta.x >= delta.z {
        [0, 1, 2]
    } else if delta.y >= delta.x && delta.y >= delta.z {
        [1, 0, 2]
    } else {
        [2, 1, 0]
    };
    let [drive, a, b] = axes;

    let mut cells = Vec::with_capacity(delta[drive] as usize + 1);
    let mut current = start;
    cells.push(current);

    let mut p1 = 2 * delta[a] - delta[drive];
    let mut p2 = 2 * delta[b] - delta[drive];
    while current[drive] != end[drive] {
        current[drive] += step[drive];
        if p1 >= 0 {
            current[a] += step[a];
            p1 -= 2 * delta[drive];
        }
        if p2 >= 0 {
            current[b] += step[b];
            p2 -= 2 * delta[drive];
        }
        p1 += 2 * delta[a];
        p2 += 2 * delta[b];
        cells.push(current);
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cell() {
        let cells = bresenham_3d(IVec3::new(4, 5, 6), IVec3::new(4, 5, 6));
        assert_eq!(cells, vec![IVec3::new(4, 5, 6)]);
    }

    #[test]
    fn test_axis_aligned() {
        let cells = bresenham_3d(IVec3::new(0, 0, 0), IVec3::new(0, 4, 0));
        assert_eq!(cells.len(), 5);
        assert!(cells.iter().all(|c| c.x == 0 && c.z == 0));
        assert_eq!(cells.last(), Some(&IVec3::new(0, 4, 0)));
    }

    #[test]
    fn test_diagonal_reaches_end() {
        let start = IVec3::new(-1, 1, 1);
        let end = IVec3::new(5, 3, -1);
        let cells = bresenham_3d(start, end);
        assert_eq!(cells.first(), Some(&start));
        assert_eq!(cells.last(), Some(&end));
        // One cell per step along the driving (x) axis
        assert_eq!(cells.len(), 7);
    }

    #[test]
    fn test_cells_are_connected() {
        let cells = bresenham_3d(IVec3::new(2, 10, 2), IVec3::new(6, 13, 0));
        for pair in cells.windows(2) {
            let d = (pair[1] - pair[0]).abs();
            assert!(d.max_element() <= 1);
        }
    }

    #[test]
    fn test_z_driving_axis() {
        let cells = bresenham_3d(IVec3::new(0, 0, 0), IVec3::new(1, 2, -6));
        assert_eq!(cells.len(), 7);
        assert_eq!(cells.last(), Some(&IVec3::new(1, 2, -6)));
    }
}
