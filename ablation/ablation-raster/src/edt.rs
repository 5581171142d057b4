//! Exact squared Euclidean distance transform on a dense box.
//!
//! Separable lower-envelope algorithm (Felzenszwalb & Huttenlocher): one pass
//! of 1D parabola envelopes per axis, each pass weighted by that axis'
//! physical spacing, so anisotropic grids get true physical distances.

/// Squared distance assigned to voxels with no feature in reach.
const FAR: f64 = f64::INFINITY;

/// Scratch buffers for the 1D transform, reused across lines.
struct Envelope {
    line: Vec<f64>,
    out: Vec<f64>,
    vertices: Vec<usize>,
    boundaries: Vec<f64>,
}

impl Envelope {
    fn new(len: usize) -> Self {
        Self {
            line: vec![0.0; len],
            out: vec![0.0; len],
            vertices: vec![0; len],
            boundaries: vec![0.0; len + 1],
        }
    }

    /// Transforms `self.line[..n]` into `self.out[..n]` with sample spacing `step`.
    #[allow(clippy::cast_precision_loss)]
    fn run(&mut self, n: usize, step: f64) {
        let f = &self.line[..n];
        let pos = |i: usize| i as f64 * step;
        let mut count = 0usize;

        for q in 0..n {
            if !f[q].is_finite() {
                continue;
            }
            let fq = f[q] + pos(q) * pos(q);
            loop {
                if count == 0 {
                    self.vertices[0] = q;
                    self.boundaries[0] = f64::NEG_INFINITY;
                    count = 1;
                    break;
                }
                let p = self.vertices[count - 1];
                let fp = f[p] + pos(p) * pos(p);
                let s = (fq - fp) / (2.0 * (pos(q) - pos(p)));
                if s <= self.boundaries[count - 1] {
                    count -= 1;
                    continue;
                }
                self.vertices[count] = q;
                self.boundaries[count] = s;
                count += 1;
                break;
            }
        }

        let out = &mut self.out[..n];
        if count == 0 {
            out.fill(FAR);
            return;
        }
        self.boundaries[count] = f64::INFINITY;

        let mut k = 0;
        for (p, slot) in out.iter_mut().enumerate() {
            let x = pos(p);
            while self.boundaries[k + 1] < x {
                k += 1;
            }
            let v = self.vertices[k];
            let dx = x - pos(v);
            *slot = dx * dx + f[v];
        }
    }
}

/// Computes squared physical distances to the nearest feature voxel.
///
/// `features` is an x-fastest boolean box of size `extent`; the result has the
/// same layout. Voxels with no feature anywhere in the box are infinite.
pub(crate) fn squared_distances(features: &[bool], extent: [usize; 3], spacing: [f64; 3]) -> Vec<f64> {
    let [nx, ny, nz] = extent;
    debug_assert_eq!(features.len(), nx * ny * nz);

    let mut grid: Vec<f64> = features
        .iter()
        .map(|&f| if f { 0.0 } else { FAR })
        .collect();
    let mut env = Envelope::new(nx.max(ny).max(nz));

    let strides = [1, nx, nx * ny];
    for axis in 0..3 {
        let n = extent[axis];
        if n <= 1 {
            continue;
        }
        let stride = strides[axis];
        // The two axes orthogonal to `axis`, as (count, stride) pairs
        let others: Vec<(usize, usize)> = (0..3)
            .filter(|&a| a != axis)
            .map(|a| (extent[a], strides[a]))
            .collect();
        let (outer_n, outer_stride) = others[1];
        let (inner_n, inner_stride) = others[0];

        for o in 0..outer_n {
            for i in 0..inner_n {
                let base = o * outer_stride + i * inner_stride;
                for (j, value) in env.line[..n].iter_mut().enumerate() {
                    *value = grid[base + j * stride];
                }
                env.run(n, spacing[axis]);
                for (j, &value) in env.out[..n].iter().enumerate() {
                    grid[base + j * stride] = value;
                }
            }
        }
    }

    grid
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn brute_force(features: &[bool], extent: [usize; 3], spacing: [f64; 3]) -> Vec<f64> {
        let [nx, ny, _] = extent;
        let coord = |i: usize| [i % nx, (i / nx) % ny, i / (nx * ny)];
        let seeds: Vec<_> = (0..features.len()).filter(|&i| features[i]).collect();
        (0..features.len())
            .map(|i| {
                let a = coord(i);
                seeds
                    .iter()
                    .map(|&j| {
                        let b = coord(j);
                        (0..3)
                            .map(|k| {
                                #[allow(clippy::cast_precision_loss)]
                                let d = (a[k] as f64 - b[k] as f64) * spacing[k];
                                d * d
                            })
                            .sum::<f64>()
                    })
                    .fold(FAR, f64::min)
            })
            .collect()
    }

    #[test]
    fn test_single_seed_1d() {
        let mut features = vec![false; 7];
        features[2] = true;
        let d = squared_distances(&features, [7, 1, 1], [1.0; 3]);
        assert_eq!(d, vec![4.0, 1.0, 0.0, 1.0, 4.0, 9.0, 16.0]);
    }

    #[test]
    fn test_no_seed_is_infinite() {
        let d = squared_distances(&[false; 8], [2, 2, 2], [1.0; 3]);
        assert!(d.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn test_anisotropic_single_seed() {
        let extent = [5, 5, 5];
        let mut features = vec![false; 125];
        features[2 + 5 * (2 + 5 * 2)] = true;
        let d = squared_distances(&features, extent, [0.5, 1.0, 2.0]);
        // (4, 2, 2): two voxels along x at 0.5mm
        assert_relative_eq!(d[4 + 5 * (2 + 5 * 2)], 1.0);
        // (2, 2, 4): two voxels along z at 2mm
        assert_relative_eq!(d[2 + 5 * (2 + 5 * 4)], 16.0);
        // (0, 0, 0): 1^2 + 2^2 + 4^2
        assert_relative_eq!(d[0], 21.0);
    }

    #[test]
    fn test_matches_brute_force() {
        let extent = [6, 5, 4];
        let len = 6 * 5 * 4;
        let features: Vec<bool> = (0..len).map(|i| i % 17 == 3 || i == 58).collect();
        let spacing = [0.7, 1.3, 2.1];
        let fast = squared_distances(&features, extent, spacing);
        let slow = brute_force(&features, extent, spacing);
        for (a, b) in fast.iter().zip(&slow) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }
}
