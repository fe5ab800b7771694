//! Random sampling helpers.
//!
//! Every function draws from an explicit generator so each render thread
//! (and each pixel) owns its own random stream.

use ivar_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let phi = 2.0 * PI * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Cosine-weighted direction on the hemisphere around +Z.
pub fn cosine_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let phi = 2.0 * PI * gen_f32(rng);
    let r = r1.sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - r1).max(0.0).sqrt())
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
pub fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

/// Sample a random point in the unit disk.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform barycentric pair `(alpha, beta)` with `alpha + beta <= 1`.
pub fn triangle_coords(rng: &mut dyn RngCore) -> (f32, f32) {
    let alpha = gen_f32(rng);
    let beta = gen_f32(rng);
    if alpha + beta > 1.0 {
        (1.0 - alpha, 1.0 - beta)
    } else {
        (alpha, beta)
    }
}

/// Normalized cumulative distribution over `weights`.
///
/// Negative (and NaN) weights count as zero. Returns the CDF
/// (non-decreasing, last entry exactly 1.0) and the un-normalized total.
/// When the total is not positive every entry is weighted equally.
pub fn build_cdf(weights: &[f32]) -> (Vec<f32>, f32) {
    if weights.is_empty() {
        return (Vec::new(), 0.0);
    }
    let weights: Vec<f32> = weights.iter().map(|w| w.max(0.0)).collect();
    let total: f32 = weights.iter().sum();

    let n = weights.len() as f32;
    let mut running = 0.0;
    let mut cdf: Vec<f32> = weights
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if total > 0.0 && total.is_finite() {
                running += w;
                running / total
            } else {
                (i + 1) as f32 / n
            }
        })
        .collect();

    if let Some(last) = cdf.last_mut() {
        *last = 1.0;
    }
    (cdf, total)
}

/// Index of the first CDF entry strictly greater than `u`.
///
/// `cdf` must be non-empty; `u` in [0, 1).
pub fn sample_cdf(cdf: &[f32], u: f32) -> usize {
    cdf.partition_point(|&c| c <= u).min(cdf.len().saturating_sub(1))
}

/// Probability of index `i` under `cdf`.
pub fn cdf_probability(cdf: &[f32], i: usize) -> f32 {
    match i {
        0 => cdf[0],
        _ => cdf[i] - cdf[i - 1],
    }
}

/// Seed for the random stream of one pixel.
///
/// SplitMix64 finalizer over the render seed and the pixel index, so
/// neighbouring pixels get uncorrelated streams.
pub fn pixel_seed(seed: u64, pixel_index: u64) -> u64 {
    let mut z = seed
        .wrapping_add(pixel_index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unit_vectors_are_unit() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cosine_hemisphere_points_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mean_z = 0.0;
        let n = 20_000;
        for _ in 0..n {
            let v = cosine_hemisphere(&mut rng);
            assert!(v.z >= 0.0);
            assert!((v.length() - 1.0).abs() < 1e-4);
            mean_z += v.z;
        }
        // E[cos] under a cosine-weighted hemisphere is 2/3
        mean_z /= n as f32;
        assert!((mean_z - 2.0 / 3.0).abs() < 0.01, "mean_z={}", mean_z);
    }

    #[test]
    fn test_triangle_coords_inside() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let (a, b) = triangle_coords(&mut rng);
            assert!(a >= 0.0 && b >= 0.0 && a + b <= 1.0);
        }
    }

    #[test]
    fn test_disk_samples_inside() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let p = random_in_unit_disk(&mut rng);
            assert!(p.length_squared() < 1.0);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_build_cdf_by_weight() {
        let (cdf, total) = build_cdf(&[1.0, 3.0]);

        assert_eq!(total, 4.0);
        assert_eq!(cdf, vec![0.25, 1.0]);
        assert_eq!(sample_cdf(&cdf, 0.0), 0);
        assert_eq!(sample_cdf(&cdf, 0.2499), 0);
        assert_eq!(sample_cdf(&cdf, 0.25), 1);
        assert_eq!(sample_cdf(&cdf, 0.9999), 1);
        assert_eq!(cdf_probability(&cdf, 0), 0.25);
        assert_eq!(cdf_probability(&cdf, 1), 0.75);
    }

    #[test]
    fn test_build_cdf_zero_weights_is_uniform() {
        let (cdf, total) = build_cdf(&[0.0, 0.0, 0.0, 0.0]);

        assert_eq!(total, 0.0);
        assert_eq!(cdf, vec![0.25, 0.5, 0.75, 1.0]);
        assert!(build_cdf(&[]).0.is_empty());
    }

    #[test]
    fn test_build_cdf_ignores_negative_weights() {
        let (cdf, total) = build_cdf(&[2.0, -1.0, 2.0]);

        assert_eq!(total, 4.0);
        assert_eq!(cdf, vec![0.5, 0.5, 1.0]);
        assert_eq!(cdf_probability(&cdf, 1), 0.0);

        let (cdf, total) = build_cdf(&[-1.0, -3.0]);
        assert_eq!(total, 0.0);
        assert_eq!(cdf, vec![0.5, 1.0]);
    }

    #[test]
    fn test_sample_cdf_never_overflows() {
        let cdf = vec![0.5, 1.0];
        assert_eq!(sample_cdf(&cdf, 1.0), 1);
    }

    #[test]
    fn test_pixel_seed_spreads() {
        let a = pixel_seed(42, 0);
        let b = pixel_seed(42, 1);
        let c = pixel_seed(43, 0);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, pixel_seed(42, 0));
    }
}
