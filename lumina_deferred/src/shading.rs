//! Fixed shading math shared by every backend
//!
//! Pure functions with no state. Programs on any backend must reproduce
//! these results within floating-point tolerance.

use glam::{Mat3, Vec3, Vec4};

/// sRGB to AP1-equivalent input matrix of the ACES fit (column-major)
pub const ACES_INPUT_MATRIX: Mat3 = Mat3::from_cols(
    Vec3::new(0.59719, 0.07600, 0.02840),
    Vec3::new(0.35458, 0.90834, 0.13383),
    Vec3::new(0.04823, 0.01566, 0.83777),
);

/// Output matrix of the ACES fit (column-major)
pub const ACES_OUTPUT_MATRIX: Mat3 = Mat3::from_cols(
    Vec3::new(1.60475, -0.10208, -0.00327),
    Vec3::new(-0.53108, 1.10813, -0.07276),
    Vec3::new(-0.07367, -0.00605, 1.07602),
);

/// Display gamma applied after tonemapping
pub const DISPLAY_GAMMA: f32 = 2.2;

/// Magnitude the fit input is saturated to. Keeps `x * x` finite in f32.
const FIT_INPUT_LIMIT: f32 = 1.0e18;

// ===== NORMALS =====

/// Map a unit normal from [-1, 1] to [0, 1]
pub fn encode_normal(normal: Vec3) -> Vec3 {
    (normal + Vec3::ONE) * 0.5
}

/// Map an encoded sample back to a unit normal
///
/// A sample decoding to the zero vector yields zero instead of NaN.
pub fn decode_normal(sample: Vec3) -> Vec3 {
    (sample * 2.0 - Vec3::ONE).normalize_or_zero()
}

// ===== LIGHTING =====

/// Lambert term `clamp(dot(N, -normalize(L)), 0, 1)`
///
/// `light_direction` points from the light towards the surface.
pub fn directional_term(normal: Vec3, light_direction: Vec3) -> f32 {
    normal
        .dot(-light_direction.normalize_or_zero())
        .clamp(0.0, 1.0)
}

/// Radiance of one directional light on a surface
pub fn directional_light(normal: Vec3, light_direction: Vec3, color: Vec3) -> Vec3 {
    color * directional_term(normal, light_direction)
}

// ===== COMPOSE / TONEMAP =====

/// `diffuse * light`, unclamped, with opaque alpha
pub fn compose(diffuse: Vec4, light: Vec4) -> Vec4 {
    (diffuse.truncate() * light.truncate()).extend(1.0)
}

fn rrt_odt_fit(v: Vec3) -> Vec3 {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.432951) + 0.238081;
    a / b
}

/// ACES fitted curve, clamped to [0, 1]
///
/// NaN channels are treated as zero; infinities saturate.
pub fn aces_fitted(color: Vec3) -> Vec3 {
    let v = ACES_INPUT_MATRIX * color;
    let v = Vec3::select(v.is_nan_mask(), Vec3::ZERO, v)
        .clamp(Vec3::splat(-FIT_INPUT_LIMIT), Vec3::splat(FIT_INPUT_LIMIT));
    let v = ACES_OUTPUT_MATRIX * rrt_odt_fit(v);
    v.clamp(Vec3::ZERO, Vec3::ONE)
}

/// `pow(color, 1 / 2.2)`; negative channels are clamped to zero first
pub fn gamma_correct(color: Vec3) -> Vec3 {
    color.max(Vec3::ZERO).powf(1.0 / DISPLAY_GAMMA)
}

/// Full display transform: ACES fit then gamma
pub fn tonemap(color: Vec3) -> Vec3 {
    gamma_correct(aces_fitted(color))
}

#[cfg(test)]
#[path = "shading_tests.rs"]
mod tests;
