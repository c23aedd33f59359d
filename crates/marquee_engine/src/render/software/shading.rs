//! Surface shading and colour encoding
//!
//! Metal/rough shading with a GGX specular lobe and Lambert diffuse. Light
//! intensities use the convention where a white light of intensity 1 hitting
//! a white Lambert surface head-on yields exactly white. Lighting happens in
//! linear space; output goes through ACES filmic tone mapping and sRGB
//! encoding.

use crate::foundation::color::Color;
use crate::foundation::math::{constants::PI, Mat3, Vec3};

/// Light arriving at a surface point
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    /// Unit vector from the surface towards the light
    pub to_light: Vec3,
    /// Colour times intensity
    pub radiance: Vec3,
    /// 1 when fully lit, 0 when fully shadowed
    pub visibility: f32,
}

/// Inputs of the standard surface model
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    /// Linear base colour
    pub albedo: Vec3,
    /// Metallic factor
    pub metalness: f32,
    /// Perceptual roughness
    pub roughness: f32,
    /// Unit normal
    pub normal: Vec3,
    /// Unit vector from the surface towards the eye
    pub to_eye: Vec3,
}

/// sRGB transfer to linear
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// Linear to sRGB transfer
pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(0.416_666_66) - 0.055
    }
}

/// Linear version of an sRGB colour
pub fn color_to_linear(color: Color) -> Vec3 {
    color.to_vec3().map(srgb_to_linear)
}

/// ACES filmic curve fit, input and output in linear space
pub fn aces_filmic(color: Vec3) -> Vec3 {
    #[rustfmt::skip]
    let input = Mat3::new(
        0.59719, 0.35458, 0.04823,
        0.07600, 0.90834, 0.01566,
        0.02840, 0.13383, 0.83777,
    );
    #[rustfmt::skip]
    let output = Mat3::new(
         1.60475, -0.53108, -0.07367,
        -0.10208,  1.10813, -0.00605,
        -0.00327, -0.07276,  1.07602,
    );
    let v = input * (color / 0.6);
    let fitted = v.map(|x| {
        let a = x * (x + 0.024_578_6) - 0.000_090_537;
        let b = x * (0.983_729 * x + 0.432_951) + 0.238_081;
        a / b
    });
    (output * fitted).map(|x| x.clamp(0.0, 1.0))
}

/// Tone map and encode a linear radiance to an opaque RGBA8 pixel
pub fn encode_pixel(linear: Vec3) -> [u8; 4] {
    let mapped = aces_filmic(linear);
    let q = |v: f32| (linear_to_srgb(v).clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(mapped.x), q(mapped.y), q(mapped.z), 255]
}

fn f_schlick(f0: Vec3, dot_vh: f32) -> Vec3 {
    let fresnel = ((-5.554_73 * dot_vh - 6.983_16) * dot_vh).exp2();
    f0 * (1.0 - fresnel) + Vec3::repeat(fresnel)
}

fn v_smith_correlated(alpha: f32, dot_nl: f32, dot_nv: f32) -> f32 {
    let a2 = alpha * alpha;
    let gv = dot_nl * (a2 + (1.0 - a2) * dot_nv * dot_nv).sqrt();
    let gl = dot_nv * (a2 + (1.0 - a2) * dot_nl * dot_nl).sqrt();
    0.5 / (gv + gl).max(1e-6)
}

fn d_ggx(alpha: f32, dot_nh: f32) -> f32 {
    let a2 = alpha * alpha;
    let denom = dot_nh * dot_nh * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

/// Outgoing linear radiance of a standard surface
pub fn shade_standard(surface: &Surface, ambient: Vec3, lights: &[LightSample]) -> Vec3 {
    let diffuse = surface.albedo * (1.0 - surface.metalness);
    let f0 = Vec3::repeat(0.04).lerp(&surface.albedo, surface.metalness);
    let roughness = surface.roughness.clamp(0.0525, 1.0);
    let alpha = roughness * roughness;

    let n = surface.normal;
    let v = surface.to_eye;
    let dot_nv = n.dot(&v).clamp(0.0, 1.0);

    let mut radiance = ambient.component_mul(&diffuse);
    for light in lights {
        let l = light.to_light;
        let dot_nl = n.dot(&l).clamp(0.0, 1.0);
        if dot_nl <= 0.0 || light.visibility <= 0.0 {
            continue;
        }
        let h = (l + v).try_normalize(f32::EPSILON).unwrap_or(n);
        let dot_nh = n.dot(&h).clamp(0.0, 1.0);
        let dot_vh = v.dot(&h).clamp(0.0, 1.0);

        let specular = f_schlick(f0, dot_vh) * (v_smith_correlated(alpha, dot_nl, dot_nv) * d_ggx(alpha, dot_nh));
        let brdf = diffuse + specular * PI;
        radiance += light.radiance.component_mul(&brdf) * (dot_nl * light.visibility);
    }
    radiance
}
