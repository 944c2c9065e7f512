//! 8-bit CIE L*a*b* conversion for RGB frames (D65 white point, sRGB
//! transfer curve).
//!
//! Encoding follows the usual 8-bit convention: `L * 255 / 100`, and `a`,
//! `b` offset by 128.

const WHITE_X: f64 = 0.950456;
const WHITE_Z: f64 = 1.088754;
const EPSILON: f64 = 0.008856;
const KAPPA: f64 = 903.3;

/// Planar L*a*b* image, one byte per sample.
#[derive(Clone, Debug, PartialEq)]
pub struct LabPlanes {
    pub l: Vec<u8>,
    pub a: Vec<u8>,
    pub b: Vec<u8>,
}

/// Converts interleaved RGB bytes to planar 8-bit L*a*b*.
pub fn rgb_to_lab(rgb: &[u8]) -> LabPlanes {
    let n = rgb.len() / 3;
    let mut planes = LabPlanes {
        l: Vec::with_capacity(n),
        a: Vec::with_capacity(n),
        b: Vec::with_capacity(n),
    };
    for px in rgb.chunks_exact(3) {
        let [l, a, b] = pixel_to_lab(px[0], px[1], px[2]);
        planes.l.push(l);
        planes.a.push(a);
        planes.b.push(b);
    }
    planes
}

/// Writes planar 8-bit L*a*b* back into interleaved RGB bytes.
pub fn lab_to_rgb(planes: &LabPlanes, rgb: &mut [u8]) {
    for (i, px) in rgb.chunks_exact_mut(3).enumerate() {
        let [r, g, b] = pixel_to_rgb(planes.l[i], planes.a[i], planes.b[i]);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}

fn pixel_to_lab(r: u8, g: u8, b: u8) -> [u8; 3] {
    let r = srgb_to_linear(r);
    let g = srgb_to_linear(g);
    let b = srgb_to_linear(b);

    let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / WHITE_X;
    let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
    let z = (0.019334 * r + 0.119193 * g + 0.950227 * b) / WHITE_Z;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    let l = if y > EPSILON {
        116.0 * y.cbrt() - 16.0
    } else {
        KAPPA * y
    };
    let a = 500.0 * (fx - fy);
    let bb = 200.0 * (fy - fz);

    [
        to_byte(l * 255.0 / 100.0),
        to_byte(a + 128.0),
        to_byte(bb + 128.0),
    ]
}

fn pixel_to_rgb(l: u8, a: u8, b: u8) -> [u8; 3] {
    let l = l as f64 * 100.0 / 255.0;
    let a = a as f64 - 128.0;
    let b = b as f64 - 128.0;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let y = if l > KAPPA * EPSILON {
        fy * fy * fy
    } else {
        l / KAPPA
    };
    let x = lab_f_inv(fx) * WHITE_X;
    let z = lab_f_inv(fz) * WHITE_Z;

    let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
    let g = -0.969256 * x + 1.875991 * y + 0.041556 * z;
    let bl = 0.055648 * x - 0.204043 * y + 1.057311 * z;

    [linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(bl)]
}

fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let cubed = f * f * f;
    if cubed > EPSILON {
        cubed
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

fn srgb_to_linear(v: u8) -> f64 {
    let c = v as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let encoded = if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    to_byte(encoded * 255.0)
}

fn to_byte(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_and_black() {
        assert_eq!(pixel_to_lab(255, 255, 255), [255, 128, 128]);
        assert_eq!(pixel_to_lab(0, 0, 0), [0, 128, 128]);
    }

    #[test]
    fn test_gray_is_achromatic() {
        let [_, a, b] = pixel_to_lab(128, 128, 128);
        assert_eq!((a, b), (128, 128));
    }

    #[test]
    fn test_red_has_positive_a() {
        let [_, a, _] = pixel_to_lab(255, 0, 0);
        assert!(a > 200);
    }

    #[test]
    fn test_round_trip_is_close() {
        let samples: Vec<u8> = vec![
            0, 0, 0, 255, 255, 255, 128, 128, 128, 200, 30, 40, 60, 70, 220, 15, 15, 15,
        ];
        let planes = rgb_to_lab(&samples);
        let mut back = vec![0u8; samples.len()];
        lab_to_rgb(&planes, &mut back);
        for (orig, conv) in samples.iter().zip(&back) {
            assert!(
                (*orig as i32 - *conv as i32).abs() <= 3,
                "{orig} came back as {conv}"
            );
        }
    }
}
