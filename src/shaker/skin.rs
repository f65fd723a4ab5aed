//! Procedural die face skins
//!
//! Rasterises the six face images of a die from a [`SkinPreset`] plus the
//! optional CSS colour overrides in [`SkinSettings`]. The RGBA buffers are
//! plain bytes so they can be checked without a renderer; [`face_images`]
//! wraps them as Bevy images.

use bevy::log::warn;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::shaker::types::{SkinPreset, SkinSettings, FACE_COUNT};

type Rgba = [f32; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundPattern {
    Solid,
    LinearGradient,
    RadialGradient,
    Stripes(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipStyle {
    SolidCircle,
    HollowCircle,
    Square,
}

/// Everything needed to draw a face.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinStyle {
    pub size: u32,
    pub border: u32,
    pub corner_radius: u32,
    pub background: Rgba,
    pub background2: Rgba,
    pub border_color: Rgba,
    pub pip_color: Rgba,
    pub pattern: BackgroundPattern,
    pub pip_style: PipStyle,
    pub pip_radius: u32,
}

fn rgb(r: f32, g: f32, b: f32) -> Rgba {
    [r, g, b, 1.0]
}

impl SkinStyle {
    pub fn preset(preset: SkinPreset, size: u32) -> Self {
        // Presets are authored for 256 px faces.
        let k = size as f32 / 256.0;
        let px = |v: f32| (v * k).round() as u32;

        let base = Self {
            size,
            border: px(8.0),
            corner_radius: px(18.0),
            background: rgb(1.0, 1.0, 1.0),
            background2: rgb(1.0, 1.0, 1.0),
            border_color: rgb(0.0, 0.0, 0.0),
            pip_color: rgb(0.0, 0.0, 0.0),
            pattern: BackgroundPattern::Solid,
            pip_style: PipStyle::SolidCircle,
            pip_radius: px(14.0),
        };

        match preset {
            SkinPreset::Classic => base,
            SkinPreset::Dark => Self {
                background: rgb(0.08, 0.08, 0.1),
                background2: rgb(0.12, 0.12, 0.16),
                border_color: rgb(0.3, 0.3, 0.35),
                pip_color: rgb(1.0, 1.0, 1.0),
                pattern: BackgroundPattern::LinearGradient,
                ..base
            },
            SkinPreset::Candy => Self {
                corner_radius: px(22.0),
                background: rgb(1.0, 0.8, 0.9),
                background2: rgb(0.9, 0.95, 1.0),
                border_color: rgb(0.85, 0.5, 0.7),
                pip_color: rgb(0.4, 0.1, 0.3),
                pattern: BackgroundPattern::RadialGradient,
                pip_style: PipStyle::HollowCircle,
                pip_radius: px(16.0),
                ..base
            },
            SkinPreset::Neon => Self {
                corner_radius: 0,
                background: rgb(0.05, 0.05, 0.08),
                background2: rgb(0.08, 0.05, 0.12),
                border_color: rgb(0.15, 0.15, 0.2),
                pip_color: rgb(0.2, 1.0, 0.9),
                pattern: BackgroundPattern::Stripes(8),
                pip_radius: px(12.0),
                ..base
            },
        }
    }

    /// Preset from settings with any CSS overrides applied. Unparseable
    /// colours are logged and ignored.
    pub fn from_settings(settings: &SkinSettings) -> Self {
        let mut style = Self::preset(settings.preset, settings.size);
        apply_override(&mut style.background, settings.background.as_deref(), "background");
        apply_override(&mut style.background2, settings.background2.as_deref(), "background2");
        apply_override(&mut style.border_color, settings.border_color.as_deref(), "border_color");
        apply_override(&mut style.pip_color, settings.pip_color.as_deref(), "pip_color");
        style
    }
}

fn apply_override(target: &mut Rgba, value: Option<&str>, field: &str) {
    let Some(value) = value else {
        return;
    };
    match csscolorparser::parse(value) {
        Ok(c) => *target = [c.r, c.g, c.b, c.a],
        Err(e) => warn!("Ignoring skin {} override {:?}: {}", field, value, e),
    }
}

// ============================================================================
// Rasterising
// ============================================================================

fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

fn to_rgba8(c: Rgba) -> [u8; 4] {
    c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn in_rounded_rect(x: i32, y: i32, x0: i32, y0: i32, x1: i32, y1: i32, radius: i32) -> bool {
    if radius <= 0 {
        return x >= x0 && x <= x1 && y >= y0 && y <= y1;
    }
    let (cx0, cy0) = (x0 + radius, y0 + radius);
    let (cx1, cy1) = (x1 - radius, y1 - radius);
    if x >= cx0 && x <= cx1 && y >= y0 && y <= y1 {
        return true;
    }
    if y >= cy0 && y <= cy1 && x >= x0 && x <= x1 {
        return true;
    }
    let r2 = radius * radius;
    [(cx0, cy0), (cx1, cy0), (cx0, cy1), (cx1, cy1)]
        .iter()
        .any(|&(cx, cy)| (x - cx).pow(2) + (y - cy).pow(2) <= r2)
}

struct Canvas {
    size: i32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(size: u32) -> Self {
        Self {
            size: size as i32,
            pixels: vec![0; size as usize * size as usize * 4],
        }
    }

    fn set(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.size || y >= self.size {
            return;
        }
        let i = (y as usize * self.size as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color);
    }
}

/// Pip centres for `face` on a face of the given geometry.
pub fn pip_positions(face: u32, size: u32, border: u32, corner_radius: u32) -> Vec<(i32, i32)> {
    let (s, inset) = (size as i32, (border + corner_radius) as i32);
    let (cx, cy) = (s / 2, s / 2);
    let inner = (s - 2 * inset).max(0);
    let off = (inner / 4).max(1);

    let c = (cx, cy);
    let nw = (cx - off, cy - off);
    let ne = (cx + off, cy - off);
    let sw = (cx - off, cy + off);
    let se = (cx + off, cy + off);
    let w = (cx - off, cy);
    let e = (cx + off, cy);

    match face {
        1 => vec![c],
        2 => vec![nw, se],
        3 => vec![nw, c, se],
        4 => vec![nw, ne, sw, se],
        5 => vec![nw, ne, c, sw, se],
        6 => vec![nw, ne, w, e, sw, se],
        _ => Vec::new(),
    }
}

fn draw_body(canvas: &mut Canvas, style: &SkinStyle) {
    let s = canvas.size;
    let b = style.border as i32;
    let r = style.corner_radius as i32;
    let (x0, y0, x1, y1) = (b, b, s - b - 1, s - b - 1);
    let border = to_rgba8(style.border_color);

    for y in 0..s {
        for x in 0..s {
            let in_body = in_rounded_rect(x, y, x0, y0, x1, y1, r);
            let in_border = in_rounded_rect(x, y, x0 - 1, y0 - 1, x1 + 1, y1 + 1, (r - 1).max(0));
            if in_body {
                let color = match style.pattern {
                    BackgroundPattern::Solid => style.background,
                    BackgroundPattern::LinearGradient => {
                        let t = if y1 > y0 {
                            (y - y0) as f32 / (y1 - y0) as f32
                        } else {
                            0.0
                        };
                        lerp_color(style.background, style.background2, t)
                    }
                    BackgroundPattern::RadialGradient => {
                        let half = s as f32 * 0.5;
                        let dx = (x as f32 - half) / half;
                        let dy = (y as f32 - half) / half;
                        lerp_color(style.background, style.background2, (dx * dx + dy * dy).sqrt())
                    }
                    BackgroundPattern::Stripes(count) => {
                        let width = (x1 - x0 + 1).max(1);
                        let k = ((x - x0) * count as i32 / width).abs();
                        if k % 2 == 0 {
                            style.background
                        } else {
                            style.background2
                        }
                    }
                };
                canvas.set(x, y, to_rgba8(color));
            } else if in_border {
                canvas.set(x, y, border);
            }
        }
    }
}

fn draw_pip(canvas: &mut Canvas, (cx, cy): (i32, i32), style: &SkinStyle) {
    let r = style.pip_radius.max(2) as i32;
    let color = to_rgba8(style.pip_color);
    let inner = (r - (r / 3).max(1)).max(0);

    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = dx * dx + dy * dy;
            let hit = match style.pip_style {
                PipStyle::SolidCircle => d2 <= r * r,
                PipStyle::HollowCircle => d2 <= r * r && d2 >= inner * inner,
                PipStyle::Square => true,
            };
            if hit {
                canvas.set(cx + dx, cy + dy, color);
            }
        }
    }
}

/// RGBA8 pixels of one face, row-major, `size * size * 4` bytes.
pub fn rasterize_face(style: &SkinStyle, face: u32) -> Vec<u8> {
    let mut canvas = Canvas::new(style.size);
    draw_body(&mut canvas, style);
    for pip in pip_positions(face, style.size, style.border, style.corner_radius) {
        draw_pip(&mut canvas, pip, style);
    }
    canvas.pixels
}

/// Faces 1..=6 in order. Empty when the style cannot produce an image.
pub fn rasterize_faces(style: &SkinStyle) -> Vec<Vec<u8>> {
    if !(SkinSettings::MIN_SIZE..=SkinSettings::MAX_SIZE).contains(&style.size) {
        return Vec::new();
    }
    (1..=FACE_COUNT).map(|face| rasterize_face(style, face)).collect()
}

fn image_from_rgba8(size: u32, rgba: Vec<u8>) -> Image {
    let extent = Extent3d {
        width: size,
        height: size,
        depth_or_array_layers: 1,
    };

    let mut image = Image {
        texture_descriptor: bevy::render::render_resource::TextureDescriptor {
            label: None,
            size: extent,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            mip_level_count: 1,
            sample_count: 1,
            usage: bevy::render::render_resource::TextureUsages::TEXTURE_BINDING
                | bevy::render::render_resource::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        ..default()
    };

    image.resize(extent);
    image.data = Some(rgba);
    image
}

/// Six face images for the configured skin, falling back to the Classic
/// preset when the configured one yields fewer than six faces.
pub fn face_images(settings: &SkinSettings) -> Vec<Image> {
    let mut style = SkinStyle::from_settings(settings);
    let mut faces = rasterize_faces(&style);
    if faces.len() < FACE_COUNT as usize {
        warn!(
            "Skin {:?} produced {} faces; using the classic skin",
            settings.preset,
            faces.len()
        );
        style = SkinStyle::preset(SkinPreset::Classic, SkinSettings::default().size);
        faces = rasterize_faces(&style);
    }

    faces
        .into_iter()
        .map(|rgba| image_from_rgba8(style.size, rgba))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(rgba: &[u8], size: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * size + x) * 4) as usize;
        [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
    }

    #[test]
    fn test_pip_counts_match_faces() {
        for face in 1..=6 {
            assert_eq!(pip_positions(face, 256, 8, 18).len(), face as usize);
        }
        assert!(pip_positions(7, 256, 8, 18).is_empty());
    }

    #[test]
    fn test_every_preset_yields_six_distinct_faces() {
        for preset in [
            SkinPreset::Classic,
            SkinPreset::Dark,
            SkinPreset::Candy,
            SkinPreset::Neon,
        ] {
            let style = SkinStyle::preset(preset, 64);
            let faces = rasterize_faces(&style);
            assert_eq!(faces.len(), 6, "{preset:?}");
            for face in &faces {
                assert_eq!(face.len(), 64 * 64 * 4);
            }
            for i in 0..faces.len() {
                for j in i + 1..faces.len() {
                    assert_ne!(faces[i], faces[j], "{preset:?} faces {} and {}", i + 1, j + 1);
                }
            }
        }
    }

    #[test]
    fn test_classic_face_one_has_centre_pip_and_transparent_corner() {
        let style = SkinStyle::preset(SkinPreset::Classic, 128);
        let rgba = rasterize_face(&style, 1);
        assert_eq!(pixel(&rgba, 128, 64, 64), [0, 0, 0, 255]);
        assert_eq!(pixel(&rgba, 128, 0, 0), [0, 0, 0, 0]);
        // Body away from the pip is white.
        assert_eq!(pixel(&rgba, 128, 20, 64), [255, 255, 255, 255]);
    }

    #[test]
    fn test_css_override_changes_pips() {
        let settings = SkinSettings {
            preset: SkinPreset::Classic,
            size: 64,
            pip_color: Some("#ff0000".to_string()),
            ..Default::default()
        };
        let style = SkinStyle::from_settings(&settings);
        assert_eq!(style.pip_color, [1.0, 0.0, 0.0, 1.0]);
        let rgba = rasterize_face(&style, 1);
        assert_eq!(pixel(&rgba, 64, 32, 32), [255, 0, 0, 255]);
    }

    #[test]
    fn test_bad_css_override_is_ignored() {
        let settings = SkinSettings {
            preset: SkinPreset::Dark,
            background: Some("not a colour".to_string()),
            ..Default::default()
        };
        let style = SkinStyle::from_settings(&settings);
        assert_eq!(style.background, SkinStyle::preset(SkinPreset::Dark, 256).background);
    }

    #[test]
    fn test_zero_size_falls_back_to_classic() {
        let settings = SkinSettings {
            preset: SkinPreset::Neon,
            size: 0,
            ..Default::default()
        };
        let images = face_images(&settings);
        assert_eq!(images.len(), 6);
        assert_eq!(images[0].width(), 256);
    }

    #[test]
    fn test_oversized_style_falls_back_to_classic() {
        let style = SkinStyle::preset(SkinPreset::Candy, 40_000);
        assert!(rasterize_faces(&style).is_empty());

        let settings = SkinSettings {
            preset: SkinPreset::Candy,
            size: 40_000,
            ..Default::default()
        };
        let images = face_images(&settings);
        assert_eq!(images.len(), 6);
        assert_eq!(images[0].width(), 256);
    }
}
