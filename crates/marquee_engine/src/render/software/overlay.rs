//! 2D overlay pass
//!
//! Draws UI quads and text over a copy of the finished frame with straight
//! alpha blending in display (sRGB) space, without depth testing. Quads go
//! first, then text, each in ascending depth order.

use super::font_atlas::FontAtlas;
use super::framebuffer::Framebuffer;
use crate::foundation::math::Vec4;
use crate::ui::rendering::line_advance;
use crate::ui::{RenderQuad, RenderText, UIRenderData};

/// Draw `ui` into `target`
pub fn draw(target: &mut Framebuffer, ui: &UIRenderData, fonts: &mut FontAtlas) {
    if ui.is_empty() {
        return;
    }
    let mut quads: Vec<&RenderQuad> = ui.quads.iter().collect();
    quads.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    let mut texts: Vec<&RenderText> = ui.texts.iter().collect();
    texts.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    for quad in quads {
        fill_rect(target, quad.position.x, quad.position.y, quad.size.x, quad.size.y, quad.color);
    }
    for text in texts {
        draw_text(target, text, fonts);
    }
}

fn draw_text(target: &mut Framebuffer, text: &RenderText, fonts: &mut FontAtlas) {
    let ascent = fonts.ascent(text.size);
    let mut top = text.position.y;
    for line in text.text.split('\n') {
        let baseline = (top + ascent).round();
        let mut pen = text.position.x;
        for ch in line.chars() {
            let glyph = fonts.glyph(ch, text.size);
            let metrics = glyph.metrics;
            let left = pen.round() as i64 + i64::from(metrics.xmin);
            let glyph_top = baseline as i64 - i64::from(metrics.ymin) - metrics.height as i64;
            for (row, coverage_row) in glyph.coverage.chunks(metrics.width.max(1)).enumerate() {
                for (column, &coverage) in coverage_row.iter().enumerate() {
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = text.color.w * f32::from(coverage) / 255.0;
                    blend_pixel(target, left + column as i64, glyph_top + row as i64, text.color, alpha);
                }
            }
            pen += metrics.advance_width;
        }
        top += line_advance(text.size);
    }
}

fn blend_pixel(target: &mut Framebuffer, x: i64, y: i64, color: Vec4, alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(target.width()) || y >= i64::from(target.height()) {
        return;
    }
    let stride = target.width() as usize;
    let dst = &mut target.pixels_mut()[y as usize * stride + x as usize];
    blend(dst, color, alpha.clamp(0.0, 1.0));
}

fn blend(dst: &mut [u8; 4], color: Vec4, alpha: f32) {
    let source = [color.x, color.y, color.z];
    for channel in 0..3 {
        let blended = source[channel].clamp(0.0, 1.0) * 255.0 * alpha + f32::from(dst[channel]) * (1.0 - alpha);
        dst[channel] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = 255;
}

/// Blend a rectangle covering the pixels whose centers fall inside it
fn fill_rect(target: &mut Framebuffer, x: f32, y: f32, width: f32, height: f32, color: Vec4) {
    let alpha = color.w.clamp(0.0, 1.0);
    if alpha <= 0.0 || width <= 0.0 || height <= 0.0 {
        return;
    }
    let (fw, fh) = (target.width() as f32, target.height() as f32);
    let x0 = (x - 0.5).ceil().clamp(0.0, fw) as u32;
    let x1 = (x + width - 0.5).ceil().clamp(0.0, fw) as u32;
    let y0 = (y - 0.5).ceil().clamp(0.0, fh) as u32;
    let y1 = (y + height - 0.5).ceil().clamp(0.0, fh) as u32;
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let stride = target.width() as usize;
    let pixels = target.pixels_mut();
    for py in y0..y1 {
        for px in x0..x1 {
            blend(&mut pixels[py as usize * stride + px as usize], color, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    fn fonts() -> FontAtlas {
        FontAtlas::bundled().unwrap()
    }

    #[test]
    fn test_opaque_quad_covers_its_pixels() {
        let mut fb = Framebuffer::new(8, 8, true);
        fb.clear([0, 0, 0, 255]);
        let ui = UIRenderData {
            quads: vec![RenderQuad {
                position: Vec2::new(2.0, 2.0),
                size: Vec2::new(3.0, 2.0),
                color: Vec4::new(1.0, 0.0, 0.0, 1.0),
                depth: 0.0,
            }],
            texts: Vec::new(),
        };
        draw(&mut fb, &ui, &mut fonts());
        assert_eq!(fb.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(fb.pixel(4, 3), Some([255, 0, 0, 255]));
        assert_eq!(fb.pixel(5, 3), Some([0, 0, 0, 255]));
        assert_eq!(fb.pixel(2, 4), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_translucent_quad_blends() {
        let mut fb = Framebuffer::new(2, 2, true);
        fb.clear([0, 0, 200, 255]);
        let ui = UIRenderData {
            quads: vec![RenderQuad {
                position: Vec2::zeros(),
                size: Vec2::new(2.0, 2.0),
                color: Vec4::new(1.0, 1.0, 1.0, 0.5),
                depth: 0.0,
            }],
            texts: Vec::new(),
        };
        draw(&mut fb, &ui, &mut fonts());
        assert_eq!(fb.pixel(0, 0), Some([128, 128, 228, 255]));
    }

    #[test]
    fn test_text_stays_inside_its_line_box() {
        let mut fb = Framebuffer::new(32, 24, true);
        fb.clear([0, 0, 0, 255]);
        let ui = UIRenderData {
            quads: Vec::new(),
            texts: vec![RenderText {
                position: Vec2::new(4.0, 4.0),
                text: "H".to_string(),
                color: Vec4::new(1.0, 1.0, 1.0, 1.0),
                size: 14.0,
                depth: 0.0,
            }],
        };
        draw(&mut fb, &ui, &mut fonts());
        let lit: Vec<(u32, u32)> = (0..24)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) != Some([0, 0, 0, 255]))
            .collect();
        assert!(lit.len() > 10);
        let advance = crate::ui::rendering::glyph_advance(14.0);
        assert!(lit.iter().all(|&(x, y)| x >= 4 && (x as f32) < 4.0 + advance + 1.0 && y >= 4 && y < 4 + 14));
        assert!(lit.iter().any(|&(x, y)| fb.pixel(x, y).map_or(false, |p| p[0] > 200)));
    }

    #[test]
    fn test_second_line_is_one_line_advance_down() {
        let ui = |text: &str| UIRenderData {
            quads: Vec::new(),
            texts: vec![RenderText {
                position: Vec2::zeros(),
                text: text.to_string(),
                color: Vec4::new(1.0, 1.0, 1.0, 1.0),
                size: 14.0,
                depth: 0.0,
            }],
        };
        let topmost = |fb: &Framebuffer| {
            (0..40).find(|&y| (0..16).any(|x| fb.pixel(x, y) != Some([0, 0, 0, 255])))
        };
        let mut atlas = fonts();
        let mut single = Framebuffer::new(16, 40, true);
        single.clear([0, 0, 0, 255]);
        draw(&mut single, &ui("T"), &mut atlas);
        let mut double = Framebuffer::new(16, 40, true);
        double.clear([0, 0, 0, 255]);
        draw(&mut double, &ui(" \nT"), &mut atlas);

        let shift = topmost(&double).unwrap() - topmost(&single).unwrap();
        assert!((shift as f32 - line_advance(14.0)).abs() <= 1.0);
    }
}
