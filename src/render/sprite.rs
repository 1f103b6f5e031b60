use std::path::Path;

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

use crate::error::{Error, Result};

const GLYPH_SIZE: u32 = 32;

/// Read the apple glyph from a PNG file.
pub fn load_apple(path: &Path) -> Result<Pixmap> {
    Pixmap::load_png(path).map_err(|err| Error::Asset(format!("{}: {err}", path.display())))
}

/// Built-in apple glyph: red fruit, brown stem, green leaf on a transparent
/// background.
pub fn apple_glyph() -> Result<Pixmap> {
    let mut glyph = Pixmap::new(GLYPH_SIZE, GLYPH_SIZE).ok_or(Error::Surface(GLYPH_SIZE))?;
    let size = GLYPH_SIZE as f32;

    let mut paint = Paint::default();
    paint.anti_alias = true;

    paint.set_color_rgba8(0xd0, 0x1c, 0x1f, 0xff);
    let fruit = PathBuilder::from_circle(size / 2.0, size * 0.58, size * 0.4)
        .ok_or_else(|| Error::Asset("apple body".to_string()))?;
    glyph.fill_path(&fruit, &paint, FillRule::Winding, Transform::identity(), None);

    paint.set_color_rgba8(0x5b, 0x3a, 0x1a, 0xff);
    if let Some(stem) = Rect::from_xywh(size * 0.47, size * 0.05, size * 0.07, size * 0.2) {
        glyph.fill_rect(stem, &paint, Transform::identity(), None);
    }

    paint.set_color_rgba8(0x3c, 0xa0, 0x3c, 0xff);
    let leaf = Rect::from_xywh(size * 0.55, size * 0.06, size * 0.25, size * 0.12)
        .and_then(PathBuilder::from_oval)
        .ok_or_else(|| Error::Asset("apple leaf".to_string()))?;
    glyph.fill_path(&leaf, &paint, FillRule::Winding, Transform::identity(), None);

    Ok(glyph)
}
