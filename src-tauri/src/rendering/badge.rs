//! Unread-count badge for the tray icon.
//!
//! WhatsApp Web reports unread chats in the document title, e.g.
//! `"(3) WhatsApp"`. The text between the first `(` and the following `)` is
//! drawn as a white label on a red pill in the top-left corner of the icon.
//!
//! Text is laid out and rasterized with resvg, using the system font database
//! loaded once per [`BadgeRenderer`].

use std::sync::Arc;

use image::{imageops, RgbaImage};
use resvg::{tiny_skia, usvg};

/// Reference icon edge in pixels. Every base icon is normalized to this size.
pub const ICON_SIZE: u32 = 256;

/// Badge text size in pixels.
const FONT_SIZE_PX: f32 = 150.0;

/// Height of one line of badge text (ascent + descent).
const LINE_HEIGHT_PX: f32 = FONT_SIZE_PX * 1.15;

/// Horizontal padding on each side of the text. Corner radius is 3x this.
const MARGIN_PX: f32 = 20.0;

const BADGE_FILL: &str = "#ff0000";
const TEXT_FILL: &str = "#ffffff";

/// Bold sans-serif faces tried in order.
const FONT_FAMILY: &str =
    "'Noto Sans', 'DejaVu Sans', 'Liberation Sans', 'Segoe UI', Arial, Helvetica, sans-serif";

/// Whether the tray should draw attention to the icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayStatus {
    /// Unread messages are pending.
    Active,
    /// Nothing to report.
    Passive,
}

impl TrayStatus {
    pub fn for_title(title: &str) -> Self {
        if badge_text(title).is_some() {
            TrayStatus::Active
        } else {
            TrayStatus::Passive
        }
    }
}

/// Extract the badge text from a page title.
///
/// Returns the text between the first `(` and the next `)`. A title with no
/// `(`, or with no `)` after it, has no badge.
pub fn badge_text(title: &str) -> Option<&str> {
    let open = title.find('(')?;
    let rest = &title[open + 1..];
    let close = rest.find(')')?;
    Some(&rest[..close])
}

/// Unread count as a number, when the badge text is numeric.
pub fn unread_count(title: &str) -> Option<u32> {
    badge_text(title).and_then(|text| text.trim().parse().ok())
}

/// Composites the unread badge onto a base icon.
pub struct BadgeRenderer {
    options: usvg::Options<'static>,
}

impl Default for BadgeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BadgeRenderer {
    /// Create a renderer backed by the system fonts.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        log::debug!("[BADGE] Loaded {} font faces", fontdb.len());

        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(fontdb);
        Self { options }
    }

    /// Render the icon for `title`.
    ///
    /// Without badge text the base icon is returned unchanged. Otherwise the
    /// result is a `ICON_SIZE` square copy of the base with the badge on top.
    /// Long text is clipped at the icon edge.
    pub fn render(&self, title: &str, base: &RgbaImage) -> RgbaImage {
        let Some(text) = badge_text(title) else {
            return base.clone();
        };

        let mut icon = if base.dimensions() == (ICON_SIZE, ICON_SIZE) {
            base.clone()
        } else {
            imageops::resize(base, ICON_SIZE, ICON_SIZE, imageops::FilterType::Lanczos3)
        };

        match self.rasterize_badge(text) {
            Some(badge) => imageops::overlay(&mut icon, &badge, 0, 0),
            None => log::warn!("[BADGE] Could not rasterize badge for {:?}", text),
        }

        icon
    }

    /// Width of `text` set in the badge font, 0 when it produces no glyphs.
    fn text_width(&self, escaped: &str) -> f32 {
        if escaped.trim().is_empty() {
            return 0.0;
        }

        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}"><text x="0" y="{font}" font-family="{family}" font-weight="bold" font-size="{font}">{text}</text></svg>"#,
            size = ICON_SIZE,
            font = FONT_SIZE_PX,
            family = FONT_FAMILY,
            text = escaped,
        );

        match usvg::Tree::from_str(&svg, &self.options) {
            Ok(tree) if tree.root().has_children() => tree.root().abs_bounding_box().width(),
            Ok(_) => 0.0,
            Err(e) => {
                log::warn!("[BADGE] Failed to lay out badge text: {}", e);
                0.0
            },
        }
    }

    fn rasterize_badge(&self, text: &str) -> Option<RgbaImage> {
        let escaped = escape_xml(text);
        let width = self.text_width(&escaped) + 2.0 * MARGIN_PX;
        let height = LINE_HEIGHT_PX;
        let radius = 3.0 * MARGIN_PX;

        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><rect x="0" y="0" width="{width}" height="{height}" rx="{radius}" ry="{radius}" fill="{badge_fill}"/><text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="central" font-family="{family}" font-weight="bold" font-size="{font}" fill="{text_fill}">{text}</text></svg>"#,
            size = ICON_SIZE,
            width = width,
            height = height,
            radius = radius,
            badge_fill = BADGE_FILL,
            cx = width / 2.0,
            cy = height / 2.0,
            family = FONT_FAMILY,
            font = FONT_SIZE_PX,
            text_fill = TEXT_FILL,
            text = escaped,
        );

        let tree = usvg::Tree::from_str(&svg, &self.options).ok()?;
        let mut pixmap = tiny_skia::Pixmap::new(ICON_SIZE, ICON_SIZE)?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha; image expects straight alpha
        let rgba: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        RgbaImage::from_raw(ICON_SIZE, ICON_SIZE, rgba)
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {},
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn base_icon() -> RgbaImage {
        RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, BLUE)
    }

    #[test]
    fn test_badge_text_extraction() {
        assert_eq!(badge_text("WhatsApp (3)"), Some("3"));
        assert_eq!(badge_text("WhatsApp (12) - notice"), Some("12"));
        assert_eq!(badge_text("(7) WhatsApp"), Some("7"));
        assert_eq!(badge_text("WhatsApp ()"), Some(""));
    }

    #[test]
    fn test_no_badge_without_parenthesis() {
        assert_eq!(badge_text("WhatsApp"), None);
        assert_eq!(badge_text(""), None);
    }

    #[test]
    fn test_unclosed_parenthesis_has_no_badge() {
        assert_eq!(badge_text("WhatsApp (3"), None);
        // A `)` before the `(` does not close it
        assert_eq!(badge_text("a) WhatsApp (3"), None);
    }

    #[test]
    fn test_unread_count() {
        assert_eq!(unread_count("(42) WhatsApp"), Some(42));
        assert_eq!(unread_count("WhatsApp (new)"), None);
        assert_eq!(unread_count("WhatsApp"), None);
    }

    #[test]
    fn test_tray_status() {
        assert_eq!(TrayStatus::for_title("(1) WhatsApp"), TrayStatus::Active);
        assert_eq!(TrayStatus::for_title("WhatsApp"), TrayStatus::Passive);
    }

    #[test]
    fn test_render_without_badge_returns_base() {
        let renderer = BadgeRenderer::new();
        let base = RgbaImage::from_pixel(32, 32, BLUE);
        let icon = renderer.render("WhatsApp", &base);
        assert_eq!(icon, base);
    }

    #[test]
    fn test_render_draws_red_pill_top_left() {
        let renderer = BadgeRenderer::new();
        let base = base_icon();
        let icon = renderer.render("WhatsApp (3)", &base);

        assert_eq!(icon.dimensions(), (ICON_SIZE, ICON_SIZE));
        // Left edge of the pill, below the rounded corner
        assert_eq!(*icon.get_pixel(5, 86), RED);
        // Bottom-right corner is untouched
        assert_eq!(*icon.get_pixel(250, 250), BLUE);
        // Base image itself is not modified
        assert_eq!(*base.get_pixel(5, 86), BLUE);
    }

    fn has_fonts(renderer: &BadgeRenderer) -> bool {
        renderer.options.fontdb.len() > 0
    }

    fn is_white(pixel: &Rgba<u8>) -> bool {
        pixel.0.iter().all(|&c| c > 200)
    }

    #[test]
    fn test_render_draws_text_inside_pill() {
        let renderer = BadgeRenderer::new();
        if !has_fonts(&renderer) {
            eprintln!("no system fonts, skipping badge text check");
            return;
        }

        let icon = renderer.render("WhatsApp (88)", &base_icon());
        let pill_height = LINE_HEIGHT_PX as u32;
        let white = icon
            .enumerate_pixels()
            .filter(|(_, y, p)| *y < pill_height && is_white(p))
            .count();
        assert!(white > 100, "only {} text pixels", white);

        // Two digits widen the pill past the bare margins; row 8 is above the glyphs
        assert_eq!(*icon.get_pixel((2.0 * MARGIN_PX) as u32 + 10, 8), RED);
        assert!(!icon.enumerate_pixels().any(|(_, y, p)| y >= pill_height && is_white(p)));
    }

    #[test]
    fn test_render_normalizes_base_size() {
        let renderer = BadgeRenderer::new();
        let base = RgbaImage::from_pixel(64, 64, BLUE);
        let icon = renderer.render("(1)", &base);
        assert_eq!(icon.dimensions(), (ICON_SIZE, ICON_SIZE));
    }

    #[test]
    fn test_render_survives_hostile_text() {
        let renderer = BadgeRenderer::new();
        let base = base_icon();
        let titles = [
            "WhatsApp (<script>&\"'</script>)",
            "WhatsApp (\u{0}\u{7})",
            "WhatsApp ()",
            "WhatsApp (999999999999999999999999999999)",
        ];
        for title in titles {
            let icon = renderer.render(title, &base);
            assert_eq!(icon.dimensions(), (ICON_SIZE, ICON_SIZE));
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape_xml("1\u{0}2"), "12");
    }
}
