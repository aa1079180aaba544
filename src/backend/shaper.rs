//! Text metrics from egui's bundled fonts.

use crate::editor::{FontFamilyKind, FontSpec, TextShaper};
use ab_glyph::{Font, FontArc, ScaleFont};
use eframe::egui;

/// Used when a family has no usable font.
const FALLBACK_ASCENT: f64 = 0.8;
const FALLBACK_ADVANCE: f64 = 0.5;

struct LoadedFont {
    font: FontArc,
    tweak: egui::FontTweak,
}

/// [`TextShaper`] measuring with the first font of each egui family, the
/// same fonts the inline editor draws with.
pub struct EguiShaper {
    proportional: Option<LoadedFont>,
    monospace: Option<LoadedFont>,
}

impl std::fmt::Debug for EguiShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EguiShaper")
            .field("proportional", &self.proportional.is_some())
            .field("monospace", &self.monospace.is_some())
            .finish()
    }
}

impl Default for EguiShaper {
    fn default() -> Self {
        Self::new()
    }
}

fn load_family(
    definitions: &egui::FontDefinitions,
    family: &egui::FontFamily,
) -> Option<LoadedFont> {
    let font_name = definitions.families.get(family)?.first()?;
    let data = definitions.font_data.get(font_name)?.clone();
    let tweak = data.tweak;
    let font = match data.font {
        std::borrow::Cow::Borrowed(bytes) => {
            ab_glyph::FontRef::try_from_slice_and_index(bytes, data.index)
                .map(FontArc::from)
                .ok()
        }
        std::borrow::Cow::Owned(bytes) => {
            ab_glyph::FontVec::try_from_vec_and_index(bytes, data.index)
                .map(FontArc::from)
                .ok()
        }
    };
    if font.is_none() {
        tracing::warn!(%font_name, "cannot parse font, using estimated metrics");
    }
    Some(LoadedFont { font: font?, tweak })
}

impl EguiShaper {
    pub fn new() -> Self {
        let definitions = egui::FontDefinitions::default();
        Self {
            proportional: load_family(&definitions, &egui::FontFamily::Proportional),
            monospace: load_family(&definitions, &egui::FontFamily::Monospace),
        }
    }

    fn loaded(&self, family: FontFamilyKind) -> Option<&LoadedFont> {
        match family {
            FontFamilyKind::Proportional => self.proportional.as_ref(),
            FontFamilyKind::Monospace => self.monospace.as_ref(),
        }
    }
}

impl TextShaper for EguiShaper {
    fn ascent(&self, font: &FontSpec) -> f64 {
        let Some(loaded) = self.loaded(font.family) else {
            return font.size * FALLBACK_ASCENT;
        };
        let size = font.size as f32;
        let scaled = loaded.font.as_scaled(size * loaded.tweak.scale);
        f64::from(scaled.ascent() + loaded.tweak.y_offset * size)
    }

    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        let Some(loaded) = self.loaded(font.family) else {
            return font.size * FALLBACK_ADVANCE * text.chars().count() as f64;
        };
        let scaled = loaded
            .font
            .as_scaled(font.size as f32 * loaded.tweak.scale);
        let mut width = 0.0f32;
        let mut previous = None;
        for chr in text.chars() {
            let glyph = scaled.glyph_id(chr);
            if let Some(previous) = previous {
                width += scaled.kern(previous, glyph);
            }
            width += scaled.h_advance(glyph);
            previous = Some(glyph);
        }
        f64::from(width)
    }
}
