//! Vello-backed drawing surface.

use kurbo::{Affine, BezPath, Point, Size, Stroke};
use modsim_core::surface::{Surface, TextStyle};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use vello::{AaConfig, Scene};

/// A [`Surface`] that encodes drawing commands into a Vello scene.
///
/// Build a frame with [`VelloSurface::begin_frame`], let the viewport draw
/// into it, then hand [`VelloSurface::take_scene`] to a `vello::Renderer`.
pub struct VelloSurface {
    /// The Vello scene being built.
    scene: Scene,
    size: Size,
    transform: Affine,
    antialias: bool,
    /// Font context for text rendering (cached to avoid rescanning fonts).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
}

impl Default for VelloSurface {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl VelloSurface {
    /// Create a surface of the given pixel size.
    pub fn new(size: Size) -> Self {
        Self {
            scene: Scene::new(),
            size,
            transform: Affine::IDENTITY,
            antialias: true,
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Reset the scene and transform for a new frame.
    pub fn begin_frame(&mut self, size: Size) {
        self.scene.reset();
        self.size = size;
        self.transform = Affine::IDENTITY;
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Rasterization mode matching the antialias toggle.
    ///
    /// Vello always antialiases; with the toggle off the frame is rendered
    /// with multisampling instead of analytic area coverage.
    pub fn aa_config(&self) -> AaConfig {
        if self.antialias {
            AaConfig::Area
        } else {
            AaConfig::Msaa8
        }
    }
}

impl Surface for VelloSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn antialias(&self) -> bool {
        self.antialias
    }

    fn set_antialias(&mut self, enabled: bool) {
        self.antialias = enabled;
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.scene.fill(Fill::NonZero, self.transform, color, None, path);
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, color: Color) {
        let stroke = Stroke::new(width);
        self.scene.stroke(&stroke, self.transform, color, None, path);
    }

    /// Lay out `text` with Parley and draw its glyph runs with the first
    /// line's baseline at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) {
        if text.is_empty() {
            return;
        }

        let brush = Brush::Solid(style.color);
        let weight = if style.bold {
            parley::FontWeight::BOLD
        } else {
            parley::FontWeight::NORMAL
        };
        let family = if style.monospace {
            parley::GenericFamily::Monospace
        } else {
            parley::GenericFamily::SansSerif
        };

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(style.font_size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontWeight(weight));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Single(
            parley::FontFamily::Generic(family),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        // Parley puts y=0 at the top of the layout; shift so the baseline lands on origin.y
        let baseline = layout
            .lines()
            .next()
            .map(|line| f64::from(line.metrics().baseline))
            .unwrap_or(0.0);
        let text_transform = self.transform * Affine::translate((origin.x, origin.y - baseline));

        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
    }
}
