//! Renderer trait and the preview renderer.

use crate::surface::Surface;
use kurbo::{Shape as KurboShape, Stroke};
use peniko::Color;
use sketchboard_core::geometry::{handle_rect, selection_outline};
use sketchboard_core::shapes::{Geometry, Shape, ShapeKind, ShapeStyle};
use sketchboard_core::{Draft, EditorConfig, SceneCache};

/// Default dash pattern for the live preview.
const PREVIEW_DASHES: [f64; 2] = [5.0, 5.0];
/// Default dash pattern for the selection outline.
const SELECTION_DASHES: [f64; 2] = [4.0, 4.0];
/// Stroke width of the selection outline.
const SELECTION_STROKE_WIDTH: f64 = 1.0;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Committed shapes in paint order.
    pub shapes: &'a [Shape],
    /// Shape under construction, if any.
    pub draft: Option<&'a Draft>,
    /// Background color.
    pub background_color: Color,
    /// Color of the dashed preview.
    pub preview_color: Color,
    pub preview_dashes: Vec<f64>,
    /// Selection outline color.
    pub selection_color: Color,
    pub selection_dashes: Vec<f64>,
    /// Fill color of the resize handle.
    pub handle_color: Color,
    /// Gap between a bounding box and its selection outline.
    pub selection_margin: f64,
    /// Half-size of the resize handle square.
    pub handle_half_size: f64,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(shapes: &'a [Shape]) -> Self {
        let config = EditorConfig::default();
        Self {
            shapes,
            draft: None,
            background_color: Color::from_rgba8(255, 255, 255, 255),
            preview_color: Color::from_rgba8(128, 128, 128, 255), // Gray
            preview_dashes: PREVIEW_DASHES.to_vec(),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            selection_dashes: SELECTION_DASHES.to_vec(),
            handle_color: Color::from_rgba8(59, 130, 246, 255),
            selection_margin: config.selection_margin,
            handle_half_size: config.handle_half_size,
        }
    }

    /// Context over everything a scene cache holds.
    pub fn from_scene(scene: &'a SceneCache) -> Self {
        Self::new(scene.shapes())
    }

    /// Set the shape under construction.
    pub fn with_draft(mut self, draft: Option<&'a Draft>) -> Self {
        self.draft = draft;
        self
    }

    /// Take the selection margin and handle size from an editor config.
    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.selection_margin = config.selection_margin;
        self.handle_half_size = config.handle_half_size;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the preview color.
    pub fn with_preview_color(mut self, color: Color) -> Self {
        self.preview_color = color;
        self
    }

    /// Set the preview dash pattern.
    pub fn with_preview_dashes(mut self, dashes: &[f64]) -> Self {
        self.preview_dashes = dashes.to_vec();
        self
    }

    /// Set the selection outline color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Set the selection outline dash pattern.
    pub fn with_selection_dashes(mut self, dashes: &[f64]) -> Self {
        self.selection_dashes = dashes.to_vec();
        self
    }

    /// Set the resize handle color.
    pub fn with_handle_color(mut self, color: Color) -> Self {
        self.handle_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Paint one frame onto `surface`.
    fn build_scene(&mut self, ctx: &RenderContext, surface: &mut dyn Surface);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Draws the committed scene, the selection decoration and the live preview.
#[derive(Debug, Default)]
pub struct PreviewRenderer {
    frames: u64,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames built so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn render_geometry(&self, geometry: &Geometry, style: &ShapeStyle, surface: &mut dyn Surface) {
        let path = geometry.to_path();

        // Fill first, open shapes never fill
        if geometry.kind().is_closed() {
            if let Some(fill_color) = style.fill() {
                surface.fill(&path, fill_color);
            }
        }

        surface.stroke(&path, style.stroke(), &Stroke::new(style.stroke_width));
    }

    fn render_selection(&self, shape: &Shape, ctx: &RenderContext, surface: &mut dyn Surface) {
        let outline = selection_outline(shape, ctx.selection_margin).to_path(0.1);
        let stroke =
            Stroke::new(SELECTION_STROKE_WIDTH).with_dashes(0.0, ctx.selection_dashes.iter().copied());
        surface.stroke(&outline, ctx.selection_color, &stroke);

        let handle = handle_rect(shape, ctx.selection_margin, ctx.handle_half_size).to_path(0.1);
        surface.fill(&handle, ctx.handle_color);
    }

    fn render_draft(&self, draft: &Draft, ctx: &RenderContext, surface: &mut dyn Surface) {
        let path = draft.geometry().to_path();
        if draft.kind == ShapeKind::Freehand {
            // Freehand previews are the stroke itself
            surface.stroke(&path, draft.style.stroke(), &Stroke::new(draft.style.stroke_width));
        } else {
            let stroke = Stroke::new(draft.style.stroke_width)
                .with_dashes(0.0, ctx.preview_dashes.iter().copied());
            surface.stroke(&path, ctx.preview_color, &stroke);
        }
    }
}

impl Renderer for PreviewRenderer {
    fn build_scene(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) {
        surface.clear(self.background_color(ctx));

        // Draw all shapes in paint order
        for shape in ctx.shapes {
            self.render_geometry(shape.geometry(), shape.style(), surface);
        }

        if let Some(selected) = ctx.shapes.iter().find(|shape| shape.is_selected()) {
            self.render_selection(selected, ctx, surface);
        }

        if let Some(draft) = ctx.draft {
            self.render_draft(draft, ctx, surface);
        }

        self.frames += 1;
        log::trace!("Built frame {} ({} shapes)", self.frames, ctx.shapes.len());
    }
}
