use crate::config::StackConfig;
use crate::detail::DetailContent;
use crate::gesture::PointerId;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter};

/// Elements the surface must provide before the stack can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, StrumDisplay)]
pub enum Anchor {
    Track,
    Viewport,
    DetailPanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Animated,
    /// Applied with transitions disabled for exactly one layout pass.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbGeometry {
    pub size_percent: f64,
    pub offset_percent: f64,
}

/// Capabilities the stack needs from whatever draws it.
pub trait Surface {
    fn has_anchor(&self, anchor: Anchor) -> bool;

    // track
    fn set_translation(&mut self, offset: f64);
    fn set_transitions_enabled(&mut self, enabled: bool);
    /// Forces pending style changes through a layout pass.
    fn flush_layout(&mut self);
    /// Distance between the origins of the first two items, if there are two.
    fn measure_spacing(&self) -> Option<f64>;
    fn item_extent(&self) -> Option<f64>;
    fn viewport_extent(&self) -> f64;
    fn set_thumb(&mut self, thumb: Option<ThumbGeometry>);
    fn mark_active(&mut self, original_index: usize);
    fn focus_item(&mut self, virtual_index: isize);
    fn capture_pointer(&mut self, pointer: PointerId);
    fn release_pointer(&mut self, pointer: PointerId);
    fn request_frame(&mut self);

    // detail panel
    fn render_detail(&mut self, content: &DetailContent);
    fn set_detail_visible(&mut self, visible: bool, transition: Transition);
    fn focus_detail_close(&mut self, delay: Duration);
}

/// Turns a (possibly fractional) virtual index into a track offset and keeps
/// the scroll thumb in step with it.
#[derive(Debug, Clone)]
pub struct TransformRenderer {
    spacing: f64,
    viewport: f64,
    thumb_min_ratio: f64,
    single_item_gutter: f64,
    fallback_spacing: f64,
}

impl TransformRenderer {
    pub fn new(config: &StackConfig) -> Self {
        Self {
            spacing: config.fallback_spacing,
            viewport: 0.0,
            thumb_min_ratio: config.thumb_min_ratio,
            single_item_gutter: config.single_item_gutter,
            fallback_spacing: config.fallback_spacing,
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    /// Re-reads spacing and viewport size from the surface.
    pub fn measure<S: Surface>(&mut self, surface: &S, item_count: usize) {
        let measured = if item_count > 1 {
            surface.measure_spacing()
        } else {
            surface
                .item_extent()
                .map(|height| height + self.single_item_gutter)
        };

        self.spacing = match measured {
            Some(spacing) if spacing.is_finite() && spacing > 0.0 => spacing,
            other => {
                log::warn!(
                    "unusable item spacing {:?}, falling back to {}",
                    other,
                    self.fallback_spacing
                );
                self.fallback_spacing
            }
        };
        self.viewport = surface.viewport_extent().max(0.0);
    }

    pub fn offset_for(&self, index: f64) -> f64 {
        -(self.spacing * index)
    }

    pub fn render<S: Surface>(&self, surface: &mut S, index: f64, transition: Transition) {
        let offset = self.offset_for(index);
        match transition {
            Transition::Animated => surface.set_translation(offset),
            Transition::Immediate => {
                surface.set_transitions_enabled(false);
                surface.set_translation(offset);
                surface.flush_layout();
                surface.set_transitions_enabled(true);
            }
        }
    }

    /// Thumb size and position for the active item, or `None` when the whole
    /// catalogue fits in the viewport.
    pub fn thumb_geometry(&self, active_original: usize, item_count: usize) -> Option<ThumbGeometry> {
        let total = self.spacing * item_count as f64;
        if item_count <= 1 || total <= self.viewport {
            return None;
        }

        let ratio = (self.viewport / total).max(self.thumb_min_ratio);
        let size_percent = ratio * 100.0;
        let progress = active_original as f64 / (item_count - 1) as f64;
        Some(ThumbGeometry {
            size_percent,
            offset_percent: progress * (100.0 - size_percent),
        })
    }

    pub fn update_thumb<S: Surface>(&self, surface: &mut S, active_original: usize, item_count: usize) {
        surface.set_thumb(self.thumb_geometry(active_original, item_count));
    }

    /// Virtual index of the item under `track_y`, measured from the track origin
    /// before translation, while the track sits at `index`.
    pub fn hit_test(&self, index: f64, track_y: f64, virtual_len: usize) -> Option<isize> {
        self.hit_test_translated(self.offset_for(index), track_y, virtual_len)
    }

    /// Same as [`Self::hit_test`] but against the translation currently on
    /// screen, which differs from the settled one mid-slide.
    pub fn hit_test_translated(&self, translation: f64, track_y: f64, virtual_len: usize) -> Option<isize> {
        let position = (track_y - translation) / self.spacing;
        if !position.is_finite() || position < 0.0 {
            return None;
        }
        let virtual_index = position.floor() as usize;
        (virtual_index < virtual_len).then_some(virtual_index as isize)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every call so tests can assert on ordering.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub missing: Vec<Anchor>,
        pub spacing: Option<f64>,
        pub item_extent: Option<f64>,
        pub viewport: f64,
        pub calls: Vec<Call>,
        pub translation: f64,
        pub transitions_enabled: bool,
        pub thumb: Option<ThumbGeometry>,
        pub active: Option<usize>,
        pub focused: Option<isize>,
        pub captured: Option<PointerId>,
        pub detail: Option<DetailContent>,
        pub detail_visible: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Translate(f64),
        Transitions(bool),
        Flush,
        Focus(isize),
        Capture(PointerId),
        Release(PointerId),
        Frame,
        DetailVisible(bool, Transition),
        FocusClose,
    }

    impl RecordingSurface {
        pub fn with_spacing(spacing: f64) -> Self {
            Self {
                spacing: Some(spacing),
                item_extent: Some(spacing - 12.0),
                viewport: 300.0,
                transitions_enabled: true,
                ..Default::default()
            }
        }

        pub fn take_calls(&mut self) -> Vec<Call> {
            std::mem::take(&mut self.calls)
        }
    }

    impl Surface for RecordingSurface {
        fn has_anchor(&self, anchor: Anchor) -> bool {
            !self.missing.contains(&anchor)
        }

        fn set_translation(&mut self, offset: f64) {
            self.translation = offset;
            self.calls.push(Call::Translate(offset));
        }

        fn set_transitions_enabled(&mut self, enabled: bool) {
            self.transitions_enabled = enabled;
            self.calls.push(Call::Transitions(enabled));
        }

        fn flush_layout(&mut self) {
            self.calls.push(Call::Flush);
        }

        fn measure_spacing(&self) -> Option<f64> {
            self.spacing
        }

        fn item_extent(&self) -> Option<f64> {
            self.item_extent
        }

        fn viewport_extent(&self) -> f64 {
            self.viewport
        }

        fn set_thumb(&mut self, thumb: Option<ThumbGeometry>) {
            self.thumb = thumb;
        }

        fn mark_active(&mut self, original_index: usize) {
            self.active = Some(original_index);
        }

        fn focus_item(&mut self, virtual_index: isize) {
            self.focused = Some(virtual_index);
            self.calls.push(Call::Focus(virtual_index));
        }

        fn capture_pointer(&mut self, pointer: PointerId) {
            self.captured = Some(pointer);
            self.calls.push(Call::Capture(pointer));
        }

        fn release_pointer(&mut self, pointer: PointerId) {
            if self.captured == Some(pointer) {
                self.captured = None;
            }
            self.calls.push(Call::Release(pointer));
        }

        fn request_frame(&mut self) {
            self.calls.push(Call::Frame);
        }

        fn render_detail(&mut self, content: &DetailContent) {
            self.detail = Some(content.clone());
        }

        fn set_detail_visible(&mut self, visible: bool, transition: Transition) {
            self.detail_visible = visible;
            self.calls.push(Call::DetailVisible(visible, transition));
        }

        fn focus_detail_close(&mut self, _delay: Duration) {
            self.calls.push(Call::FocusClose);
        }
    }

    fn renderer_for(surface: &RecordingSurface, items: usize) -> TransformRenderer {
        let mut renderer = TransformRenderer::new(&StackConfig::default());
        renderer.measure(surface, items);
        renderer
    }

    #[test]
    fn test_immediate_render_disables_transitions_for_one_pass() {
        let mut surface = RecordingSurface::with_spacing(100.0);
        let renderer = renderer_for(&surface, 5);
        renderer.render(&mut surface, 5.0, Transition::Immediate);
        assert_eq!(
            surface.take_calls(),
            vec![
                Call::Transitions(false),
                Call::Translate(-500.0),
                Call::Flush,
                Call::Transitions(true),
            ]
        );

        renderer.render(&mut surface, 6.5, Transition::Animated);
        assert_eq!(surface.take_calls(), vec![Call::Translate(-650.0)]);
    }

    #[test]
    fn test_single_item_spacing_uses_gutter() {
        let mut surface = RecordingSurface::with_spacing(100.0);
        surface.spacing = None;
        surface.item_extent = Some(80.0);
        assert_eq!(renderer_for(&surface, 1).spacing(), 92.0);
    }

    #[test]
    fn test_zero_spacing_falls_back() {
        let mut surface = RecordingSurface::with_spacing(100.0);
        surface.spacing = Some(0.0);
        let renderer = renderer_for(&surface, 3);
        assert_eq!(renderer.spacing(), StackConfig::default().fallback_spacing);

        surface.spacing = None;
        surface.item_extent = None;
        assert_eq!(
            renderer_for(&surface, 1).spacing(),
            StackConfig::default().fallback_spacing
        );
    }

    #[test]
    fn test_thumb_geometry() {
        let surface = RecordingSurface::with_spacing(100.0);
        let renderer = renderer_for(&surface, 5);

        // viewport 300 / total 500
        let first = renderer.thumb_geometry(0, 5).unwrap();
        assert!((first.size_percent - 60.0).abs() < 1e-9);
        assert_eq!(first.offset_percent, 0.0);

        let last = renderer.thumb_geometry(4, 5).unwrap();
        assert!((last.offset_percent - 40.0).abs() < 1e-9);

        assert!(renderer.thumb_geometry(0, 1).is_none());
        assert!(renderer.thumb_geometry(0, 3).is_none());
    }

    #[test]
    fn test_thumb_respects_minimum_ratio() {
        let mut surface = RecordingSurface::with_spacing(100.0);
        surface.viewport = 50.0;
        let renderer = renderer_for(&surface, 40);
        let thumb = renderer.thumb_geometry(20, 40).unwrap();
        assert!((thumb.size_percent - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_accounts_for_translation() {
        let surface = RecordingSurface::with_spacing(100.0);
        let renderer = renderer_for(&surface, 5);
        assert_eq!(renderer.hit_test(5.0, 10.0, 15), Some(5));
        assert_eq!(renderer.hit_test(5.0, 250.0, 15), Some(7));
        assert_eq!(renderer.hit_test(0.0, -10.0, 15), None);
        assert_eq!(renderer.hit_test(14.0, 150.0, 15), None);
    }

    #[test]
    fn test_hit_test_mid_slide_uses_displayed_translation() {
        let surface = RecordingSurface::with_spacing(100.0);
        let renderer = renderer_for(&surface, 5);
        // settled at 8, still drawn halfway between 5 and 8
        assert_eq!(renderer.hit_test(8.0, 10.0, 15), Some(8));
        assert_eq!(renderer.hit_test_translated(-650.0, 10.0, 15), Some(6));
        assert_eq!(renderer.hit_test_translated(-650.0, -60.0, 15), Some(5));
    }
}
