use super::{
    CLOSE_BUTTON_SIZE, DETAIL_FADE_MS, DETAIL_PADDING, DETAIL_WIDTH, ITEM_GAP, ITEM_HEIGHT, Rect,
    THUMB_GAP, TRACK_MARGIN, TRACK_WIDTH, USP_FADE_MS, USP_LINE_HEIGHT,
};
use servstack::detail::{DetailContent, UspEntry};
use servstack::gesture::PointerId;
use servstack::render::{Anchor, Surface, ThumbGeometry, Transition};
use std::time::{Duration, Instant};

/// Time-based tween toward a target value.
#[derive(Debug, Clone)]
pub struct SnapAnimator {
    active: bool,
    start: f64,
    target: f64,
    started_at: Instant,
    duration: Duration,
}

impl Default for SnapAnimator {
    fn default() -> Self {
        Self {
            active: false,
            start: 0.0,
            target: 0.0,
            started_at: Instant::now(),
            duration: Duration::from_millis(350),
        }
    }
}

impl SnapAnimator {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn start(&mut self, current: f64, target: f64, duration: Duration, now: Instant) {
        self.active = true;
        self.start = current;
        self.target = target;
        self.started_at = now;
        self.duration = duration;
    }

    /// Next value while animating. The final tick yields the target and
    /// deactivates the animator.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        if !self.active {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.duration {
            self.active = false;
            return Some(self.target);
        }
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        Some(self.start + (self.target - self.start) * ease_out_cubic(t))
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameUpdate {
    pub redraw: bool,
    /// The track translation animation finished during this frame.
    pub settled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailHit {
    CloseButton,
    Card,
    Backdrop,
}

/// Cairo-backed stack surface. Holds everything the draw function needs and
/// is advanced once per frame clock tick.
#[derive(Debug)]
pub struct CairoSurface {
    width: f64,
    height: f64,
    translation: f64,
    transitions_enabled: bool,
    transition: Duration,
    slide: SnapAnimator,
    thumb: Option<ThumbGeometry>,
    active: Option<usize>,
    focused: Option<isize>,
    captured: Option<PointerId>,
    detail: Option<DetailContent>,
    detail_visible: bool,
    detail_opacity: f64,
    fade: SnapAnimator,
    reveal_requested: bool,
    revealed_at: Option<Instant>,
    close_focus_at: Option<Instant>,
    close_focused: bool,
    dirty: bool,
}

impl CairoSurface {
    pub fn new(transition: Duration) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            translation: 0.0,
            transitions_enabled: true,
            transition,
            slide: SnapAnimator::default(),
            thumb: None,
            active: None,
            focused: None,
            captured: None,
            detail: None,
            detail_visible: false,
            detail_opacity: 0.0,
            fade: SnapAnimator::default(),
            reveal_requested: false,
            revealed_at: None,
            close_focus_at: None,
            close_focused: false,
            dirty: true,
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    pub fn set_transition(&mut self, transition: Duration) {
        self.transition = transition;
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn translation(&self) -> f64 {
        self.translation
    }

    pub fn thumb(&self) -> Option<ThumbGeometry> {
        self.thumb
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn focused(&self) -> Option<isize> {
        self.focused
    }

    pub fn captured(&self) -> Option<PointerId> {
        self.captured
    }

    pub fn detail(&self) -> Option<&DetailContent> {
        self.detail.as_ref()
    }

    pub fn detail_opacity(&self) -> f64 {
        self.detail_opacity
    }

    pub fn close_focused(&self) -> bool {
        self.close_focused
    }

    /// Screen y of the track origin. The current item sits here once settled.
    pub fn track_origin(&self) -> f64 {
        ((self.height - ITEM_HEIGHT) / 2.0).max(0.0)
    }

    pub fn to_track_y(&self, y: f64) -> f64 {
        y - self.track_origin()
    }

    pub fn item_rect(&self, virtual_index: isize) -> Rect {
        let y = self.track_origin() + self.translation + virtual_index as f64 * (ITEM_HEIGHT + ITEM_GAP);
        Rect::new(TRACK_MARGIN, y, TRACK_WIDTH, ITEM_HEIGHT)
    }

    pub fn track_column(&self) -> Rect {
        Rect::new(TRACK_MARGIN, 0.0, TRACK_WIDTH, self.height)
    }

    pub fn thumb_rail(&self) -> Rect {
        let inset = self.height * 0.15;
        Rect::new(
            TRACK_MARGIN + TRACK_WIDTH + THUMB_GAP,
            inset,
            super::THUMB_WIDTH,
            (self.height - inset * 2.0).max(0.0),
        )
    }

    pub fn detail_card(&self) -> Rect {
        let usp_count = self.detail.as_ref().map_or(0, |d| d.usps.len());
        let height = DETAIL_PADDING * 2.0 + 120.0 + usp_count as f64 * USP_LINE_HEIGHT;
        let x = TRACK_MARGIN + TRACK_WIDTH + THUMB_GAP * 3.0;
        let width = DETAIL_WIDTH.min((self.width - x - TRACK_MARGIN).max(DETAIL_WIDTH / 2.0));
        Rect::new(x, (self.height - height) / 2.0, width, height)
    }

    pub fn close_button(&self) -> Rect {
        let card = self.detail_card();
        Rect::new(
            card.x + card.width - DETAIL_PADDING / 2.0 - CLOSE_BUTTON_SIZE,
            card.y + DETAIL_PADDING / 2.0,
            CLOSE_BUTTON_SIZE,
            CLOSE_BUTTON_SIZE,
        )
    }

    /// Classifies a click against the open detail panel. Clicks on the track
    /// column are left to the stack.
    pub fn detail_hit(&self, x: f64, y: f64) -> Option<DetailHit> {
        if !self.detail_visible {
            return None;
        }
        if self.close_button().contains(x, y) {
            Some(DetailHit::CloseButton)
        } else if self.detail_card().contains(x, y) {
            Some(DetailHit::Card)
        } else if self.track_column().contains(x, y) {
            None
        } else {
            Some(DetailHit::Backdrop)
        }
    }

    /// Opacity of a staggered selling point at `now`.
    pub fn usp_alpha(&self, entry: &UspEntry, now: Instant) -> f64 {
        let Some(revealed_at) = self.revealed_at else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(revealed_at);
        let Some(shown_for) = elapsed.checked_sub(entry.delay) else {
            return 0.0;
        };
        (shown_for.as_secs_f64() / Duration::from_millis(USP_FADE_MS).as_secs_f64()).clamp(0.0, 1.0)
    }

    fn revealing(&self, now: Instant) -> bool {
        self.detail
            .as_ref()
            .and_then(|d| d.usps.last())
            .is_some_and(|last| self.revealed_at.is_some() && self.usp_alpha(last, now) < 1.0)
    }

    /// Steps animations to `now`.
    pub fn advance(&mut self, now: Instant) -> FrameUpdate {
        let mut update = FrameUpdate {
            redraw: std::mem::take(&mut self.dirty),
            settled: false,
        };

        if let Some(value) = self.slide.tick(now) {
            self.translation = value;
            update.redraw = true;
            update.settled = !self.slide.is_active();
        }

        if let Some(value) = self.fade.tick(now) {
            self.detail_opacity = value;
            update.redraw = true;
        }

        if std::mem::take(&mut self.reveal_requested) {
            self.revealed_at = Some(now);
            update.redraw = true;
        }
        if self.revealing(now) {
            update.redraw = true;
        }

        if let Some(at) = self.close_focus_at
            && now >= at
        {
            self.close_focus_at = None;
            self.close_focused = self.detail_visible;
            update.redraw = true;
        }

        update
    }
}

impl Surface for CairoSurface {
    fn has_anchor(&self, _anchor: Anchor) -> bool {
        // every anchor is painted by the same drawing area
        true
    }

    fn set_translation(&mut self, offset: f64) {
        if self.transitions_enabled {
            self.slide
                .start(self.translation, offset, self.transition, Instant::now());
        } else {
            self.slide.cancel();
            self.translation = offset;
        }
        self.dirty = true;
    }

    fn set_transitions_enabled(&mut self, enabled: bool) {
        self.transitions_enabled = enabled;
    }

    fn flush_layout(&mut self) {
        self.dirty = true;
    }

    fn measure_spacing(&self) -> Option<f64> {
        Some(ITEM_HEIGHT + ITEM_GAP)
    }

    fn item_extent(&self) -> Option<f64> {
        Some(ITEM_HEIGHT)
    }

    fn viewport_extent(&self) -> f64 {
        self.height
    }

    fn set_thumb(&mut self, thumb: Option<ThumbGeometry>) {
        self.thumb = thumb;
        self.dirty = true;
    }

    fn mark_active(&mut self, original_index: usize) {
        self.active = Some(original_index);
        self.dirty = true;
    }

    fn focus_item(&mut self, virtual_index: isize) {
        self.focused = Some(virtual_index);
        self.close_focused = false;
        self.dirty = true;
    }

    fn capture_pointer(&mut self, pointer: PointerId) {
        self.captured = Some(pointer);
    }

    fn release_pointer(&mut self, pointer: PointerId) {
        if self.captured == Some(pointer) {
            self.captured = None;
        }
    }

    fn request_frame(&mut self) {
        self.reveal_requested = true;
    }

    fn render_detail(&mut self, content: &DetailContent) {
        self.detail = Some(content.clone());
        self.revealed_at = None;
        self.dirty = true;
    }

    fn set_detail_visible(&mut self, visible: bool, transition: Transition) {
        self.detail_visible = visible;
        let target = if visible { 1.0 } else { 0.0 };
        match transition {
            Transition::Animated => self.fade.start(
                self.detail_opacity,
                target,
                Duration::from_millis(DETAIL_FADE_MS),
                Instant::now(),
            ),
            Transition::Immediate => {
                self.fade.cancel();
                self.detail_opacity = target;
            }
        }
        if !visible {
            self.close_focus_at = None;
            self.close_focused = false;
        }
        self.dirty = true;
    }

    fn focus_detail_close(&mut self, delay: Duration) {
        self.close_focus_at = Some(Instant::now() + delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> CairoSurface {
        let mut surface = CairoSurface::new(Duration::from_millis(350));
        surface.set_viewport(960.0, 640.0);
        surface
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    fn content(usps: usize) -> DetailContent {
        DetailContent {
            original_index: 0,
            icon: "✦".into(),
            title: "Design".into(),
            usps: (0..usps)
                .map(|i| UspEntry {
                    text: format!("usp {i}"),
                    delay: Duration::from_millis(70) * i as u32,
                })
                .collect(),
        }
    }

    #[test]
    fn test_animator_eases_to_target() {
        let mut animator = SnapAnimator::default();
        let t0 = Instant::now();
        animator.start(0.0, -100.0, Duration::from_millis(100), t0);

        let mid = animator.tick(t0 + Duration::from_millis(50)).unwrap();
        assert!(mid < -50.0 && mid > -100.0);
        assert!(animator.is_active());

        assert_eq!(animator.tick(t0 + Duration::from_millis(100)), Some(-100.0));
        assert!(!animator.is_active());
        assert_eq!(animator.tick(t0 + Duration::from_millis(150)), None);
    }

    #[test]
    fn test_animated_translation_settles() {
        let mut surface = surface();
        surface.advance(Instant::now());

        surface.set_translation(-480.0);
        let update = surface.advance(later());
        assert!(update.redraw);
        assert!(update.settled);
        assert_eq!(surface.translation(), -480.0);

        assert_eq!(surface.advance(later()), FrameUpdate::default());
    }

    #[test]
    fn test_immediate_translation_never_settles() {
        let mut surface = surface();
        surface.set_translation(-96.0);
        surface.set_transitions_enabled(false);
        surface.set_translation(-480.0);
        surface.set_transitions_enabled(true);
        assert_eq!(surface.translation(), -480.0);

        let update = surface.advance(later());
        assert!(update.redraw);
        assert!(!update.settled);
    }

    #[test]
    fn test_usps_reveal_after_frame() {
        let mut surface = surface();
        surface.render_detail(&content(3));
        let entries = surface.detail().unwrap().usps.clone();
        let t0 = Instant::now();
        assert_eq!(surface.usp_alpha(&entries[0], t0), 0.0);

        surface.request_frame();
        surface.advance(t0);
        assert_eq!(surface.usp_alpha(&entries[0], t0 + Duration::from_millis(500)), 1.0);
        assert_eq!(surface.usp_alpha(&entries[2], t0 + Duration::from_millis(100)), 0.0);
        assert!(surface.advance(t0 + Duration::from_millis(100)).redraw);
    }

    #[test]
    fn test_close_button_focus_waits_for_delay() {
        let mut surface = surface();
        surface.render_detail(&content(1));
        surface.set_detail_visible(true, Transition::Animated);
        surface.focus_detail_close(Duration::from_millis(100));
        assert!(!surface.close_focused());

        surface.advance(later());
        assert!(surface.close_focused());
        assert_eq!(surface.detail_opacity(), 1.0);

        surface.set_detail_visible(false, Transition::Immediate);
        assert!(!surface.close_focused());
        assert_eq!(surface.detail_opacity(), 0.0);
    }

    #[test]
    fn test_detail_hit_regions() {
        let mut surface = surface();
        surface.render_detail(&content(2));
        assert_eq!(surface.detail_hit(900.0, 20.0), None);

        surface.set_detail_visible(true, Transition::Immediate);
        let close = surface.close_button();
        let card = surface.detail_card();
        assert_eq!(
            surface.detail_hit(close.x + 1.0, close.y + 1.0),
            Some(DetailHit::CloseButton)
        );
        assert_eq!(
            surface.detail_hit(card.x + 4.0, card.y + card.height - 4.0),
            Some(DetailHit::Card)
        );
        assert_eq!(surface.detail_hit(TRACK_MARGIN + 10.0, 320.0), None);
        assert_eq!(surface.detail_hit(955.0, 5.0), Some(DetailHit::Backdrop));
    }

    #[test]
    fn test_track_coordinates() {
        let surface = surface();
        assert_eq!(surface.track_origin(), (640.0 - ITEM_HEIGHT) / 2.0);
        assert_eq!(surface.to_track_y(surface.track_origin() + 10.0), 10.0);
        assert_eq!(surface.item_rect(2).y, surface.track_origin() + 2.0 * 96.0);
    }
}
