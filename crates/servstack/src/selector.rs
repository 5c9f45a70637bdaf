use crate::config::StackConfig;
use crate::detail::{CloseReason, DetailPresenter};
use crate::error::{ConfigurationError, StackError};
use crate::gesture::{GestureController, KeyIntent, NavKey, PointerId};
use crate::item::Item;
use crate::listeners::{Channel, ListenerRegistry};
use crate::modal::{Openable, Propagation};
use crate::render::{Anchor, Surface, TransformRenderer, Transition};
use crate::track::TrackModel;
use std::time::Instant;
use strum::IntoEnumIterator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pointer: PointerId, y: f64 },
    PointerMove { pointer: PointerId, y: f64 },
    PointerUp { pointer: PointerId, y: f64 },
    PointerCancel { pointer: PointerId },
    Wheel { delta_y: f64 },
    Key(NavKey),
    /// A click on a specific replicated item.
    ItemActivated(isize),
    DetailCloseClicked,
    DetailBackdropClicked,
    Resized,
}

impl InputEvent {
    pub fn channel(&self) -> Channel {
        match self {
            Self::PointerDown { .. } => Channel::PointerDown,
            Self::PointerMove { .. } => Channel::PointerMove,
            Self::PointerUp { .. } => Channel::PointerUp,
            Self::PointerCancel { .. } => Channel::PointerCancel,
            Self::Wheel { .. } => Channel::Wheel,
            Self::Key(_) => Channel::Keydown,
            Self::ItemActivated(_) => Channel::ItemActivate,
            Self::DetailCloseClicked => Channel::DetailClose,
            Self::DetailBackdropClicked => Channel::DetailBackdrop,
            Self::Resized => Channel::Resize,
        }
    }
}

#[derive(Debug)]
pub struct LoopingStackSelector<S> {
    surface: S,
    config: StackConfig,
    catalogue: Vec<Item>,
    track: Option<TrackModel>,
    gestures: GestureController,
    renderer: TransformRenderer,
    detail: DetailPresenter,
    listeners: ListenerRegistry,
    focused: Option<isize>,
    /// Virtual item the detail panel was opened from.
    opened_on: Option<isize>,
    inert: bool,
}

impl<S: Surface> LoopingStackSelector<S> {
    pub fn new(surface: S, catalogue: Vec<Item>, config: StackConfig) -> Self {
        Self {
            surface,
            gestures: GestureController::new(&config),
            renderer: TransformRenderer::new(&config),
            detail: DetailPresenter::new(config.usp_stagger(), config.detail_focus_delay()),
            config,
            catalogue,
            track: None,
            listeners: ListenerRegistry::new(),
            focused: None,
            opened_on: None,
            inert: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn track(&self) -> Option<&TrackModel> {
        self.track.as_ref()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// True once a build failed; every call is a no-op until [`Self::rebuild`].
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    pub fn detail_open(&self) -> bool {
        self.detail.is_open()
    }

    pub fn item_spacing(&self) -> f64 {
        self.renderer.spacing()
    }

    pub fn focused(&self) -> Option<isize> {
        self.focused
    }

    pub fn current_virtual_index(&self) -> Option<isize> {
        self.track.as_ref().map(TrackModel::current_virtual_index)
    }

    pub fn active_original_index(&self) -> Option<usize> {
        self.track.as_ref().map(TrackModel::active_original_index)
    }

    /// Virtual item under `track_y` at the settled position.
    pub fn hit_test(&self, track_y: f64) -> Option<isize> {
        let track = self.track.as_ref()?;
        self.renderer.hit_test(
            track.current_virtual_index() as f64,
            track_y,
            track.virtual_items().len(),
        )
    }

    /// Virtual item under `track_y` while the track is drawn at `translation`.
    pub fn hit_test_at(&self, track_y: f64, translation: f64) -> Option<isize> {
        let track = self.track.as_ref()?;
        self.renderer
            .hit_test_translated(translation, track_y, track.virtual_items().len())
    }

    /// Builds the track if it does not exist yet.
    pub fn ensure_built(&mut self) -> Result<(), StackError> {
        if self.track.is_some() {
            return Ok(());
        }
        if let Some(anchor) = Anchor::iter().find(|a| !self.surface.has_anchor(*a)) {
            return Err(ConfigurationError::MissingAnchor(anchor).into());
        }
        let track = TrackModel::initialize(self.catalogue.clone(), self.config.cycles)?;
        log::debug!(
            "built stack: {} items x {} cycles",
            track.len(),
            track.cycles()
        );
        self.track = Some(track);
        Ok(())
    }

    /// Host has made the stack visible.
    pub fn on_open(&mut self) {
        if self.inert {
            return;
        }
        if let Err(e) = self.ensure_built() {
            log::warn!("services stack disabled: {}", e);
            self.inert = true;
            return;
        }

        // a close during a slide loses its settle signal
        if let Some(track) = self.track.as_mut()
            && track.normalize()
        {
            log::debug!(
                "normalized virtual index to {} on open",
                track.current_virtual_index()
            );
        }

        Channel::persistent().for_each(|channel| {
            self.listeners.register(channel);
        });
        self.remeasure();
        self.focus_current();
    }

    /// Host has hidden the stack. Forced: no animation, no focus restoration.
    pub fn on_close(&mut self) {
        if let Some(track) = &self.track {
            let target = track.current_virtual_index();
            self.detail
                .close(&mut self.surface, CloseReason::HostClosed, target);
        }
        self.opened_on = None;
        if let Some(drag) = self.gestures.cancel_active() {
            self.surface.release_pointer(drag.pointer);
        }
        self.gestures.reset();
        let removed = self.listeners.teardown();
        log::debug!("services stack closed, {} listeners removed", removed);
    }

    /// Final close: tears everything down. The next open builds a fresh track.
    pub fn teardown(&mut self) {
        self.on_close();
        self.track = None;
        self.focused = None;
        self.detail.invalidate();
    }

    /// Swaps in a new catalogue and tunables, reopening if currently open.
    pub fn rebuild(&mut self, catalogue: Vec<Item>, config: StackConfig) {
        let was_open = !self.listeners.is_empty();
        self.teardown();
        self.gestures = GestureController::new(&config);
        self.renderer = TransformRenderer::new(&config);
        self.detail = DetailPresenter::new(config.usp_stagger(), config.detail_focus_delay());
        self.catalogue = catalogue;
        self.config = config;
        self.inert = false;
        if was_open {
            self.on_open();
        }
    }

    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Propagation {
        if self.inert || self.track.is_none() || !self.listeners.is_registered(event.channel()) {
            return Propagation::Proceed;
        }

        match event {
            InputEvent::PointerDown { pointer, y } => self.press(pointer, y),
            InputEvent::PointerMove { pointer, y } => self.drag_to(pointer, y),
            InputEvent::PointerUp { pointer, y } => self.release(pointer, y),
            InputEvent::PointerCancel { pointer } => self.cancel(pointer),
            InputEvent::Wheel { delta_y } => {
                if let Some(steps) = self.gestures.wheel(delta_y, self.renderer.spacing(), now) {
                    self.commit_step(steps);
                }
                Propagation::Stop
            }
            InputEvent::Key(key) => self.key(key),
            InputEvent::ItemActivated(virtual_index) => self.activate(virtual_index),
            InputEvent::DetailCloseClicked => self.close_detail(CloseReason::CloseButton),
            InputEvent::DetailBackdropClicked => self.close_detail(CloseReason::Backdrop),
            InputEvent::Resized => {
                self.remeasure();
                Propagation::Stop
            }
        }
    }

    /// The surface finished the transition started by the last committed move.
    pub fn transition_end(&mut self) {
        if self.inert || self.gestures.is_dragging() {
            return;
        }
        let Some(track) = self.track.as_mut() else {
            return;
        };

        let before = track.current_virtual_index();
        if !track.normalize() {
            return;
        }
        let after = track.current_virtual_index();
        log::debug!("normalized virtual index {} -> {}", before, after);

        self.renderer
            .render(&mut self.surface, after as f64, Transition::Immediate);
        if self.focused == Some(before) {
            self.focused = Some(after);
            if !self.detail.is_open() {
                self.surface.focus_item(after);
            }
        }
    }

    fn press(&mut self, pointer: PointerId, y: f64) -> Propagation {
        let Some(start) = self.current_virtual_index() else {
            return Propagation::Proceed;
        };
        if !self.gestures.press(pointer, y, start) {
            return Propagation::Proceed;
        }
        self.surface.capture_pointer(pointer);
        for channel in [Channel::PointerMove, Channel::PointerUp, Channel::PointerCancel] {
            self.listeners.register(channel);
        }
        Propagation::Stop
    }

    fn drag_to(&mut self, pointer: PointerId, y: f64) -> Propagation {
        let Some(preview) = self.gestures.preview(pointer, y, self.renderer.spacing()) else {
            return Propagation::Proceed;
        };
        if self.detail.is_open() && self.gestures.drag().is_some_and(|d| d.moved) {
            self.close_detail(CloseReason::Swipe);
        }
        self.renderer
            .render(&mut self.surface, preview, Transition::Immediate);
        Propagation::Stop
    }

    fn release(&mut self, pointer: PointerId, y: f64) -> Propagation {
        let Some(steps) = self.gestures.release(pointer, y, self.renderer.spacing()) else {
            return Propagation::Proceed;
        };
        self.end_drag(pointer);
        if steps != 0 {
            self.commit_step(steps);
        } else {
            self.render_current(Transition::Animated);
        }
        Propagation::Stop
    }

    fn cancel(&mut self, pointer: PointerId) -> Propagation {
        if self.gestures.cancel(pointer).is_none() {
            return Propagation::Proceed;
        }
        self.end_drag(pointer);
        self.render_current(Transition::Animated);
        Propagation::Stop
    }

    fn end_drag(&mut self, pointer: PointerId) {
        self.surface.release_pointer(pointer);
        for channel in [Channel::PointerMove, Channel::PointerUp, Channel::PointerCancel] {
            self.listeners.deregister(channel);
        }
    }

    fn key(&mut self, key: NavKey) -> Propagation {
        match self.gestures.key(key, self.detail.is_open()) {
            KeyIntent::Step(delta) => {
                self.commit_step(delta);
                self.focus_current();
            }
            KeyIntent::First => self.jump_to_original(0),
            KeyIntent::Last => self.jump_to_original(usize::MAX),
            KeyIntent::Activate => {
                let Some(target) = self.focused.or(self.current_virtual_index()) else {
                    return Propagation::Proceed;
                };
                return self.activate(target);
            }
            KeyIntent::CloseDetail => return self.close_detail(CloseReason::Escape),
            KeyIntent::Unhandled => return Propagation::Proceed,
        }
        Propagation::Stop
    }

    fn jump_to_original(&mut self, original_index: usize) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        track.jump_to_original(original_index);
        self.render_current(Transition::Animated);
        self.sync();
        self.focus_current();
    }

    fn activate(&mut self, virtual_index: isize) -> Propagation {
        let Some(track) = self.track.as_mut() else {
            return Propagation::Proceed;
        };
        if track.virtual_item(virtual_index).is_none() {
            return Propagation::Proceed;
        }
        track.jump_to(virtual_index);
        self.focused = Some(virtual_index);
        self.opened_on = Some(virtual_index);
        self.render_current(Transition::Animated);
        self.sync();

        if let Some(track) = &self.track {
            self.detail.open(&mut self.surface, track.active_item());
        }
        Propagation::Stop
    }

    /// Focus goes back to the copy the panel was opened from, even if the
    /// track has since been normalized into another cycle.
    fn close_detail(&mut self, reason: CloseReason) -> Propagation {
        let Some(target) = self.opened_on.or(self.current_virtual_index()) else {
            return Propagation::Proceed;
        };
        if !self.detail.close(&mut self.surface, reason, target) {
            return Propagation::Proceed;
        }
        self.opened_on = None;
        if reason.restores_focus() {
            self.focused = Some(target);
        }
        Propagation::Stop
    }

    fn commit_step(&mut self, delta: isize) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        track.step(delta);
        self.render_current(Transition::Animated);
        self.sync();
    }

    fn focus_current(&mut self) {
        if let Some(current) = self.current_virtual_index() {
            self.focused = Some(current);
            self.surface.focus_item(current);
        }
    }

    fn render_current(&mut self, transition: Transition) {
        if let Some(track) = &self.track {
            let index = track.current_virtual_index() as f64;
            self.renderer.render(&mut self.surface, index, transition);
        }
    }

    fn remeasure(&mut self) {
        let Some(track) = &self.track else {
            return;
        };
        self.renderer.measure(&self.surface, track.len());
        self.render_current(Transition::Immediate);
        self.sync();
    }

    /// Pushes the active item to the surface markers, thumb and panel.
    fn sync(&mut self) {
        let Some(track) = &self.track else {
            return;
        };
        let active = track.active_original_index();
        self.surface.mark_active(active);
        self.renderer
            .update_thumb(&mut self.surface, active, track.len());
        self.detail.sync(&mut self.surface, track.active_item());
    }
}

impl<S: Surface> Openable for LoopingStackSelector<S> {
    fn after_open(&mut self) {
        self.on_open();
    }

    fn after_close(&mut self) {
        self.on_close();
    }

    fn handle_key(&mut self, key: NavKey, now: Instant) -> Propagation {
        self.handle(InputEvent::Key(key), now)
    }
}
