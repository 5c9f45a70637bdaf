use crate::config::StackConfig;
use std::time::{Duration, Instant};
use strum::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

/// Keys the stack reacts to. Parses both DOM `KeyboardEvent.key` values and
/// GDK key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
pub enum NavKey {
    #[strum(to_string = "ArrowUp", serialize = "Up", serialize = "KP_Up")]
    ArrowUp,
    #[strum(to_string = "ArrowDown", serialize = "Down", serialize = "KP_Down")]
    ArrowDown,
    #[strum(to_string = "ArrowLeft", serialize = "Left", serialize = "KP_Left")]
    ArrowLeft,
    #[strum(to_string = "ArrowRight", serialize = "Right", serialize = "KP_Right")]
    ArrowRight,
    #[strum(to_string = "Home", serialize = "KP_Home")]
    Home,
    #[strum(to_string = "End", serialize = "KP_End")]
    End,
    #[strum(to_string = "Enter", serialize = "Return", serialize = "KP_Enter")]
    Enter,
    #[strum(to_string = " ", serialize = "space", serialize = "Space")]
    Space,
    #[strum(to_string = "Escape")]
    Escape,
    #[strum(to_string = "Tab", serialize = "ISO_Left_Tab", serialize = "KP_Tab")]
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    Step(isize),
    First,
    Last,
    Activate,
    CloseDetail,
    Unhandled,
}

/// Rounds a fractional step count, ties to even.
pub fn round_steps(raw: f64) -> isize {
    if !raw.is_finite() {
        return 0;
    }
    raw.round_ties_even() as isize
}

/// Maps a wheel delta to a step count whose magnitude is clamped to
/// `1..=max_steps` in the direction of the delta.
pub fn wheel_steps(delta_y: f64, spacing: f64, max_steps: u32) -> isize {
    if delta_y == 0.0 || !delta_y.is_finite() {
        return 0;
    }
    let magnitude = round_steps((delta_y / spacing).abs()).clamp(1, max_steps.max(1) as isize);
    magnitude * delta_y.signum() as isize
}

/// Drops wheel events that arrive inside the cooldown window.
#[derive(Debug, Clone)]
pub struct WheelGate {
    cooldown: Duration,
    locked_until: Option<Instant>,
}

impl WheelGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            locked_until: None,
        }
    }

    /// Returns true and starts a new window if the gate is open at `now`.
    pub fn try_pass(&mut self, now: Instant) -> bool {
        if self.locked_until.is_some_and(|until| now < until) {
            return false;
        }
        self.locked_until = Some(now + self.cooldown);
        true
    }

    pub fn is_locked(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    pub fn reset(&mut self) {
        self.locked_until = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer: PointerId,
    pub start_y: f64,
    pub start_index: isize,
    pub moved: bool,
}

impl DragSession {
    fn displacement(&self, y: f64, spacing: f64) -> f64 {
        -(y - self.start_y) / spacing
    }
}

#[derive(Debug, Clone)]
pub struct GestureController {
    drag: Option<DragSession>,
    wheel: WheelGate,
    max_wheel_steps: u32,
}

impl GestureController {
    pub fn new(config: &StackConfig) -> Self {
        Self {
            drag: None,
            wheel: WheelGate::new(config.wheel_cooldown()),
            max_wheel_steps: config.max_wheel_steps,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Starts a drag. Ignored while another pointer owns the gesture.
    pub fn press(&mut self, pointer: PointerId, y: f64, start_index: isize) -> bool {
        if self.drag.is_some() {
            return false;
        }
        self.drag = Some(DragSession {
            pointer,
            start_y: y,
            start_index,
            moved: false,
        });
        true
    }

    /// Fractional index to preview while dragging. Never commits.
    pub fn preview(&mut self, pointer: PointerId, y: f64, spacing: f64) -> Option<f64> {
        let drag = self.drag.as_mut().filter(|d| d.pointer == pointer)?;
        if y != drag.start_y {
            drag.moved = true;
        }
        Some(drag.start_index as f64 + drag.displacement(y, spacing))
    }

    /// Ends the drag and returns the whole number of steps to commit.
    pub fn release(&mut self, pointer: PointerId, y: f64, spacing: f64) -> Option<isize> {
        let drag = self.take(pointer)?;
        Some(round_steps(drag.displacement(y, spacing)))
    }

    pub fn cancel(&mut self, pointer: PointerId) -> Option<DragSession> {
        self.take(pointer)
    }

    /// Ends whatever drag is in progress, regardless of pointer.
    pub fn cancel_active(&mut self) -> Option<DragSession> {
        self.drag.take()
    }

    fn take(&mut self, pointer: PointerId) -> Option<DragSession> {
        match self.drag {
            Some(d) if d.pointer == pointer => self.drag.take(),
            _ => None,
        }
    }

    /// Steps for a wheel event, or `None` if it was gated or carried no direction.
    pub fn wheel(&mut self, delta_y: f64, spacing: f64, now: Instant) -> Option<isize> {
        let steps = wheel_steps(delta_y, spacing, self.max_wheel_steps);
        if steps == 0 || !self.wheel.try_pass(now) {
            return None;
        }
        Some(steps)
    }

    pub fn key(&self, key: NavKey, detail_open: bool) -> KeyIntent {
        match key {
            NavKey::ArrowDown | NavKey::ArrowRight => KeyIntent::Step(1),
            NavKey::ArrowUp | NavKey::ArrowLeft => KeyIntent::Step(-1),
            NavKey::Home => KeyIntent::First,
            NavKey::End => KeyIntent::Last,
            NavKey::Enter | NavKey::Space => KeyIntent::Activate,
            NavKey::Escape if detail_open => KeyIntent::CloseDetail,
            NavKey::Escape | NavKey::Tab => KeyIntent::Unhandled,
        }
    }

    pub fn reset(&mut self) {
        self.drag = None;
        self.wheel.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> GestureController {
        GestureController::new(&StackConfig::default())
    }

    #[test]
    fn test_wheel_step_counts() {
        assert_eq!(wheel_steps(250.0, 100.0, 3), 2);
        assert_eq!(wheel_steps(40.0, 100.0, 3), 1);
        assert_eq!(wheel_steps(-900.0, 100.0, 3), -3);
        assert_eq!(wheel_steps(-120.0, 100.0, 3), -1);
        assert_eq!(wheel_steps(0.0, 100.0, 3), 0);
    }

    #[test]
    fn test_wheel_cooldown_drops_events() {
        let mut gestures = controller();
        let t0 = Instant::now();
        assert_eq!(gestures.wheel(250.0, 100.0, t0), Some(2));
        assert_eq!(gestures.wheel(100.0, 100.0, t0 + Duration::from_millis(50)), None);
        assert_eq!(gestures.wheel(100.0, 100.0, t0 + Duration::from_millis(179)), None);
        assert_eq!(
            gestures.wheel(-100.0, 100.0, t0 + Duration::from_millis(180)),
            Some(-1)
        );
    }

    #[test]
    fn test_zero_wheel_delta_does_not_lock() {
        let mut gestures = controller();
        let t0 = Instant::now();
        assert_eq!(gestures.wheel(0.0, 100.0, t0), None);
        assert_eq!(gestures.wheel(100.0, 100.0, t0), Some(1));
    }

    #[test]
    fn test_drag_preview_and_commit() {
        let mut gestures = controller();
        let pointer = PointerId(1);
        assert!(gestures.press(pointer, 300.0, 5));
        assert!(!gestures.press(PointerId(2), 10.0, 5));

        let preview = gestures.preview(pointer, 250.0, 100.0).unwrap();
        assert!((preview - 5.5).abs() < 1e-9);
        assert!(gestures.drag().unwrap().moved);
        assert_eq!(gestures.preview(PointerId(2), 250.0, 100.0), None);

        assert_eq!(gestures.release(pointer, 220.0, 100.0), Some(1));
        assert!(!gestures.is_dragging());
    }

    #[test]
    fn test_short_drag_rounds_to_zero() {
        let mut gestures = controller();
        gestures.press(PointerId(1), 300.0, 5);
        assert_eq!(gestures.release(PointerId(1), 330.0, 100.0), Some(0));
    }

    #[test]
    fn test_cancel_ends_only_matching_pointer() {
        let mut gestures = controller();
        gestures.press(PointerId(1), 0.0, 0);
        assert!(gestures.cancel(PointerId(9)).is_none());
        assert!(gestures.cancel(PointerId(1)).is_some());
        assert!(!gestures.is_dragging());
    }

    #[test]
    fn test_key_names_parse() {
        let cases = [
            ("ArrowDown", NavKey::ArrowDown),
            ("Down", NavKey::ArrowDown),
            ("Return", NavKey::Enter),
            ("space", NavKey::Space),
            (" ", NavKey::Space),
            ("ISO_Left_Tab", NavKey::Tab),
            ("Escape", NavKey::Escape),
        ];
        for (name, expected) in cases {
            assert_eq!(name.parse::<NavKey>().unwrap(), expected);
        }
        assert!("F5".parse::<NavKey>().is_err());
    }

    #[test]
    fn test_key_intents() {
        let gestures = controller();
        assert_eq!(gestures.key(NavKey::ArrowRight, false), KeyIntent::Step(1));
        assert_eq!(gestures.key(NavKey::ArrowUp, false), KeyIntent::Step(-1));
        assert_eq!(gestures.key(NavKey::Space, false), KeyIntent::Activate);
        assert_eq!(gestures.key(NavKey::Escape, true), KeyIntent::CloseDetail);
        assert_eq!(gestures.key(NavKey::Escape, false), KeyIntent::Unhandled);
    }
}
