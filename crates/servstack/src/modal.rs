use crate::gesture::NavKey;
use derive_more::{AsRef, Deref, Display, From, Into};
use parking_lot::Mutex;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct FocusId(String);

crate::impl_string_newtype!(FocusId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Stop,
    Proceed,
}

/// Extension points a modal's content implements.
pub trait Openable {
    /// Runs after the shell is visible and owns focus.
    fn after_open(&mut self) {}

    /// Runs after the shell hid itself. Content must treat this as forced.
    fn after_close(&mut self) {}

    /// Gets first refusal on keys while open.
    fn handle_key(&mut self, _key: NavKey, _now: Instant) -> Propagation {
        Propagation::Proceed
    }

    /// Where focus lands when the modal opens.
    fn initial_focus(&self) -> Option<FocusId> {
        None
    }

    /// Polled by the host after each interaction; true closes the modal.
    fn take_close_request(&mut self) -> bool {
        false
    }
}

static GLOBAL_SCROLL_LOCK: LazyLock<ScrollLock> = LazyLock::new(ScrollLock::default);

/// Counted lock over page scrolling. Held while any modal is open.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock(Arc<Mutex<usize>>);

impl ScrollLock {
    pub fn global() -> Self {
        GLOBAL_SCROLL_LOCK.clone()
    }

    pub fn acquire(&self) -> ScrollLockGuard {
        *self.0.lock() += 1;
        ScrollLockGuard { lock: self.clone() }
    }

    pub fn is_held(&self) -> bool {
        *self.0.lock() > 0
    }

    pub fn holders(&self) -> usize {
        *self.0.lock()
    }
}

#[derive(Debug)]
pub struct ScrollLockGuard {
    lock: ScrollLock,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let mut holders = self.lock.0.lock();
        *holders = holders.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    None,
    /// The content or the shell consumed the key.
    Consumed,
    MoveFocus(FocusId),
    Closed { restore: Option<FocusId> },
}

#[derive(Debug)]
pub struct ModalShell<C> {
    content: C,
    visible: bool,
    restore_focus: Option<FocusId>,
    focusables: Vec<FocusId>,
    scroll_lock: ScrollLock,
    scroll_guard: Option<ScrollLockGuard>,
}

impl<C: Openable> ModalShell<C> {
    pub fn new(content: C, scroll_lock: ScrollLock) -> Self {
        Self {
            content,
            visible: false,
            restore_focus: None,
            focusables: Vec::new(),
            scroll_lock,
            scroll_guard: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Focus targets inside the dialog, in tab order.
    pub fn set_focusables(&mut self, focusables: Vec<FocusId>) {
        self.focusables = focusables;
    }

    /// Opens the modal. Returns the focus target, or `None` if it was already
    /// open.
    pub fn open(&mut self, previously_focused: Option<FocusId>) -> Option<FocusId> {
        if self.visible {
            return None;
        }
        self.visible = true;
        self.restore_focus = previously_focused;
        self.scroll_guard = Some(self.scroll_lock.acquire());

        let target = self
            .content
            .initial_focus()
            .or_else(|| self.focusables.first().cloned())
            .unwrap_or_else(|| FocusId::from("dialog"));

        self.content.after_open();
        Some(target)
    }

    /// Closes the modal and returns the focus target to restore. `None` means
    /// it was not open.
    pub fn close(&mut self) -> Option<Option<FocusId>> {
        if !self.visible {
            return None;
        }
        self.visible = false;
        self.scroll_guard = None;
        self.content.after_close();
        Some(self.restore_focus.take())
    }

    pub fn toggle(&mut self, previously_focused: Option<FocusId>) -> bool {
        if self.visible {
            self.close();
        } else {
            self.open(previously_focused);
        }
        self.visible
    }

    pub fn backdrop_click(&mut self) -> ShellAction {
        self.close_action()
    }

    /// Routes a key while open: content first, then Escape and the Tab trap.
    pub fn handle_key(
        &mut self,
        key: NavKey,
        shift: bool,
        current: Option<&FocusId>,
        now: Instant,
    ) -> ShellAction {
        if !self.visible {
            return ShellAction::None;
        }
        if self.content.handle_key(key, now) == Propagation::Stop {
            if self.content.take_close_request() {
                return self.close_action();
            }
            return ShellAction::Consumed;
        }

        match key {
            NavKey::Escape => self.close_action(),
            NavKey::Tab => self
                .trap_focus(current, shift)
                .map_or(ShellAction::None, ShellAction::MoveFocus),
            _ => ShellAction::None,
        }
    }

    /// Closes if the content asked for it since the last poll.
    pub fn poll_close_request(&mut self) -> ShellAction {
        if self.visible && self.content.take_close_request() {
            return self.close_action();
        }
        ShellAction::None
    }

    fn close_action(&mut self) -> ShellAction {
        match self.close() {
            Some(restore) => ShellAction::Closed { restore },
            None => ShellAction::None,
        }
    }

    /// Wraps Tab at the ends of the focusable list.
    fn trap_focus(&self, current: Option<&FocusId>, shift: bool) -> Option<FocusId> {
        let (first, last) = (self.focusables.first()?, self.focusables.last()?);
        match (shift, current) {
            (true, Some(c)) if c == first => Some(last.clone()),
            (false, Some(c)) if c == last => Some(first.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        opened: usize,
        closed: usize,
        swallow_escape: bool,
    }

    impl Openable for Probe {
        fn after_open(&mut self) {
            self.opened += 1;
        }

        fn after_close(&mut self) {
            self.closed += 1;
        }

        fn handle_key(&mut self, key: NavKey, _now: Instant) -> Propagation {
            if key == NavKey::Escape && self.swallow_escape {
                self.swallow_escape = false;
                return Propagation::Stop;
            }
            Propagation::Proceed
        }
    }

    fn shell() -> (ModalShell<Probe>, ScrollLock) {
        let lock = ScrollLock::default();
        let mut shell = ModalShell::new(Probe::default(), lock.clone());
        shell.set_focusables(vec![FocusId::from("first"), FocusId::from("last")]);
        (shell, lock)
    }

    #[test]
    fn test_open_close_is_idempotent_and_pairs_scroll_lock() {
        let (mut shell, lock) = shell();
        assert_eq!(shell.open(Some(FocusId::from("trigger"))), Some(FocusId::from("first")));
        assert_eq!(shell.open(None), None);
        assert!(lock.is_held());
        assert_eq!(shell.content().opened, 1);

        assert_eq!(shell.close(), Some(Some(FocusId::from("trigger"))));
        assert_eq!(shell.close(), None);
        assert!(!lock.is_held());
        assert_eq!(shell.content().closed, 1);
    }

    #[test]
    fn test_dropping_open_shell_releases_lock() {
        let (mut shell, lock) = shell();
        shell.open(None);
        assert_eq!(lock.holders(), 1);
        drop(shell);
        assert_eq!(lock.holders(), 0);
    }

    #[test]
    fn test_escape_goes_to_content_first() {
        let (mut shell, _lock) = shell();
        let now = Instant::now();
        shell.open(None);
        shell.content_mut().swallow_escape = true;

        assert_eq!(
            shell.handle_key(NavKey::Escape, false, None, now),
            ShellAction::Consumed
        );
        assert!(shell.is_open());
        assert_eq!(
            shell.handle_key(NavKey::Escape, false, None, now),
            ShellAction::Closed { restore: None }
        );
        assert!(!shell.is_open());
    }

    #[test]
    fn test_tab_wraps_inside_dialog() {
        let (mut shell, _lock) = shell();
        let now = Instant::now();
        shell.open(None);
        let (first, last) = (FocusId::from("first"), FocusId::from("last"));

        assert_eq!(
            shell.handle_key(NavKey::Tab, false, Some(&last), now),
            ShellAction::MoveFocus(first.clone())
        );
        assert_eq!(
            shell.handle_key(NavKey::Tab, true, Some(&first), now),
            ShellAction::MoveFocus(last)
        );
        assert_eq!(
            shell.handle_key(NavKey::Tab, false, Some(&first), now),
            ShellAction::None
        );
    }

    #[test]
    fn test_backdrop_closes() {
        let (mut shell, _lock) = shell();
        shell.open(Some(FocusId::from("nav")));
        assert_eq!(
            shell.backdrop_click(),
            ShellAction::Closed {
                restore: Some(FocusId::from("nav"))
            }
        );
        assert_eq!(shell.backdrop_click(), ShellAction::None);
    }
}
