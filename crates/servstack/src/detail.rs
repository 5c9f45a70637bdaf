use crate::item::{Glyph, Item, ItemLabel};
use crate::render::{Surface, Transition};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UspEntry {
    pub text: String,
    /// Reveal delay relative to the panel content appearing.
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailContent {
    pub original_index: usize,
    pub icon: Glyph,
    pub title: ItemLabel,
    pub usps: Vec<UspEntry>,
}

impl DetailContent {
    pub fn for_item(item: &Item, stagger: Duration) -> Self {
        Self {
            original_index: item.original_index(),
            icon: item.icon.clone(),
            title: item.label.clone(),
            usps: item
                .usps
                .iter()
                .zip(0u32..)
                .map(|(usp, i)| UspEntry {
                    text: usp.clone(),
                    delay: stagger * i,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    Escape,
    Backdrop,
    /// A drag started moving the track.
    Swipe,
    /// The host modal closed underneath the panel.
    HostClosed,
}

impl CloseReason {
    pub fn restores_focus(self) -> bool {
        matches!(self, Self::CloseButton | Self::Escape | Self::Backdrop)
    }

    fn transition(self) -> Transition {
        match self {
            Self::HostClosed => Transition::Immediate,
            _ => Transition::Animated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone)]
pub struct DetailPresenter {
    state: DetailState,
    stagger: Duration,
    focus_delay: Duration,
    rendered: Option<usize>,
}

impl DetailPresenter {
    pub fn new(stagger: Duration, focus_delay: Duration) -> Self {
        Self {
            state: DetailState::Closed,
            stagger,
            focus_delay,
            rendered: None,
        }
    }

    pub fn state(&self) -> DetailState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DetailState::Open
    }

    /// Original index whose content is currently in the panel.
    pub fn rendered(&self) -> Option<usize> {
        self.rendered
    }

    /// Forgets the rendered content so the next sync repaints it.
    pub fn invalidate(&mut self) {
        self.rendered = None;
    }

    /// Replaces the panel content. Does not change visibility.
    pub fn render<S: Surface>(&mut self, surface: &mut S, item: &Item) {
        let content = DetailContent::for_item(item, self.stagger);
        surface.render_detail(&content);
        if !content.usps.is_empty() {
            surface.request_frame();
        }
        self.rendered = Some(item.original_index());
    }

    /// Renders `item` unless it is already the panel's content.
    pub fn sync<S: Surface>(&mut self, surface: &mut S, item: &Item) {
        if self.rendered != Some(item.original_index()) {
            self.render(surface, item);
        }
    }

    /// Shows the panel for `item`. Re-activating while open only swaps content.
    pub fn open<S: Surface>(&mut self, surface: &mut S, item: &Item) {
        self.sync(surface, item);
        if self.is_open() {
            return;
        }
        self.state = DetailState::Open;
        surface.set_detail_visible(true, Transition::Animated);
        surface.focus_detail_close(self.focus_delay);
    }

    /// Hides the panel. When the reason restores focus, `focus_target` (the
    /// active virtual item) gets it back. Returns false if already closed.
    pub fn close<S: Surface>(&mut self, surface: &mut S, reason: CloseReason, focus_target: isize) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = DetailState::Closed;
        surface.set_detail_visible(false, reason.transition());
        if reason.restores_focus() {
            surface.focus_item(focus_target);
        }
        log::debug!("detail panel closed ({:?})", reason);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::UspList;
    use crate::render::tests::{Call, RecordingSurface};

    fn item(index: usize, usps: &str) -> Item {
        Item::new(index, "Design", Glyph::from("✦"), usps.parse::<UspList>().unwrap())
    }

    fn presenter() -> DetailPresenter {
        DetailPresenter::new(Duration::from_millis(70), Duration::from_millis(100))
    }

    #[test]
    fn test_usp_entries_are_staggered_in_order() {
        let content = DetailContent::for_item(&item(2, "A|B|C"), Duration::from_millis(70));
        let delays: Vec<_> = content.usps.iter().map(|u| u.delay.as_millis()).collect();
        assert_eq!(delays, vec![0, 70, 140]);
        assert_eq!(content.usps[2].text, "C");
        assert_eq!(content.original_index, 2);
    }

    #[test]
    fn test_open_then_reactivate_rerenders_in_place() {
        let mut surface = RecordingSurface::with_spacing(100.0);
        let mut detail = presenter();

        detail.open(&mut surface, &item(0, "A"));
        assert!(detail.is_open());
        assert_eq!(
            surface.take_calls(),
            vec![
                Call::Frame,
                Call::DetailVisible(true, Transition::Animated),
                Call::FocusClose,
            ]
        );

        detail.open(&mut surface, &item(3, ""));
        assert_eq!(surface.take_calls(), Vec::<Call>::new());
        assert_eq!(surface.detail.as_ref().unwrap().original_index, 3);
        assert_eq!(detail.rendered(), Some(3));
    }

    #[test]
    fn test_close_restores_focus_unless_forced() {
        let mut surface = RecordingSurface::with_spacing(100.0);
        let mut detail = presenter();

        detail.open(&mut surface, &item(1, ""));
        surface.take_calls();
        assert!(detail.close(&mut surface, CloseReason::Escape, 6));
        assert_eq!(
            surface.take_calls(),
            vec![
                Call::DetailVisible(false, Transition::Animated),
                Call::Focus(6)
            ]
        );
        assert!(!detail.close(&mut surface, CloseReason::Escape, 6));

        detail.open(&mut surface, &item(1, ""));
        surface.take_calls();
        assert!(detail.close(&mut surface, CloseReason::HostClosed, 6));
        assert_eq!(
            surface.take_calls(),
            vec![Call::DetailVisible(false, Transition::Immediate)]
        );
    }
}
