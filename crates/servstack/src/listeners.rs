use std::collections::BTreeSet;
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

/// Input channels a component can listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, StrumDisplay)]
pub enum Channel {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    Wheel,
    Resize,
    Keydown,
    ItemActivate,
    DetailClose,
    DetailBackdrop,
}

impl Channel {
    /// Channels that only live for the duration of a drag.
    pub fn is_per_drag(self) -> bool {
        matches!(self, Self::PointerMove | Self::PointerUp | Self::PointerCancel)
    }

    pub fn persistent() -> impl Iterator<Item = Channel> {
        Self::iter().filter(|c| !c.is_per_drag())
    }
}

/// Registration/deregistration pairs tracked per component instance.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    active: BTreeSet<Channel>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the channel was already registered.
    pub fn register(&mut self, channel: Channel) -> bool {
        self.active.insert(channel)
    }

    pub fn deregister(&mut self, channel: Channel) -> bool {
        self.active.remove(&channel)
    }

    pub fn is_registered(&self, channel: Channel) -> bool {
        self.active.contains(&channel)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Removes every registration and returns how many there were.
    pub fn teardown(&mut self) -> usize {
        let count = self.active.len();
        self.active.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_pairs() {
        let mut registry = ListenerRegistry::new();
        assert!(registry.register(Channel::Wheel));
        assert!(!registry.register(Channel::Wheel));
        assert!(registry.is_registered(Channel::Wheel));
        assert!(registry.deregister(Channel::Wheel));
        assert!(!registry.deregister(Channel::Wheel));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_teardown_is_single_pass() {
        let mut registry = ListenerRegistry::new();
        Channel::persistent().for_each(|c| {
            registry.register(c);
        });
        registry.register(Channel::PointerMove);
        assert_eq!(registry.teardown(), Channel::iter().count() - 2);
        assert!(registry.is_empty());
    }
}
