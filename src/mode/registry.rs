//! Mode registry: id → title + factory

use std::collections::BTreeMap;

use crate::mode::{DemoMode, ModeId};

type ModeFactory = Box<dyn Fn() -> Box<dyn DemoMode>>;

struct ModeEntry {
    title: String,
    factory: ModeFactory,
}

/// Registered modes, ordered by id.
///
/// Each entry builds a fresh mode value on every entry, so re-entering a mode
/// always starts from the same state.
#[derive(Default)]
pub struct ModeRegistry {
    entries: BTreeMap<ModeId, ModeEntry>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode. Registering an id twice replaces the earlier entry.
    pub fn register<F>(&mut self, id: impl Into<ModeId>, title: &str, factory: F)
    where
        F: Fn() -> Box<dyn DemoMode> + 'static,
    {
        let id = id.into();
        let entry = ModeEntry {
            title: title.to_string(),
            factory: Box::new(factory),
        };
        if let Some(previous) = self.entries.insert(id, entry) {
            log::warn!(
                "Mode {} \"{}\" replaced by \"{}\"",
                id,
                previous.title,
                title
            );
        }
    }

    /// Register a mode type built with `Default`
    pub fn register_default<M>(&mut self, id: impl Into<ModeId>, title: &str)
    where
        M: DemoMode + Default + 'static,
    {
        self.register(id, title, || Box::new(M::default()));
    }

    pub fn contains(&self, id: ModeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn title(&self, id: ModeId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.title.as_str())
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = ModeId> + '_ {
        self.entries.keys().copied()
    }

    pub fn first(&self) -> Option<ModeId> {
        self.entries.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a fresh instance of a mode
    pub fn instantiate(&self, id: ModeId) -> Option<Box<dyn DemoMode>> {
        self.entries.get(&id).map(|e| (e.factory)())
    }
}

impl std::fmt::Debug for ModeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, e)| (id, &e.title)))
            .finish()
    }
}
