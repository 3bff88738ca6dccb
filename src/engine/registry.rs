//! Named scenes owned by one render loop.

use std::ops::{Index, IndexMut};

use rustc_hash::FxHashMap;

use crate::scene::SceneComposer;

/// Handle to a scene in a [`SceneRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(usize);

/// Scene storage with unique names. Scenes live as long as the registry,
/// so an id handed out by a registry always indexes it.
pub struct SceneRegistry {
    scenes: Vec<SceneComposer>,
    names: FxHashMap<String, SceneId>,
}

impl SceneRegistry {
    /// Registry holding one scene.
    #[must_use]
    pub fn with_scene(name: &str, scene: SceneComposer) -> (Self, SceneId) {
        let id = SceneId(0);
        let mut names = FxHashMap::default();
        let _ = names.insert(name.to_owned(), id);
        let registry = Self {
            scenes: vec![scene],
            names,
        };
        (registry, id)
    }

    /// Store `scene` under `name`. Returns `None` if the name is taken.
    pub fn insert(&mut self, name: &str, scene: SceneComposer) -> Option<SceneId> {
        if self.names.contains_key(name) {
            return None;
        }
        let id = SceneId(self.scenes.len());
        self.scenes.push(scene);
        let _ = self.names.insert(name.to_owned(), id);
        Some(id)
    }

    /// Scene by id.
    #[must_use]
    pub fn get(&self, id: SceneId) -> Option<&SceneComposer> {
        self.scenes.get(id.0)
    }

    /// Mutable scene by id.
    pub fn get_mut(&mut self, id: SceneId) -> Option<&mut SceneComposer> {
        self.scenes.get_mut(id.0)
    }

    /// Id of the scene called `name`.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<SceneId> {
        self.names.get(name).copied()
    }

    /// Name of scene `id`.
    #[must_use]
    pub fn name_of(&self, id: SceneId) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.as_str())
    }

    /// Number of scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether there are no scenes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl Index<SceneId> for SceneRegistry {
    type Output = SceneComposer;

    fn index(&self, id: SceneId) -> &SceneComposer {
        &self.scenes[id.0]
    }
}

impl IndexMut<SceneId> for SceneRegistry {
    fn index_mut(&mut self, id: SceneId) -> &mut SceneComposer {
        &mut self.scenes[id.0]
    }
}
