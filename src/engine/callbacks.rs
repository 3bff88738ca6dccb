//! Pre-render callbacks run once per frame, just before the final scene
//! draw.

use std::error::Error;

use rustc_hash::FxHashMap;

use crate::scene::SceneComposer;

/// Opaque handle returned by [`PreRenderCallbacks::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

/// Result of a pre-render callback.
pub type CallbackResult = Result<(), Box<dyn Error>>;

type Callback = Box<dyn FnMut(&mut SceneComposer) -> CallbackResult>;

/// Keyed set of pre-render callbacks.
///
/// Run order is unspecified. A callback that fails is logged and the rest
/// still run.
#[derive(Default)]
pub struct PreRenderCallbacks {
    callbacks: FxHashMap<CallbackId, Callback>,
    next_id: u64,
}

impl PreRenderCallbacks {
    /// Register `callback`; keep the id to remove it later.
    pub fn add(
        &mut self,
        callback: impl FnMut(&mut SceneComposer) -> CallbackResult + 'static,
    ) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        let _ = self.callbacks.insert(id, Box::new(callback));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn remove(&mut self, id: CallbackId) -> bool {
        self.callbacks.remove(&id).is_some()
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback against `scene`. Returns how many failed.
    pub fn run(&mut self, scene: &mut SceneComposer) -> usize {
        let mut failures = 0;
        for (id, callback) in &mut self.callbacks {
            if let Err(e) = callback(scene) {
                log::warn!("pre-render callback {} failed: {e}", id.0);
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::assets::ManualSource;
    use crate::options::Options;

    fn scene() -> SceneComposer {
        SceneComposer::new(&Options::default(), Box::new(ManualSource::new()))
    }

    #[test]
    fn failing_callback_does_not_stop_the_others() {
        let mut callbacks = PreRenderCallbacks::default();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _ = callbacks.add(|_| Err("boom".into()));
        let _ = callbacks.add(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        let mut scene = scene();
        assert_eq!(callbacks.run(&mut scene), 1);
        assert_eq!(callbacks.run(&mut scene), 1);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn removed_callbacks_stop_running() {
        let mut callbacks = PreRenderCallbacks::default();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = callbacks.add(move |scene| {
            scene.set_morphs_time(10.0);
            counter.set(counter.get() + 1);
            Ok(())
        });
        let mut scene = scene();
        let _ = callbacks.run(&mut scene);
        assert!(callbacks.remove(id));
        assert!(!callbacks.remove(id));
        let _ = callbacks.run(&mut scene);
        assert_eq!(hits.get(), 1);
        assert!(callbacks.is_empty());
    }
}
