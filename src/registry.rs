use crate::renderer::Renderer;

/// Explicit registry of live renderer instances, keyed by container id and
/// kept in registration order. Owned by the page-level controller; its only
/// jobs are register, unregister, and broadcast; renderer internals stay
/// with the renderers.
#[derive(Debug, Default)]
pub struct RendererRegistry {
    renderers: Vec<Renderer>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance; a renderer already bound to the same container
    /// id is replaced.
    pub fn register(&mut self, renderer: Renderer) {
        if let Some(existing) = self
            .renderers
            .iter_mut()
            .find(|r| r.container_id() == renderer.container_id())
        {
            *existing = renderer;
        } else {
            self.renderers.push(renderer);
        }
    }

    pub fn unregister(&mut self, container_id: &str) -> Option<Renderer> {
        let index = self
            .renderers
            .iter()
            .position(|r| r.container_id() == container_id)?;
        Some(self.renderers.remove(index))
    }

    pub fn get_mut(&mut self, container_id: &str) -> Option<&mut Renderer> {
        self.renderers
            .iter_mut()
            .find(|r| r.container_id() == container_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Renderer> {
        self.renderers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Renderer> {
        self.renderers.iter_mut()
    }

    pub fn first(&self) -> Option<&Renderer> {
        self.renderers.first()
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Re-tint every live instance, e.g. on a theme change.
    pub fn broadcast_color(&mut self, color: [u8; 3]) {
        for renderer in &mut self.renderers {
            renderer.update_color(color);
        }
    }

    /// Toggle the first instance and align the rest to its new state.
    /// Returns the state all instances end up in (true when empty, matching
    /// a fresh default).
    pub fn toggle_all_monochrome(&mut self) -> bool {
        let mut iter = self.renderers.iter_mut();
        let Some(first) = iter.next() else {
            return true;
        };
        let new_state = first.toggle_monochrome();
        for renderer in iter {
            renderer.set_monochrome(new_state);
        }
        new_state
    }

    pub fn set_all_monochrome(&mut self, enabled: bool) {
        for renderer in &mut self.renderers {
            renderer.set_monochrome(enabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::container::Container;

    fn make_renderer(id: &str, monochrome: bool) -> Renderer {
        let container = Container::from_pixels(id, 160, 80);
        let config = RenderConfig {
            monochrome,
            ..RenderConfig::default()
        };
        Renderer::new(&container, config).expect("construct")
    }

    #[test]
    fn register_replaces_same_container_id() {
        let mut registry = RendererRegistry::new();
        registry.register(make_renderer("hero", true));
        registry.register(make_renderer("hero", false));
        assert_eq!(registry.len(), 1);
        assert!(!registry.get_mut("hero").expect("hero").config().monochrome);
    }

    #[test]
    fn toggle_all_aligns_divergent_instances_to_the_first() {
        let mut registry = RendererRegistry::new();
        registry.register(make_renderer("hero", true));
        registry.register(make_renderer("footer", false));

        // First flips true -> false, second is set to match.
        assert!(!registry.toggle_all_monochrome());
        for renderer in registry.iter() {
            assert!(!renderer.config().monochrome);
        }

        assert!(registry.toggle_all_monochrome());
        for renderer in registry.iter() {
            assert!(renderer.config().monochrome);
        }
    }

    #[test]
    fn broadcast_color_reaches_every_instance() {
        let mut registry = RendererRegistry::new();
        registry.register(make_renderer("hero", true));
        registry.register(make_renderer("footer", true));
        registry.broadcast_color([1, 2, 3]);
        for renderer in registry.iter() {
            assert_eq!(renderer.config().tint_color, [1, 2, 3]);
        }
    }

    #[test]
    fn unregister_removes_by_id() {
        let mut registry = RendererRegistry::new();
        registry.register(make_renderer("hero", true));
        assert!(registry.unregister("missing").is_none());
        assert!(registry.unregister("hero").is_some());
        assert!(registry.is_empty());
    }
}
