//! Per-mode resource scope

use crate::backend::{GraphicsBackend, ResourceHandle};
use crate::mode::ModeId;

/// Every GPU object created while entering a mode, in creation order.
///
/// Releasing destroys them in reverse order exactly once.
#[derive(Debug)]
pub struct ResourceScope {
    owner: ModeId,
    handles: Vec<ResourceHandle>,
}

impl ResourceScope {
    pub fn new(owner: ModeId) -> Self {
        Self {
            owner,
            handles: Vec::new(),
        }
    }

    /// Record a newly created object
    pub fn track(&mut self, handle: ResourceHandle) {
        log::trace!("mode {}: tracking {:?}", self.owner, handle);
        self.handles.push(handle);
    }

    pub fn handles(&self) -> &[ResourceHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Destroy everything recorded so far, newest first. Returns how many
    /// objects were destroyed; a scope that is already empty releases nothing.
    pub fn release(&mut self, gpu: &mut dyn GraphicsBackend) -> usize {
        let count = self.handles.len();
        while let Some(handle) = self.handles.pop() {
            gpu.destroy(handle);
        }
        if count > 0 {
            log::debug!("mode {}: released {} resources", self.owner, count);
        }
        count
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            log::error!(
                "mode {}: scope dropped with {} unreleased resources",
                self.owner,
                self.handles.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::*;

    fn desc() -> BufferDescriptor {
        BufferDescriptor {
            label: None,
            size: 16,
            usage: BufferUsage::VERTEX,
        }
    }

    #[test]
    fn test_release_destroys_everything_once() {
        let mut gpu = DummyBackend::new();
        let mut scope = ResourceScope::new(ModeId(1));
        for _ in 0..3 {
            let buffer = gpu.create_buffer(&desc()).unwrap();
            scope.track(ResourceHandle::Buffer(buffer));
        }

        assert_eq!(scope.release(&mut gpu), 3);
        assert_eq!(scope.release(&mut gpu), 0);
        assert!(scope.is_empty());
        assert_eq!(gpu.live_resources().total(), 0);
        assert_eq!(gpu.invalid_destroys(), 0);
    }

    #[test]
    fn test_release_order_is_reversed() {
        let mut gpu = DummyBackend::new();
        let mut scope = ResourceScope::new(ModeId(1));
        let layout = gpu.create_bind_group_layout(&[]).unwrap();
        scope.track(ResourceHandle::BindGroupLayout(layout));
        let group = gpu.create_bind_group(layout, &[]).unwrap();
        scope.track(ResourceHandle::BindGroup(group));

        assert_eq!(
            scope.handles().last(),
            Some(&ResourceHandle::BindGroup(group))
        );
        scope.release(&mut gpu);
        assert_eq!(gpu.live_resources().total(), 0);
    }
}
