//! Accounting for GPU-backed resources allocated by a scene build.
//!
//! Every mesh, material, and image a build creates is registered here, and a
//! teardown releases exactly that set. After N rebuilds the live count equals
//! what the latest build allocated.

use bevy::prelude::*;

/// A handle to a GPU-backed asset owned by the current scene build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedResource {
    Mesh(Handle<Mesh>),
    Material(Handle<StandardMaterial>),
    Image(Handle<Image>),
}

impl From<Handle<Mesh>> for TrackedResource {
    fn from(handle: Handle<Mesh>) -> Self {
        TrackedResource::Mesh(handle)
    }
}

impl From<Handle<StandardMaterial>> for TrackedResource {
    fn from(handle: Handle<StandardMaterial>) -> Self {
        TrackedResource::Material(handle)
    }
}

impl From<Handle<Image>> for TrackedResource {
    fn from(handle: Handle<Image>) -> Self {
        TrackedResource::Image(handle)
    }
}

/// Something that can free a tracked resource.
pub trait ResourceSink {
    fn release(&mut self, resource: TrackedResource);
}

/// Registry of the resources owned by the live scene build.
#[derive(Resource, Debug, Default)]
pub struct ResourceTracker {
    live: Vec<TrackedResource>,
    allocated: u64,
    released: u64,
}

impl ResourceTracker {
    /// Register a freshly allocated handle and hand it back.
    pub fn track<H>(&mut self, handle: H) -> H
    where
        H: Clone + Into<TrackedResource>,
    {
        self.live.push(handle.clone().into());
        self.allocated += 1;
        handle
    }

    /// Release every live resource into the sink, returning how many were freed.
    pub fn release_all(&mut self, sink: &mut impl ResourceSink) -> usize {
        let count = self.live.len();
        for resource in self.live.drain(..) {
            sink.release(resource);
        }
        self.released += count as u64;
        count
    }

    /// Resources owned by the live build.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Resources allocated since startup.
    pub fn allocated_total(&self) -> u64 {
        self.allocated
    }

    /// Resources released since startup.
    pub fn released_total(&self) -> u64 {
        self.released
    }
}

/// Mutable access to the asset collections a scene build allocates from.
pub struct SceneAssets<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub images: &'a mut Assets<Image>,
}

impl<'a> SceneAssets<'a> {
    pub fn new(
        meshes: &'a mut Assets<Mesh>,
        materials: &'a mut Assets<StandardMaterial>,
        images: &'a mut Assets<Image>,
    ) -> Self {
        Self {
            meshes,
            materials,
            images,
        }
    }
}

impl ResourceSink for SceneAssets<'_> {
    fn release(&mut self, resource: TrackedResource) {
        match resource {
            TrackedResource::Mesh(handle) => {
                self.meshes.remove(&handle);
            }
            TrackedResource::Material(handle) => {
                self.materials.remove(&handle);
            }
            TrackedResource::Image(handle) => {
                self.images.remove(&handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSink {
        released: Vec<TrackedResource>,
    }

    impl ResourceSink for CountingSink {
        fn release(&mut self, resource: TrackedResource) {
            self.released.push(resource);
        }
    }

    #[test]
    fn test_release_all_drains_live_set() {
        let mut meshes = Assets::<Mesh>::default();
        let mut tracker = ResourceTracker::default();
        let a = tracker.track(meshes.add(Cuboid::default()));
        let b = tracker.track(meshes.add(Sphere::default()));
        assert_eq!(tracker.live_count(), 2);

        let mut sink = CountingSink::default();
        assert_eq!(tracker.release_all(&mut sink), 2);
        assert_eq!(tracker.live_count(), 0);
        assert_eq!(sink.released, vec![a.into(), b.into()]);

        // Second release is a no-op.
        assert_eq!(tracker.release_all(&mut sink), 0);
        assert_eq!(tracker.released_total(), 2);
        assert_eq!(tracker.allocated_total(), 2);
    }

    #[test]
    fn test_scene_assets_removes_from_collections() {
        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut images = Assets::<Image>::default();
        let mut tracker = ResourceTracker::default();

        tracker.track(meshes.add(Sphere::new(1.0)));
        tracker.track(materials.add(StandardMaterial::default()));
        tracker.track(images.add(Image::default()));
        assert_eq!(meshes.len() + materials.len() + images.len(), 3);

        let mut assets = SceneAssets::new(&mut meshes, &mut materials, &mut images);
        assert_eq!(tracker.release_all(&mut assets), 3);
        assert!(meshes.is_empty());
        assert!(materials.is_empty());
        assert!(images.is_empty());
    }

    #[test]
    fn test_untracked_assets_survive_release() {
        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut images = Assets::<Image>::default();
        let shared = images.add(Image::default());

        let mut tracker = ResourceTracker::default();
        tracker.track(meshes.add(Sphere::new(1.0)));

        let mut assets = SceneAssets::new(&mut meshes, &mut materials, &mut images);
        tracker.release_all(&mut assets);
        assert!(images.get(&shared).is_some());
    }
}
