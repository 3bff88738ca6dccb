//! Hierarchical regions owning renderable objects.
//!
//! Regions live in an arena owned by [`RegionTree`] and are addressed by
//! [`RegionId`]; objects are owned by the tree and addressed by
//! [`ObjectId`]. Every traversal takes a `transverse` flag deciding whether
//! it recurses into child regions.

use glam::Mat4;
use rustc_hash::FxHashMap;

use super::bounds::BoundingBox;
use super::object::{
    ObjectId, PrimitiveType, RenderOptions, RenderableObject, DEFAULT_DURATION,
};

/// Handle to a region inside a [`RegionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

/// Something a picking pass may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickTarget {
    /// The object's own primitive.
    Object(ObjectId),
    /// The object's marker sprite.
    Marker(ObjectId),
}

/// One node of the region tree.
#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    parent: Option<RegionId>,
    children: Vec<RegionId>,
    objects: Vec<ObjectId>,
    transform: Mat4,
    visible: bool,
    duration: f32,
    pickable_update_required: bool,
}

impl Region {
    fn new(parent: Option<RegionId>) -> Self {
        Self {
            name: String::new(),
            parent,
            children: Vec::new(),
            objects: Vec::new(),
            transform: Mat4::IDENTITY,
            visible: true,
            duration: DEFAULT_DURATION,
            pickable_update_required: true,
        }
    }

    /// Name, empty for anonymous regions.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent region, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    /// Child regions in creation order.
    #[must_use]
    pub fn children(&self) -> &[RegionId] {
        &self.children
    }

    /// Objects in insertion order.
    #[must_use]
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Local transform relative to the parent.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Local visibility flag.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Timeline length last set on this region.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Whether objects were added since the last pickable query.
    #[must_use]
    pub fn pickable_update_required(&self) -> bool {
        self.pickable_update_required
    }
}

/// Arena of regions rooted at a single root region, plus the objects they
/// own.
#[derive(Debug)]
pub struct RegionTree {
    regions: Vec<Option<Region>>,
    objects: FxHashMap<ObjectId, RenderableObject>,
    owners: FxHashMap<ObjectId, RegionId>,
    next_object_id: u64,
}

impl Default for RegionTree {
    fn default() -> Self {
        Self::new()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

impl RegionTree {
    /// Tree with an anonymous root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: vec![Some(Region::new(None))],
            objects: FxHashMap::default(),
            owners: FxHashMap::default(),
            next_object_id: 1,
        }
    }

    /// The root region.
    #[must_use]
    pub fn root(&self) -> RegionId {
        RegionId(0)
    }

    /// Region data, `None` for removed regions.
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0).and_then(Option::as_ref)
    }

    fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Object data.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&RenderableObject> {
        self.objects.get(&id)
    }

    /// Mutable object data.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut RenderableObject> {
        self.objects.get_mut(&id)
    }

    /// Region owning `object`.
    #[must_use]
    pub fn region_of(&self, object: ObjectId) -> Option<RegionId> {
        self.owners.get(&object).copied()
    }

    /// Every live object with its id, in no particular order.
    pub fn iter_objects(&self) -> impl Iterator<Item = (ObjectId, &RenderableObject)> {
        self.objects.iter().map(|(id, o)| (*id, o))
    }

    /// Number of live objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // ---- Names & paths ----

    /// Region name, empty when anonymous or removed.
    #[must_use]
    pub fn name(&self, id: RegionId) -> &str {
        self.region(id).map_or("", Region::name)
    }

    /// Rename a region; empty names are ignored.
    pub fn set_name(&mut self, id: RegionId, name: &str) {
        if name.is_empty() {
            return;
        }
        if let Some(region) = self.region_mut(id) {
            region.name = name.to_owned();
        }
    }

    /// Parent of a region.
    #[must_use]
    pub fn parent(&self, id: RegionId) -> Option<RegionId> {
        self.region(id).and_then(Region::parent)
    }

    /// Append a child named `name` to `parent`.
    pub fn create_child(&mut self, parent: RegionId, name: &str) -> Option<RegionId> {
        let _ = self.region(parent)?;
        let id = RegionId(self.regions.len());
        self.regions.push(Some(Region::new(Some(parent))));
        self.set_name(id, name);
        if let Some(p) = self.region_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// First child of `parent` named `name`.
    #[must_use]
    pub fn child_with_name(&self, parent: RegionId, name: &str) -> Option<RegionId> {
        if name.is_empty() {
            return None;
        }
        self.region(parent)?
            .children
            .iter()
            .copied()
            .find(|c| self.name(*c) == name)
    }

    /// Names from the outermost named ancestor down to this region.
    /// Anonymous regions have an empty path.
    #[must_use]
    pub fn full_separated_path(&self, id: RegionId) -> Vec<String> {
        let mut path = Vec::new();
        if self.name(id).is_empty() {
            return path;
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let name = self.name(current);
            if !name.is_empty() {
                path.push(name.to_owned());
            }
            cursor = self.parent(current);
        }
        path.reverse();
        path
    }

    /// `/`-joined [`full_separated_path`](Self::full_separated_path).
    #[must_use]
    pub fn full_path(&self, id: RegionId) -> String {
        self.full_separated_path(id).join("/")
    }

    /// Descend from `start` by exact, first-match name lookup. An empty
    /// path resolves to `start`.
    #[must_use]
    pub fn find_child_from_path(&self, start: RegionId, path: &str) -> Option<RegionId> {
        let _ = self.region(start)?;
        split_path(path).try_fold(start, |region, segment| {
            self.child_with_name(region, segment)
        })
    }

    /// Descend from `start`, creating missing regions along `path`.
    pub fn create_child_from_path(&mut self, start: RegionId, path: &str) -> Option<RegionId> {
        let _ = self.region(start)?;
        let mut region = start;
        for segment in split_path(path) {
            region = match self.child_with_name(region, segment) {
                Some(child) => child,
                None => self.create_child(region, segment)?,
            };
        }
        Some(region)
    }

    /// Existing region at `path`, or a newly created one.
    pub fn find_or_create_child_from_path(
        &mut self,
        start: RegionId,
        path: &str,
    ) -> Option<RegionId> {
        self.find_child_from_path(start, path)
            .or_else(|| self.create_child_from_path(start, path))
    }

    // ---- Objects ----

    /// Take ownership of `object` and attach it to `region`.
    pub fn add_object(&mut self, region: RegionId, object: RenderableObject) -> Option<ObjectId> {
        let id = ObjectId(self.next_object_id);
        let target = self.region_mut(region)?;
        target.objects.push(id);
        target.pickable_update_required = true;
        self.next_object_id += 1;
        let _ = self.objects.insert(id, object);
        let _ = self.owners.insert(id, region);
        Some(id)
    }

    /// Detach and dispose `object` if `region` directly owns it. Returns
    /// whether anything was removed.
    pub fn remove_object(&mut self, region: RegionId, object: ObjectId) -> bool {
        let Some(target) = self.region_mut(region) else {
            return false;
        };
        let Some(index) = target.objects.iter().position(|o| *o == object) else {
            return false;
        };
        let _ = target.objects.remove(index);
        self.drop_object(object);
        true
    }

    fn drop_object(&mut self, object: ObjectId) {
        if let Some(mut o) = self.objects.remove(&object) {
            o.dispose();
        }
        let _ = self.owners.remove(&object);
    }

    /// Whether `object` belongs to `region` (or, with `transverse`, to any
    /// descendant).
    #[must_use]
    pub fn object_is_in_region(&self, region: RegionId, object: ObjectId, transverse: bool) -> bool {
        let Some(r) = self.region(region) else {
            return false;
        };
        r.objects.contains(&object)
            || (transverse
                && r.children
                    .iter()
                    .any(|c| self.object_is_in_region(*c, object, transverse)))
    }

    /// Objects of `region` (and descendants with `transverse`), depth
    /// first, local objects before children's.
    #[must_use]
    pub fn all_objects(&self, region: RegionId, transverse: bool) -> Vec<ObjectId> {
        let mut out = Vec::new();
        self.collect_objects(region, transverse, &mut out);
        out
    }

    fn collect_objects(&self, region: RegionId, transverse: bool, out: &mut Vec<ObjectId>) {
        let Some(r) = self.region(region) else {
            return;
        };
        out.extend_from_slice(&r.objects);
        if transverse {
            for child in &r.children {
                self.collect_objects(*child, transverse, out);
            }
        }
    }

    /// Objects matching `predicate`.
    fn find_objects(
        &self,
        region: RegionId,
        transverse: bool,
        predicate: impl Fn(&RenderableObject) -> bool,
    ) -> Vec<ObjectId> {
        self.all_objects(region, transverse)
            .into_iter()
            .filter(|id| self.objects.get(id).is_some_and(&predicate))
            .collect()
    }

    /// Objects whose group name equals `name`.
    #[must_use]
    pub fn find_objects_with_group_name(
        &self,
        region: RegionId,
        name: &str,
        transverse: bool,
    ) -> Vec<ObjectId> {
        self.find_objects(region, transverse, |o| o.group_name() == Some(name))
    }

    /// Objects whose anatomical id equals `id`.
    #[must_use]
    pub fn find_objects_with_anatomical_id(
        &self,
        region: RegionId,
        id: &str,
        transverse: bool,
    ) -> Vec<ObjectId> {
        self.find_objects(region, transverse, |o| o.anatomical_id() == Some(id))
    }

    /// Objects of one primitive type whose group name equals `name`.
    #[must_use]
    pub fn find_primitives_with_group_name(
        &self,
        region: RegionId,
        ty: PrimitiveType,
        name: &str,
        transverse: bool,
    ) -> Vec<ObjectId> {
        self.find_objects(region, transverse, |o| {
            o.primitive_type() == ty && o.group_name() == Some(name)
        })
    }

    /// Surfaces named `name`.
    #[must_use]
    pub fn find_geometries_with_group_name(
        &self,
        region: RegionId,
        name: &str,
        transverse: bool,
    ) -> Vec<ObjectId> {
        self.find_primitives_with_group_name(region, PrimitiveType::Geometry, name, transverse)
    }

    /// Point clouds named `name`.
    #[must_use]
    pub fn find_pointsets_with_group_name(
        &self,
        region: RegionId,
        name: &str,
        transverse: bool,
    ) -> Vec<ObjectId> {
        self.find_primitives_with_group_name(region, PrimitiveType::Pointset, name, transverse)
    }

    /// Glyphsets named `name`.
    #[must_use]
    pub fn find_glyphsets_with_group_name(
        &self,
        region: RegionId,
        name: &str,
        transverse: bool,
    ) -> Vec<ObjectId> {
        self.find_primitives_with_group_name(region, PrimitiveType::Glyphset, name, transverse)
    }

    /// Line sets named `name`.
    #[must_use]
    pub fn find_lines_with_group_name(
        &self,
        region: RegionId,
        name: &str,
        transverse: bool,
    ) -> Vec<ObjectId> {
        self.find_primitives_with_group_name(region, PrimitiveType::Lines, name, transverse)
    }

    /// Visit every object of type `ty`.
    pub fn for_each_of_type(
        &mut self,
        region: RegionId,
        ty: PrimitiveType,
        transverse: bool,
        mut f: impl FnMut(ObjectId, &mut RenderableObject),
    ) {
        for id in self.all_objects(region, transverse) {
            if let Some(o) = self.objects.get_mut(&id) {
                if o.primitive_type() == ty {
                    f(id, o);
                }
            }
        }
    }

    /// Visit every surface.
    pub fn for_each_geometry(
        &mut self,
        region: RegionId,
        transverse: bool,
        f: impl FnMut(ObjectId, &mut RenderableObject),
    ) {
        self.for_each_of_type(region, PrimitiveType::Geometry, transverse, f);
    }

    /// Visit every glyphset.
    pub fn for_each_glyphset(
        &mut self,
        region: RegionId,
        transverse: bool,
        f: impl FnMut(ObjectId, &mut RenderableObject),
    ) {
        self.for_each_of_type(region, PrimitiveType::Glyphset, transverse, f);
    }

    /// Visit every point cloud.
    pub fn for_each_pointset(
        &mut self,
        region: RegionId,
        transverse: bool,
        f: impl FnMut(ObjectId, &mut RenderableObject),
    ) {
        self.for_each_of_type(region, PrimitiveType::Pointset, transverse, f);
    }

    /// Visit every line set.
    pub fn for_each_line(
        &mut self,
        region: RegionId,
        transverse: bool,
        f: impl FnMut(ObjectId, &mut RenderableObject),
    ) {
        self.for_each_of_type(region, PrimitiveType::Lines, transverse, f);
    }

    /// Dispose local objects and, with `transverse`, every descendant
    /// region along with its objects.
    pub fn clear(&mut self, region: RegionId, transverse: bool) {
        let Some(r) = self.region_mut(region) else {
            return;
        };
        let objects = std::mem::take(&mut r.objects);
        let children = if transverse {
            std::mem::take(&mut r.children)
        } else {
            Vec::new()
        };
        for object in objects {
            self.drop_object(object);
        }
        for child in children {
            self.remove_subtree(child);
        }
    }

    fn remove_subtree(&mut self, region: RegionId) {
        let Some(r) = self.regions.get_mut(region.0).and_then(Option::take) else {
            return;
        };
        for object in r.objects {
            self.drop_object(object);
        }
        for child in r.children {
            self.remove_subtree(child);
        }
    }

    // ---- Transform & visibility ----

    /// Replace the local transform.
    pub fn set_transformation(&mut self, region: RegionId, transform: Mat4) {
        if let Some(r) = self.region_mut(region) {
            r.transform = transform;
        }
    }

    /// Product of every ancestor's local transform with this one's.
    #[must_use]
    pub fn world_transform(&self, region: RegionId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(region);
        while let Some(current) = cursor {
            let Some(r) = self.region(current) else {
                break;
            };
            matrix = r.transform * matrix;
            cursor = r.parent;
        }
        matrix
    }

    /// Local visibility flag; does not touch children.
    pub fn set_visibility(&mut self, region: RegionId, visible: bool) {
        if let Some(r) = self.region_mut(region) {
            r.visible = visible;
        }
    }

    /// Local visibility flag.
    #[must_use]
    pub fn visibility(&self, region: RegionId) -> bool {
        self.region(region).is_some_and(Region::is_visible)
    }

    /// Whether the region and all its ancestors are visible.
    #[must_use]
    pub fn is_shown(&self, region: RegionId) -> bool {
        let mut cursor = Some(region);
        while let Some(current) = cursor {
            match self.region(current) {
                Some(r) if r.visible => cursor = r.parent,
                _ => return false,
            }
        }
        true
    }

    fn set_all_primitives_visibility(&mut self, region: RegionId, visible: bool) {
        for id in self.all_objects(region, true) {
            if let Some(o) = self.objects.get_mut(&id) {
                o.set_visibility(visible);
            }
        }
    }

    /// Hide every object in the subtree.
    pub fn hide_all_primitives(&mut self, region: RegionId) {
        self.set_all_primitives_visibility(region, false);
    }

    /// Show every object in the subtree.
    pub fn show_all_primitives(&mut self, region: RegionId) {
        self.set_all_primitives_visibility(region, true);
    }

    /// World-space bounds of local objects (and descendants with
    /// `transverse`); `None` when nothing has bounds.
    #[must_use]
    pub fn bounding_box(&self, region: RegionId, transverse: bool) -> Option<BoundingBox> {
        let r = self.region(region)?;
        let local = r
            .objects
            .iter()
            .filter_map(|id| self.objects.get(id)?.bounding_box())
            .reduce(|a, b| a.union(&b))
            .map(|b| b.transformed(&self.world_transform(region)));
        if !transverse {
            return local;
        }
        r.children.iter().fold(local, |acc, child| {
            BoundingBox::union_opt(acc, self.bounding_box(*child, transverse))
        })
    }

    // ---- Time ----

    /// Set the timeline length of the subtree.
    pub fn set_duration(&mut self, region: RegionId, duration: f32) {
        let Some(r) = self.region_mut(region) else {
            return;
        };
        r.duration = duration;
        let children = r.children.clone();
        for id in r.objects.clone() {
            if let Some(o) = self.objects.get_mut(&id) {
                o.set_duration(duration);
            }
        }
        for child in children {
            self.set_duration(child, duration);
        }
    }

    /// Timeline length last set on `region`.
    #[must_use]
    pub fn duration(&self, region: RegionId) -> f32 {
        self.region(region).map_or(DEFAULT_DURATION, Region::duration)
    }

    /// Time of the first local object, else of the first descendant that
    /// has one; `-1` when the subtree holds no objects.
    #[must_use]
    pub fn current_time(&self, region: RegionId) -> f32 {
        let Some(r) = self.region(region) else {
            return -1.0;
        };
        if let Some(o) = r.objects.first().and_then(|id| self.objects.get(id)) {
            return o.current_time();
        }
        r.children
            .iter()
            .map(|c| self.current_time(*c))
            .find(|t| *t != -1.0)
            .unwrap_or(-1.0)
    }

    /// Push one absolute time to every object in scope.
    pub fn set_morph_time(&mut self, region: RegionId, time: f32, transverse: bool) {
        for id in self.all_objects(region, transverse) {
            if let Some(o) = self.objects.get_mut(&id) {
                o.set_morph_time(time);
            }
        }
    }

    /// Whether anything in the subtree changes with time.
    #[must_use]
    pub fn is_time_varying(&self, region: RegionId) -> bool {
        self.all_objects(region, true)
            .iter()
            .any(|id| self.objects.get(id).is_some_and(RenderableObject::is_time_varying))
    }

    /// Animation step for every object in scope, then marker placement.
    ///
    /// Each object advances by `play_rate * delta`. While paused with
    /// markers displayed, enabled markers are projected through the
    /// options' camera and fitted to the depth window they span together.
    pub fn render_geometries(
        &mut self,
        region: RegionId,
        play_rate: f32,
        delta: f32,
        play_animation: bool,
        options: &RenderOptions,
        transverse: bool,
    ) {
        let ids = self.all_objects(region, transverse);
        let step = play_rate * delta;
        for id in &ids {
            if let Some(o) = self.objects.get_mut(id) {
                o.render(step, play_animation, options);
            }
        }
        if !options.display_markers || play_animation {
            return;
        }
        let Some(camera) = options.camera else {
            return;
        };
        let worlds: Vec<(ObjectId, Mat4)> = ids
            .iter()
            .filter_map(|id| Some((*id, self.world_transform(self.region_of(*id)?))))
            .collect();
        let depths: Vec<f32> = worlds
            .iter()
            .filter_map(|(id, world)| {
                self.objects
                    .get_mut(id)?
                    .marker_mut()?
                    .update_depth(&camera, world)
            })
            .collect();
        if depths.is_empty() {
            return;
        }
        let min = depths.iter().copied().fold(f32::INFINITY, f32::min);
        let max = depths.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        for id in &ids {
            if let Some(o) = self.objects.get_mut(id) {
                o.process_marker_visual(min, max);
            }
        }
    }

    // ---- Picking ----

    /// Whether objects were added to the region (or, with `transverse`, a
    /// descendant) since the last pickable query.
    #[must_use]
    pub fn check_pickable_update_required(&self, region: RegionId, transverse: bool) -> bool {
        let Some(r) = self.region(region) else {
            return false;
        };
        r.pickable_update_required
            || (transverse
                && r.children
                    .iter()
                    .any(|c| self.check_pickable_update_required(*c, transverse)))
    }

    /// Visible objects (or their enabled markers, with `pick_markers`) in
    /// scope. Clears the pickable flag of every visited region.
    pub fn pickable_objects(
        &mut self,
        region: RegionId,
        pick_markers: bool,
        transverse: bool,
    ) -> Vec<PickTarget> {
        let mut out = Vec::new();
        self.collect_pickable(region, pick_markers, transverse, &mut out);
        out
    }

    fn collect_pickable(
        &mut self,
        region: RegionId,
        pick_markers: bool,
        transverse: bool,
        out: &mut Vec<PickTarget>,
    ) {
        let Some(r) = self.region_mut(region) else {
            return;
        };
        r.pickable_update_required = false;
        let children = if transverse { r.children.clone() } else { Vec::new() };
        let objects = r.objects.clone();
        for id in &objects {
            let Some(o) = self.objects.get(id) else {
                continue;
            };
            if !o.visibility() {
                continue;
            }
            if !pick_markers {
                out.push(PickTarget::Object(*id));
            } else if o.marker().is_some_and(|m| m.is_enabled()) {
                out.push(PickTarget::Marker(*id));
            }
        }
        for child in children {
            self.collect_pickable(child, pick_markers, transverse, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::camera::{Camera, Viewport};
    use crate::scene::mesh::MorphGeometry;

    fn unit_cube_points(offset: Vec3) -> RenderableObject {
        RenderableObject::geometry(MorphGeometry::from_triangles(
            vec![offset, offset + Vec3::ONE],
            vec![],
        ))
    }

    #[test]
    fn path_round_trips_through_full_path() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        for path in ["a", "a/b/c", "/x/y", "a/b/d", "heart/left ventricle"] {
            let created = tree.create_child_from_path(root, path).unwrap();
            let full = tree.full_path(created);
            assert_eq!(tree.find_child_from_path(root, &full), Some(created), "{path}");
        }
        assert_eq!(tree.full_path(root), "");
        assert_eq!(tree.find_child_from_path(root, ""), Some(root));
    }

    #[test]
    fn create_reuses_existing_segments() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let c = tree.create_child_from_path(root, "a/b/c").unwrap();
        let d = tree.create_child_from_path(root, "a/b/d").unwrap();
        assert_eq!(tree.parent(c), tree.parent(d));
        assert_eq!(tree.region(root).unwrap().children().len(), 1);
        assert_eq!(tree.find_child_from_path(root, "a/missing"), None);
        assert_eq!(tree.find_or_create_child_from_path(root, "a/b/c"), Some(c));
        assert_eq!(tree.full_separated_path(d), vec!["a", "b", "d"]);
    }

    #[test]
    fn anonymous_regions_have_empty_path() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let anon = tree.create_child(root, "").unwrap();
        let named = tree.create_child(anon, "n").unwrap();
        assert_eq!(tree.full_path(anon), "");
        assert_eq!(tree.full_path(named), "n");
        tree.set_name(named, "");
        assert_eq!(tree.name(named), "n");
    }

    #[test]
    fn removal_is_idempotent() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let child = tree.create_child(root, "c").unwrap();
        let id = tree.add_object(child, unit_cube_points(Vec3::ZERO)).unwrap();
        assert!(tree.object_is_in_region(child, id, false));
        assert!(tree.object_is_in_region(root, id, true));
        assert!(!tree.object_is_in_region(root, id, false));

        assert!(!tree.remove_object(root, id));
        assert!(tree.remove_object(child, id));
        assert!(!tree.object_is_in_region(child, id, false));
        assert!(!tree.object_is_in_region(root, id, true));
        assert!(!tree.remove_object(child, id));
        assert!(tree.object(id).is_none());
    }

    #[test]
    fn bounding_box_applies_world_transform() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        assert!(tree.bounding_box(root, true).is_none());
        let child = tree.create_child(root, "moved").unwrap();
        tree.set_transformation(root, Mat4::from_scale(Vec3::splat(2.0)));
        tree.set_transformation(child, Mat4::from_translation(Vec3::X * 10.0));
        let _ = tree.add_object(child, unit_cube_points(Vec3::ZERO));
        let _ = tree.add_object(root, unit_cube_points(-Vec3::ONE));

        let local = tree.bounding_box(root, false).unwrap();
        assert_eq!(local.min, Vec3::splat(-2.0));
        assert_eq!(local.max, Vec3::ZERO);

        let all = tree.bounding_box(root, true).unwrap();
        assert_eq!(all.max, Vec3::new(22.0, 2.0, 2.0));
    }

    #[test]
    fn hidden_objects_have_no_bounds() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let _ = tree.add_object(root, unit_cube_points(Vec3::ZERO));
        tree.hide_all_primitives(root);
        assert!(tree.bounding_box(root, true).is_none());
        tree.show_all_primitives(root);
        assert!(tree.bounding_box(root, true).is_some());
    }

    #[test]
    fn visibility_is_local_but_shown_checks_ancestors() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let child = tree.create_child(root, "c").unwrap();
        tree.set_visibility(root, false);
        assert!(tree.visibility(child));
        assert!(!tree.is_shown(child));
    }

    #[test]
    fn morph_time_and_duration_reach_descendants() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let leaf = tree.create_child_from_path(root, "a/b").unwrap();
        assert_eq!(tree.current_time(root), -1.0);
        let id = tree.add_object(leaf, unit_cube_points(Vec3::ZERO)).unwrap();

        tree.set_morph_time(root, 100.0, false);
        assert_eq!(tree.current_time(root), 0.0);
        tree.set_morph_time(root, 100.0, true);
        assert_eq!(tree.current_time(root), 100.0);

        tree.set_duration(root, 50.0);
        assert_eq!(tree.object(id).unwrap().duration(), 50.0);
        assert_eq!(tree.duration(leaf), 50.0);
        assert_eq!(tree.current_time(root), 50.0);
    }

    #[test]
    fn time_varying_searches_subtree() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let leaf = tree.create_child(root, "leaf").unwrap();
        let id = tree.add_object(leaf, unit_cube_points(Vec3::ZERO)).unwrap();
        assert!(!tree.is_time_varying(root));
        tree.object_mut(id).unwrap().set_time_enabled(true);
        assert!(tree.is_time_varying(root));
    }

    #[test]
    fn render_geometries_scales_delta_by_play_rate() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let leaf = tree.create_child(root, "leaf").unwrap();
        let a = tree.add_object(root, unit_cube_points(Vec3::ZERO)).unwrap();
        let b = tree.add_object(leaf, unit_cube_points(Vec3::ZERO)).unwrap();
        let opts = RenderOptions::default();

        tree.render_geometries(root, 500.0, 0.016, true, &opts, false);
        assert!((tree.object(a).unwrap().current_time() - 8.0).abs() < 1e-4);
        assert_eq!(tree.object(b).unwrap().current_time(), 0.0);

        tree.render_geometries(root, 500.0, 0.016, true, &opts, true);
        assert!((tree.object(b).unwrap().current_time() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn paused_render_places_markers() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let mut near = unit_cube_points(Vec3::new(0.0, 0.0, 2.0));
        near.set_name("near");
        let mut far = unit_cube_points(Vec3::new(0.0, 0.0, -4.0));
        far.set_name("far");
        let near = tree.add_object(root, near).unwrap();
        let far = tree.add_object(root, far).unwrap();
        let viewport = Viewport {
            eye_position: Vec3::new(0.5, 0.5, 10.0),
            target_position: Vec3::splat(0.5),
            ..Viewport::default()
        };
        let opts = RenderOptions {
            display_markers: true,
            camera: Some(Camera::new(40.0, 1.0, &viewport).view()),
        };
        tree.render_geometries(root, 1.0, 0.0, false, &opts, true);
        let n = tree.object(near).unwrap().marker().unwrap();
        let f = tree.object(far).unwrap().marker().unwrap();
        assert!(n.is_visible() && f.is_visible());
        assert!(n.size() > f.size());

        tree.render_geometries(root, 1.0, 0.0, true, &opts, true);
        assert!(!tree.object(near).unwrap().marker().unwrap().is_enabled());
    }

    #[test]
    fn lookups_filter_by_name_and_type() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let leaf = tree.create_child(root, "leaf").unwrap();
        let mut surface = unit_cube_points(Vec3::ZERO);
        surface.set_name("lung");
        surface.set_anatomical_id("UBERON:0002048");
        let mut points =
            RenderableObject::pointset(MorphGeometry::from_triangles(vec![Vec3::ZERO], vec![]));
        points.set_name("lung");
        let s = tree.add_object(root, surface).unwrap();
        let p = tree.add_object(leaf, points).unwrap();

        assert_eq!(tree.find_objects_with_group_name(root, "lung", false), vec![s]);
        assert_eq!(tree.find_objects_with_group_name(root, "lung", true), vec![s, p]);
        assert_eq!(tree.find_pointsets_with_group_name(root, "lung", true), vec![p]);
        assert!(tree.find_glyphsets_with_group_name(root, "lung", true).is_empty());
        assert_eq!(
            tree.find_objects_with_anatomical_id(root, "UBERON:0002048", true),
            vec![s]
        );
        assert!(tree
            .find_objects_with_anatomical_id(leaf, "UBERON:0002048", true)
            .is_empty());

        let mut visited = Vec::new();
        tree.for_each_geometry(root, true, |id, _| visited.push(id));
        assert_eq!(visited, vec![s]);
    }

    #[test]
    fn pickable_flag_clears_on_query() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let leaf = tree.create_child(root, "leaf").unwrap();
        let _ = tree.pickable_objects(root, false, true);
        assert!(!tree.check_pickable_update_required(root, true));

        let id = tree.add_object(leaf, unit_cube_points(Vec3::ZERO)).unwrap();
        assert!(!tree.check_pickable_update_required(root, false));
        assert!(tree.check_pickable_update_required(root, true));
        assert_eq!(tree.pickable_objects(root, false, true), vec![PickTarget::Object(id)]);
        assert!(tree.pickable_objects(root, true, true).is_empty());
        assert!(!tree.check_pickable_update_required(root, true));
    }

    #[test]
    fn clear_disposes_objects_and_optionally_children() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let leaf = tree.create_child(root, "leaf").unwrap();
        let a = tree.add_object(root, unit_cube_points(Vec3::ZERO)).unwrap();
        let b = tree.add_object(leaf, unit_cube_points(Vec3::ZERO)).unwrap();

        tree.clear(root, false);
        assert!(tree.object(a).is_none());
        assert!(tree.object(b).is_some());

        tree.clear(root, true);
        assert!(tree.object(b).is_none());
        assert!(tree.region(leaf).is_none());
        assert_eq!(tree.object_count(), 0);
        assert!(tree.region(root).unwrap().children().is_empty());
    }
}
