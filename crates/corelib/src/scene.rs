//! Scene graph of game objects, each carrying a list of components.
//!
//! Components are trait objects looked up by concrete type. The scene owns
//! all objects in dense storage and drives the per-frame `awake`/`update`
//! dispatch; rendering code reads back what it needs via
//! [`Scene::iter_renderables`].

use std::any::Any;

use crate::{
    Mat4,
    components::RenderComponent,
    error::{CoreError, CoreResult},
    transform::Transform,
};

/// Game object id (dense, index into the scene's object array).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId(pub u32);

/// Type-erasure helper so components can be downcast without each one
/// writing the same two methods.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour or data attached to a [`GameObject`].
pub trait Component: AsAny {
    /// Stable name used in logs and errors.
    fn type_name(&self) -> &'static str;

    /// Called once before the first update, after the component is attached.
    fn awake(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called every frame while the component is enabled.
    fn update(&mut self, _dt: f32, _ctx: &mut ComponentContext<'_>) {}
}

/// What a component may touch while it runs: its owner's transform, its own
/// enabled flag and read-only access to the other components on the object.
pub struct ComponentContext<'a> {
    pub object: GameObjectId,
    pub name: &'a str,
    pub transform: &'a mut Transform,
    enabled: &'a mut bool,
    before: &'a [ComponentSlot],
    after: &'a [ComponentSlot],
}

impl ComponentContext<'_> {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        *self.enabled
    }

    /// Stop receiving updates until re-enabled from outside.
    #[inline]
    pub fn disable(&mut self) {
        *self.enabled = false;
    }

    /// Another component of type `T` on the same object.
    pub fn sibling<T: Component>(&self) -> Option<&T> {
        self.before
            .iter()
            .chain(self.after)
            .find_map(ComponentSlot::downcast_ref)
    }
}

struct ComponentSlot {
    enabled: bool,
    awoken: bool,
    component: Box<dyn Component>,
}

impl ComponentSlot {
    fn downcast_ref<T: Component>(&self) -> Option<&T> {
        AsAny::as_any(&*self.component).downcast_ref()
    }

    fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(&mut *self.component).downcast_mut()
    }
}

pub struct GameObject {
    id: GameObjectId,
    name: String,
    pub transform: Transform,
    components: Vec<ComponentSlot>,
}

impl GameObject {
    fn new(id: GameObjectId, name: String, transform: Transform) -> Self {
        Self {
            id,
            name,
            transform,
            components: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> GameObjectId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a component. At most one component of each type per object.
    pub fn add<T: Component>(&mut self, component: T) -> CoreResult<()> {
        if self.has::<T>() {
            return Err(CoreError::DuplicateComponent {
                id: self.id,
                component: component.type_name(),
            });
        }

        log::debug!("Adding {} to '{}'", component.type_name(), self.name);
        self.components.push(ComponentSlot {
            enabled: true,
            awoken: false,
            component: Box::new(component),
        });
        Ok(())
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(ComponentSlot::downcast_ref)
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(ComponentSlot::downcast_mut)
    }

    #[inline]
    pub fn has<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// `None` if there is no component of type `T`.
    pub fn is_enabled<T: Component>(&self) -> Option<bool> {
        self.slot::<T>().map(|slot| slot.enabled)
    }

    /// Returns `false` if there is no component of type `T`.
    pub fn set_enabled<T: Component>(&mut self, enabled: bool) -> bool {
        match self
            .components
            .iter_mut()
            .find(|slot| slot.downcast_ref::<T>().is_some())
        {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Component type names in attachment order.
    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.components.iter().map(|slot| slot.component.type_name())
    }

    fn slot<T: Component>(&self) -> Option<&ComponentSlot> {
        self.components
            .iter()
            .find(|slot| slot.downcast_ref::<T>().is_some())
    }

    fn awake(&mut self) {
        self.dispatch(|component, awoken, ctx| {
            if !*awoken {
                *awoken = true;
                component.awake(ctx);
                if !ctx.is_enabled() {
                    log::warn!(
                        "{} on '{}' disabled itself during awake",
                        component.type_name(),
                        ctx.name
                    );
                }
            }
        });
    }

    fn update(&mut self, dt: f32) {
        self.dispatch(|component, _, ctx| {
            if ctx.is_enabled() {
                component.update(dt, ctx);
            }
        });
    }

    /// Visit every component in attachment order with a context that lends
    /// out everything except the component itself.
    fn dispatch(
        &mut self,
        mut visit: impl FnMut(&mut dyn Component, &mut bool, &mut ComponentContext<'_>),
    ) {
        let GameObject {
            id,
            name,
            transform,
            components,
        } = self;

        for i in 0..components.len() {
            let (before, rest) = components.split_at_mut(i);
            let Some((slot, after)) = rest.split_first_mut() else {
                break;
            };
            let ComponentSlot {
                enabled,
                awoken,
                component,
            } = slot;

            let mut ctx = ComponentContext {
                object: *id,
                name: name.as_str(),
                transform: &mut *transform,
                enabled,
                before: &*before,
                after: &*after,
            };
            visit(&mut **component, awoken, &mut ctx);
        }
    }
}

/// Dense, append-only store of game objects; despawned slots stay dead.
#[derive(Default)]
pub struct Scene {
    objects: Vec<GameObject>,
    alive: Vec<bool>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> GameObjectId {
        let id = GameObjectId(self.objects.len() as u32);
        let name = name.into();
        log::debug!("Spawning '{}' as {:?}", name, id);

        self.objects.push(GameObject::new(id, name, transform));
        self.alive.push(true);
        id
    }

    /// Returns `false` if the object was already gone.
    pub fn despawn(&mut self, id: GameObjectId) -> bool {
        match self.alive.get_mut(id.0 as usize) {
            Some(alive) if *alive => {
                *alive = false;
                self.objects[id.0 as usize].components.clear();
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_alive(&self, id: GameObjectId) -> bool {
        self.alive.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|alive| **alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn object(&self, id: GameObjectId) -> Option<&GameObject> {
        if self.is_alive(id) {
            self.objects.get(id.0 as usize)
        } else {
            None
        }
    }

    pub fn object_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        if self.is_alive(id) {
            self.objects.get_mut(id.0 as usize)
        } else {
            None
        }
    }

    pub fn add_component<T: Component>(
        &mut self,
        id: GameObjectId,
        component: T,
    ) -> CoreResult<()> {
        self.object_mut(id)
            .ok_or(CoreError::DeadObject(id))?
            .add(component)
    }

    /// First live object with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<GameObjectId> {
        self.iter().find(|object| object.name == name).map(GameObject::id)
    }

    /// Live objects in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> + '_ {
        self.objects
            .iter()
            .zip(&self.alive)
            .filter_map(|(object, alive)| alive.then_some(object))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameObject> + '_ {
        self.objects
            .iter_mut()
            .zip(&self.alive)
            .filter_map(|(object, alive)| alive.then_some(object))
    }

    /// Run `awake` on every component that has not been awoken yet.
    pub fn awake(&mut self) {
        for object in self.iter_mut() {
            object.awake();
        }
    }

    /// Advance one frame. Components added since the last frame are awoken first.
    pub fn update(&mut self, dt: f32) {
        self.awake();
        for object in self.iter_mut() {
            object.update(dt);
        }
    }

    /// Enabled render components of live objects, with their model matrix.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (Mat4, &RenderComponent)> + '_ {
        self.iter().flat_map(|object| {
            let model = object.transform.matrix();
            object
                .components
                .iter()
                .filter(|slot| slot.enabled)
                .filter_map(ComponentSlot::downcast_ref::<RenderComponent>)
                .map(move |render| (model, render))
        })
    }
}
