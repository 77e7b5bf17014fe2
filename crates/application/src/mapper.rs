//! Mapper port and the per-use-case mapper registry.

use core::any::Any;
use core::marker::PhantomData;
use std::sync::Arc;

use aqua_core::{Effect, Entities, Entity, TrackedType};
use tracing::debug;

use crate::error::{MapperError, OutputError};

/// Persists the changes of one entity type.
///
/// Every method must accept an empty set and treat it as a no-op.
#[async_trait::async_trait]
pub trait Mapper<E: Entity>: Send + Sync {
    async fn add_all(&self, entities: &Entities<E>) -> Result<(), MapperError>;

    async fn update_all(&self, entities: &Entities<E>) -> Result<(), MapperError>;

    async fn delete_all(&self, entities: &Entities<E>) -> Result<(), MapperError>;
}

#[async_trait::async_trait]
impl<E, M> Mapper<E> for Arc<M>
where
    E: Entity,
    M: Mapper<E> + ?Sized,
{
    async fn add_all(&self, entities: &Entities<E>) -> Result<(), MapperError> {
        (**self).add_all(entities).await
    }

    async fn update_all(&self, entities: &Entities<E>) -> Result<(), MapperError> {
        (**self).update_all(entities).await
    }

    async fn delete_all(&self, entities: &Entities<E>) -> Result<(), MapperError> {
        (**self).delete_all(entities).await
    }
}

/// Binds a mapper for `E` to a concrete repository handle `R`.
pub trait MapperFactory<R: ?Sized, E: Entity>: Send + Sync {
    type Mapper: Mapper<E> + 'static;

    fn mapper_for(&self, repository: &R) -> Self::Mapper;
}

/// Type-erased registry entry.
#[async_trait::async_trait]
trait ErasedMapper: Send + Sync {
    fn entity_type(&self) -> TrackedType;

    fn as_any(&self) -> &dyn Any;

    async fn dispatch(&self, effect: &Effect) -> Result<(), MapperError>;
}

struct Typed<E: Entity> {
    mapper: Box<dyn Mapper<E>>,
    _entity: PhantomData<fn() -> E>,
}

#[async_trait::async_trait]
impl<E: Entity> ErasedMapper for Typed<E> {
    fn entity_type(&self) -> TrackedType {
        TrackedType::of::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn dispatch(&self, effect: &Effect) -> Result<(), MapperError> {
        let index = effect.entities_that::<E>();
        let new = index.new_entities();
        let dirty = index.dirty_entities();
        let deleted = index.deleted_entities();

        debug!(
            entity_type = core::any::type_name::<E>(),
            new = new.len(),
            dirty = dirty.len(),
            deleted = deleted.len(),
            "dispatching tracked entities"
        );

        self.mapper.add_all(&new).await?;
        self.mapper.update_all(&dirty).await?;
        self.mapper.delete_all(&deleted).await?;
        Ok(())
    }
}

/// Mappers for the entity types of one bounded context, in registration order.
///
/// Registering a type twice replaces the earlier mapper and keeps its position.
#[derive(Default)]
pub struct Mappers {
    entries: Vec<Box<dyn ErasedMapper>>,
}

impl Mappers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E, M>(mut self, mapper: M) -> Self
    where
        E: Entity,
        M: Mapper<E> + 'static,
    {
        let entry: Box<dyn ErasedMapper> = Box::new(Typed::<E> {
            mapper: Box::new(mapper),
            _entity: PhantomData,
        });
        let ty = TrackedType::of::<E>();
        match self.entries.iter().position(|e| e.entity_type() == ty) {
            Some(position) => self.entries[position] = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Register the mapper `factory` binds to `repository`.
    pub fn bind<R, E, F>(self, factory: &F, repository: &R) -> Self
    where
        R: ?Sized,
        E: Entity,
        F: MapperFactory<R, E>,
    {
        self.register::<E, _>(factory.mapper_for(repository))
    }

    pub fn contains(&self, ty: TrackedType) -> bool {
        self.entries.iter().any(|e| e.entity_type() == ty)
    }

    /// Mapper registered for `E`.
    pub fn mapper_for<E: Entity>(&self) -> Result<&dyn Mapper<E>, OutputError> {
        self.entries
            .iter()
            .find_map(|e| e.as_any().downcast_ref::<Typed<E>>())
            .map(|typed| typed.mapper.as_ref())
            .ok_or(OutputError::NoMapper(core::any::type_name::<E>()))
    }

    /// Registered types, in registration order.
    pub fn entity_types(&self) -> impl Iterator<Item = TrackedType> + '_ {
        self.entries.iter().map(|e| e.entity_type())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replay `effect` through every registered mapper, in registration order.
    pub(crate) async fn dispatch(&self, effect: &Effect) -> Result<(), MapperError> {
        for entry in &self.entries {
            entry.dispatch(effect).await?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Mappers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.entity_type().name()))
            .finish()
    }
}
