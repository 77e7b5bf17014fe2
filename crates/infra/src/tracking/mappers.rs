use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use aqua_application::{Mapper, MapperError, MapperFactory};
use aqua_core::{Entities, Entity};
use aqua_tracking::{Day, Record, User};
use tracing::trace;

use super::rows::{DayRow, RecordRow, TrackingState, UserRow};
use super::users::InMemoryUsers;
use crate::storage::{HasStorage, TransactionalStorage};

/// An entity with a table in [`TrackingState`].
pub trait Stored: Entity {
    type Row: Send + Sync;

    const TABLE: &'static str;

    fn to_row(&self) -> Self::Row;

    fn table(state: &mut TrackingState) -> &mut HashMap<Self::Id, Self::Row>;
}

impl Stored for User {
    type Row = UserRow;

    const TABLE: &'static str = "users";

    fn to_row(&self) -> UserRow {
        UserRow::from(self)
    }

    fn table(state: &mut TrackingState) -> &mut HashMap<Self::Id, UserRow> {
        &mut state.users
    }
}

impl Stored for Day {
    type Row = DayRow;

    const TABLE: &'static str = "days";

    fn to_row(&self) -> DayRow {
        DayRow::from(self)
    }

    fn table(state: &mut TrackingState) -> &mut HashMap<Self::Id, DayRow> {
        &mut state.days
    }
}

impl Stored for Record {
    type Row = RecordRow;

    const TABLE: &'static str = "records";

    fn to_row(&self) -> RecordRow {
        RecordRow::from(self)
    }

    fn table(state: &mut TrackingState) -> &mut HashMap<Self::Id, RecordRow> {
        &mut state.records
    }
}

/// Writes one entity type into its table.
///
/// Updating or deleting a row that does not exist fails with
/// [`MapperError::Missing`] and leaves the table as it was.
pub struct InMemoryMapper<E> {
    storage: Arc<TransactionalStorage<TrackingState>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> InMemoryMapper<E> {
    pub fn new(storage: Arc<TransactionalStorage<TrackingState>>) -> Self {
        Self {
            storage,
            _entity: PhantomData,
        }
    }
}

impl<E> core::fmt::Debug for InMemoryMapper<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryMapper")
            .field("entity", &core::any::type_name::<E>())
            .finish_non_exhaustive()
    }
}

fn first_missing<E: Stored>(
    table: &HashMap<E::Id, E::Row>,
    entities: &Entities<E>,
) -> Result<(), MapperError>
where
    E::Id: core::fmt::Display,
{
    match entities.ids().find(|id| !table.contains_key(*id)) {
        Some(id) => Err(MapperError::missing(core::any::type_name::<E>(), id)),
        None => Ok(()),
    }
}

#[async_trait::async_trait]
impl<E> Mapper<E> for InMemoryMapper<E>
where
    E: Stored,
    E::Id: core::fmt::Display,
{
    async fn add_all(&self, entities: &Entities<E>) -> Result<(), MapperError> {
        trace!(table = E::TABLE, count = entities.len(), "inserting rows");
        self.storage.mutate(|state| {
            let table = E::table(state);
            for entity in entities.iter() {
                table.insert(entity.id().clone(), entity.to_row());
            }
        })?;
        Ok(())
    }

    async fn update_all(&self, entities: &Entities<E>) -> Result<(), MapperError> {
        trace!(table = E::TABLE, count = entities.len(), "updating rows");
        self.storage.mutate(|state| -> Result<(), MapperError> {
            let table = E::table(state);
            first_missing(table, entities)?;
            for entity in entities.iter() {
                table.insert(entity.id().clone(), entity.to_row());
            }
            Ok(())
        })?
    }

    async fn delete_all(&self, entities: &Entities<E>) -> Result<(), MapperError> {
        trace!(table = E::TABLE, count = entities.len(), "deleting rows");
        self.storage.mutate(|state| -> Result<(), MapperError> {
            let table = E::table(state);
            first_missing(table, entities)?;
            for id in entities.ids() {
                table.remove(id);
            }
            Ok(())
        })?
    }
}

/// Binds an [`InMemoryMapper`] to the storage of [`InMemoryUsers`].
#[derive(Debug, Default, Copy, Clone)]
pub struct InMemoryMapperFactory;

impl<E> MapperFactory<InMemoryUsers, E> for InMemoryMapperFactory
where
    E: Stored,
    E::Id: core::fmt::Display,
{
    type Mapper = InMemoryMapper<E>;

    fn mapper_for(&self, users: &InMemoryUsers) -> InMemoryMapper<E> {
        InMemoryMapper::new(users.storage().clone())
    }
}
