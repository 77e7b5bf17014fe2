//! `aqua-application`: ports and orchestration shared by every bounded context.
//!
//! A use case runs inside a [`TransactionScope`], lets the domain populate an
//! [`Effect`](aqua_core::Effect), and hands the effect to an [`Output`]
//! pipeline that logs it and replays its changes through the registered
//! [`Mapper`]s. Nothing in here knows about a concrete storage backend.

pub mod error;
pub mod mapper;
pub mod output;
pub mod transaction;

pub use error::{MapperError, OutputError, TransactionError};
pub use mapper::{Mapper, MapperFactory, Mappers};
pub use output::{EffectLog, Output};
pub use transaction::{Transaction, TransactionFactory, TransactionScope, transactionally};
