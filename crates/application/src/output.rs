//! Output pipeline: the single consumer of an [`Effect`].

use std::sync::Arc;

use aqua_core::Effect;
use tracing::debug;

use crate::error::OutputError;
use crate::mapper::Mappers;

/// Audit logging of a finished effect.
///
/// Infallible by signature: a logger that cannot write must deal with it
/// itself instead of failing the use case.
#[async_trait::async_trait]
pub trait EffectLog: Send + Sync {
    async fn log_effect(&self, effect: &Effect);
}

#[async_trait::async_trait]
impl<L> EffectLog for Arc<L>
where
    L: EffectLog + ?Sized,
{
    async fn log_effect(&self, effect: &Effect) {
        (**self).log_effect(effect).await
    }
}

#[async_trait::async_trait]
impl<'a, L> EffectLog for &'a L
where
    L: EffectLog + ?Sized,
{
    async fn log_effect(&self, effect: &Effect) {
        (**self).log_effect(effect).await
    }
}

/// Logs an effect and replays it into persistence through [`Mappers`].
#[derive(Debug)]
pub struct Output<L> {
    mappers: Mappers,
    log: L,
}

impl<L: EffectLog> Output<L> {
    pub fn new(mappers: Mappers, log: L) -> Self {
        Self { mappers, log }
    }

    pub fn mappers(&self) -> &Mappers {
        &self.mappers
    }

    /// Consume `effect`.
    ///
    /// A cancelled effect is skipped entirely. Otherwise every tracked type
    /// must have a mapper (checked before anything is logged or written), the
    /// effect is logged, and each registered type is dispatched as
    /// `add_all(new)`, `update_all(dirty)`, `delete_all(deleted)`.
    ///
    /// The effect is taken by value, so it cannot be output twice:
    ///
    /// ```compile_fail
    /// # use aqua_application::{EffectLog, Output};
    /// # use aqua_core::Effect;
    /// # struct Quiet;
    /// # #[async_trait::async_trait]
    /// # impl EffectLog for Quiet {
    /// #     async fn log_effect(&self, _: &Effect) {}
    /// # }
    /// # async fn twice(output: Output<Quiet>, effect: Effect) {
    /// output.run(effect).await.ok();
    /// output.run(effect).await.ok();
    /// # }
    /// ```
    pub async fn run(&self, effect: Effect) -> Result<(), OutputError> {
        if effect.is_cancelled() {
            debug!("effect cancelled; nothing to output");
            return Ok(());
        }

        if let Some(unmapped) = effect
            .tracked_types()
            .find(|ty| !self.mappers.contains(*ty))
        {
            return Err(OutputError::NoMapper(unmapped.name()));
        }

        self.log.log_effect(&effect).await;
        self.mappers.dispatch(&effect).await?;

        debug!(entities = effect.len(), "effect output");
        Ok(())
    }
}
