use std::any::TypeId;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::trace;

use crate::container::{BuildContext, BuildError, BuildStrategy};
use crate::engine::{CompositionEngine, CompositionError};
use crate::integration::extension::CompositionIntegration;
use crate::part::{ImportPoint, Part};

/// Bounds the busy-retry performed when a recomposition pass collides with
/// another one already in flight.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// How many compose attempts to make before giving up.
    pub max_attempts: u32,
    /// The pause before the second attempt; doubled after each conflict.
    pub initial_backoff: Duration,
    /// The upper bound on the pause between attempts.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 64,
            initial_backoff: Duration::from_micros(20),
            max_backoff: Duration::from_millis(5),
        }
    }
}

/// The post-construction hook of the bridge: satisfies a freshly constructed
/// part's imports against the composition scope of the container it was
/// built on.
///
/// Parts that opted out are skipped entirely. Parts with at least one
/// recomposable import go through `compose`, retrying on transient
/// recomposition conflicts per the [`RetryPolicy`]; all other parts get a
/// plain one-shot satisfaction pass. Every other failure propagates.
pub struct ComposeStrategy {
    retry: RetryPolicy,
}

impl ComposeStrategy {
    pub fn new() -> Self {
        Self::with_retry_policy(RetryPolicy::default())
    }

    pub fn with_retry_policy(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    fn compose_with_retry(
        &self,
        engine: &dyn CompositionEngine,
        part: &mut dyn Part,
    ) -> Result<(), CompositionError> {
        let mut backoff = self.retry.initial_backoff;
        for attempt in 1..=self.retry.max_attempts {
            match engine.compose(part) {
                Err(CompositionError::RecompositionConflict) => {
                    if attempt == self.retry.max_attempts {
                        break;
                    }
                    trace!(attempt, "recomposition conflict, backing off");
                    thread::sleep(backoff);
                    backoff = (backoff * 2).min(self.retry.max_backoff);
                }
                other => return other,
            }
        }
        Err(CompositionError::RecompositionLivelock {
            attempts: self.retry.max_attempts,
        })
    }
}

impl BuildStrategy for ComposeStrategy {
    fn post_build_up(
        &self,
        context: &BuildContext<'_>,
        existing: &mut dyn Part,
    ) -> Result<(), BuildError> {
        if existing.not_composable() {
            return Ok(());
        }

        // Absence of the integration is a setup bug in the hosting
        // application, not a runtime condition.
        let Some(integration) = context.container().extension::<CompositionIntegration>() else {
            panic!(
                "composition integration must be enabled on the container \
                 or an ancestor before its build pipeline runs"
            );
        };

        let engine = integration.engine().as_ref();
        let result = if requires_recomposition(existing) {
            self.compose_with_retry(engine, existing)
        } else {
            engine.satisfy_imports_once(existing)
        };
        result.map_err(|source| BuildError::Composition {
            contract: context.contract().dyn_clone(),
            source,
        })
    }
}

fn recompose_cache() -> &'static RwLock<HashMap<TypeId, bool>> {
    static CACHE: OnceLock<RwLock<HashMap<TypeId, bool>>> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

/// Whether `part`'s concrete type carries at least one recomposable import.
///
/// The decision is memoized process-wide per type: the read path takes no
/// exclusive lock, and the import enumeration runs at most once per type
/// even under concurrent first-time lookups.
pub(crate) fn requires_recomposition(part: &dyn Part) -> bool {
    let type_id = part.as_any().type_id();
    if let Some(flag) = recompose_cache().read().get(&type_id) {
        return *flag;
    }

    let mut cache = recompose_cache().write();
    *cache
        .entry(type_id)
        .or_insert_with(|| part.imports().iter().any(ImportPoint::allow_recomposition))
}
