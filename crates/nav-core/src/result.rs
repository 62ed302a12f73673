//! Result channels.
//!
//! An instance opened for a result carries [`RESULT_CHANNEL`] metadata
//! naming the channel that waits for it. When that instance closes, the
//! controller queues a [`PendingResult`]; the queue is drained into the
//! channel's handler once the channel is registered and its owner is the
//! active destination of its container. A result is delivered at most once,
//! and results whose owner is torn down first are discarded.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use nav_model::{InstanceId, MetadataKey, PendingOutcome, PendingResult, ResultChannelId};
use serde::de::DeserializeOwned;

use crate::error::{NavigationError, Result};

/// Instance metadata naming the channel a result-producing instance reports to.
pub const RESULT_CHANNEL: MetadataKey<ResultChannelId> = MetadataKey::new("nav.result_channel");

/// What a typed channel receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult<T> {
    /// The destination closed without producing a value.
    Closed,
    Completed(T),
}

impl<T> NavigationResult<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Closed => None,
            Self::Completed(value) => Some(value),
        }
    }
}

/// Handle to a registered typed channel.
pub struct ResultChannel<T> {
    id: ResultChannelId,
    _value: PhantomData<fn() -> T>,
}

impl<T> ResultChannel<T> {
    pub(crate) fn new(id: ResultChannelId) -> Self {
        Self {
            id,
            _value: PhantomData,
        }
    }

    pub fn id(&self) -> &ResultChannelId {
        &self.id
    }
}

impl<T> Clone for ResultChannel<T> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<T> fmt::Debug for ResultChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResultChannel").field(&self.id).finish()
    }
}

pub type ResultHandler = Box<dyn FnMut(PendingOutcome) -> Result<()>>;

/// Wrap a typed callback. Payloads of another type fail the delivery with
/// [`NavigationError::ResultTypeMismatch`].
pub(crate) fn typed_handler<T, F>(mut handler: F) -> ResultHandler
where
    T: DeserializeOwned + 'static,
    F: FnMut(NavigationResult<T>) + 'static,
{
    Box::new(move |outcome: PendingOutcome| -> Result<()> {
        let result = match outcome {
            PendingOutcome::Closed => NavigationResult::Closed,
            PendingOutcome::Result { payload } => {
                NavigationResult::Completed(payload.decode::<T>()?)
            }
        };
        handler(result);
        Ok(())
    })
}

/// Pending results and the channels waiting for them.
#[derive(Default)]
pub struct ResultManager {
    pending: Vec<PendingResult>,
    channels: BTreeMap<ResultChannelId, ResultHandler>,
}

impl ResultManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result. A newer result for the same channel replaces the
    /// queued one, except that a plain close never replaces a queued value.
    pub fn post(&mut self, result: PendingResult) {
        let queued_value = self
            .pending
            .iter()
            .any(|queued| queued.channel == result.channel && !queued.outcome.is_closed());
        if result.outcome.is_closed() && queued_value {
            tracing::debug!(channel = %result.channel, "Keeping queued result over close");
            return;
        }
        let before = self.pending.len();
        self.pending.retain(|queued| queued.channel != result.channel);
        if self.pending.len() != before {
            tracing::debug!(channel = %result.channel, "Replacing queued result");
        }
        tracing::debug!(
            channel = %result.channel,
            closed = result.outcome.is_closed(),
            "Queued result"
        );
        self.pending.push(result);
    }

    /// Queued results in delivery order.
    pub fn pending(&self) -> &[PendingResult] {
        &self.pending
    }

    pub fn register(&mut self, channel: ResultChannelId, handler: ResultHandler) -> Result<()> {
        if self.channels.contains_key(&channel) {
            return Err(NavigationError::DuplicateResultChannel {
                channel: channel.to_string(),
            });
        }
        self.channels.insert(channel, handler);
        Ok(())
    }

    pub fn unregister(&mut self, channel: &ResultChannelId) -> bool {
        self.channels.remove(channel).is_some()
    }

    pub fn has_channel(&self, channel: &ResultChannelId) -> bool {
        self.channels.contains_key(channel)
    }

    /// Drop every channel and queued result owned by `owner`.
    pub fn discard_owner(&mut self, owner: &InstanceId) {
        self.channels.retain(|channel, _| &channel.owner != owner);
        let before = self.pending.len();
        self.pending.retain(|queued| &queued.channel.owner != owner);
        let dropped = before - self.pending.len();
        if dropped > 0 {
            tracing::debug!(owner = %owner, dropped, "Discarded results of torn-down owner");
        }
    }

    /// Remove and return the first queued result that can be delivered now.
    pub(crate) fn take_deliverable<F>(&mut self, owner_active: F) -> Option<PendingResult>
    where
        F: Fn(&InstanceId) -> bool,
    {
        let index = self.pending.iter().position(|queued| {
            self.channels.contains_key(&queued.channel) && owner_active(&queued.channel.owner)
        })?;
        Some(self.pending.remove(index))
    }

    /// Hand a dequeued result to its channel.
    pub(crate) fn deliver(&mut self, result: PendingResult) -> Result<()> {
        let Some(handler) = self.channels.get_mut(&result.channel) else {
            tracing::warn!(channel = %result.channel, "Dropping result for unregistered channel");
            return Ok(());
        };
        tracing::debug!(channel = %result.channel, "Delivering result");
        handler(result.outcome)
    }
}

impl fmt::Debug for ResultManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultManager")
            .field("pending", &self.pending)
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .finish()
    }
}
