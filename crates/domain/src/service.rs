//! Aggregate service: the command workflow and aggregate reads.

use std::sync::Arc;

use common::{
    Clock, EngineConfig, SnapshotConfig, SubjectIdError, WorkflowError, WorkflowResult,
};
use event_store::{EventPublisher, EventStore, PersistedEvent, StreamKey, SubjectId};

use crate::aggregate::Aggregate;
use crate::command::CommandHandler;
use crate::hydrator::{fold, hydrate};
use crate::query::{read_stream, report_side_effect_failure};
use crate::sequencer::{EventSequencer, last_known_sequence, last_snapshot_sequence};
use crate::snapshot_policy::SnapshotPolicy;

/// Construction-time configuration of an [`AggregateService`].
#[derive(Debug, Clone)]
pub struct AggregateOptions<A> {
    /// Stamped as `source` on every persisted event.
    pub service_name: String,
    /// The state of a subject with no history.
    pub default_state: A,
    /// Snapshotting is disabled when `None`.
    pub snapshot: Option<SnapshotConfig>,
}

impl<A> AggregateOptions<A> {
    pub fn new(service_name: impl Into<String>, default_state: A) -> Self {
        Self {
            service_name: service_name.into(),
            default_state,
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: SnapshotConfig) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Takes the service name and snapshot settings from `config`.
    pub fn from_engine_config(config: &EngineConfig, default_state: A) -> Self {
        Self {
            service_name: config.service_name.clone(),
            default_state,
            snapshot: config.snapshot,
        }
    }
}

/// Entry point for one aggregate type.
///
/// `push` runs a command against a subject and `get` reads its current
/// state. All state lives in the store; the service itself only holds
/// immutable configuration and the injected collaborators, so it can be
/// shared freely across tasks.
pub struct AggregateService<A, S>
where
    A: Aggregate,
    S: EventStore<Event = A::Event>,
{
    store: S,
    handler: Box<dyn CommandHandler<A>>,
    publisher: Option<Box<dyn EventPublisher<A, A::Event>>>,
    sequencer: EventSequencer,
    policy: SnapshotPolicy,
    default_state: A,
}

impl<A, S> AggregateService<A, S>
where
    A: Aggregate,
    S: EventStore<Event = A::Event>,
{
    pub fn new(
        options: AggregateOptions<A>,
        store: S,
        handler: impl CommandHandler<A> + 'static,
    ) -> Self {
        Self {
            store,
            handler: Box::new(handler),
            publisher: None,
            sequencer: EventSequencer::new(options.service_name),
            policy: SnapshotPolicy::new(options.snapshot),
            default_state: options.default_state,
        }
    }

    /// Publishes the events of every successful command through `publisher`.
    pub fn with_publisher(mut self, publisher: impl EventPublisher<A, A::Event> + 'static) -> Self {
        self.publisher = Some(Box::new(publisher));
        self
    }

    /// Stamps event times from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.sequencer = EventSequencer::with_clock(self.sequencer.source().to_string(), clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles `command` against `subject` and returns the resulting state.
    ///
    /// New events are appended in one call. Once they are stored, the
    /// snapshot policy and the publisher (if any) run concurrently; their
    /// failures are logged and counted but do not fail the command.
    ///
    /// A handler that produces no events leaves the stream untouched and
    /// returns the current state.
    ///
    /// # Errors
    ///
    /// - `Persistance` if the stream cannot be loaded, hydrated or appended to
    ///   (including a sequence collision with a concurrent writer).
    /// - `Command` if the handler rejects the command or `subject` is empty.
    #[tracing::instrument(
        skip_all,
        fields(aggregate = A::aggregate_type(), subject = %subject)
    )]
    pub async fn push(&self, subject: &SubjectId, command: A::Command) -> WorkflowResult<A> {
        if subject.is_empty() {
            metrics::counter!("commands_rejected_total").increment(1);
            return Err(WorkflowError::Command(SubjectIdError.to_string()));
        }

        let stream = StreamKey::aggregate(subject.clone());
        let expected_version = self.policy.expected_version();

        let bundle = self.store.load(&stream, expected_version).await?;
        let last_known = last_known_sequence(&bundle);

        let current = hydrate(
            &self.default_state,
            bundle.snapshot.as_ref(),
            expected_version,
            &bundle.events,
        )
        .map_err(|e| WorkflowError::Persistance(format!("cannot decode snapshot: {e}")))?;

        let new_events = match self.handler.handle(&current, command).await {
            Ok(events) => events,
            Err(err) => {
                metrics::counter!("commands_rejected_total").increment(1);
                tracing::debug!(error = %err, "command rejected");
                return Err(WorkflowError::Command(err.to_string()));
            }
        };
        metrics::counter!("commands_handled_total").increment(1);

        if new_events.is_empty() {
            tracing::debug!("command produced no events");
            return Ok(current);
        }

        let persisted = self.sequencer.sequence(subject, last_known, new_events);
        let last_applied = persisted
            .last()
            .map(PersistedEvent::sequence)
            .unwrap_or(last_known);

        self.store.append(persisted.clone()).await?;
        metrics::counter!("events_persisted_total").increment(persisted.len() as u64);
        tracing::debug!(count = persisted.len(), %last_applied, "events persisted");

        let final_state = fold(current, &persisted);

        let snapshot = self.policy.maybe_snapshot(
            &self.store,
            &stream,
            &final_state,
            last_applied,
            last_snapshot_sequence(&bundle),
        );
        let publish = async {
            match &self.publisher {
                Some(publisher) => publisher
                    .publish(&final_state, &persisted)
                    .await
                    .map_err(WorkflowError::from),
                None => Ok(()),
            }
        };
        let (snapshot_result, publish_result) = futures_util::join!(snapshot, publish);

        for err in [snapshot_result.err(), publish_result.err()]
            .into_iter()
            .flatten()
        {
            report_side_effect_failure(&stream, &err);
        }

        Ok(final_state)
    }

    /// Reads the current state of `subject`.
    ///
    /// May write a snapshot when one is due; a failed write does not fail
    /// the read.
    ///
    /// # Errors
    ///
    /// `Persistance` if the stream cannot be loaded or hydrated.
    #[tracing::instrument(
        skip_all,
        fields(aggregate = A::aggregate_type(), subject = %subject)
    )]
    pub async fn get(&self, subject: &SubjectId) -> WorkflowResult<A> {
        read_stream(
            &self.store,
            &StreamKey::aggregate(subject.clone()),
            &self.default_state,
            &self.policy,
        )
        .await
    }
}

impl<A, S> std::fmt::Debug for AggregateService<A, S>
where
    A: Aggregate + std::fmt::Debug,
    S: EventStore<Event = A::Event>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateService")
            .field("aggregate", &A::aggregate_type())
            .field("sequencer", &self.sequencer)
            .field("policy", &self.policy)
            .field("default_state", &self.default_state)
            .field("publishes", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}
