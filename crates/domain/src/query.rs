//! Read-side workflow shared by aggregates and projections.

use common::{Stage, WorkflowError, WorkflowResult};
use event_store::{EventStore, StreamKey};
use serde::{Serialize, de::DeserializeOwned};

use crate::aggregate::Apply;
use crate::hydrator::hydrate;
use crate::sequencer::{last_folded_sequence, last_snapshot_sequence};
use crate::snapshot_policy::SnapshotPolicy;

/// Loads `stream`, hydrates it onto `default_state` and returns the result.
///
/// The snapshot policy is evaluated on the way out, so a read may write a
/// snapshot. A failed snapshot write is logged and counted but the read
/// still succeeds.
///
/// # Errors
///
/// - `Persistance` when the store cannot load the stream.
/// - `Persistance` for aggregate streams and `Projection` for projection
///   streams when an accepted snapshot cannot be decoded.
pub async fn read_stream<S, St>(
    store: &St,
    stream: &StreamKey,
    default_state: &S,
    policy: &SnapshotPolicy,
) -> WorkflowResult<S>
where
    S: Apply<St::Event> + Clone + Serialize + DeserializeOwned + Sync,
    St: EventStore + ?Sized,
{
    metrics::counter!("reads_total", "kind" => read_kind(stream)).increment(1);

    let expected_version = policy.expected_version();
    let bundle = store.load(stream, expected_version).await?;

    let state = hydrate(
        default_state,
        bundle.snapshot.as_ref(),
        expected_version,
        &bundle.events,
    )
    .map_err(|e| {
        WorkflowError::new(
            hydration_stage(stream),
            format!("cannot decode snapshot: {e}"),
        )
    })?;

    tracing::debug!(
        %stream,
        events = bundle.events.len(),
        from_snapshot = bundle.snapshot.is_some(),
        "stream hydrated"
    );

    if let Err(err) = policy
        .maybe_snapshot(
            store,
            stream,
            &state,
            last_folded_sequence(&bundle),
            last_snapshot_sequence(&bundle),
        )
        .await
    {
        report_side_effect_failure(stream, &err);
    }

    Ok(state)
}

fn read_kind(stream: &StreamKey) -> &'static str {
    match stream {
        StreamKey::Aggregate { .. } => "aggregate",
        StreamKey::Named { .. } => "named_projection",
        StreamKey::Global { .. } => "global_projection",
    }
}

fn hydration_stage(stream: &StreamKey) -> Stage {
    match stream {
        StreamKey::Aggregate { .. } => Stage::Persistance,
        StreamKey::Named { .. } | StreamKey::Global { .. } => Stage::Projection,
    }
}

/// Logs and counts a failed snapshot write or publish that the caller
/// does not surface.
pub(crate) fn report_side_effect_failure(stream: &StreamKey, err: &WorkflowError) {
    metrics::counter!("side_effect_failures_total", "stage" => err.stage().as_str())
        .increment(1);
    tracing::warn!(
        %stream,
        stage = %err.stage(),
        error = err.message(),
        "side effect failed"
    );
}
