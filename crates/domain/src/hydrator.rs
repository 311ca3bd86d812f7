//! Rebuilds current state from a baseline and the pending events.

use event_store::{PersistedEvent, Snapshot};
use serde::de::DeserializeOwned;

use crate::aggregate::Apply;

/// Whether `snapshot` may be used as the hydration baseline.
///
/// Only a snapshot whose version equals the version the caller expects is
/// usable. Without an expected version every snapshot is treated as stale.
pub fn accepts_snapshot(snapshot: Option<&Snapshot>, expected_version: Option<u32>) -> bool {
    match (snapshot, expected_version) {
        (Some(snapshot), Some(expected)) => snapshot.version == expected,
        _ => false,
    }
}

/// Left-folds `events`, in the order given, onto `state`.
pub fn fold<S, E>(state: S, events: &[PersistedEvent<E>]) -> S
where
    S: Apply<E>,
{
    events.iter().fold(state, |state, event| state.apply(event))
}

/// Computes current state from an optional snapshot and the pending events.
///
/// The baseline is the snapshot's state when [`accepts_snapshot`] holds and
/// `default_state` otherwise; `events` are then folded onto it. A rejected
/// snapshot does not widen `events`: the caller must have loaded the stream
/// with the same expected version so that the events cover everything after
/// whichever baseline is chosen.
///
/// Fails only if an accepted snapshot cannot be decoded into `S`.
pub fn hydrate<S, E>(
    default_state: &S,
    snapshot: Option<&Snapshot>,
    expected_version: Option<u32>,
    events: &[PersistedEvent<E>],
) -> Result<S, serde_json::Error>
where
    S: Apply<E> + Clone + DeserializeOwned,
{
    let baseline = match snapshot {
        Some(snapshot) if accepts_snapshot(Some(snapshot), expected_version) => {
            snapshot.state_as::<S>()?
        }
        _ => default_state.clone(),
    };

    Ok(fold(baseline, events))
}
