use chrono::{DateTime, Duration, TimeZone, Utc};
use event_store::{
    CONTENT_TYPE, EventId, EventMetadata, PersistedEvent, SPEC_VERSION, SequenceNumber, SubjectId,
};

use crate::ProductEvent;

/// `source` stamped on fixture events.
pub const FIXTURE_SOURCE: &str = "catalog-tests";

/// Time of the first fixture event: 2024-04-19T13:37:50.937Z.
pub fn fixture_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 19, 13, 37, 50)
        .single()
        .unwrap_or_default()
        + Duration::milliseconds(937)
}

/// Builds a private event for `subject` at `sequence`.
pub fn product_event(
    subject: &str,
    sequence: u64,
    time: DateTime<Utc>,
    event: ProductEvent,
) -> PersistedEvent<ProductEvent> {
    PersistedEvent {
        event,
        subject: SubjectId::from(subject),
        id: EventId::new(SequenceNumber::new(sequence), SubjectId::from(subject)),
        time,
        datacontenttype: CONTENT_TYPE.to_string(),
        specversion: SPEC_VERSION.to_string(),
        source: FIXTURE_SOURCE.to_string(),
        metadata: EventMetadata::private(),
    }
}

/// Seven events of product `"1"`, sequences 2 through 8, one minute apart:
/// the product is created and its price then changes to 200, 201 ... 205.
pub fn projection_test_events() -> Vec<PersistedEvent<ProductEvent>> {
    let start = fixture_start();
    let created = product_event(
        "1",
        2,
        start,
        ProductEvent::ProductCreated {
            id: "1".to_string(),
            name: "test".to_string(),
        },
    );

    std::iter::once(created)
        .chain((0..6u64).map(|i| {
            product_event(
                "1",
                3 + i,
                start + Duration::minutes(i as i64 + 1),
                ProductEvent::ProductPriceChanged { price: 200 + i },
            )
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_events_are_consecutive_and_timed() {
        let events = projection_test_events();
        assert_eq!(events.len(), 7);

        let ids: Vec<String> = events.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["2_1", "3_1", "4_1", "5_1", "6_1", "7_1", "8_1"]);

        assert_eq!(
            events[0].time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2024-04-19T13:37:50.937Z"
        );
        assert_eq!(
            events[6].time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2024-04-19T13:43:50.937Z"
        );
        assert_eq!(
            events[6].event,
            ProductEvent::ProductPriceChanged { price: 205 }
        );
    }
}
