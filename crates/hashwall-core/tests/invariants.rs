//! Property tests: the store never exceeds capacity, never holds the same
//! image twice, and matches a plain model of the eviction rule.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use hashwall_core::app::IngestionPolicy;
use hashwall_core::domain::{Extraction, NewImageRecord, OutcomeKind};
use hashwall_core::impls::InMemoryRecordStore;
use hashwall_core::ports::RecordStore;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 4, 24, 0, 0, 0).unwrap()
}

/// Items as (url index or no image, created_at offset). Offsets are a
/// permutation so no two items share a timestamp.
fn items() -> impl Strategy<Value = Vec<(Option<u8>, i64)>> {
    prop::collection::vec(prop::option::weighted(0.85, 0u8..12), 0..60).prop_flat_map(|urls| {
        let offsets: Vec<i64> = (0..urls.len() as i64).collect();
        (Just(urls), Just(offsets).prop_shuffle())
            .prop_map(|(urls, offsets)| urls.into_iter().zip(offsets).collect::<Vec<_>>())
    })
}

/// Reference model: Vec of (created_at offset, url).
fn model_step(model: &mut Vec<(i64, String)>, max: usize, url: String, at: i64) -> OutcomeKind {
    if model.len() >= max {
        if let Some(pos) = model.iter().enumerate().min_by_key(|(_, (t, _))| *t).map(|(i, _)| i) {
            model.remove(pos);
        }
    }
    if model.iter().any(|(_, u)| *u == url) {
        OutcomeKind::SkippedDuplicate
    } else {
        model.push((at, url));
        OutcomeKind::Inserted
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn store_matches_model(max in 1usize..8, items in items()) {
        let rt = runtime();
        let (stored, expected, kinds, expected_kinds) = rt.block_on(async {
            let policy = IngestionPolicy::new(InMemoryRecordStore::new(), max).unwrap();
            let mut model = Vec::new();
            let mut kinds = Vec::new();
            let mut expected_kinds = Vec::new();

            for (url, at) in items {
                let extraction = match url {
                    Some(n) => {
                        let url = format!("http://img/{n}.jpg");
                        expected_kinds.push(model_step(&mut model, max, url.clone(), at));
                        Extraction::Image(
                            NewImageRecord::new("fash_rev", url)
                                .with_created_at(t0() + Duration::minutes(at)),
                        )
                    }
                    None => {
                        expected_kinds.push(OutcomeKind::SkippedNoImage);
                        Extraction::NoImage
                    }
                };
                kinds.push(policy.ingest(extraction).await.unwrap().kind());
            }

            let mut stored: Vec<String> = policy
                .store()
                .recent(usize::MAX)
                .await
                .unwrap()
                .into_iter()
                .map(|r| r.image_url)
                .collect();
            stored.sort();
            let mut expected: Vec<String> = model.into_iter().map(|(_, url)| url).collect();
            expected.sort();
            (stored, expected, kinds, expected_kinds)
        });

        prop_assert_eq!(kinds, expected_kinds);
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn capacity_and_uniqueness_hold(max in 1usize..6, urls in prop::collection::vec(0u8..10, 0..40)) {
        let rt = runtime();
        rt.block_on(async {
            let policy = IngestionPolicy::new(InMemoryRecordStore::new(), max).unwrap();
            for (i, n) in urls.into_iter().enumerate() {
                let record = NewImageRecord::new("fash_rev", format!("http://img/{n}.jpg"))
                    .with_created_at(t0() + Duration::seconds(i as i64));
                policy.ingest(Extraction::Image(record)).await.unwrap();

                let records = policy.store().recent(usize::MAX).await.unwrap();
                assert!(records.len() <= max);
                let mut seen: Vec<&str> = records.iter().map(|r| r.image_url.as_str()).collect();
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), records.len());
            }
        });
    }
}
