use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use session_recommender::{
    db::DataSource,
    error::{AppError, AppResult},
    models::{Enrollment, RawDataset, Session, Tag, User},
    services::{snapshot_channel, HybridScorer, LevelPolicy, SnapshotRefresher},
};

/// Serves a small dataset or a large one on alternate calls, failing every third call
struct AlternatingSource {
    calls: AtomicUsize,
}

fn dataset(users: i64, sessions: i64) -> RawDataset {
    RawDataset {
        users: (1..=users)
            .map(|id| {
                User::new(id)
                    .with_job(if id % 2 == 0 { "engineer" } else { "designer" })
                    .with_years((id % 7) as f64)
            })
            .collect(),
        sessions: (1..=sessions).map(|session_id| Session { session_id }).collect(),
        enrollments: (1..=users)
            .map(|id| Enrollment::new(id, id % sessions + 1))
            .collect(),
        tags: (1..=sessions)
            .map(|id| Tag::field(id, if id % 2 == 0 { "backend" } else { "frontend" }))
            .collect(),
    }
}

#[async_trait::async_trait]
impl DataSource for AlternatingSource {
    async fn load(&self) -> AppResult<RawDataset> {
        match self.calls.fetch_add(1, Ordering::SeqCst) % 3 {
            0 => Ok(dataset(10, 4)),
            1 => Ok(dataset(40, 12)),
            _ => Err(AppError::DataLoad("replica lag".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "alternating"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_see_whole_snapshots_during_refresh() {
    let source: Arc<dyn DataSource> = Arc::new(AlternatingSource {
        calls: AtomicUsize::new(0),
    });
    let (publisher, reader) = snapshot_channel();
    let refresher = Arc::new(SnapshotRefresher::new(source, publisher, LevelPolicy::default()));
    refresher.refresh_once().await.unwrap();

    let writer = {
        let refresher = Arc::clone(&refresher);
        tokio::spawn(async move {
            for _ in 0..12 {
                let _ = refresher.refresh_once().await;
            }
        })
    };

    let mut readers = Vec::new();
    for user_id in 1..=8 {
        let reader = reader.clone();
        readers.push(tokio::spawn(async move {
            let scorer = HybridScorer::default();
            for _ in 0..50 {
                let snapshot = reader.require().unwrap();
                let summary = snapshot.summary();
                assert!(
                    (summary.user_count, summary.session_count) == (10, 4)
                        || (summary.user_count, summary.session_count) == (40, 12)
                );
                let first = scorer.recommend(&snapshot, user_id, 3);
                assert_eq!(first.len(), 3);
                assert_eq!(scorer.recommend(&snapshot, user_id, 3), first);
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for handle in readers {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_failed_cycle_leaves_published_snapshot_untouched() {
    let source = Arc::new(AlternatingSource {
        calls: AtomicUsize::new(1),
    });
    let (publisher, reader) = snapshot_channel();
    let refresher = SnapshotRefresher::new(source, publisher, LevelPolicy::default());

    let published = refresher.refresh_once().await.unwrap();
    let before = reader.require().unwrap().summary();

    assert!(refresher.refresh_once().await.is_err());
    let after = reader.require().unwrap();
    assert!(Arc::ptr_eq(&published, &after));
    assert_eq!(after.summary(), before);
}
