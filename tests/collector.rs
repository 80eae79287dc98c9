//! Collector Integration Tests
//!
//! Source aggregation, failure isolation and batching.

mod common;

use common::{ids, track, Call, FakeApi};
use mixtape::adapters::MAX_IDS_PER_CALL;
use mixtape::core::{Collector, Source, SourceOutcome};
use mixtape::PlaylistSettings;

fn settings(seeds: &[&str]) -> PlaylistSettings {
    PlaylistSettings {
        seeds: ids(seeds),
        ..PlaylistSettings::new("PLtarget")
    }
}

fn collected_ids(collection: &mixtape::core::Collection) -> Vec<String> {
    let mut out: Vec<String> = collection.videos().map(|v| v.id.clone()).collect();
    out.sort();
    out
}

#[tokio::test]
async fn test_liked_and_seed_sources_are_pooled() {
    let api = FakeApi::new()
        .liked(vec![track("l1"), track("l2")])
        .catalog(vec![track("s1"), track("s2")])
        .playlist("PLseed", &["s1", "s2"]);

    let collection = Collector::new(&api).collect(&settings(&["PLseed"])).await;

    assert_eq!(collection.fetched_sources(), 2);
    assert_eq!(collection.failures().count(), 0);
    assert_eq!(collected_ids(&collection), ids(&["l1", "l2", "s1", "s2"]));
}

#[tokio::test]
async fn test_failing_seed_is_skipped() {
    let api = FakeApi::new()
        .liked(vec![track("l1")])
        .catalog(vec![track("s1")])
        .playlist("PLgood", &["s1"])
        .fail_playlist("PLbroken");

    let collection = Collector::new(&api)
        .collect(&settings(&["PLbroken", "PLgood"]))
        .await;

    let failures: Vec<_> = collection.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, &Source::Seed("PLbroken".to_string()));
    assert!(failures[0].1.contains("Playlist not found"));

    assert_eq!(collected_ids(&collection), ids(&["l1", "s1"]));
}

#[tokio::test]
async fn test_failing_liked_videos_is_skipped() {
    let api = FakeApi::new()
        .fail_liked()
        .catalog(vec![track("s1")])
        .playlist("PLseed", &["s1"]);

    let collection = Collector::new(&api).collect(&settings(&["PLseed"])).await;

    assert!(matches!(
        &collection.outcomes[0],
        SourceOutcome::Failed { source: Source::Liked, .. }
    ));
    assert_eq!(collected_ids(&collection), ids(&["s1"]));
}

#[tokio::test]
async fn test_target_is_never_used_as_seed() {
    let api = FakeApi::new()
        .catalog(vec![track("t1")])
        .playlist("PLtarget", &["t1"]);

    let collection = Collector::new(&api)
        .collect(&settings(&["PLtarget", "PLtarget"]))
        .await;

    assert_eq!(api.playlist_reads("PLtarget"), 0);
    assert_eq!(collection.outcomes.len(), 1);
    assert_eq!(collection.outcomes[0].source(), &Source::Liked);
}

#[tokio::test]
async fn test_liked_can_be_disabled() {
    let api = FakeApi::new().liked(vec![track("l1")]);
    let settings = PlaylistSettings {
        include_liked: false,
        ..PlaylistSettings::new("PLtarget")
    };

    let collection = Collector::new(&api).collect(&settings).await;

    assert!(collection.outcomes.is_empty());
    assert!(!api.calls().iter().any(|c| matches!(c, Call::ListLiked(_))));
}

#[tokio::test]
async fn test_duplicate_seeds_are_read_once() {
    let api = FakeApi::new()
        .catalog(vec![track("s1")])
        .playlist("PLseed", &["s1"]);

    let collection = Collector::new(&api)
        .collect(&settings(&["PLseed", "PLseed"]))
        .await;

    assert_eq!(api.playlist_reads("PLseed"), 1);
    assert_eq!(collection.outcomes.len(), 2);
}

#[tokio::test]
async fn test_metadata_is_fetched_in_batches() {
    let video_ids: Vec<String> = (0..120).map(|i| format!("s{:03}", i)).collect();
    let refs: Vec<&str> = video_ids.iter().map(String::as_str).collect();
    let api = FakeApi::with_page_size(500)
        .catalog(video_ids.iter().map(|id| track(id)).collect())
        .playlist("PLseed", &refs);

    let videos = Collector::new(&api).seed_playlist("PLseed").await.unwrap();
    assert_eq!(videos.len(), 120);

    let batch_sizes: Vec<usize> = api
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::ListVideos(batch) => Some(batch.len()),
            _ => None,
        })
        .collect();
    assert_eq!(batch_sizes, vec![50, 50, 20]);
    assert!(batch_sizes.iter().all(|n| *n <= MAX_IDS_PER_CALL));
}

#[tokio::test]
async fn test_pagination_reads_every_page() {
    let liked: Vec<_> = (0..23).map(|i| track(&format!("l{:02}", i))).collect();
    let api = FakeApi::with_page_size(5).liked(liked);

    let videos = Collector::new(&api).liked_videos().await.unwrap();
    assert_eq!(videos.len(), 23);
    assert_eq!(videos[0].id, "l00");
    assert_eq!(videos[22].id, "l22");

    let liked_calls = api
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::ListLiked(_)))
        .count();
    assert_eq!(liked_calls, 5);
}

#[tokio::test]
async fn test_ban_set_from_playlist() {
    let api = FakeApi::new().playlist("PLban", &["x", "y"]);
    let collector = Collector::new(&api);

    let bans = collector.ban_set(Some("PLban")).await.unwrap();
    assert_eq!(bans.len(), 2);
    assert!(bans.contains("x"));
    assert!(!bans.contains("z"));

    assert!(collector.ban_set(None).await.unwrap().is_empty());
}
