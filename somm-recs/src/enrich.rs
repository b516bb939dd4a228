//! Artwork enrichment
//!
//! Runs after a batch is assembled, off the playback path. Slots are
//! filled in place; the list's length, order, and dedup keys are never
//! altered. Because lookups may finish after the batch has been
//! replaced, every application re-checks that the slot still holds the
//! track the lookup was issued for.

use crate::sources::ArtworkSource;
use somm_model::{ArtworkRef, Track};

/// Apply one finished lookup to the slot it was issued for
///
/// Returns false without touching anything when the slot is gone or
/// now holds a different track.
pub fn attach_artwork(tracks: &mut [Track], index: usize, key: &str, artwork: ArtworkRef) -> bool {
    match tracks.get_mut(index) {
        Some(slot) if slot.dedup_key() == key => {
            slot.artwork = Some(artwork);
            true
        }
        Some(_) => {
            tracing::debug!(index, key, "artwork arrived for a replaced slot, dropped");
            false
        }
        None => false,
    }
}

/// Fetch and attach artwork for every slot still missing it
pub fn enrich_artwork(tracks: &mut [Track], source: &dyn ArtworkSource) {
    let pending: Vec<(usize, String, String, String)> = tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.artwork.is_none())
        .map(|(i, t)| (i, t.dedup_key(), t.title.clone(), t.artist.clone()))
        .collect();

    for (index, key, title, artist) in pending {
        if let Some(artwork) = source.find_artwork(&title, &artist) {
            attach_artwork(tracks, index, &key, artwork);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapArtwork;

    impl ArtworkSource for MapArtwork {
        fn find_artwork(&self, title: &str, _artist: &str) -> Option<ArtworkRef> {
            if title == "Findable" {
                Some(ArtworkRef {
                    url: "https://art.example/findable.jpg".into(),
                })
            } else {
                None
            }
        }
    }

    #[test]
    fn test_enrichment_preserves_length_order_and_keys() {
        let mut tracks = vec![
            Track::new("1", "Findable", "Ana"),
            Track::new("2", "Missing", "Bo"),
            Track::new("3", "Findable", "Cy"),
        ];
        let keys_before: Vec<String> = tracks.iter().map(|t| t.dedup_key()).collect();

        enrich_artwork(&mut tracks, &MapArtwork);

        assert_eq!(tracks.len(), 3);
        let keys_after: Vec<String> = tracks.iter().map(|t| t.dedup_key()).collect();
        assert_eq!(keys_before, keys_after);
        assert!(tracks[0].artwork.is_some());
        assert!(tracks[1].artwork.is_none());
        assert!(tracks[2].artwork.is_some());
    }

    #[test]
    fn test_existing_artwork_is_not_refetched() {
        let mut tracks = vec![Track::new("1", "Findable", "Ana")];
        tracks[0].artwork = Some(ArtworkRef {
            url: "https://art.example/original.jpg".into(),
        });

        enrich_artwork(&mut tracks, &MapArtwork);
        assert_eq!(
            tracks[0].artwork.as_ref().map(|a| a.url.as_str()),
            Some("https://art.example/original.jpg")
        );
    }

    #[test]
    fn test_late_lookup_for_replaced_slot_is_dropped() {
        let mut tracks = vec![Track::new("1", "Old Song", "Ana")];
        let stale_key = tracks[0].dedup_key();
        tracks[0] = Track::new("2", "New Song", "Bo");

        let applied = attach_artwork(
            &mut tracks,
            0,
            &stale_key,
            ArtworkRef {
                url: "https://art.example/old.jpg".into(),
            },
        );
        assert!(!applied);
        assert!(tracks[0].artwork.is_none());

        let applied = attach_artwork(
            &mut tracks,
            5,
            &stale_key,
            ArtworkRef {
                url: "https://art.example/old.jpg".into(),
            },
        );
        assert!(!applied);
    }
}
