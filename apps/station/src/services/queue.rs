//! Queue engine
//!
//! Holds the ordered list of items scheduled after the current track and
//! publishes every change on a `watch` channel. Mutations that leave the
//! queue untouched (out-of-range removal, a resync that finds nothing to
//! do) do not notify subscribers, so observers can rely on "no change
//! notification" meaning "same queue".

use tokio::sync::watch;

use crate::models::{Playlist, QueueItem, Song};

/// Ordered upcoming-play queue
pub struct QueueEngine {
    items: watch::Sender<Vec<QueueItem>>,
}

impl Default for QueueEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueEngine {
    pub fn new() -> Self {
        let (items, _) = watch::channel(Vec::new());
        Self { items }
    }

    /// Observe the queue; the receiver starts at the current value
    pub fn subscribe(&self) -> watch::Receiver<Vec<QueueItem>> {
        self.items.subscribe()
    }

    pub fn snapshot(&self) -> Vec<QueueItem> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn push_back(&self, item: QueueItem) {
        self.items.send_modify(|items| items.push(item));
    }

    pub fn push_front(&self, item: QueueItem) {
        self.items.send_modify(|items| items.insert(0, item));
    }

    /// Remove the item at `index`, tolerating stale indices
    pub fn remove(&self, index: usize) -> Option<QueueItem> {
        let mut removed = None;
        self.items.send_if_modified(|items| {
            if index < items.len() {
                removed = Some(items.remove(index));
                true
            } else {
                false
            }
        });
        removed
    }

    pub fn pop_front(&self) -> Option<QueueItem> {
        let mut head = None;
        self.items.send_if_modified(|items| {
            if items.is_empty() {
                false
            } else {
                head = Some(items.remove(0));
                true
            }
        });
        head
    }

    /// Empty the queue; returns whether anything was removed
    pub fn clear(&self) -> bool {
        self.items.send_if_modified(|items| {
            let had_items = !items.is_empty();
            items.clear();
            had_items
        })
    }

    /// Replace the queue with playlist continuation after `current`
    ///
    /// Returns `false` and leaves the queue untouched when `current` is not
    /// part of `songs`. New continuation items are stamped with `now`.
    pub fn resync(&self, current: &Song, playlist: &Playlist, songs: &[Song], now: i64) -> bool {
        self.items.send_if_modified(|items| {
            match continuation(items, current, playlist, songs, now) {
                Some(next) => {
                    *items = next;
                    true
                }
                None => false,
            }
        })
    }
}

/// Build the resynced queue: surviving request items followed by every
/// playlist song strictly after the first occurrence of `current`
pub fn continuation(
    existing: &[QueueItem],
    current: &Song,
    playlist: &Playlist,
    songs: &[Song],
    now: i64,
) -> Option<Vec<QueueItem>> {
    let position = songs.iter().position(|song| song.id == current.id)?;

    let requests = existing.iter().filter(|item| item.is_from_request).cloned();
    let upcoming = songs[position + 1..]
        .iter()
        .map(|song| QueueItem::from_playlist(song.clone(), playlist.clone(), now));

    Some(requests.chain(upcoming).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song::new(id, format!("Song {id}"), "Artist", "Album", 180_000)
    }

    fn playlist() -> Playlist {
        Playlist::new("p1", "Evening")
    }

    fn item(id: &str) -> QueueItem {
        QueueItem::from_playlist(song(id), playlist(), 0)
    }

    fn ids(engine: &QueueEngine) -> Vec<String> {
        engine.snapshot().into_iter().map(|i| i.song.id).collect()
    }

    #[test]
    fn test_push_front_and_back() {
        let engine = QueueEngine::new();
        engine.push_back(item("a"));
        engine.push_front(item("b"));
        engine.push_back(item("c"));
        assert_eq!(ids(&engine), vec!["b", "a", "c"]);
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn test_remove_out_of_range_does_not_notify() {
        let engine = QueueEngine::new();
        engine.push_back(item("a"));
        let mut rx = engine.subscribe();

        assert!(engine.remove(1).is_none());
        assert!(!rx.has_changed().unwrap());

        let removed = engine.remove(0).unwrap();
        assert_eq!(removed.song.id, "a");
        assert!(rx.has_changed().unwrap());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_pop_front_on_empty_queue() {
        let engine = QueueEngine::new();
        assert!(engine.pop_front().is_none());
    }

    #[test]
    fn test_clear_reports_whether_items_were_removed() {
        let engine = QueueEngine::new();
        assert!(!engine.clear());
        engine.push_back(item("a"));
        assert!(engine.clear());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_continuation_keeps_requests_and_drops_old_continuation() {
        let songs: Vec<Song> = ["1", "2", "3"].iter().map(|id| song(id)).collect();
        let request = QueueItem::from_request(song("r"), playlist(), "req-1", 0);
        let existing = vec![item("old"), request.clone()];

        let next = continuation(&existing, &songs[0], &playlist(), &songs, 7_000).unwrap();

        assert_eq!(next[0], request);
        assert!(next[1..].iter().all(|i| i.added_at == 7_000));
        let rest: Vec<_> = next[1..].iter().map(|i| i.song.id.as_str()).collect();
        assert_eq!(rest, vec!["2", "3"]);
        assert!(next[1..].iter().all(|i| !i.is_from_request));
    }

    #[test]
    fn test_continuation_after_last_song_keeps_only_requests() {
        let songs: Vec<Song> = ["1", "2"].iter().map(|id| song(id)).collect();
        let next = continuation(&[item("x")], &songs[1], &playlist(), &songs, 0).unwrap();
        assert!(next.is_empty());
    }

    #[test]
    fn test_continuation_uses_first_occurrence() {
        let songs: Vec<Song> = ["1", "2", "1", "3"].iter().map(|id| song(id)).collect();
        let next = continuation(&[], &song("1"), &playlist(), &songs, 0).unwrap();
        let rest: Vec<_> = next.iter().map(|i| i.song.id.as_str()).collect();
        assert_eq!(rest, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_resync_with_unknown_song_leaves_queue() {
        let engine = QueueEngine::new();
        engine.push_back(item("a"));
        let before = engine.snapshot();
        let mut rx = engine.subscribe();

        let songs = vec![song("1"), song("2")];
        assert!(!engine.resync(&song("zz"), &playlist(), &songs, 0));

        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), before);
    }
}
