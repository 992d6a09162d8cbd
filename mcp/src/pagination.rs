//! Cursor-based pagination over a [`FeatureSet`].
//!
//! A page ends with an opaque cursor token encoding the key of its last
//! entry. The next request resumes strictly above that key, so entries
//! added or removed between requests never cause a key to be returned twice.
//!
//! Token format: URL-safe base64 of `{"last": <key>}` in JSON.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use crate::{
    config::DEFAULT_PAGE_SIZE,
    error::{FeatureError, FeatureResult},
    registry::FeatureSet,
};

#[derive(Serialize, Deserialize)]
struct CursorToken<K> {
    last: K,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the following page; `None` on the last page
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Encode a key as an opaque cursor token.
pub fn encode_cursor<K: Serialize>(last: &K) -> FeatureResult<String> {
    let json = serde_json::to_vec(&CursorToken { last })
        .map_err(|e| FeatureError::InvalidCursor(format!("failed to encode cursor: {}", e)))?;
    Ok(URL_SAFE.encode(json))
}

/// Decode a cursor token produced by [`encode_cursor`].
pub fn decode_cursor<K: DeserializeOwned>(token: &str) -> FeatureResult<K> {
    let bytes = URL_SAFE.decode(token).map_err(|e| {
        warn!("Rejected cursor with invalid encoding: {}", e);
        FeatureError::InvalidCursor(token.to_string())
    })?;
    let decoded: CursorToken<K> = serde_json::from_slice(&bytes).map_err(|e| {
        warn!("Rejected cursor with invalid payload: {}", e);
        FeatureError::InvalidCursor(token.to_string())
    })?;
    Ok(decoded.last)
}

/// Slices a feature set into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Return the page following `cursor`, or the first page when `cursor` is
    /// `None` or empty.
    pub fn paginate<T, K>(
        &self,
        features: &FeatureSet<T, K>,
        cursor: Option<&str>,
    ) -> FeatureResult<Page<T>>
    where
        T: Clone,
        K: Ord + Serialize + DeserializeOwned,
    {
        // One extra entry tells whether another page follows.
        let window = self.page_size.saturating_add(1);
        let mut items: Vec<T> = match cursor.filter(|c| !c.is_empty()) {
            None => features.first_n(window).collect(),
            Some(token) => {
                let last: K = decode_cursor(token)?;
                features.above_n(&last, window).collect()
            }
        };

        let has_more = items.len() > self.page_size;
        items.truncate(self.page_size);

        let next_cursor = match items.last() {
            Some(last) if has_more => Some(encode_cursor(&features.key_of(last))?),
            _ => None,
        };

        Ok(Page { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    fn fruit_set(names: &[&str]) -> FeatureSet<String, String> {
        let set = FeatureSet::new(|name: &String| name.clone());
        set.add(names.iter().map(|n| n.to_string()));
        set
    }

    #[test]
    fn test_cursor_roundtrip() {
        let token = encode_cursor(&"banana".to_string()).unwrap();
        let decoded: String = decode_cursor(&token).unwrap();
        assert_eq!(decoded, "banana");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_cursor::<String>("not base64!").unwrap_err();
        assert!(matches!(err, FeatureError::InvalidCursor(_)));

        let not_json = URL_SAFE.encode(b"plain text");
        let err = decode_cursor::<String>(&not_json).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidCursor(_)));

        let wrong_type = encode_cursor(&42u64).unwrap();
        let err = decode_cursor::<String>(&wrong_type).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidCursor(_)));
    }

    #[test]
    fn test_single_page_has_no_cursor() {
        let set = fruit_set(&["cherry", "apple", "banana"]);
        let page = Paginator::new(10).paginate(&set, None).unwrap();

        assert_eq!(page.items, vec!["apple", "banana", "cherry"]);
        assert!(page.is_last());
    }

    #[test]
    fn test_walk_all_pages() {
        let names: Vec<String> = (0..23).map(|i| format!("tool_{:02}", i)).collect();
        let set = FeatureSet::new(|name: &String| name.clone());
        set.add(names.iter().rev().cloned());

        let paginator = Paginator::new(5);
        let mut cursor: Option<String> = None;
        let mut collected = Vec::new();
        let mut pages = 0;

        loop {
            let page = paginator.paginate(&set, cursor.as_deref()).unwrap();
            pages += 1;
            assert!(page.items.len() <= 5);
            collected.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(pages, 5);
        assert_eq!(collected, names);
    }

    #[test]
    fn test_exactly_full_last_page() {
        let set = fruit_set(&["a", "b", "c", "d"]);
        let paginator = Paginator::new(2);

        let first = paginator.paginate(&set, None).unwrap();
        assert_eq!(first.items, vec!["a", "b"]);
        let second = paginator
            .paginate(&set, first.next_cursor.as_deref())
            .unwrap();
        assert_eq!(second.items, vec!["c", "d"]);
        assert!(second.is_last());
    }

    #[test]
    fn test_empty_cursor_starts_from_beginning() {
        let set = fruit_set(&["apple", "banana"]);
        let page = Paginator::new(1).paginate(&set, Some("")).unwrap();
        assert_eq!(page.items, vec!["apple"]);
        assert!(page.next_cursor.is_some());
    }

    #[test]
    fn test_cursor_survives_removal_of_last_key() {
        let set = fruit_set(&["apple", "banana", "cherry", "durian"]);
        let paginator = Paginator::new(2);

        let first = paginator.paginate(&set, None).unwrap();
        set.remove(["banana"]);
        set.add(["aardvark".to_string()]);

        let second = paginator
            .paginate(&set, first.next_cursor.as_deref())
            .unwrap();
        assert_eq!(second.items, vec!["cherry", "durian"]);
    }

    #[test]
    fn test_empty_set_yields_empty_last_page() {
        let set = fruit_set(&[]);
        let page = Paginator::default().paginate(&set, None).unwrap();
        assert!(page.items.is_empty());
        assert!(page.is_last());
    }

    #[test]
    fn test_invalid_cursor_is_error() {
        let set = fruit_set(&["apple"]);
        let result = Paginator::default().paginate(&set, Some("%%%"));
        assert!(matches!(result, Err(FeatureError::InvalidCursor(_))));
    }

    #[derive(Debug)]
    struct CountedEntry {
        name: String,
        clones: Arc<AtomicUsize>,
    }

    impl Clone for CountedEntry {
        fn clone(&self) -> Self {
            self.clones.fetch_add(1, Ordering::SeqCst);
            Self {
                name: self.name.clone(),
                clones: Arc::clone(&self.clones),
            }
        }
    }

    #[test]
    fn test_page_copies_at_most_one_extra_entry() {
        let clones = Arc::new(AtomicUsize::new(0));
        let set = FeatureSet::new(|entry: &CountedEntry| entry.name.clone());
        set.add((0..100).map(|i| CountedEntry {
            name: format!("entry_{:03}", i),
            clones: Arc::clone(&clones),
        }));
        clones.store(0, Ordering::SeqCst);

        let paginator = Paginator::new(2);
        let first = paginator.paginate(&set, None).unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(clones.load(Ordering::SeqCst), 3);

        clones.store(0, Ordering::SeqCst);
        let second = paginator
            .paginate(&set, first.next_cursor.as_deref())
            .unwrap();
        assert_eq!(second.items[0].name, "entry_002");
        assert_eq!(clones.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_page_size_clamped() {
        assert_eq!(Paginator::new(0).page_size(), 1);
        assert_eq!(Paginator::default().page_size(), DEFAULT_PAGE_SIZE);
    }
}
