//! Snapshot iterator returned by feature enumeration.

use std::{iter::FusedIterator, sync::Arc, vec};

/// Lazy iterator over a point-in-time snapshot of a [`FeatureSet`].
///
/// The snapshot is taken when the iterator is created; later mutations of
/// the set are not observed. Entries are cloned out one at a time as the
/// iterator advances, so callers never share the registry's copy.
///
/// [`FeatureSet`]: super::FeatureSet
#[derive(Debug)]
pub struct FeatureIter<T> {
    inner: vec::IntoIter<Arc<T>>,
}

impl<T> FeatureIter<T> {
    pub(crate) fn new(snapshot: Vec<Arc<T>>) -> Self {
        Self {
            inner: snapshot.into_iter(),
        }
    }
}

impl<T: Clone> Iterator for FeatureIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(Arc::unwrap_or_clone)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Clone> ExactSizeIterator for FeatureIter<T> {}

impl<T: Clone> FusedIterator for FeatureIter<T> {}
