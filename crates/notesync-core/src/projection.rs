//! Filtered view of the synced note list (search + pinned-only).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::Note;
use crate::sync::NoteList;
use crate::util::is_blank;

/// Consumer-controlled filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionFilter {
    pub search: String,
    pub pinned_only: bool,
}

impl ProjectionFilter {
    #[must_use]
    pub fn new(search: impl Into<String>, pinned_only: bool) -> Self {
        Self {
            search: search.into(),
            pinned_only,
        }
    }
}

/// Notes matching `filter`, in their incoming order.
///
/// Search is a case-insensitive substring match on title or content, using
/// the query as typed; a blank search matches everything. The pinned-only
/// toggle composes with AND.
#[must_use]
pub fn project(notes: &[Note], filter: &ProjectionFilter) -> Vec<Note> {
    let query = normalize_query(&filter.search);
    notes
        .iter()
        .filter(|note| note_matches_query(note, &query))
        .filter(|note| !filter.pinned_only || note.pinned)
        .cloned()
        .collect()
}

/// Lowercased query; blank queries collapse to the empty string.
fn normalize_query(raw: &str) -> String {
    if is_blank(raw) {
        String::new()
    } else {
        raw.to_lowercase()
    }
}

fn note_matches_query(note: &Note, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    note.title.to_lowercase().contains(query) || note.content.to_lowercase().contains(query)
}

/// Reactive projection over a published note list.
///
/// Filter changes republish synchronously; list changes are picked up by a
/// background task on the next scheduler turn. Construct inside a tokio
/// runtime.
pub struct ViewProjection {
    inner: Arc<ProjectionInner>,
    task: JoinHandle<()>,
}

struct ProjectionInner {
    source: watch::Receiver<NoteList>,
    filter: Mutex<ProjectionFilter>,
    output: watch::Sender<NoteList>,
}

impl ProjectionInner {
    fn lock_filter(&self) -> MutexGuard<'_, ProjectionFilter> {
        self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recompute from the latest list and filter. The filter lock is held
    /// while publishing so the last publish always reflects the latest inputs.
    fn recompute(&self) {
        let filter = self.lock_filter();
        let notes = self.source.borrow().clone();
        self.output
            .send_replace(Arc::new(project(&notes, &filter)));
    }
}

impl ViewProjection {
    #[must_use]
    pub fn new(source: watch::Receiver<NoteList>) -> Self {
        let initial = project(&source.borrow(), &ProjectionFilter::default());
        let (output, _) = watch::channel(Arc::new(initial));
        let inner = Arc::new(ProjectionInner {
            source: source.clone(),
            filter: Mutex::new(ProjectionFilter::default()),
            output,
        });

        let task = tokio::spawn(follow_source(source, Arc::clone(&inner)));
        Self { inner, task }
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.inner.lock_filter().search = search.into();
        self.inner.recompute();
    }

    pub fn set_pinned_only(&self, pinned_only: bool) {
        self.inner.lock_filter().pinned_only = pinned_only;
        self.inner.recompute();
    }

    #[must_use]
    pub fn search(&self) -> String {
        self.inner.lock_filter().search.clone()
    }

    #[must_use]
    pub fn pinned_only(&self) -> bool {
        self.inner.lock_filter().pinned_only
    }

    #[must_use]
    pub fn filter(&self) -> ProjectionFilter {
        self.inner.lock_filter().clone()
    }

    /// Projection of the latest list under the current filter.
    #[must_use]
    pub fn current(&self) -> Vec<Note> {
        let filter = self.filter();
        project(&self.inner.source.borrow(), &filter)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NoteList> {
        self.inner.output.subscribe()
    }
}

impl Drop for ViewProjection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn follow_source(mut source: watch::Receiver<NoteList>, inner: Arc<ProjectionInner>) {
    while source.changed().await.is_ok() {
        inner.recompute();
    }
}
