// Paginated feed traversal: hands pages to a caller-supplied handler one at
// a time and asks the caller before fetching each following page. The walker
// never looks inside records; it only reads the page size and the
// continuation token.

use std::fmt;

/// Opaque reference to the next page of a feed. For the HTTP fetcher this is
/// the absolute `next_link` URL returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        ContinuationToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fetched batch of records plus the token of the following batch, if
/// any. An empty page is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub records: Vec<R>,
    pub next: Option<ContinuationToken>,
}

impl<R> Page<R> {
    pub fn new(records: Vec<R>, next: Option<ContinuationToken>) -> Self {
        Page { records, next }
    }

    /// A page with no continuation token.
    pub fn last(records: Vec<R>) -> Self {
        Page { records, next: None }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of follow-up pages. Called at most once per continuation token.
pub trait PageFetcher {
    type Record;
    type Error;

    fn fetch_next(&mut self, token: &ContinuationToken) -> Result<Page<Self::Record>, Self::Error>;
}

/// Yes/no gate consulted at every page boundary that has a next page.
pub trait Confirmer {
    fn confirm(&mut self) -> bool;
}

impl<F> Confirmer for F
where
    F: FnMut() -> bool,
{
    fn confirm(&mut self) -> bool {
        self()
    }
}

/// Why a walk reached `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last handled page had no continuation token.
    Exhausted,
    /// The confirmer declined to fetch the next page.
    Declined,
}

/// Totals for one completed walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: usize,
    pub records: usize,
    pub stop: StopReason,
}

enum WalkState<R> {
    Fetching(Page<R>),
    Done(StopReason),
}

/// Drives one traversal at a time over a continuation chain.
///
/// `walk` borrows the walker mutably, so a second walk cannot start on the
/// same instance while one is running.
pub struct FeedWalker<F, C> {
    fetcher: F,
    confirmer: C,
}

impl<F, C> FeedWalker<F, C>
where
    F: PageFetcher,
    C: Confirmer,
{
    pub fn new(fetcher: F, confirmer: C) -> Self {
        FeedWalker { fetcher, confirmer }
    }

    /// Walk from `initial` until the chain ends or the confirmer says stop.
    ///
    /// `handle` receives each page with the number of records handled before
    /// it and must return the new cumulative count; that value becomes the
    /// offset passed with the next page. Fetch errors end the walk
    /// immediately and are returned unchanged.
    pub fn walk<H>(&mut self, initial: Page<F::Record>, mut handle: H) -> Result<WalkSummary, F::Error>
    where
        H: FnMut(&Page<F::Record>, usize) -> usize,
    {
        let mut offset = 0;
        let mut pages = 0;
        let mut state = WalkState::Fetching(initial);

        loop {
            let page = match state {
                WalkState::Fetching(page) => page,
                WalkState::Done(stop) => {
                    tracing::info!(pages, records = offset, ?stop, "feed walk finished");
                    return Ok(WalkSummary {
                        pages,
                        records: offset,
                        stop,
                    });
                }
            };

            offset = handle(&page, offset);
            pages += 1;
            tracing::debug!(page = pages, size = page.len(), offset, "handled feed page");

            state = match page.next {
                None => WalkState::Done(StopReason::Exhausted),
                Some(ref token) => {
                    if self.confirmer.confirm() {
                        tracing::debug!(%token, "fetching next feed page");
                        WalkState::Fetching(self.fetcher.fetch_next(token)?)
                    } else {
                        WalkState::Done(StopReason::Declined)
                    }
                }
            };
        }
    }

    pub fn into_parts(self) -> (F, C) {
        (self.fetcher, self.confirmer)
    }
}

/// Handler helper: returns `offset + page.len()`, the value every handler
/// must hand back to the walker.
pub fn advance<R>(page: &Page<R>, offset: usize) -> usize {
    offset + page.len()
}
