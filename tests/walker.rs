// Integration tests for paginated feed traversal

use contacts_sync_cli::walker::{
    advance, ContinuationToken, FeedWalker, Page, PageFetcher, StopReason,
};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("page unavailable: {0}")]
struct PageUnavailable(String);

/// Serves pages from a script; `fail_on` makes one token fail.
struct ScriptedFeed {
    pages: VecDeque<Page<&'static str>>,
    fetched: Vec<String>,
    fail_on: Option<&'static str>,
}

impl ScriptedFeed {
    fn new(pages: Vec<Page<&'static str>>) -> Self {
        ScriptedFeed {
            pages: pages.into(),
            fetched: Vec::new(),
            fail_on: None,
        }
    }
}

impl PageFetcher for ScriptedFeed {
    type Record = &'static str;
    type Error = PageUnavailable;

    fn fetch_next(&mut self, token: &ContinuationToken) -> Result<Page<&'static str>, PageUnavailable> {
        self.fetched.push(token.as_str().to_string());
        if self.fail_on == Some(token.as_str()) {
            return Err(PageUnavailable(token.to_string()));
        }
        self.pages
            .pop_front()
            .ok_or_else(|| PageUnavailable(token.to_string()))
    }
}

fn token(s: &str) -> Option<ContinuationToken> {
    Some(ContinuationToken::new(s))
}

fn records(n: usize) -> Vec<&'static str> {
    vec!["record"; n]
}

#[test]
fn test_handles_every_page_once_in_order() {
    for extra in 0..4 {
        let mut pages = Vec::new();
        for i in 1..=extra {
            let next = if i < extra { token(&format!("t{}", i + 1)) } else { None };
            pages.push(Page::new(vec!["x"; i], next));
        }
        let first_next = if extra > 0 { token("t1") } else { None };
        let mut walker = FeedWalker::new(ScriptedFeed::new(pages), || true);
        let mut sizes = Vec::new();

        let summary = walker
            .walk(Page::new(vec![], first_next), |page, offset| {
                sizes.push(page.len());
                advance(page, offset)
            })
            .unwrap();

        assert_eq!(sizes, (0..=extra).collect::<Vec<_>>());
        assert_eq!(summary.pages, extra + 1);
        assert_eq!(summary.stop, StopReason::Exhausted);
    }
}

#[test]
fn test_offsets_sum_previous_page_sizes() {
    let feed = ScriptedFeed::new(vec![
        Page::new(records(0), token("p3")),
        Page::last(records(5)),
    ]);
    let mut walker = FeedWalker::new(feed, || true);
    let mut offsets = Vec::new();

    let summary = walker
        .walk(Page::new(records(3), token("p2")), |page, offset| {
            offsets.push(offset);
            advance(page, offset)
        })
        .unwrap();

    assert_eq!(offsets, vec![0, 3, 3]);
    assert_eq!(summary.records, 8);
}

#[test]
fn test_empty_last_page_needs_no_fetch_or_confirm() {
    let mut confirms = 0;
    let mut handled = 0;
    let mut walker = FeedWalker::new(ScriptedFeed::new(vec![]), || {
        confirms += 1;
        true
    });

    let summary = walker
        .walk(Page::last(records(0)), |page, offset| {
            handled += 1;
            advance(page, offset)
        })
        .unwrap();

    let (feed, _) = walker.into_parts();
    assert_eq!(handled, 1);
    assert!(feed.fetched.is_empty());
    assert_eq!(confirms, 0);
    assert_eq!(summary.records, 0);
}

#[test]
fn test_declined_confirmation_stops_before_fetch() {
    let feed = ScriptedFeed::new(vec![Page::last(records(1))]);
    let mut walker = FeedWalker::new(feed, || false);
    let mut handled = 0;

    let summary = walker
        .walk(Page::new(records(2), token("p2")), |page, offset| {
            handled += 1;
            advance(page, offset)
        })
        .unwrap();

    assert_eq!(handled, 1);
    assert_eq!(summary.stop, StopReason::Declined);
    assert_eq!(summary.records, 2);
    let (feed, _) = walker.into_parts();
    assert!(feed.fetched.is_empty());
}

#[test]
fn test_fetch_error_propagates_without_partial_handle() {
    let mut feed = ScriptedFeed::new(vec![Page::last(records(4))]);
    feed.fail_on = Some("p2");
    let mut walker = FeedWalker::new(feed, || true);
    let mut handled = 0;

    let err = walker
        .walk(Page::new(records(2), token("p2")), |page, offset| {
            handled += 1;
            advance(page, offset)
        })
        .unwrap_err();

    assert_eq!(err, PageUnavailable("p2".to_string()));
    assert_eq!(handled, 1);
    let (feed, _) = walker.into_parts();
    assert_eq!(feed.fetched, vec!["p2"]);
}

#[test]
fn test_three_pages_with_continuous_numbering() {
    let feed = ScriptedFeed::new(vec![
        Page::new(records(2), token("p3")),
        Page::last(records(1)),
    ]);
    let mut walker = FeedWalker::new(feed, || true);
    let mut offsets = Vec::new();

    let summary = walker
        .walk(Page::new(records(2), token("p2")), |page, offset| {
            offsets.push(offset);
            advance(page, offset)
        })
        .unwrap();

    assert_eq!(offsets, vec![0, 2, 4]);
    assert_eq!(summary.records, 5);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.stop, StopReason::Exhausted);
}

#[test]
fn test_empty_page_with_token_still_asks_to_continue() {
    let feed = ScriptedFeed::new(vec![Page::last(records(1))]);
    let mut asked = 0;
    let mut walker = FeedWalker::new(feed, || {
        asked += 1;
        asked < 2
    });

    let summary = walker
        .walk(Page::new(records(0), token("p2")), advance)
        .unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.records, 1);
    drop(walker);
    assert_eq!(asked, 1);
}

#[test]
fn test_walker_can_be_reused_after_a_walk() {
    let feed = ScriptedFeed::new(vec![Page::last(records(1)), Page::last(records(2))]);
    let mut walker = FeedWalker::new(feed, || true);

    let first = walker.walk(Page::new(records(1), token("a")), advance).unwrap();
    let second = walker.walk(Page::new(records(1), token("b")), advance).unwrap();

    assert_eq!(first.records, 2);
    assert_eq!(second.records, 3);
}
