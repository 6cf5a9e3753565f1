//! Request filtering: the allow/block decision consulted by the engine for
//! every outgoing request while ad-blocking is enabled.
//!
//! The engine does not know about [`AdFilter`] directly. It only sees the
//! [`NetworkProfile`] slot, which holds at most one [`RequestFilter`].

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::privacy::FilterListEngine;

/// Substrings that mark an address as an advertisement.
///
/// Matching is case-sensitive and positional-agnostic, so `"canadas.com"`
/// is blocked too.
pub const BLOCKED_SUBSTRINGS: [&str; 2] = ["ads", "advertisements"];

/// Outcome of a filter decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Allow,
    Block,
}

impl FilterDecision {
    pub fn is_block(self) -> bool {
        self == Self::Block
    }
}

/// Where a request comes from: the top-level page and whether the request
/// loads that page itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext<'a> {
    pub source: &'a str,
    pub main_frame: bool,
}

/// Capability injected into the engine's request path.
///
/// Called synchronously for every request; implementations must not block.
pub trait RequestFilter {
    /// Decides whether the request to `address` may proceed.
    fn decide(&self, address: &str) -> FilterDecision;

    /// Same decision with the originating page known. Filters that ignore
    /// the context keep the default.
    fn decide_in(&self, address: &str, _context: &RequestContext<'_>) -> FilterDecision {
        self.decide(address)
    }

    /// Drops any per-page state. Called when the top-level URL changes.
    fn reset(&self) {}
}

/// The ad filter registered when the toolbar toggle is switched on.
pub struct AdFilter {
    lists: Option<Rc<FilterListEngine>>,
}

impl AdFilter {
    /// Substring policy only.
    pub fn new() -> Self {
        Self { lists: None }
    }

    /// Substring policy, then the filter-list engine when one is loaded.
    pub fn with_lists(lists: Option<Rc<FilterListEngine>>) -> Self {
        Self { lists }
    }
}

impl Default for AdFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestFilter for AdFilter {
    fn decide(&self, address: &str) -> FilterDecision {
        self.decide_in(address, &RequestContext::default())
    }

    fn decide_in(&self, address: &str, context: &RequestContext<'_>) -> FilterDecision {
        if BLOCKED_SUBSTRINGS.iter().any(|needle| address.contains(needle)) {
            return FilterDecision::Block;
        }
        match self.lists {
            Some(ref lists) => lists.decide_in(address, context),
            None => FilterDecision::Allow,
        }
    }

    fn reset(&self) {
        if let Some(ref lists) = self.lists {
            lists.reset();
        }
    }
}

/// Slot holding the active filter of a view's network profile.
///
/// Registering replaces the previous filter, clearing leaves the slot empty.
/// An empty slot allows everything.
#[derive(Default)]
pub struct NetworkProfile {
    filter: RefCell<Option<Rc<dyn RequestFilter>>>,
    /// Top-level page, source of every subresource request.
    page_url: RefCell<String>,
}

impl NetworkProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_request_filter(&self, filter: Option<Rc<dyn RequestFilter>>) {
        debug!(registered = filter.is_some(), "Request filter slot updated");
        *self.filter.borrow_mut() = filter;
    }

    pub fn has_filter(&self) -> bool {
        self.filter.borrow().is_some()
    }

    /// Consults the registered filter, if any.
    pub fn decide(&self, address: &str) -> FilterDecision {
        // Clone the Rc so a filter may re-register without a borrow conflict.
        let filter = self.filter.borrow().clone();
        match filter {
            Some(filter) => filter.decide(address),
            None => FilterDecision::Allow,
        }
    }

    /// Consults the registered filter with the current page as source.
    pub fn decide_request(&self, address: &str, main_frame: bool) -> FilterDecision {
        let filter = self.filter.borrow().clone();
        let Some(filter) = filter else {
            return FilterDecision::Allow;
        };
        let source = self.page_url.borrow().clone();
        filter.decide_in(
            address,
            &RequestContext {
                source: &source,
                main_frame,
            },
        )
    }

    /// Records the new top-level URL and drops per-page filter state.
    pub fn page_changed(&self, url: &str) {
        *self.page_url.borrow_mut() = url.to_owned();
        self.reset();
    }

    pub fn reset(&self) {
        let filter = self.filter.borrow().clone();
        if let Some(filter) = filter {
            filter.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ads_subdomain_blocked() {
        assert_eq!(
            AdFilter::new().decide("http://ads.example.com"),
            FilterDecision::Block
        );
    }

    #[test]
    fn test_advertisements_path_blocked() {
        assert_eq!(
            AdFilter::new().decide("http://example.com/advertisements/x"),
            FilterDecision::Block
        );
    }

    #[test]
    fn test_unrelated_word_containing_ads_is_blocked() {
        // Inherited false positive.
        assert_eq!(
            AdFilter::new().decide("http://canadas.com"),
            FilterDecision::Block
        );
        assert!(AdFilter::new().decide("https://advertisements-museum.org").is_block());
    }

    #[test]
    fn test_plain_address_allowed() {
        assert_eq!(
            AdFilter::new().decide("http://example.com"),
            FilterDecision::Allow
        );
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(
            AdFilter::new().decide("http://ADS.example.com"),
            FilterDecision::Allow
        );
    }

    #[test]
    fn test_empty_address_allowed() {
        assert_eq!(AdFilter::new().decide(""), FilterDecision::Allow);
    }

    #[test]
    fn test_empty_profile_allows_everything() {
        let profile = NetworkProfile::new();
        assert!(!profile.has_filter());
        assert_eq!(
            profile.decide("http://ads.example.com"),
            FilterDecision::Allow
        );
    }

    #[test]
    fn test_profile_uses_registered_filter_until_cleared() {
        let profile = NetworkProfile::new();
        profile.set_request_filter(Some(Rc::new(AdFilter::new())));
        assert_eq!(
            profile.decide("http://ads.example.com"),
            FilterDecision::Block
        );

        profile.set_request_filter(None);
        assert!(!profile.has_filter());
        assert_eq!(
            profile.decide("http://ads.example.com"),
            FilterDecision::Allow
        );
    }

    struct BlockEverything;

    impl RequestFilter for BlockEverything {
        fn decide(&self, _address: &str) -> FilterDecision {
            FilterDecision::Block
        }
    }

    #[test]
    fn test_registering_replaces_previous_filter() {
        let profile = NetworkProfile::new();
        profile.set_request_filter(Some(Rc::new(BlockEverything)));
        assert!(profile.decide("http://example.com").is_block());

        profile.set_request_filter(Some(Rc::new(AdFilter::new())));
        assert!(!profile.decide("http://example.com").is_block());
    }

    #[derive(Default)]
    struct RecordingFilter {
        seen: RefCell<Vec<(String, String, bool)>>,
        resets: std::cell::Cell<usize>,
    }

    impl RequestFilter for RecordingFilter {
        fn decide(&self, _address: &str) -> FilterDecision {
            FilterDecision::Allow
        }

        fn decide_in(&self, address: &str, context: &RequestContext<'_>) -> FilterDecision {
            self.seen.borrow_mut().push((
                address.to_owned(),
                context.source.to_owned(),
                context.main_frame,
            ));
            FilterDecision::Allow
        }

        fn reset(&self) {
            self.resets.set(self.resets.get() + 1);
        }
    }

    #[test]
    fn test_profile_passes_current_page_as_source() {
        let profile = NetworkProfile::new();
        let filter = Rc::new(RecordingFilter::default());
        profile.set_request_filter(Some(filter.clone()));

        profile.page_changed("https://news.example/");
        profile.decide_request("https://cdn.example/app.js", false);
        profile.decide_request("https://next.example/", true);

        assert_eq!(
            *filter.seen.borrow(),
            vec![
                (
                    "https://cdn.example/app.js".to_string(),
                    "https://news.example/".to_string(),
                    false
                ),
                (
                    "https://next.example/".to_string(),
                    "https://news.example/".to_string(),
                    true
                ),
            ]
        );
        assert_eq!(filter.resets.get(), 1);
    }

    #[test]
    fn test_substring_rule_applies_whatever_the_context() {
        let context = RequestContext {
            source: "https://example.com/",
            main_frame: true,
        };
        assert!(AdFilter::new().decide_in("http://ads.example.com", &context).is_block());
        assert!(!AdFilter::new().decide_in("http://example.com", &context).is_block());
    }
}
