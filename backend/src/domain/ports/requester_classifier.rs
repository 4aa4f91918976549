//! Capability port for classifying public profile requesters.
//!
//! The bot-facing HTML surface serves pre-rendered preview markup to
//! automated agents and a forwarding document to everyone else. Consumers
//! depend on this capability, not on any particular detection mechanism;
//! the header-sniffing implementation lives in the inbound adapter and can
//! be swapped for a signed-request scheme without touching the resolver.

/// What kind of client issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequesterClass {
    /// A crawler, link unfurler, or other automated agent.
    Automated,
    /// An interactive browser.
    Human,
}

/// Signals available for classification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestSignals {
    /// The request's `User-Agent` header, when present.
    pub user_agent: Option<String>,
}

/// Port deciding which representation a requester receives.
#[cfg_attr(test, mockall::automock)]
pub trait RequesterClassifier: Send + Sync {
    /// Classify a request from its signals.
    fn classify(&self, signals: &RequestSignals) -> RequesterClass;
}

/// Fixture implementation treating every requester as human.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRequesterClassifier;

impl RequesterClassifier for FixtureRequesterClassifier {
    fn classify(&self, _signals: &RequestSignals) -> RequesterClass {
        RequesterClass::Human
    }
}
