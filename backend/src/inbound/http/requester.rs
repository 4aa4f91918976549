//! Header-sniffing requester classifier.
//!
//! Current detection strategy: case-insensitive substring markers in the
//! `User-Agent` header. A request with no user agent is treated as automated
//! so crawlers that omit the header still receive renderable markup.

use crate::domain::ports::{RequestSignals, RequesterClass, RequesterClassifier};

const AGENT_MARKERS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "slurp",
    "facebookexternalhit",
    "whatsapp",
    "telegram",
    "slackbot",
    "discordbot",
    "twitterbot",
    "linkedinbot",
    "pinterest",
    "embedly",
    "quora link preview",
    "curl",
    "wget",
    "python-requests",
    "headlesschrome",
];

/// Classifier matching known automated-agent markers in the user agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserAgentClassifier;

impl RequesterClassifier for UserAgentClassifier {
    fn classify(&self, signals: &RequestSignals) -> RequesterClass {
        let Some(user_agent) = signals.user_agent.as_deref() else {
            return RequesterClass::Automated;
        };
        let lowered = user_agent.to_lowercase();
        if AGENT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            RequesterClass::Automated
        } else {
            RequesterClass::Human
        }
    }
}
