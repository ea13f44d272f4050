use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("salesbot.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("salesbot.client.request_errors");
pub(crate) static CLIENT_UNAUTHENTICATED: Counter =
    Counter::new("salesbot.client.unauthenticated");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("salesbot.client.request_duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("salesbot.session.turns");
pub(crate) static SESSION_FALLBACKS: Counter = Counter::new("salesbot.session.fallbacks");
pub(crate) static SESSION_TIMEOUTS: Counter = Counter::new("salesbot.session.timeouts");
pub(crate) static SESSION_TURN_DURATION: Moments =
    Moments::new("salesbot.session.turn_duration_seconds");

pub(crate) static VIEW_SUBMISSIONS: Counter = Counter::new("salesbot.view.submissions");
pub(crate) static VIEW_BLANK_SUBMISSIONS: Counter =
    Counter::new("salesbot.view.blank_submissions");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_UNAUTHENTICATED);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_FALLBACKS);
    collector.register_counter(&SESSION_TIMEOUTS);
    collector.register_moments(&SESSION_TURN_DURATION);

    collector.register_counter(&VIEW_SUBMISSIONS);
    collector.register_counter(&VIEW_BLANK_SUBMISSIONS);
}
