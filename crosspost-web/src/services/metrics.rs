use metrics::counter;

use crate::identity::{Provider, SignInOutcome};

/// Count a sign-in decision per provider.
pub fn record_sign_in(provider: Provider, outcome: &SignInOutcome) {
    counter!(
        "sign_in_outcomes_total",
        "provider" => provider.as_str(),
        "outcome" => outcome.label()
    )
    .increment(1);
}

/// Count a link preview fetch by outcome (`ok`, `timeout`, ...).
pub fn record_preview_fetch(outcome: &'static str) {
    counter!("link_preview_fetches_total", "outcome" => outcome).increment(1);
}
