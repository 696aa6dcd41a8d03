use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

/// Authentication decision taken for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Bypass,
    Authenticated,
    Rejected,
    Misconfigured,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Bypass => "bypass",
            Decision::Authenticated => "authenticated",
            Decision::Rejected => "rejected",
            Decision::Misconfigured => "misconfigured",
        }
    }
}

static AUTH_DECISIONS_TOTAL: Lazy<Option<IntCounterVec>> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "gateway_auth_decisions_total",
            "Authentication decisions by outcome",
        ),
        &["outcome"],
    )
    .map_err(|e| tracing::error!("failed to create auth decisions counter: {}", e))
    .ok()?;

    if let Err(e) = prometheus::register(Box::new(counter.clone())) {
        tracing::warn!("failed to register auth decisions counter: {}", e);
    }
    Some(counter)
});

static AUTH_STEPS_BUILT_TOTAL: Lazy<Option<IntCounter>> = Lazy::new(|| {
    let counter = IntCounter::new(
        "gateway_auth_steps_built_total",
        "Authentication steps constructed (one per gRPC method)",
    )
    .map_err(|e| tracing::error!("failed to create auth steps counter: {}", e))
    .ok()?;

    if let Err(e) = prometheus::register(Box::new(counter.clone())) {
        tracing::warn!("failed to register auth steps counter: {}", e);
    }
    Some(counter)
});

pub fn record_decision(decision: Decision) {
    if let Some(counter) = AUTH_DECISIONS_TOTAL.as_ref() {
        counter.with_label_values(&[decision.as_str()]).inc();
    }
}

pub fn record_step_built() {
    if let Some(counter) = AUTH_STEPS_BUILT_TOTAL.as_ref() {
        counter.inc();
    }
}

/// Current count for one outcome
pub fn decisions(decision: Decision) -> u64 {
    AUTH_DECISIONS_TOTAL
        .as_ref()
        .map(|counter| counter.with_label_values(&[decision.as_str()]).get())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_decision_increments() {
        let before = decisions(Decision::Misconfigured);
        record_decision(Decision::Misconfigured);
        assert!(decisions(Decision::Misconfigured) > before);
    }
}
