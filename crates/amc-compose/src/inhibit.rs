//! Inhibition rule conversion.

use crate::alertmanager as am;
use crate::routes::{partition_matchers, MatcherStrategy};
use crate::tenant::{InhibitRule, TenantKey};

/// Converts a tenant inhibition rule, confining both sides to the tenant
/// namespace unless `strategy` is [`MatcherStrategy::None`].
#[must_use]
pub fn convert_inhibit_rule(
    rule: &InhibitRule,
    tenant: &TenantKey,
    strategy: MatcherStrategy,
) -> am::InhibitRule {
    let (mut source_match, mut source_match_re) = partition_matchers(&rule.source_match);
    strategy.confine(tenant, &mut source_match, &mut source_match_re);

    let (mut target_match, mut target_match_re) = partition_matchers(&rule.target_match);
    strategy.confine(tenant, &mut target_match, &mut target_match_re);

    am::InhibitRule {
        target_match,
        target_match_re,
        source_match,
        source_match_re,
        equal: rule.equal.clone(),
        extra: am::Extra::new(),
    }
}
