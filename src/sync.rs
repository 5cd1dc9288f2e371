/// Keeps the installed header rules in step with the configured providers
use std::collections::BTreeSet;

use log::info;

use crate::domain::collect_domains;
use crate::host::{HostError, RuleEngine, SettingsStore};
use crate::providers::BUILT_IN_PROVIDERS;
use crate::rules::{RuleUpdate, compile_rules};
use crate::settings::Settings;

/// Hostnames that need a framing rule: built-ins, the active provider and every custom site
pub fn build_domain_set(settings: &Settings) -> BTreeSet<String> {
    let active = std::iter::once(settings.active_template());
    let built_in = BUILT_IN_PROVIDERS.iter().map(|provider| provider.template);
    let custom = settings.custom_sites.iter().map(|site| site.url.as_str());

    collect_domains(active.chain(built_in).chain(custom))
}

/// Replace every installed rule with a fresh compilation of the current settings
///
/// Removal and installation go to the engine as one update, so the engine
/// never holds a mix of old and new rules. Returns the domains now covered.
pub async fn sync_rules<H>(host: &H) -> Result<BTreeSet<String>, HostError>
where
    H: SettingsStore + RuleEngine,
{
    let settings = host.load_settings().await?;
    let domains = build_domain_set(&settings);

    let installed = host.installed_rule_ids().await?;
    let update = RuleUpdate::replace(installed, compile_rules(&domains));

    if !update.is_empty() {
        host.update_rules(&update).await?;
    }

    info!(
        "Dynamic rules updated for domains: {:?}",
        domains.iter().collect::<Vec<_>>()
    );
    Ok(domains)
}
