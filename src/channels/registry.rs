//! Channel registry: the startup snapshot of which channels exist, whether
//! they are enabled and which adapter serves them.

use std::sync::Arc;

use super::adapter::ChannelAdapter;
use super::feishu::FeishuAdapter;
use super::line::LineAdapter;
use super::slack::SlackAdapter;
use super::{CANONICAL_ORDER, MULTI_ALIAS};
use crate::config::settings::ChannelsConfig;

/// One registered channel
#[derive(Clone)]
pub struct ChannelEntry {
    pub id: &'static str,
    pub enabled: bool,
    /// Recipient used when a request does not name one
    pub default_recipient: Option<String>,
    pub adapter: Arc<dyn ChannelAdapter>,
}

impl std::fmt::Debug for ChannelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelEntry")
            .field("id", &self.id)
            .field("enabled", &self.enabled)
            .field("default_recipient", &self.default_recipient)
            .finish_non_exhaustive()
    }
}

impl ChannelEntry {
    /// Every required credential is present
    pub fn is_configured(&self) -> bool {
        self.adapter.missing_credentials().is_empty()
    }
}

/// Read-only lookup of channels, iterated in canonical order
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    entries: Vec<ChannelEntry>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one adapter per known channel from configuration
    pub fn from_settings(channels: &ChannelsConfig, client: reqwest::Client) -> Self {
        let mut registry = Self::new();

        registry.register(
            channels.slack.enabled,
            channels.slack.default_channel.clone(),
            Arc::new(SlackAdapter::new(channels.slack.clone(), client.clone())),
        );
        registry.register(
            channels.line.enabled,
            channels.line.default_user_id.clone(),
            Arc::new(LineAdapter::new(channels.line.clone(), client.clone())),
        );
        registry.register(
            channels.feishu.enabled,
            channels.feishu.default_user_id.clone(),
            Arc::new(FeishuAdapter::new(channels.feishu.clone(), client)),
        );

        tracing::debug!(
            enabled = ?registry.enabled_ids(),
            "Channel registry built"
        );

        registry
    }

    /// Add or replace the adapter for `adapter.name()`
    ///
    /// Entries stay sorted by canonical position; ids outside the canonical
    /// list sort after it in registration order.
    pub fn register(
        &mut self,
        enabled: bool,
        default_recipient: Option<String>,
        adapter: Arc<dyn ChannelAdapter>,
    ) -> &mut Self {
        let entry = ChannelEntry {
            id: adapter.name(),
            enabled,
            default_recipient,
            adapter,
        };

        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => {
                self.entries.push(entry);
                self.entries.sort_by_key(|e| canonical_rank(e.id));
            }
        }

        self
    }

    pub fn get(&self, id: &str) -> Option<&ChannelEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn enabled_ids(&self) -> Vec<&'static str> {
        self.entries.iter().filter(|e| e.enabled).map(|e| e.id).collect()
    }

    /// Turn requested ids into registry entries
    ///
    /// `multi` expands to every registered channel; unknown ids and repeats
    /// are dropped, first occurrence wins.
    pub fn resolve<I, S>(&self, requested: I) -> Vec<&ChannelEntry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved: Vec<&ChannelEntry> = Vec::new();

        for id in requested {
            let id = id.as_ref();
            let candidates: Vec<&ChannelEntry> = if id == MULTI_ALIAS {
                self.entries.iter().collect()
            } else {
                self.get(id).into_iter().collect()
            };

            for entry in candidates {
                if !resolved.iter().any(|r| r.id == entry.id) {
                    resolved.push(entry);
                }
            }
        }

        resolved
    }
}

fn canonical_rank(id: &str) -> usize {
    CANONICAL_ORDER
        .iter()
        .position(|c| *c == id)
        .unwrap_or(CANONICAL_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{FeishuConfig, LineConfig, SlackConfig};

    fn settings() -> ChannelsConfig {
        ChannelsConfig {
            slack: SlackConfig {
                enabled: true,
                webhook_url: Some("https://hooks.example.com/x".into()),
                ..Default::default()
            },
            line: LineConfig {
                enabled: false,
                ..Default::default()
            },
            feishu: FeishuConfig {
                enabled: true,
                default_user_id: Some("ou_1".into()),
                ..Default::default()
            },
        }
    }

    fn registry() -> ChannelRegistry {
        ChannelRegistry::from_settings(&settings(), reqwest::Client::new())
    }

    #[test]
    fn test_from_settings_registers_all_in_canonical_order() {
        let registry = registry();
        assert_eq!(registry.ids(), vec!["slack", "line", "feishu"]);
        assert_eq!(registry.enabled_ids(), vec!["slack", "feishu"]);
    }

    #[test]
    fn test_configured_flags() {
        let registry = registry();
        assert!(registry.get("slack").unwrap().is_configured());
        assert!(!registry.get("feishu").unwrap().is_configured());
        assert_eq!(
            registry.get("feishu").unwrap().default_recipient.as_deref(),
            Some("ou_1")
        );
    }

    #[test]
    fn test_resolve_multi_and_dedup() {
        let registry = registry();
        let ids: Vec<_> = registry
            .resolve(["line", "multi", "line"])
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["line", "slack", "feishu"]);
    }

    #[test]
    fn test_resolve_drops_unknown() {
        let registry = registry();
        assert!(registry.resolve(["nonexistent"]).is_empty());
        let ids: Vec<_> = registry
            .resolve(["feishu", "discord", "slack"])
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["feishu", "slack"]);
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = registry();
        let adapter = registry.get("line").unwrap().adapter.clone();
        registry.register(true, Some("U9".into()), adapter);

        assert_eq!(registry.ids().len(), 3);
        assert!(registry.get("line").unwrap().enabled);
    }
}
