//! Agent status board: one card per provisioned agent, keyed by name.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::{AgentProfile, SettingSpec};
use crate::model::{Agent, AgentAction, AgentStatus};

/// A setting on a control card and its current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingState {
    pub name: String,
    pub options: Vec<String>,
    pub value: Option<String>,
}

impl SettingState {
    /// The option after the current one (wrapping), or the first option
    /// when nothing is selected yet.
    pub fn next_option(&self) -> Option<&str> {
        let current = self
            .value
            .as_deref()
            .and_then(|v| self.options.iter().position(|o| o == v));
        let idx = current.map_or(0, |i| (i + 1) % self.options.len().max(1));
        self.options.get(idx).map(String::as_str)
    }
}

impl From<&SettingSpec> for SettingState {
    fn from(spec: &SettingSpec) -> Self {
        Self {
            name: spec.name.clone(),
            options: spec.options.clone(),
            value: spec.value.clone(),
        }
    }
}

/// Render state of one agent's card.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCard {
    pub name: String,
    /// `None` until the first snapshot or control result for this agent.
    pub status: Option<AgentStatus>,
    /// (metric name, display value), rebuilt wholesale on every snapshot.
    pub metrics: Vec<(String, String)>,
    pub settings: Vec<SettingState>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AgentCard {
    fn new(profile: &AgentProfile) -> Self {
        Self {
            name: profile.name.clone(),
            status: None,
            metrics: Vec::new(),
            settings: profile.settings.iter().map(SettingState::from).collect(),
            updated_at: None,
        }
    }

    /// Lowercased indicator tag; `unknown` before any data arrived.
    pub fn status_tag(&self) -> &str {
        self.status.as_ref().map_or("unknown", AgentStatus::tag)
    }
}

/// Cards for the provisioned roster.
///
/// The set of cards is fixed at construction: feed snapshots naming an
/// agent outside the roster are ignored.
#[derive(Debug, Clone, Default)]
pub struct AgentStatusBoard {
    cards: IndexMap<String, AgentCard>,
}

impl AgentStatusBoard {
    pub fn new(roster: &[AgentProfile]) -> Self {
        let mut cards = IndexMap::with_capacity(roster.len());
        for profile in roster {
            if cards.contains_key(&profile.name) {
                warn!(agent = %profile.name, "duplicate agent in roster, keeping the first");
                continue;
            }
            cards.insert(profile.name.clone(), AgentCard::new(profile));
        }
        Self { cards }
    }

    /// Update status and metrics for every agent that has a card.
    ///
    /// Name matching is exact and case-sensitive. Returns the number of
    /// cards touched.
    pub fn apply_snapshot(&mut self, agents: &[Agent]) -> usize {
        let now = Utc::now();
        let mut updated = 0;

        for agent in agents {
            let Some(card) = self.cards.get_mut(&agent.name) else {
                debug!(agent = %agent.name, "no card for agent, ignoring");
                continue;
            };
            card.status = Some(agent.status.clone());
            card.metrics.clone_from(&agent.metrics);
            card.updated_at = Some(now);
            updated += 1;
        }

        updated
    }

    /// Optimistically reflect a successful control request.
    ///
    /// No reconciliation happens: the next snapshot for this agent wins.
    pub fn apply_control_result(&mut self, agent: &str, action: AgentAction) -> bool {
        let Some(card) = self.cards.get_mut(agent) else {
            return false;
        };
        card.status = Some(AgentStatus::after(action));
        card.updated_at = Some(Utc::now());
        true
    }

    /// Record a setting value the backend accepted.
    pub fn set_setting(&mut self, agent: &str, setting: &str, value: &str) -> bool {
        let Some(state) = self
            .cards
            .get_mut(agent)
            .and_then(|c| c.settings.iter_mut().find(|s| s.name == setting))
        else {
            return false;
        };
        state.value = Some(value.to_owned());
        true
    }

    pub fn card(&self, name: &str) -> Option<&AgentCard> {
        self.cards.get(name)
    }

    pub fn card_at(&self, index: usize) -> Option<&AgentCard> {
        self.cards.get_index(index).map(|(_, c)| c)
    }

    /// Cards in roster order.
    pub fn cards(&self) -> impl Iterator<Item = &AgentCard> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of cards currently showing `status`.
    pub fn count_with(&self, status: &AgentStatus) -> usize {
        self.cards
            .values()
            .filter(|c| c.status.as_ref() == Some(status))
            .count()
    }
}
