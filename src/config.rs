//! Service and per-bot configuration.
//!
//! Everything is read from environment variables with hardcoded defaults.
//! The `from_env` constructors delegate to `from_lookup`, which takes the
//! variable source as a closure so tests can supply a map instead of touching
//! the process environment.

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::commands::IntentKind;
use crate::response::{MessageCatalog, MessageKey};
use crate::types::{LabelRole, LabelVocabulary};
use crate::webhooks::EventKind;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Bots enabled when `HELPER_BOTS` is unset.
pub const DEFAULT_HELPER_BOTS: &str = "bug-bash,bug-hunt";

/// Who users are told to contact when something goes wrong.
pub const DEFAULT_SUPPORT_TEAM: &str = "the Topcoder team";

/// Upper bound for `{PREFIX}_COMPLETION_HOURS` (one year).
pub const MAX_COMPLETION_HOURS: u32 = 24 * 365;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },

    #[error("unknown helper bot {0:?} (expected bug-bash, bug-hunt or bug-verification)")]
    UnknownVariant(String),

    #[error("no helper bots enabled")]
    NoBots,
}

/// The three helper bots. They share one engine and differ only in
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Claim / release / hand over issues during a bug bash.
    BugBash,
    /// Issue creators manage the labels of their own reports.
    BugHunt,
    /// QA claims fixed issues and records a pass/fail verdict.
    BugVerification,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::BugBash, Variant::BugHunt, Variant::BugVerification];

    /// The name used in `HELPER_BOTS`.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::BugBash => "bug-bash",
            Variant::BugHunt => "bug-hunt",
            Variant::BugVerification => "bug-verification",
        }
    }

    /// Prefix of the bot's environment variables.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Variant::BugBash => "BUG_BASH",
            Variant::BugHunt => "BUG_HUNT",
            Variant::BugVerification => "BUG_VERIFICATION",
        }
    }

    pub fn default_bot_name(&self) -> &'static str {
        match self {
            Variant::BugBash => "bug-bash-helper",
            Variant::BugHunt => "bug-hunt-helper",
            Variant::BugVerification => "bug-verification-helper",
        }
    }

    /// The commands this bot handles. Anything else gets the help reply.
    pub fn supported_intents(&self) -> &'static [IntentKind] {
        match self {
            Variant::BugBash => &[
                IntentKind::Assign,
                IntentKind::Unassign,
                IntentKind::Ready,
                IntentKind::Help,
            ],
            Variant::BugHunt => &[
                IntentKind::AddLabels,
                IntentKind::RemoveLabels,
                IntentKind::Help,
            ],
            Variant::BugVerification => &[
                IntentKind::Assign,
                IntentKind::Unassign,
                IntentKind::Pass,
                IntentKind::Fail,
                IntentKind::Help,
            ],
        }
    }

    pub fn supports(&self, kind: IntentKind) -> bool {
        self.supported_intents().contains(&kind)
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownVariant(s.to_string()))
    }
}

/// Everything one bot needs to interpret commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub variant: Variant,
    /// Mention name without `@`.
    pub bot_name: String,
    pub labels: LabelVocabulary,
    /// Label marking issues that belong to the event. Assign requires it,
    /// and it scopes the "one issue at a time" check.
    pub event_label: Option<String>,
    /// Whether commands in new issue bodies are processed (comments always are).
    pub listens_to_issue_opened: bool,
    /// Whether issues awaiting fixes block picking up new ones.
    pub feedback_blocks_pickup: bool,
    /// Hours an assignee has to complete an issue.
    pub completion_hours: u32,
    pub catalog: MessageCatalog,
}

impl BotConfig {
    /// The hardcoded configuration of a variant.
    pub fn defaults(variant: Variant, support_team: &str) -> Self {
        let catalog = MessageCatalog::for_variant(variant, support_team);
        let bot_name = variant.default_bot_name().to_string();

        match variant {
            Variant::BugBash => BotConfig {
                variant,
                bot_name,
                labels: LabelVocabulary::new([
                    (LabelRole::OpenForPickup, "Open for Pickup"),
                    (LabelRole::Feedback, "Feedback"),
                    (LabelRole::Accepted, "ACCEPTED"),
                    (LabelRole::ReadyForReview, "Ready for Review"),
                ]),
                event_label: Some("CF-20".to_string()),
                listens_to_issue_opened: true,
                feedback_blocks_pickup: true,
                completion_hours: 12,
                catalog,
            },
            Variant::BugHunt => BotConfig {
                variant,
                bot_name,
                labels: LabelVocabulary::default(),
                event_label: None,
                listens_to_issue_opened: true,
                feedback_blocks_pickup: false,
                completion_hours: 12,
                catalog,
            },
            Variant::BugVerification => BotConfig {
                variant,
                bot_name,
                labels: LabelVocabulary::new([
                    (LabelRole::OpenForPickup, "QA_OpenForPickup"),
                    (LabelRole::Assigned, "QA_Assigned"),
                    (LabelRole::Feedback, "QA_Feedback"),
                    (LabelRole::Accepted, "QA_Accepted"),
                    (LabelRole::ReadyForReview, "QA_ReadyForReview"),
                    (LabelRole::Pass, "QA_Pass"),
                    (LabelRole::Fail, "QA_Fail"),
                ]),
                event_label: None,
                listens_to_issue_opened: false,
                feedback_blocks_pickup: false,
                completion_hours: 2,
                catalog,
            },
        }
    }

    /// Applies `{PREFIX}_*` overrides from `lookup` on top of the defaults.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(
        variant: Variant,
        support_team: &str,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = variant.env_prefix();
        let get = |suffix: &str| {
            lookup(&format!("{}_{}", prefix, suffix)).filter(|value| !value.trim().is_empty())
        };

        let mut config = Self::defaults(variant, support_team);

        if let Some(name) = get("BOT_NAME") {
            config.bot_name = name.trim().trim_start_matches('@').to_string();
        }
        if let Some(label) = get("LABEL") {
            config.event_label = Some(label);
        }
        for role in LabelRole::ALL {
            if let Some(name) = get(&format!("LABEL_{}", role.env_suffix())) {
                config.labels.set(role, name);
            }
        }
        for key in MessageKey::ALL {
            if let Some(template) = get(&format!("MESSAGE_{}", key.env_suffix())) {
                config.catalog.set_template(key, template);
            }
        }
        if let Some(hours) = get("COMPLETION_HOURS") {
            let invalid = |reason: String| ConfigError::Invalid {
                name: format!("{}_COMPLETION_HOURS", prefix),
                value: hours.clone(),
                reason,
            };
            let parsed: u32 = hours.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
            if !(1..=MAX_COMPLETION_HOURS).contains(&parsed) {
                return Err(invalid(format!(
                    "must be between 1 and {}",
                    MAX_COMPLETION_HOURS
                )));
            }
            config.completion_hours = parsed;
        }

        Ok(config)
    }

    pub fn from_env(variant: Variant, support_team: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(variant, support_team, |name| std::env::var(name).ok())
    }

    pub fn listens_to(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::CommentCreated => true,
            EventKind::IssueOpened => self.listens_to_issue_opened,
        }
    }
}

/// Configuration of the whole service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Secret for `X-Hub-Signature-256` verification.
    pub webhook_secret: String,
    pub github_token: String,
    pub bots: Vec<BotConfig>,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let github_token = get("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;
        let webhook_secret = get("WEBHOOK_SECRET").ok_or(ConfigError::Missing("WEBHOOK_SECRET"))?;

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.parse().map_err(|e| ConfigError::Invalid {
            name: "BIND_ADDR".to_string(),
            value: bind.clone(),
            reason: format!("{}", e),
        })?;

        let support_team = get("SUPPORT_TEAM").unwrap_or_else(|| DEFAULT_SUPPORT_TEAM.to_string());

        let enabled = get("HELPER_BOTS").unwrap_or_else(|| DEFAULT_HELPER_BOTS.to_string());
        let mut variants: Vec<Variant> = Vec::new();
        for name in enabled.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let variant: Variant = name.parse()?;
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
        if variants.is_empty() {
            return Err(ConfigError::NoBots);
        }

        let bots = variants
            .into_iter()
            .map(|variant| BotConfig::from_lookup(variant, &support_team, &lookup))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ServerConfig {
            bind_addr,
            webhook_secret,
            github_token,
            bots,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [("GITHUB_TOKEN", "ghp_x"), ("WEBHOOK_SECRET", "s3cret")];

    #[test]
    fn server_defaults() {
        let config = ServerConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        let variants: Vec<_> = config.bots.iter().map(|bot| bot.variant).collect();
        assert_eq!(variants, vec![Variant::BugBash, Variant::BugHunt]);
        assert_eq!(config.bots[0].catalog.support_team, "the Topcoder team");
    }

    #[test]
    fn required_variables() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("WEBHOOK_SECRET", "s")])).unwrap_err(),
            ConfigError::Missing("GITHUB_TOKEN")
        );
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("GITHUB_TOKEN", "t"), ("WEBHOOK_SECRET", " ")]))
                .unwrap_err(),
            ConfigError::Missing("WEBHOOK_SECRET")
        );
    }

    #[test]
    fn helper_bots_are_parsed_and_deduplicated() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HELPER_BOTS", "bug-verification, Bug-Bash,bug-verification,"));
        let config = ServerConfig::from_lookup(lookup(&vars)).unwrap();
        let variants: Vec<_> = config.bots.iter().map(|bot| bot.variant).collect();
        assert_eq!(variants, vec![Variant::BugVerification, Variant::BugBash]);

        let mut vars = REQUIRED.to_vec();
        vars.push(("HELPER_BOTS", "bug-squash"));
        assert_eq!(
            ServerConfig::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::UnknownVariant("bug-squash".into())
        );

        let mut vars = REQUIRED.to_vec();
        vars.push(("HELPER_BOTS", " , "));
        assert_eq!(
            ServerConfig::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::NoBots
        );
    }

    #[test]
    fn invalid_bind_addr() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("BIND_ADDR", "not an address"));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn bot_overrides() {
        let config = BotConfig::from_lookup(
            Variant::BugBash,
            "QA",
            lookup(&[
                ("BUG_BASH_BOT_NAME", "@my-bash-bot"),
                ("BUG_BASH_LABEL", "CF-21"),
                ("BUG_BASH_LABEL_OPEN_FOR_PICKUP", "Pickup"),
                ("BUG_BASH_LABEL_ASSIGNED", "Taken"),
                ("BUG_BASH_COMPLETION_HOURS", "24"),
                ("BUG_HUNT_BOT_NAME", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.bot_name, "my-bash-bot");
        assert_eq!(config.event_label.as_deref(), Some("CF-21"));
        assert_eq!(config.labels.name(LabelRole::OpenForPickup), Some("Pickup"));
        assert_eq!(config.labels.name(LabelRole::Assigned), Some("Taken"));
        assert_eq!(config.labels.name(LabelRole::Feedback), Some("Feedback"));
        assert_eq!(config.completion_hours, 24);
    }

    #[test]
    fn invalid_completion_hours() {
        let err = BotConfig::from_lookup(
            Variant::BugVerification,
            "QA",
            lookup(&[("BUG_VERIFICATION_COMPLETION_HOURS", "two")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { name, .. } if name == "BUG_VERIFICATION_COMPLETION_HOURS"
        ));
    }

    #[test]
    fn message_overrides() {
        let config = BotConfig::from_lookup(
            Variant::BugHunt,
            "us",
            lookup(&[
                ("BUG_HUNT_MESSAGE_LABELS_ADDED", "Labels applied."),
                ("BUG_HUNT_MESSAGE_NOT_CREATOR", "  "),
            ]),
        )
        .unwrap();
        assert_eq!(config.catalog.template(MessageKey::LabelsAdded), "Labels applied.");
        assert_eq!(
            config.catalog.template(MessageKey::NotCreator),
            MessageKey::NotCreator.default_template()
        );
    }

    #[test]
    fn message_env_suffixes_are_distinct() {
        let suffixes: std::collections::HashSet<_> =
            MessageKey::ALL.iter().map(MessageKey::env_suffix).collect();
        assert_eq!(suffixes.len(), MessageKey::ALL.len());
    }

    #[test]
    fn completion_hours_out_of_range() {
        for value in ["0", "8761", "4294967295"] {
            let err = BotConfig::from_lookup(
                Variant::BugBash,
                "us",
                lookup(&[("BUG_BASH_COMPLETION_HOURS", value)]),
            )
            .unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { value: v, .. } if v == value),
                "{}: {:?}",
                value,
                err
            );
        }

        let config = BotConfig::from_lookup(
            Variant::BugBash,
            "us",
            lookup(&[("BUG_BASH_COMPLETION_HOURS", "8760")]),
        )
        .unwrap();
        assert_eq!(config.completion_hours, MAX_COMPLETION_HOURS);
    }

    #[test]
    fn variant_defaults() {
        let bash = BotConfig::defaults(Variant::BugBash, "QA");
        assert_eq!(bash.event_label.as_deref(), Some("CF-20"));
        assert!(bash.feedback_blocks_pickup);
        assert!(bash.listens_to(EventKind::IssueOpened));

        let verification = BotConfig::defaults(Variant::BugVerification, "QA");
        assert_eq!(verification.completion_hours, 2);
        assert_eq!(verification.labels.name(LabelRole::Pass), Some("QA_Pass"));
        assert!(!verification.listens_to(EventKind::IssueOpened));
        assert!(verification.listens_to(EventKind::CommentCreated));

        assert!(BotConfig::defaults(Variant::BugHunt, "QA").labels.is_empty());
    }

    #[test]
    fn supported_intents() {
        assert!(Variant::BugBash.supports(IntentKind::Ready));
        assert!(!Variant::BugBash.supports(IntentKind::Pass));
        assert!(Variant::BugHunt.supports(IntentKind::AddLabels));
        assert!(!Variant::BugHunt.supports(IntentKind::Assign));
        assert!(Variant::BugVerification.supports(IntentKind::Fail));
        assert!(!Variant::BugVerification.supports(IntentKind::Ready));
    }
}
