use std::collections::BTreeMap;

pub const TARGET_ID_VAR: &str = "MIRROR_TARGET_ID";
pub const FILTER_ID_VAR: &str = "MIRROR_FILTER_ID";
pub const SKIP_TAGS_VAR: &str = "MIRROR_SKIP_TAGS";

/// Tag keys mapped to an optional required value; `None` means any value of
/// the key marks an instance as excluded.
pub type SkipTags = BTreeMap<String, Option<String>>;

/// Process-wide settings, built once at startup and passed by reference into
/// every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub target_id: String,
    pub filter_id: String,
    pub skip_tags: SkipTags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

impl MirrorConfig {
    pub fn from_parts(
        target_id: Option<String>,
        filter_id: Option<String>,
        skip_tags: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            target_id: require_id(target_id, TARGET_ID_VAR)?,
            filter_id: require_id(filter_id, FILTER_ID_VAR)?,
            skip_tags: skip_tags.map(parse_skip_tags).unwrap_or_default(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(
            std::env::var(TARGET_ID_VAR).ok(),
            std::env::var(FILTER_ID_VAR).ok(),
            std::env::var(SKIP_TAGS_VAR).ok().as_deref(),
        )
    }
}

fn require_id(value: Option<String>, var_name: &str) -> Result<String, ConfigError> {
    match value {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(ConfigError::new(format!("{var_name} variable is empty"))),
    }
}

/// Entries are comma separated, `key` or `key=value`. The split is on the
/// first `=` only, so a value may itself contain `=`. Entries with an empty
/// key are ignored; nothing is rejected.
pub fn parse_skip_tags(raw: &str) -> SkipTags {
    let mut tags = SkipTags::new();
    for entry in raw.split(',') {
        match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                tags.insert(key.to_string(), Some(value.to_string()));
            }
            None if !entry.is_empty() => {
                tags.insert(entry.to_string(), None);
            }
            _ => {}
        }
    }
    tags
}

/// Canonical `key[=value]` comma-joined rendering; parsing it back yields
/// the same map.
pub fn format_skip_tags(tags: &SkipTags) -> String {
    tags.iter()
        .map(|(key, value)| match value {
            Some(value) => format!("{key}={value}"),
            None => key.clone(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_id_fails() {
        let error = MirrorConfig::from_parts(None, Some("tmf-1".to_string()), None)
            .expect_err("config should fail");
        assert_eq!(error.message(), "MIRROR_TARGET_ID variable is empty");
    }

    #[test]
    fn empty_filter_id_fails() {
        let error = MirrorConfig::from_parts(
            Some("tmt-1".to_string()),
            Some("  ".to_string()),
            Some("Name=web"),
        )
        .expect_err("config should fail");
        assert_eq!(error.message(), "MIRROR_FILTER_ID variable is empty");
    }

    #[test]
    fn builds_without_skip_tags() {
        let config =
            MirrorConfig::from_parts(Some("tmt-1".to_string()), Some("tmf-1".to_string()), None)
                .expect("config should build");
        assert!(config.skip_tags.is_empty());
    }

    #[test]
    fn parses_key_only_and_key_value_entries() {
        let tags = parse_skip_tags("Name=bastion,NoMirror");
        assert_eq!(
            tags.get("Name"),
            Some(&Some("bastion".to_string())),
            "valued entry should keep its value"
        );
        assert_eq!(tags.get("NoMirror"), Some(&None));
    }

    #[test]
    fn ignores_entries_with_empty_keys() {
        let tags = parse_skip_tags(",=orphan,Name=web");
        assert_eq!(tags.len(), 1);
        assert!(tags.contains_key("Name"));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let tags = parse_skip_tags("role=a=b");
        assert_eq!(tags.get("role"), Some(&Some("a=b".to_string())));
    }

    #[test]
    fn empty_value_is_kept_as_empty_string() {
        let tags = parse_skip_tags("Name=");
        assert_eq!(tags.get("Name"), Some(&Some(String::new())));
    }

    #[test]
    fn reparsing_canonical_form_is_identity() {
        let tags = parse_skip_tags("env=prod=eu,NoMirror,Name=web,");
        assert_eq!(parse_skip_tags(&format_skip_tags(&tags)), tags);
    }
}
