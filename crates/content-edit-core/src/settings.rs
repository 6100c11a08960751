//! Feature enablement settings.
//!
//! Each feature is addressed by a stable setting name (the keys in
//! [`names`]). Settings are plain values handed to the dispatcher when it is
//! built; changing them means building a new dispatcher.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::Platform;

/// Setting names of every content edit feature.
pub mod names {
    pub const AUTO_LINK: &str = "autoLink";
    pub const UNLINK_WHEN_BACKSPACE_AFTER_LINK: &str = "unlinkWhenBackspaceAfterLink";

    pub const INDENT_WHEN_TAB: &str = "indentWhenTab";
    pub const OUTDENT_WHEN_SHIFT_TAB: &str = "outdentWhenShiftTab";
    pub const MERGE_IN_NEW_LINE_WHEN_BACKSPACE_ON_FIRST_CHAR: &str =
        "mergeInNewLineWhenBackspaceOnFirstChar";
    pub const OUTDENT_WHEN_BACKSPACE_ON_EMPTY_FIRST_LINE: &str =
        "outdentWhenBackspaceOnEmptyFirstLine";
    pub const OUTDENT_WHEN_ENTER_ON_EMPTY_LINE: &str = "outdentWhenEnterOnEmptyLine";
    pub const AUTO_BULLET: &str = "autoBullet";

    pub const ALL: [&str; 8] = [
        AUTO_LINK,
        UNLINK_WHEN_BACKSPACE_AFTER_LINK,
        INDENT_WHEN_TAB,
        OUTDENT_WHEN_SHIFT_TAB,
        MERGE_IN_NEW_LINE_WHEN_BACKSPACE_ON_FIRST_CHAR,
        OUTDENT_WHEN_BACKSPACE_ON_EMPTY_FIRST_LINE,
        OUTDENT_WHEN_ENTER_ON_EMPTY_LINE,
        AUTO_BULLET,
    ];
}

/// Settings of the link feature bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkFeatureSettings {
    pub auto_link: bool,
    pub unlink_when_backspace_after_link: bool,
}

impl Default for LinkFeatureSettings {
    fn default() -> Self {
        Self {
            auto_link: true,
            unlink_when_backspace_after_link: false,
        }
    }
}

/// Settings of the list feature bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListFeatureSettings {
    pub indent_when_tab: bool,
    pub outdent_when_shift_tab: bool,
    pub merge_in_new_line_when_backspace_on_first_char: bool,
    pub outdent_when_backspace_on_empty_first_line: bool,
    pub outdent_when_enter_on_empty_line: bool,
    pub auto_bullet: bool,
}

impl ListFeatureSettings {
    /// Defaults for `platform`. Only `outdentWhenEnterOnEmptyLine` depends on
    /// it: it is on where the engine does not leave the list by itself.
    pub fn for_platform(platform: &Platform) -> Self {
        Self {
            indent_when_tab: true,
            outdent_when_shift_tab: true,
            merge_in_new_line_when_backspace_on_first_char: false,
            outdent_when_backspace_on_empty_first_line: true,
            outdent_when_enter_on_empty_line: !platform.exits_list_on_enter(),
            auto_bullet: true,
        }
    }
}

impl Default for ListFeatureSettings {
    fn default() -> Self {
        Self::for_platform(&Platform::default())
    }
}

/// Enablement of every content edit feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentEditSettings {
    #[serde(flatten)]
    pub link: LinkFeatureSettings,
    #[serde(flatten)]
    pub list: ListFeatureSettings,
}

impl ContentEditSettings {
    pub fn for_platform(platform: &Platform) -> Self {
        Self {
            link: LinkFeatureSettings::default(),
            list: ListFeatureSettings::for_platform(platform),
        }
    }

    /// Platform defaults overridden by a JSON object of `name -> bool`.
    pub fn from_json(json: &str, platform: &Platform) -> Result<Self, ConfigError> {
        let overrides: BTreeMap<String, bool> = serde_json::from_str(json)?;
        let mut settings = Self::for_platform(platform);
        for (name, enabled) in overrides {
            settings.set(&name, enabled)?;
        }
        Ok(settings)
    }

    /// Whether the feature named `name` is enabled; `None` for unknown names.
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        let flag = match name {
            names::AUTO_LINK => self.link.auto_link,
            names::UNLINK_WHEN_BACKSPACE_AFTER_LINK => self.link.unlink_when_backspace_after_link,
            names::INDENT_WHEN_TAB => self.list.indent_when_tab,
            names::OUTDENT_WHEN_SHIFT_TAB => self.list.outdent_when_shift_tab,
            names::MERGE_IN_NEW_LINE_WHEN_BACKSPACE_ON_FIRST_CHAR => {
                self.list.merge_in_new_line_when_backspace_on_first_char
            }
            names::OUTDENT_WHEN_BACKSPACE_ON_EMPTY_FIRST_LINE => {
                self.list.outdent_when_backspace_on_empty_first_line
            }
            names::OUTDENT_WHEN_ENTER_ON_EMPTY_LINE => self.list.outdent_when_enter_on_empty_line,
            names::AUTO_BULLET => self.list.auto_bullet,
            _ => return None,
        };
        Some(flag)
    }

    pub fn set(&mut self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let flag = match name {
            names::AUTO_LINK => &mut self.link.auto_link,
            names::UNLINK_WHEN_BACKSPACE_AFTER_LINK => {
                &mut self.link.unlink_when_backspace_after_link
            }
            names::INDENT_WHEN_TAB => &mut self.list.indent_when_tab,
            names::OUTDENT_WHEN_SHIFT_TAB => &mut self.list.outdent_when_shift_tab,
            names::MERGE_IN_NEW_LINE_WHEN_BACKSPACE_ON_FIRST_CHAR => {
                &mut self.list.merge_in_new_line_when_backspace_on_first_char
            }
            names::OUTDENT_WHEN_BACKSPACE_ON_EMPTY_FIRST_LINE => {
                &mut self.list.outdent_when_backspace_on_empty_first_line
            }
            names::OUTDENT_WHEN_ENTER_ON_EMPTY_LINE => {
                &mut self.list.outdent_when_enter_on_empty_line
            }
            names::AUTO_BULLET => &mut self.list.auto_bullet,
            unknown => return Err(ConfigError::UnknownFeature(unknown.to_string())),
        };
        *flag = enabled;
        Ok(())
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, name: &str, enabled: bool) -> Result<Self, ConfigError> {
        self.set(name, enabled)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_snapshot() {
        insta::assert_yaml_snapshot!(ContentEditSettings::for_platform(&Platform::default()), @r###"
        autoLink: true
        unlinkWhenBackspaceAfterLink: false
        indentWhenTab: true
        outdentWhenShiftTab: true
        mergeInNewLineWhenBackspaceOnFirstChar: false
        outdentWhenBackspaceOnEmptyFirstLine: true
        outdentWhenEnterOnEmptyLine: false
        autoBullet: true
        "###);
    }

    #[test]
    fn test_enter_outdent_default_follows_platform() {
        let chrome = Platform {
            chrome: true,
            ..Platform::default()
        };
        let settings = ContentEditSettings::for_platform(&chrome);
        assert_eq!(
            settings.is_enabled(names::OUTDENT_WHEN_ENTER_ON_EMPTY_LINE),
            Some(true)
        );
    }

    #[test]
    fn test_every_name_is_addressable() {
        let mut settings = ContentEditSettings::default();
        for name in names::ALL {
            settings.set(name, false).unwrap();
            assert_eq!(settings.is_enabled(name), Some(false), "{name}");
            settings.set(name, true).unwrap();
            assert_eq!(settings.is_enabled(name), Some(true), "{name}");
        }
        assert_eq!(settings.is_enabled("autoTable"), None);
    }

    #[test]
    fn test_from_json_overlays_platform_defaults() {
        let settings = ContentEditSettings::from_json(
            r#"{ "autoLink": false, "unlinkWhenBackspaceAfterLink": true }"#,
            &Platform::default(),
        )
        .unwrap();
        assert!(!settings.link.auto_link);
        assert!(settings.link.unlink_when_backspace_after_link);
        assert!(settings.list.auto_bullet);
    }

    #[test]
    fn test_from_json_rejects_unknown_and_malformed() {
        let err = ContentEditSettings::from_json(r#"{ "autoTable": true }"#, &Platform::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFeature(name) if name == "autoTable"));

        let err =
            ContentEditSettings::from_json(r#"{ "autoLink": 1 }"#, &Platform::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_serde_names_match_setting_names() {
        let value = serde_json::to_value(ContentEditSettings::default()).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = names::ALL.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }
}
