//! Omnibox interaction events
//!
//! Each enumeration here is the single canonical source for a concept that
//! both encodings report. The legacy encoding uses the string returned by
//! `legacy_name`, the structured encoding the integer returned by
//! `wire_value`. Both mappings are exhaustive matches, so adding a variant
//! without mapping it in both places fails to compile.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialized form of the sentinels, which have no legacy name
const UNKNOWN_NAME: &str = "unknown";

/// How the text typed into the omnibox was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Invalid,
    Unknown,
    RequestedUrl,
    Url,
    Query,
    ForcedQuery,
}

impl InputType {
    pub const ALL: [InputType; 6] = [
        InputType::Invalid,
        InputType::Unknown,
        InputType::RequestedUrl,
        InputType::Url,
        InputType::Query,
        InputType::ForcedQuery,
    ];

    pub fn legacy_name(self) -> &'static str {
        match self {
            InputType::Invalid => "invalid",
            InputType::Unknown => "unknown",
            InputType::RequestedUrl => "requested-url",
            InputType::Url => "url",
            InputType::Query => "query",
            InputType::ForcedQuery => "forced-query",
        }
    }

    pub fn wire_value(self) -> i32 {
        match self {
            InputType::Invalid => 0,
            InputType::Unknown => 1,
            InputType::RequestedUrl => 2,
            InputType::Url => 3,
            InputType::Query => 4,
            InputType::ForcedQuery => 5,
        }
    }
}

/// The autocomplete provider that produced a suggestion
///
/// Serialized by its registered name (`"HistoryURL"`, `"Search"`, ...).
/// Names that are not registered deserialize to [`ProviderType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    /// Sentinel for absent or unrecognized providers
    Unknown,
    HistoryUrl,
    HistoryContents,
    HistoryQuick,
    Search,
    Keyword,
    Builtin,
    Shortcuts,
    ExtensionApps,
}

impl ProviderType {
    pub const ALL: [ProviderType; 9] = [
        ProviderType::Unknown,
        ProviderType::HistoryUrl,
        ProviderType::HistoryContents,
        ProviderType::HistoryQuick,
        ProviderType::Search,
        ProviderType::Keyword,
        ProviderType::Builtin,
        ProviderType::Shortcuts,
        ProviderType::ExtensionApps,
    ];

    /// Resolve a provider from its registered name
    ///
    /// Unrecognized names map to [`ProviderType::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match Self::ALL
            .into_iter()
            .find(|p| p.legacy_name() == Some(name))
        {
            Some(provider) => provider,
            None => {
                tracing::debug!(provider = name, "Unmapped autocomplete provider");
                ProviderType::Unknown
            }
        }
    }

    /// Provider name as written to the legacy encoding; the sentinel has none
    pub fn legacy_name(self) -> Option<&'static str> {
        match self {
            ProviderType::Unknown => None,
            ProviderType::HistoryUrl => Some("HistoryURL"),
            ProviderType::HistoryContents => Some("HistoryContents"),
            ProviderType::HistoryQuick => Some("HistoryQuickProvider"),
            ProviderType::Search => Some("Search"),
            ProviderType::Keyword => Some("Keyword"),
            ProviderType::Builtin => Some("Builtin"),
            ProviderType::Shortcuts => Some("ShortcutsProvider"),
            ProviderType::ExtensionApps => Some("ExtensionApps"),
        }
    }

    pub fn wire_value(self) -> i32 {
        match self {
            ProviderType::Unknown => 0,
            ProviderType::HistoryUrl => 1,
            ProviderType::HistoryContents => 2,
            ProviderType::HistoryQuick => 3,
            ProviderType::Search => 4,
            ProviderType::Keyword => 5,
            ProviderType::Builtin => 6,
            ProviderType::Shortcuts => 7,
            ProviderType::ExtensionApps => 8,
        }
    }
}

impl Serialize for ProviderType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.legacy_name().unwrap_or(UNKNOWN_NAME))
    }
}

impl<'de> Deserialize<'de> for ProviderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// What kind of match a suggestion is
///
/// Serialized by its legacy name (`"history-url"`, ...). Unrecognized names
/// deserialize to [`ResultType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// Sentinel for unrecognized result types
    Unknown,
    UrlWhatYouTyped,
    HistoryUrl,
    HistoryTitle,
    HistoryBody,
    HistoryKeyword,
    NavSuggest,
    SearchWhatYouTyped,
    SearchHistory,
    SearchSuggest,
    SearchOtherEngine,
    ExtensionApp,
}

impl ResultType {
    pub const ALL: [ResultType; 12] = [
        ResultType::Unknown,
        ResultType::UrlWhatYouTyped,
        ResultType::HistoryUrl,
        ResultType::HistoryTitle,
        ResultType::HistoryBody,
        ResultType::HistoryKeyword,
        ResultType::NavSuggest,
        ResultType::SearchWhatYouTyped,
        ResultType::SearchHistory,
        ResultType::SearchSuggest,
        ResultType::SearchOtherEngine,
        ResultType::ExtensionApp,
    ];

    /// Resolve a result type from its legacy name
    ///
    /// Unrecognized names map to [`ResultType::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match Self::ALL
            .into_iter()
            .find(|t| t.legacy_name() == Some(name))
        {
            Some(result_type) => result_type,
            None => {
                tracing::debug!(result_type = name, "Unmapped autocomplete result type");
                ResultType::Unknown
            }
        }
    }

    /// Result type as written to the legacy encoding; the sentinel has none
    pub fn legacy_name(self) -> Option<&'static str> {
        match self {
            ResultType::Unknown => None,
            ResultType::UrlWhatYouTyped => Some("url-what-you-typed"),
            ResultType::HistoryUrl => Some("history-url"),
            ResultType::HistoryTitle => Some("history-title"),
            ResultType::HistoryBody => Some("history-body"),
            ResultType::HistoryKeyword => Some("history-keyword"),
            ResultType::NavSuggest => Some("navsuggest"),
            ResultType::SearchWhatYouTyped => Some("search-what-you-typed"),
            ResultType::SearchHistory => Some("search-history"),
            ResultType::SearchSuggest => Some("search-suggest"),
            ResultType::SearchOtherEngine => Some("search-other-engine"),
            ResultType::ExtensionApp => Some("extension-app"),
        }
    }

    pub fn wire_value(self) -> i32 {
        match self {
            ResultType::Unknown => 0,
            ResultType::UrlWhatYouTyped => 1,
            ResultType::HistoryUrl => 2,
            ResultType::HistoryTitle => 3,
            ResultType::HistoryBody => 4,
            ResultType::HistoryKeyword => 5,
            ResultType::NavSuggest => 6,
            ResultType::SearchWhatYouTyped => 7,
            ResultType::SearchHistory => 8,
            ResultType::SearchSuggest => 9,
            ResultType::SearchOtherEngine => 10,
            ResultType::ExtensionApp => 11,
        }
    }
}

impl Serialize for ResultType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.legacy_name().unwrap_or(UNKNOWN_NAME))
    }
}

impl<'de> Deserialize<'de> for ResultType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// One suggestion shown in the omnibox dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub provider: ProviderType,
    pub result_type: ResultType,
    pub relevance: i32,
    pub starred: bool,
}

/// A completed omnibox interaction, as delivered by the event source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmniboxLog {
    /// Text the user typed
    pub text: String,
    /// Tab the resulting URL was opened in, when known
    pub tab_id: Option<i32>,
    pub selected_index: i32,
    /// Length of the inline autocompletion appended to `text`
    pub inline_autocompleted_length: i32,
    /// Time since the user first modified the omnibox, when tracked
    pub elapsed_since_first_modified: Option<Duration>,
    pub input_type: InputType,
    pub results: Vec<Suggestion>,
}

impl OmniboxLog {
    /// Number of whitespace-separated terms in the typed text
    pub fn num_terms(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Typed length in UTF-16 code units, the unit the legacy servers count
    pub fn typed_length(&self) -> usize {
        self.text.encode_utf16().count()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_input_type_mappings_are_injective() {
        let names: HashSet<_> = InputType::ALL.iter().map(|t| t.legacy_name()).collect();
        let values: HashSet<_> = InputType::ALL.iter().map(|t| t.wire_value()).collect();
        assert_eq!(names.len(), InputType::ALL.len());
        assert_eq!(values.len(), InputType::ALL.len());
    }

    #[test]
    fn test_provider_mappings_are_injective() {
        let names: HashSet<_> = ProviderType::ALL.iter().map(|t| t.legacy_name()).collect();
        let values: HashSet<_> = ProviderType::ALL.iter().map(|t| t.wire_value()).collect();
        assert_eq!(names.len(), ProviderType::ALL.len());
        assert_eq!(values.len(), ProviderType::ALL.len());
    }

    #[test]
    fn test_result_type_mappings_are_injective() {
        let names: HashSet<_> = ResultType::ALL.iter().map(|t| t.legacy_name()).collect();
        let values: HashSet<_> = ResultType::ALL.iter().map(|t| t.wire_value()).collect();
        assert_eq!(names.len(), ResultType::ALL.len());
        assert_eq!(values.len(), ResultType::ALL.len());
        assert_eq!(ResultType::Unknown.wire_value(), 0);
        assert!(ResultType::Unknown.legacy_name().is_none());
    }

    #[test]
    fn test_suggestion_deserializes_registered_names() {
        let json = r#"{"provider": "HistoryURL", "result_type": "history-url", "relevance": 1400, "starred": true}"#;
        let suggestion: Suggestion = serde_json::from_str(json).unwrap();
        assert_eq!(suggestion.provider, ProviderType::HistoryUrl);
        assert_eq!(suggestion.result_type, ResultType::HistoryUrl);
    }

    #[test]
    fn test_suggestion_unknown_names_fall_back_to_sentinels() {
        let json = r#"{"provider": "Mystery", "result_type": "mystery", "relevance": 0, "starred": false}"#;
        let suggestion: Suggestion = serde_json::from_str(json).unwrap();
        assert_eq!(suggestion.provider, ProviderType::Unknown);
        assert_eq!(suggestion.result_type, ResultType::Unknown);
    }

    #[test]
    fn test_sentinels_serialize_and_read_back() {
        let suggestion = Suggestion {
            provider: ProviderType::Unknown,
            result_type: ResultType::Unknown,
            relevance: 1,
            starred: false,
        };
        let json = serde_json::to_string(&suggestion).unwrap();
        assert!(json.contains("\"provider\":\"unknown\""));
        let back: Suggestion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, suggestion);
    }

    #[test]
    fn test_result_type_from_name_round_trips_known_names() {
        for result_type in ResultType::ALL {
            if let Some(name) = result_type.legacy_name() {
                assert_eq!(ResultType::from_name(name), result_type);
            }
        }
    }

    #[test]
    fn test_provider_from_name_round_trips_known_names() {
        for provider in ProviderType::ALL {
            if let Some(name) = provider.legacy_name() {
                assert_eq!(ProviderType::from_name(name), provider);
            }
        }
    }

    #[test]
    fn test_unknown_provider_name_maps_to_sentinel() {
        assert_eq!(ProviderType::from_name("Mystery"), ProviderType::Unknown);
        assert_eq!(ProviderType::Unknown.wire_value(), 0);
    }

    #[test]
    fn test_num_terms() {
        let log = OmniboxLog {
            text: "  rust   ownership rules ".to_string(),
            tab_id: None,
            selected_index: 0,
            inline_autocompleted_length: 0,
            elapsed_since_first_modified: None,
            input_type: InputType::Query,
            results: Vec::new(),
        };
        assert_eq!(log.num_terms(), 3);
        assert_eq!(log.typed_length(), 25);
    }

    #[test]
    fn test_typed_length_counts_utf16_units() {
        let log = OmniboxLog {
            text: "\u{1D11E}é".to_string(),
            tab_id: None,
            selected_index: 0,
            inline_autocompleted_length: 0,
            elapsed_since_first_modified: None,
            input_type: InputType::Query,
            results: Vec::new(),
        };
        assert_eq!(log.typed_length(), 3);
    }
}
