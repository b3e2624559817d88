//! Transient user events
//!
//! [`EventRecorder`] appends omnibox interactions to a report. Each event
//! becomes a `uielement` subtree in the legacy encoding and an
//! [`OmniboxEvent`] in the structured encoding, both stamped with the same
//! time.

use chrono::Utc;
use metricslog_core::domain::profile::{OmniboxEvent, OmniboxSuggestion};
use metricslog_core::domain::{Element, Fact, OmniboxLog, Report, ReportError, StructuredLog};

/// Saturating conversion for counts the structured encoding stores as i32
fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// One omnibox interaction, in both encodings
struct OmniboxFact {
    uielement: Element,
    event: OmniboxEvent,
}

impl OmniboxFact {
    fn new(log: &OmniboxLog, session_id: i32, time: i64) -> Self {
        let typed_length = to_i32(log.typed_length());
        let num_terms = to_i32(log.num_terms());
        let typing_duration_ms = log
            .elapsed_since_first_modified
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));

        let mut autocomplete = Element::new("autocomplete")
            .with_attribute("typedlength", typed_length.to_string())
            .with_attribute("numterms", num_terms.to_string())
            .with_attribute("selectedindex", log.selected_index.to_string())
            .with_attribute("completedlength", log.inline_autocompleted_length.to_string());
        if let Some(ms) = typing_duration_ms {
            autocomplete.push_attribute("typingduration", ms.to_string());
        }
        autocomplete.push_attribute("inputtype", log.input_type.legacy_name());

        let mut suggestions = Vec::with_capacity(log.results.len());
        for result in &log.results {
            let mut item = Element::new("autocompleteitem");
            if let Some(provider) = result.provider.legacy_name() {
                item.push_attribute("provider", provider);
            }
            if let Some(result_type) = result.result_type.legacy_name() {
                item.push_attribute("resulttype", result_type);
            }
            item.push_attribute("relevance", result.relevance.to_string());
            item.push_attribute("isstarred", if result.starred { "1" } else { "0" });
            autocomplete.push_child(item);

            suggestions.push(OmniboxSuggestion {
                provider: result.provider.wire_value(),
                result_type: result.result_type.wire_value(),
                relevance: result.relevance,
                is_starred: result.starred,
            });
        }

        let mut uielement = Element::new("uielement")
            .with_attribute("action", "autocomplete")
            .with_attribute("targetidhash", "")
            .with_attribute("window", "0");
        if let Some(tab) = log.tab_id {
            uielement.push_attribute("tab", tab.to_string());
        }
        uielement.push_attribute("session", session_id.to_string());
        uielement.push_attribute("time", time.to_string());
        uielement.push_child(autocomplete);

        let event = OmniboxEvent {
            time,
            tab_id: log.tab_id,
            typed_length,
            num_typed_terms: num_terms,
            selected_index: log.selected_index,
            completed_length: log.inline_autocompleted_length,
            typing_duration_ms,
            input_type: log.input_type.wire_value(),
            suggestions,
        };

        Self { uielement, event }
    }
}

impl Fact for OmniboxFact {
    fn write_legacy(&self, element: &mut Element) {
        element.push_child(self.uielement.clone());
    }

    fn write_structured(&self, log: &mut StructuredLog) {
        log.omnibox_events.push(self.event.clone());
    }
}

/// Appends transient events to a report
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRecorder;

impl EventRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Record one omnibox interaction and count it as an event.
    pub fn record_omnibox_event(
        &self,
        report: &mut Report,
        log: &OmniboxLog,
    ) -> Result<(), ReportError> {
        report.ensure_building("record_omnibox_event")?;
        let fact = OmniboxFact::new(log, report.session_id(), Utc::now().timestamp());
        report.record(&fact)?;
        report.increment_events()?;
        tracing::trace!(
            suggestions = log.results.len(),
            events = report.num_events(),
            "Omnibox event recorded"
        );
        Ok(())
    }
}
