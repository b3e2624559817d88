//! Report domain entity
//!
//! A [`Report`] is one reporting cycle's snapshot of stability and environment
//! facts, held in two parallel encodings: the legacy element tree and the
//! structured record. It is created in the `Building` state, filled by the
//! collectors during a single pass, and then locked. Locking is terminal; a
//! locked report rejects every mutation with
//! [`ReportError::InvariantViolation`] and leaves both encodings untouched.
//!
//! Legacy elements are opened with [`Report::open_scope`], which returns a
//! guard that closes the element when dropped. Guards nest by borrowing the
//! report, so an element can never outlive the scope that opened it.

use std::ops::{Deref, DerefMut};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::errors::ReportError;
use super::fact::Fact;
use super::legacy::Element;
use super::profile::StructuredLog;

/// Lifecycle state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    /// Collectors may still write facts
    Building,
    /// Frozen; ready to be encoded
    Locked,
}

impl std::fmt::Display for ReportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportState::Building => write!(f, "building"),
            ReportState::Locked => write!(f, "locked"),
        }
    }
}

/// Both encodings of a locked report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReport {
    /// Legacy tree rendered as XML text
    pub legacy_xml: String,
    /// Structured record serialized as MessagePack
    pub structured: Vec<u8>,
}

impl EncodedReport {
    /// Decode the structured bytes back into a record
    pub fn decode_structured(&self) -> Result<StructuredLog, ReportError> {
        rmp_serde::from_slice(&self.structured).map_err(|e| ReportError::Encoding(e.to_string()))
    }
}

/// One reporting cycle's dual-encoded snapshot
#[derive(Debug, Clone)]
pub struct Report {
    client_id: String,
    session_id: i32,
    version: String,
    num_events: u32,
    root: Element,
    /// Elements opened but not yet closed, innermost last
    open: Vec<Element>,
    structured: StructuredLog,
    state: ReportState,
}

impl Report {
    /// Creates an unlocked report for one reporting cycle
    ///
    /// # Arguments
    /// * `client_id` - Stable identifier of the reporting client
    /// * `session_id` - Identifier of the current browsing session
    /// * `version` - Reporting version string (see the version provider)
    pub fn new(client_id: impl Into<String>, session_id: i32, version: impl Into<String>) -> Self {
        let client_id = client_id.into();
        let version = version.into();

        let mut root = Element::new("log");
        root.push_attribute("clientid", client_id.clone());
        root.push_attribute("appversion", version.clone());
        root.push_attribute("session", session_id.to_string());

        let structured = StructuredLog {
            client_id: client_id.clone(),
            session_id,
            system_profile: super::profile::SystemProfile {
                app_version: version.clone(),
                ..Default::default()
            },
            omnibox_events: Vec::new(),
        };

        Self {
            client_id,
            session_id,
            version,
            num_events: 0,
            root,
            open: Vec::new(),
            structured,
            state: ReportState::Building,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn session_id(&self) -> i32 {
        self.session_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn state(&self) -> ReportState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == ReportState::Locked
    }

    /// Number of events recorded so far; used by callers to decide when to
    /// cut a report, never for correctness.
    pub fn num_events(&self) -> u32 {
        self.num_events
    }

    /// Root of the legacy tree. Open elements are not visible until closed.
    pub fn legacy(&self) -> &Element {
        &self.root
    }

    /// The structured record
    pub fn structured(&self) -> &StructuredLog {
        &self.structured
    }

    /// Fails with an invariant violation unless the report is still building
    pub fn ensure_building(&self, operation: &str) -> Result<(), ReportError> {
        match self.state {
            ReportState::Building => Ok(()),
            ReportState::Locked => Err(ReportError::violation(format!(
                "{operation} on a locked report"
            ))),
        }
    }

    fn current(&mut self) -> &mut Element {
        match self.open.last_mut() {
            Some(element) => element,
            None => &mut self.root,
        }
    }

    // ========================================================================
    // Legacy tree
    // ========================================================================

    /// Open a nested legacy element; it is closed when the guard drops
    pub fn open_scope(&mut self, name: &str) -> Result<ScopedElement<'_>, ReportError> {
        self.ensure_building("open_scope")?;
        self.open.push(Element::new(name));
        Ok(ScopedElement { report: self })
    }

    fn close_element(&mut self) {
        if let Some(element) = self.open.pop() {
            self.current().push_child(element);
        }
    }

    /// Append a string attribute to the currently open element
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), ReportError> {
        self.ensure_building("write_attribute")?;
        self.current().push_attribute(name, value);
        Ok(())
    }

    /// Append an integer attribute to the currently open element
    pub fn write_int_attribute(&mut self, name: &str, value: i64) -> Result<(), ReportError> {
        self.ensure_building("write_int_attribute")?;
        self.current().push_attribute(name, value.to_string());
        Ok(())
    }

    /// Write the attributes shared by every event element
    pub fn write_common_event_attributes(&mut self) -> Result<(), ReportError> {
        self.write_int_attribute("session", i64::from(self.session_id))?;
        self.write_int_attribute("time", Utc::now().timestamp())
    }

    // ========================================================================
    // Both encodings
    // ========================================================================

    /// Apply a fact to the open legacy element and to the structured record
    pub fn record(&mut self, fact: &dyn Fact) -> Result<(), ReportError> {
        self.ensure_building("record")?;
        fact.write_legacy(self.current());
        fact.write_structured(&mut self.structured);
        Ok(())
    }

    /// Write fields that only exist in the structured encoding
    pub fn structured_mut<F>(&mut self, update: F) -> Result<(), ReportError>
    where
        F: FnOnce(&mut StructuredLog),
    {
        self.ensure_building("structured_mut")?;
        update(&mut self.structured);
        Ok(())
    }

    /// Bump the event counter after an event has been fully recorded
    pub fn increment_events(&mut self) -> Result<(), ReportError> {
        self.ensure_building("increment_events")?;
        self.num_events += 1;
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Freeze the report. No further mutation is permitted.
    pub fn lock(&mut self) -> Result<(), ReportError> {
        self.ensure_building("lock")?;
        if !self.open.is_empty() {
            return Err(ReportError::violation(format!(
                "lock with {} element(s) still open",
                self.open.len()
            )));
        }
        self.state = ReportState::Locked;
        tracing::debug!(
            client_id = %self.client_id,
            session_id = self.session_id,
            events = self.num_events,
            "Report locked"
        );
        Ok(())
    }

    /// Produce both encodings of a locked report
    pub fn encode(&self) -> Result<EncodedReport, ReportError> {
        if self.state != ReportState::Locked {
            return Err(ReportError::violation("encode on an unlocked report"));
        }
        let structured = rmp_serde::to_vec_named(&self.structured)
            .map_err(|e| ReportError::Encoding(e.to_string()))?;
        Ok(EncodedReport {
            legacy_xml: self.root.to_xml(),
            structured,
        })
    }
}

/// Guard for an open legacy element
///
/// Dereferences to the [`Report`], so writes and nested scopes go through it.
/// The element is closed exactly once, when the guard is dropped.
pub struct ScopedElement<'a> {
    report: &'a mut Report,
}

impl Deref for ScopedElement<'_> {
    type Target = Report;

    fn deref(&self) -> &Report {
        self.report
    }
}

impl DerefMut for ScopedElement<'_> {
    fn deref_mut(&mut self) -> &mut Report {
        self.report
    }
}

impl Drop for ScopedElement<'_> {
    fn drop(&mut self) {
        self.report.close_element();
    }
}
