//! Facts: one logical datum fanned out to both encodings
//!
//! Collectors never write the legacy tree and the structured record
//! separately. They build a [`Fact`] and hand it to [`Report::record`],
//! which applies both halves in the same call, so the two encodings cannot
//! drift apart.
//!
//! [`Report::record`]: super::report::Report::record

use super::legacy::Element;
use super::profile::StructuredLog;

/// A datum with a legacy half and a structured half
pub trait Fact {
    /// Write the legacy attributes onto the currently open element.
    fn write_legacy(&self, element: &mut Element);

    /// Set the matching fields of the structured record.
    fn write_structured(&self, log: &mut StructuredLog);
}

/// A fact assembled from a list of legacy attributes and a structured setter
pub struct PairedFact<F> {
    attributes: Vec<(&'static str, String)>,
    structured: F,
}

impl<F> PairedFact<F>
where
    F: Fn(&mut StructuredLog),
{
    pub fn new(attributes: Vec<(&'static str, String)>, structured: F) -> Self {
        Self {
            attributes,
            structured,
        }
    }
}

impl<F> Fact for PairedFact<F>
where
    F: Fn(&mut StructuredLog),
{
    fn write_legacy(&self, element: &mut Element) {
        for (name, value) in &self.attributes {
            element.push_attribute(*name, value.clone());
        }
    }

    fn write_structured(&self, log: &mut StructuredLog) {
        (self.structured)(log);
    }
}

/// Shorthand for [`PairedFact::new`]
pub fn paired<F>(attributes: Vec<(&'static str, String)>, structured: F) -> PairedFact<F>
where
    F: Fn(&mut StructuredLog),
{
    PairedFact::new(attributes, structured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_fact_applies_both_halves() {
        let fact = paired(vec![("arch", "x86_64".to_string())], |log| {
            log.system_profile.hardware_mut().cpu_architecture = Some("x86_64".to_string());
        });

        let mut element = Element::new("cpu");
        let mut log = StructuredLog::default();
        fact.write_legacy(&mut element);
        fact.write_structured(&mut log);

        assert_eq!(element.attribute("arch"), Some("x86_64"));
        assert_eq!(
            log.system_profile.hardware.unwrap().cpu_architecture.as_deref(),
            Some("x86_64")
        );
    }
}
