//! Built-in codec registry.
//!
//! One rule table per clinical resource type the engine serves. Medication
//! is the reference table; the rest follow the same conventions — `status`
//! style scalars, primary codings under their natural column names, and
//! `<name>Id` columns for extracted reference targets.

use std::sync::Arc;

use crate::rules::{IndexRule, IndexedCodec};
use crate::ResourceCodec;

/// RxNorm coding system URI.
pub const RXNORM_SYSTEM: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";

static MEDICATION: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding_system("rxnormCode", "code", RXNORM_SYSTEM),
    IndexRule::reference("manufacturerId", "manufacturer"),
    IndexRule::coding("form", "form"),
];

static MEDICATION_STATEMENT: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding("code", "medicationCodeableConcept"),
    IndexRule::reference("medicationId", "medicationReference"),
    IndexRule::reference("subjectId", "subject"),
];

static SERVICE_REQUEST: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::scalar("intent", "intent"),
    IndexRule::coding("code", "code"),
    IndexRule::reference("subjectId", "subject"),
    IndexRule::reference("requesterId", "requester"),
];

static SCHEDULE: &[IndexRule] = &[
    IndexRule::scalar("active", "active"),
    IndexRule::reference("actorId", "actor"),
    IndexRule::coding("serviceType", "serviceType"),
];

static SLOT: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::reference("scheduleId", "schedule"),
    IndexRule::scalar("start", "start"),
];

static PROVENANCE: &[IndexRule] = &[
    IndexRule::scalar("recorded", "recorded"),
    IndexRule::reference("targetId", "target"),
    IndexRule::coding("activity", "activity"),
];

static PATIENT: &[IndexRule] = &[
    IndexRule::scalar("active", "active"),
    IndexRule::scalar("gender", "gender"),
    IndexRule::scalar("birthDate", "birthDate"),
    IndexRule::identifier("identifier"),
];

static PRACTITIONER: &[IndexRule] = &[
    IndexRule::scalar("active", "active"),
    IndexRule::identifier("identifier"),
];

static ORGANIZATION: &[IndexRule] = &[
    IndexRule::scalar("active", "active"),
    IndexRule::scalar("name", "name"),
    IndexRule::identifier("identifier"),
];

static ENCOUNTER: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding("class", "class"),
    IndexRule::reference("subjectId", "subject"),
    IndexRule::reference("serviceProviderId", "serviceProvider"),
];

static OBSERVATION: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding("code", "code"),
    IndexRule::reference("subjectId", "subject"),
    IndexRule::reference("encounterId", "encounter"),
];

static CONDITION: &[IndexRule] = &[
    IndexRule::coding("clinicalStatus", "clinicalStatus"),
    IndexRule::coding("code", "code"),
    IndexRule::reference("subjectId", "subject"),
];

static PROCEDURE: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding("code", "code"),
    IndexRule::reference("subjectId", "subject"),
];

static ALLERGY_INTOLERANCE: &[IndexRule] = &[
    IndexRule::coding("clinicalStatus", "clinicalStatus"),
    IndexRule::coding("code", "code"),
    IndexRule::reference("patientId", "patient"),
];

static IMMUNIZATION: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding("vaccineCode", "vaccineCode"),
    IndexRule::reference("patientId", "patient"),
];

static DIAGNOSTIC_REPORT: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding("code", "code"),
    IndexRule::reference("subjectId", "subject"),
];

static BUILTIN: &[(&str, &[IndexRule])] = &[
    ("Medication", MEDICATION),
    ("MedicationStatement", MEDICATION_STATEMENT),
    ("ServiceRequest", SERVICE_REQUEST),
    ("Schedule", SCHEDULE),
    ("Slot", SLOT),
    ("Provenance", PROVENANCE),
    ("Patient", PATIENT),
    ("Practitioner", PRACTITIONER),
    ("Organization", ORGANIZATION),
    ("Encounter", ENCOUNTER),
    ("Observation", OBSERVATION),
    ("Condition", CONDITION),
    ("Procedure", PROCEDURE),
    ("AllergyIntolerance", ALLERGY_INTOLERANCE),
    ("Immunization", IMMUNIZATION),
    ("DiagnosticReport", DIAGNOSTIC_REPORT),
];

/// Codecs for every built-in resource type.
#[must_use]
pub fn builtin_codecs() -> Vec<Arc<dyn ResourceCodec>> {
    BUILTIN
        .iter()
        .map(|(resource_type, rules)| {
            Arc::new(IndexedCodec::new(resource_type, rules)) as Arc<dyn ResourceCodec>
        })
        .collect()
}

/// Resource type labels of the built-in codecs.
#[must_use]
pub fn builtin_resource_types() -> Vec<&'static str> {
    BUILTIN.iter().map(|(resource_type, _)| *resource_type).collect()
}
