use super::materials::extract_materials;
use super::recipe::build_recipe;
use super::statement::{
    ProvenanceBuilder, ProvenanceMetadata, ProvenancePredicate, ProvenanceStatement,
};
use super::subjects::SubjectExtractor;
use super::{PREDICATE_SLSA_PROVENANCE_V01, STATEMENT_IN_TOTO_V01};
use crate::build::{BuildRecord, BuildStatus};

pub fn make_builder(id: &str) -> ProvenanceBuilder {
    ProvenanceBuilder { id: id.to_string() }
}

pub fn make_metadata(status: &BuildStatus) -> ProvenanceMetadata {
    // absent timestamps stay absent, never a zero placeholder
    ProvenanceMetadata {
        build_started_on: status.start_time,
        build_finished_on: status.completion_time,
    }
}

/// Translates a completed build into an in-toto provenance statement.
///
/// The mapping is:
/// - configured builder id -> `predicate.builder.id`
/// - `*_DIGEST` results -> `subject`
/// - `CHAINS-GIT_*` params -> `predicate.materials`
/// - build name, params and step environments -> `predicate.recipe`
///
/// The output depends on nothing but the arguments.
pub fn generate_provenance_statement(
    record: &BuildRecord,
    builder: &ProvenanceBuilder,
    subjects: &dyn SubjectExtractor,
) -> ProvenanceStatement {
    ProvenanceStatement {
        statement_type: STATEMENT_IN_TOTO_V01.to_string(),
        predicate_type: PREDICATE_SLSA_PROVENANCE_V01.to_string(),
        subject: subjects.extract_subjects(record),
        predicate: ProvenancePredicate {
            builder: builder.clone(),
            recipe: build_recipe(record),
            metadata: make_metadata(&record.status),
            materials: extract_materials(record),
        },
    }
}
