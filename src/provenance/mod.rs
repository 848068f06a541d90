//! # Build Provenance
//!
//! This module maps a completed build record onto an in-toto v0.1 Statement
//! whose predicate is an SLSA v0.1 provenance document. The statement records:
//! - what was produced (subjects, from digest results)
//! - what went in (materials, from the declared git origin)
//! - how it was built (recipe: entry point, params, step environments)
//! - who built it (the configured builder id) and when
//!
//! ## Key Components
//!
//! - [`statement`] - serializable statement and predicate types
//! - [`materials`] - git origin to material mapping
//! - [`recipe`] - recipe assembly
//! - [`subjects`] - the [`subjects::SubjectExtractor`] seam and its
//!   result-convention implementation
//! - [`generators`] - composition of the above into a statement
//!
//! ## Examples
//!
//! ```
//! use chains_attest::build::{BuildRecord, ParamValue};
//! use chains_attest::provenance::generators::{generate_provenance_statement, make_builder};
//! use chains_attest::provenance::subjects::ResultSubjectExtractor;
//!
//! let record = BuildRecord::new("build-1")
//!     .with_param("CHAINS-GIT_COMMIT", ParamValue::String("abcd".to_string()))
//!     .with_param("CHAINS-GIT_URL", ParamValue::String("https://git.test.com".to_string()));
//!
//! let statement = generate_provenance_statement(
//!     &record,
//!     &make_builder("https://builder.example/v1"),
//!     &ResultSubjectExtractor,
//! );
//!
//! assert_eq!(statement.predicate.materials[0].uri, "git+https://git.test.com");
//! ```
pub mod generators;
pub mod materials;
pub mod recipe;
pub mod statement;
pub mod subjects;

/// The in-toto Statement v0.1 type URI.
pub const STATEMENT_IN_TOTO_V01: &str = "https://in-toto.io/Statement/v0.1";

/// The SLSA provenance v0.1 predicate type URI.
pub const PREDICATE_SLSA_PROVENANCE_V01: &str = "https://slsa.dev/provenance/v0.1";

/// Identifies this producer as the author of the recipe.
pub const RECIPE_TYPE: &str = "https://tekton.dev/attestations/chains@v1";

/// Param carrying the source commit hash.
pub const COMMIT_PARAM: &str = "CHAINS-GIT_COMMIT";

/// Param carrying the source repository URL.
pub const URL_PARAM: &str = "CHAINS-GIT_URL";

pub const GIT_COMMIT_DIGEST_KEY: &str = "git_commit";
pub const GIT_PURL_PREFIX: &str = "git+";
