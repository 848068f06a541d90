use crate::build::{BuildObject, BuildRecord};
use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;

pub fn testdata_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

pub fn load_build_object(name: &str) -> Result<BuildObject> {
    let contents = fs::read_to_string(testdata_path(name))?;
    BuildObject::parse(&contents)
}

pub fn load_task_run(name: &str) -> Result<BuildRecord> {
    match load_build_object(name)? {
        BuildObject::TaskRun(record) => Ok(*record),
        BuildObject::Other { kind } => Err(Error::UnsupportedInputKind(kind)),
    }
}
