use super::RECIPE_TYPE;
use super::statement::{Recipe, StepSnapshot};
use crate::build::BuildRecord;

use log::debug;

/// Records how the build was run: the entry point, every param and the
/// environment of each step.
pub fn build_recipe(record: &BuildRecord) -> Recipe {
    Recipe {
        recipe_type: RECIPE_TYPE.to_string(),
        entry_point: record.name().to_string(),
        arguments: record.params().iter().map(|p| p.to_string()).collect(),
        environment: step_environments(record),
    }
}

fn step_environments(record: &BuildRecord) -> Vec<StepSnapshot> {
    let mut steps = Vec::new();

    for (index, step) in record.steps().iter().enumerate() {
        match step.structured_environment() {
            Some(env) => steps.push(StepSnapshot {
                container: env.container.clone(),
                image: env.image.clone(),
                entry_point: step.entry_point.clone(),
            }),
            // not an error: the step simply contributes nothing
            None => debug!(
                "step {index} of {} has no structured environment, omitting it from the recipe",
                record.name()
            ),
        }
    }

    steps
}
