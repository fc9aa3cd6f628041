use std::collections::HashSet;

use bitpup_core::{LookupMiss, PackageManifest};
use tracing::debug;

use crate::types::{Resolution, UnresolvedPackage};

enum Step {
    Enter(String),
    Emit(PackageManifest),
}

/// Depth-first, dependency-first resolution of `roots`.
///
/// A package is marked visited before its dependencies are walked, so each id
/// is looked up at most once and a dependency cycle terminates; within a
/// cycle, the member reached first is emitted last. Ids that fail to look up
/// are collected in `unresolved` and do not stop the walk.
pub fn resolve_install_plan<F>(roots: &[String], mut lookup: F) -> Resolution
where
    F: FnMut(&str) -> Result<PackageManifest, LookupMiss>,
{
    let mut visited: HashSet<String> = HashSet::new();
    let mut resolution = Resolution::default();
    let mut stack: Vec<Step> = Vec::new();

    for root in roots {
        stack.push(Step::Enter(root.clone()));

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    if !visited.insert(id.clone()) {
                        continue;
                    }

                    match lookup(&id) {
                        Ok(manifest) => {
                            debug!(
                                package = %id,
                                dependencies = manifest.dependencies.len(),
                                "resolved"
                            );
                            let dependencies = manifest.dependencies.clone();
                            stack.push(Step::Emit(manifest));
                            for dependency in dependencies.into_iter().rev() {
                                if !visited.contains(&dependency) {
                                    stack.push(Step::Enter(dependency));
                                }
                            }
                        }
                        Err(miss) => {
                            debug!(package = %id, reason = miss.reason_code(), "unresolved");
                            resolution.unresolved.push(UnresolvedPackage { id, miss });
                        }
                    }
                }
                Step::Emit(manifest) => resolution.plan.push(manifest),
            }
        }
    }

    resolution
}
