mod resolve;
mod types;

pub use resolve::resolve_install_plan;
pub use types::{InstallPlan, Resolution, UnresolvedPackage};

#[cfg(test)]
mod tests;
