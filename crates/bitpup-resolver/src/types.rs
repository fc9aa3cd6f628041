use bitpup_core::{LookupMiss, PackageManifest};

/// Packages in install order: every package comes after all of its
/// (resolvable) dependencies and each id appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    packages: Vec<PackageManifest>,
}

impl InstallPlan {
    pub(crate) fn push(&mut self, manifest: PackageManifest) {
        self.packages.push(manifest);
    }

    pub fn packages(&self) -> &[PackageManifest] {
        &self.packages
    }

    pub fn into_packages(self) -> Vec<PackageManifest> {
        self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedPackage {
    pub id: String,
    pub miss: LookupMiss,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub plan: InstallPlan,
    pub unresolved: Vec<UnresolvedPackage>,
}
