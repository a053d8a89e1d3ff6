use crate::km::KmVersionRequirement;

/// The version requirements of a declaration.
///
/// They reference no types, so rewriting copies them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionRequirementInfo {
    requirements: Vec<KmVersionRequirement>,
}

impl VersionRequirementInfo {
    /// Builds the Info for a list of decoded requirements.
    #[must_use]
    pub fn create(requirements: &[KmVersionRequirement]) -> Self {
        VersionRequirementInfo {
            requirements: requirements.to_vec(),
        }
    }

    /// Returns `true` if there are no requirements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Writes the requirements back.
    #[must_use]
    pub fn rewrite(&self) -> Vec<KmVersionRequirement> {
        self.requirements.clone()
    }
}
