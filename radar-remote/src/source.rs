//! The remote data source consumed by the reconciliation engine.

use crate::error::RemoteError;
use crate::types::{LanguageBreakdown, RemoteContributor, RemoteOrganization, RemoteRepository};

/// Blocking request/response access to the platform.
///
/// `Ok(None)` from the per-repository lookups means the platform answered
/// successfully with no content; it is not an error.
pub trait RemoteSource {
    fn list_organizations(&self) -> Result<Vec<RemoteOrganization>, RemoteError>;

    fn list_organization_repositories(
        &self,
        organization: &str,
    ) -> Result<Vec<RemoteRepository>, RemoteError>;

    fn get_repository_languages(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Option<LanguageBreakdown>, RemoteError>;

    fn get_repository_contributors(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Option<Vec<RemoteContributor>>, RemoteError>;
}

impl<R: RemoteSource + ?Sized> RemoteSource for &R {
    fn list_organizations(&self) -> Result<Vec<RemoteOrganization>, RemoteError> {
        (**self).list_organizations()
    }

    fn list_organization_repositories(
        &self,
        organization: &str,
    ) -> Result<Vec<RemoteRepository>, RemoteError> {
        (**self).list_organization_repositories(organization)
    }

    fn get_repository_languages(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Option<LanguageBreakdown>, RemoteError> {
        (**self).get_repository_languages(organization, repository)
    }

    fn get_repository_contributors(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Option<Vec<RemoteContributor>>, RemoteError> {
        (**self).get_repository_contributors(organization, repository)
    }
}
