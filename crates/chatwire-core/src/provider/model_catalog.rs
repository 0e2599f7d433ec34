use std::{future::Future, pin::Pin};

use crate::{credential::Credential, error::Result};

/// A **backend** able to list the models a credential may use.
///
/// A successful listing doubles as credential validation: the resolver only
/// promotes a draft credential once this call succeeds.
pub trait ModelCatalogProvider: Send + Sync {
    /// Fetch every model id visible to `credential`, unfiltered.
    fn list_models<'s>(
        &'s self,
        credential: &'s Credential,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + 's>>;
}
