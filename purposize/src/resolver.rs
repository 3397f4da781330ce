// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use purposize_core::{PurposeDefinition, PurposeId};
use purposize_store::MetadataStore;

use crate::error::{AuthorizationError, PolicyError};
use crate::graph::{compatibility_graph, has_path, reachable};

/// Validates purpose identifiers and resolves their compatibility.
#[derive(Debug)]
pub struct PurposeResolver<'a, M> {
    metadata: &'a M,
}

impl<'a, M> PurposeResolver<'a, M>
where
    M: MetadataStore,
{
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// Returns the definition of a known purpose, fails with `UnknownPurpose` otherwise.
    pub async fn validate_purpose(
        &self,
        id: &PurposeId,
    ) -> Result<PurposeDefinition, AuthorizationError<M::Error>> {
        self.metadata
            .purpose(id)
            .await
            .map_err(AuthorizationError::Metadata)?
            .ok_or_else(|| PolicyError::UnknownPurpose(id.clone()).into())
    }

    /// Checks that all purposes are known, fails with `UnknownPurpose` on the first unknown one.
    pub async fn validate_purposes(
        &self,
        ids: &[PurposeId],
    ) -> Result<(), AuthorizationError<M::Error>> {
        let known = self
            .metadata
            .purposes()
            .await
            .map_err(AuthorizationError::Metadata)?;

        match ids
            .iter()
            .find(|id| !known.iter().any(|definition| &definition.id == *id))
        {
            Some(unknown) => Err(PolicyError::UnknownPurpose(unknown.clone()).into()),
            None => Ok(()),
        }
    }

    /// Returns all purposes whose records may be read under the given purpose, including the
    /// purpose itself.
    pub async fn transitive_compatible(
        &self,
        id: &PurposeId,
    ) -> Result<Vec<PurposeDefinition>, AuthorizationError<M::Error>> {
        self.validate_purpose(id).await?;

        let definitions = self
            .metadata
            .purposes()
            .await
            .map_err(AuthorizationError::Metadata)?;
        let graph = compatibility_graph(&definitions);
        let compatible: BTreeSet<&str> = reachable(&graph, id.as_str());

        Ok(definitions
            .iter()
            .filter(|definition| compatible.contains(definition.id.as_str()))
            .cloned()
            .collect())
    }

    /// Returns `true` if records collected for purpose `from` may be read under purpose `to`.
    pub async fn is_compatible(
        &self,
        from: &PurposeId,
        to: &PurposeId,
    ) -> Result<bool, AuthorizationError<M::Error>> {
        self.validate_purpose(from).await?;
        self.validate_purpose(to).await?;

        let definitions = self
            .metadata
            .purposes()
            .await
            .map_err(AuthorizationError::Metadata)?;
        let graph = compatibility_graph(&definitions);
        Ok(has_path(&graph, from.as_str(), to.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use purposize_core::{PurposeDefinition, PurposeId};
    use purposize_store::{MemoryStore, MetadataWriter};

    use crate::error::{AuthorizationError, PolicyError};

    use super::PurposeResolver;

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        for definition in [
            PurposeDefinition::new("ORDER").compatible_with("DELIVERY"),
            PurposeDefinition::new("DELIVERY").compatible_with("ANALYTICS"),
            PurposeDefinition::new("ANALYTICS").compatible_with("ORDER"),
            PurposeDefinition::new("NEWSLETTER"),
        ] {
            store.insert_purpose(definition).await.unwrap();
        }
        store
    }

    fn ids(definitions: Vec<PurposeDefinition>) -> Vec<String> {
        definitions
            .into_iter()
            .map(|definition| definition.id.to_string())
            .collect()
    }

    #[tokio::test]
    async fn validate() {
        let store = store().await;
        let resolver = PurposeResolver::new(&store);

        let order = resolver
            .validate_purpose(&PurposeId::new("ORDER"))
            .await
            .unwrap();
        assert_eq!(order.id, PurposeId::new("ORDER"));

        assert!(matches!(
            resolver.validate_purpose(&PurposeId::new("TEST")).await,
            Err(AuthorizationError::Policy(PolicyError::UnknownPurpose(id))) if id.as_str() == "TEST"
        ));

        assert!(
            resolver
                .validate_purposes(&[PurposeId::new("ORDER"), PurposeId::new("NEWSLETTER")])
                .await
                .is_ok()
        );
        assert!(matches!(
            resolver
                .validate_purposes(&[PurposeId::new("ORDER"), PurposeId::new("SPAM")])
                .await,
            Err(AuthorizationError::Policy(PolicyError::UnknownPurpose(id))) if id.as_str() == "SPAM"
        ));
    }

    #[tokio::test]
    async fn closure_includes_self_and_terminates() {
        let store = store().await;
        let resolver = PurposeResolver::new(&store);

        // ORDER -> DELIVERY -> ANALYTICS -> ORDER forms a cycle.
        let compatible = resolver
            .transitive_compatible(&PurposeId::new("ANALYTICS"))
            .await
            .unwrap();
        assert_eq!(ids(compatible), vec!["ANALYTICS", "DELIVERY", "ORDER"]);

        let compatible = resolver
            .transitive_compatible(&PurposeId::new("NEWSLETTER"))
            .await
            .unwrap();
        assert_eq!(ids(compatible), vec!["NEWSLETTER"]);

        assert!(
            resolver
                .transitive_compatible(&PurposeId::new("TEST"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn compatibility_is_directed() {
        let store = MemoryStore::new();
        for definition in [
            PurposeDefinition::new("A").compatible_with("B"),
            PurposeDefinition::new("B").compatible_with("C"),
            PurposeDefinition::new("C"),
        ] {
            store.insert_purpose(definition).await.unwrap();
        }
        let resolver = PurposeResolver::new(&store);

        let a = PurposeId::new("A");
        let c = PurposeId::new("C");
        assert!(resolver.is_compatible(&a, &c).await.unwrap());
        assert!(!resolver.is_compatible(&c, &a).await.unwrap());
        assert!(resolver.is_compatible(&c, &c).await.unwrap());

        // Resolving twice gives the same result.
        let first = resolver.transitive_compatible(&c).await.unwrap();
        let second = resolver.transitive_compatible(&c).await.unwrap();
        assert_eq!(first, second);
    }
}
