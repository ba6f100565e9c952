use tracing::debug;

use crate::{
    api::tracks::Track,
    common::errors::ResolveError,
    config::SourcesConfig,
    resolver::{http::HttpResolver, plugin::TrackResolver},
};

/// Ordered registry of track resolvers.
///
/// The first resolver whose `can_handle` matches gets the identifier; there
/// is no fallback to later resolvers on failure.
pub struct ResolverManager {
    resolvers: Vec<Box<dyn TrackResolver>>,
}

impl ResolverManager {
    /// Create a manager with the built-in resolvers enabled by config.
    pub fn new(config: &SourcesConfig) -> Self {
        let mut manager = Self {
            resolvers: Vec::new(),
        };

        if config.http {
            match HttpResolver::new() {
                Ok(resolver) => manager.register(Box::new(resolver)),
                Err(e) => tracing::error!("http resolver failed to initialize: {}", e),
            }
        }

        manager
    }

    /// Register an additional resolver. Registration order is match order,
    /// so put more specific resolvers before catch-alls.
    pub fn register(&mut self, resolver: Box<dyn TrackResolver>) {
        tracing::info!("Loaded resolver: {}", resolver.name());
        self.resolvers.push(resolver);
    }

    /// Resolve an identifier using the first matching resolver.
    pub async fn resolve(&self, identifier: &str) -> Result<Track, ResolveError> {
        for resolver in &self.resolvers {
            if resolver.can_handle(identifier) {
                debug!(resolver = resolver.name(), "Resolving: {}", identifier);
                return resolver.resolve(identifier).await;
            }
        }
        Err(ResolveError::NotFound(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tracks::StreamRef;
    use async_trait::async_trait;

    struct StaticResolver {
        name: &'static str,
        prefix: &'static str,
    }

    #[async_trait]
    impl TrackResolver for StaticResolver {
        fn name(&self) -> &str {
            self.name
        }

        fn can_handle(&self, identifier: &str) -> bool {
            identifier.starts_with(self.prefix)
        }

        async fn resolve(&self, identifier: &str) -> Result<Track, ResolveError> {
            Ok(Track::new(
                format!("{}:{}", self.name, identifier),
                StreamRef::new(identifier),
            ))
        }
    }

    fn manager_with(resolvers: Vec<Box<dyn TrackResolver>>) -> ResolverManager {
        let mut manager = ResolverManager::new(&SourcesConfig { http: false });
        for resolver in resolvers {
            manager.register(resolver);
        }
        manager
    }

    #[tokio::test]
    async fn first_matching_resolver_wins() {
        let manager = manager_with(vec![
            Box::new(StaticResolver {
                name: "a",
                prefix: "x:",
            }),
            Box::new(StaticResolver {
                name: "b",
                prefix: "x:",
            }),
        ]);

        let track = manager.resolve("x:song").await.expect("should resolve");
        assert_eq!(track.title, "a:x:song");
    }

    #[tokio::test]
    async fn unmatched_identifier_is_not_found() {
        let manager = manager_with(vec![Box::new(StaticResolver {
            name: "a",
            prefix: "x:",
        })]);

        let err = manager.resolve("y:song").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }
}
