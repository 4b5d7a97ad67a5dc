//! # Driver Interface
//!
//! The capabilities the bootstrap needs from a document database driver.
//! Production code uses the MongoDB adapter; tests substitute fakes.

use crate::connection::ConnectionOptions;
use crate::errors::DriverError;
use async_trait::async_trait;
use bson::Document;
use std::sync::Arc;

/// Field that records the owning collection of a stored document
pub const NAMESPACE_FIELD: &str = "_ns";

#[async_trait]
pub trait Driver: Send + Sync {
    type Connection: Connection<Database = Self::Database>;
    type Database: Database;

    /// Open a connection using the assembled options
    async fn connect(&self, options: &ConnectionOptions) -> Result<Self::Connection, DriverError>;
}

#[async_trait]
pub trait Connection: Send + Sync {
    type Database: Database;

    /// Handle for the named database
    fn database(&self, name: &str) -> Result<Self::Database, DriverError>;

    /// Version string reported by the server, e.g. "2.6.0"
    async fn server_version(&self) -> Result<String, DriverError>;
}

#[async_trait]
pub trait Database: Send + Sync {
    /// Register a transformation applied to every written document
    fn add_document_hook(&mut self, hook: Arc<dyn DocumentHook>);

    async fn collection_names(&self) -> Result<Vec<String>, DriverError>;

    async fn authenticate(&self, username: &str, password: &str) -> Result<(), DriverError>;
}

/// Transformation applied to a document before it is written
pub trait DocumentHook: Send + Sync {
    fn transform_incoming(&self, document: &mut Document, collection: &str);
}

/// Scopes stored documents to the collection they are written to
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceInjector;

impl DocumentHook for NamespaceInjector {
    fn transform_incoming(&self, document: &mut Document, collection: &str) {
        document.insert(NAMESPACE_FIELD, collection);
    }
}

/// Run every hook over `document` in registration order
pub fn apply_hooks(
    hooks: &[Arc<dyn DocumentHook>],
    mut document: Document,
    collection: &str,
) -> Document {
    for hook in hooks {
        hook.transform_incoming(&mut document, collection);
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_namespace_injector_sets_collection() {
        let mut document = doc! { "name": "zoo" };
        NamespaceInjector.transform_incoming(&mut document, "repos");
        assert_eq!(document.get_str(NAMESPACE_FIELD).unwrap(), "repos");
        assert_eq!(document.get_str("name").unwrap(), "zoo");
    }

    #[test]
    fn test_namespace_injector_overwrites_stale_namespace() {
        let mut document = doc! { "_ns": "old" };
        NamespaceInjector.transform_incoming(&mut document, "units");
        assert_eq!(document.get_str(NAMESPACE_FIELD).unwrap(), "units");
    }

    #[test]
    fn test_apply_hooks() {
        let hooks: Vec<Arc<dyn DocumentHook>> = vec![Arc::new(NamespaceInjector)];
        let document = apply_hooks(&hooks, doc! { "id": 1 }, "tasks");
        assert_eq!(document.get_str(NAMESPACE_FIELD).unwrap(), "tasks");
        assert_eq!(apply_hooks(&[], doc! {}, "tasks"), doc! {});
    }
}
