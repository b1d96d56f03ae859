use crate::spec::{Document, Operation};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// One operation placed in a tag group
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedOperation<'a> {
    pub path: &'a str,
    /// Lower-case HTTP method
    pub method: &'a str,
    pub operation: &'a Operation,
}

/// Operations sharing a primary tag, in discovery order
#[derive(Debug, Clone)]
pub struct TagGroup<'a> {
    pub tag: String,
    pub operations: Vec<ClassifiedOperation<'a>>,
}

/// Group operations by their first tag.
///
/// Tags appear in the order they are first seen; operations keep document
/// order within a tag. Untagged operations are dropped.
pub fn classify(document: &Document) -> Vec<TagGroup<'_>> {
    let mut groups: IndexMap<&str, Vec<ClassifiedOperation<'_>>> = IndexMap::new();
    for item in &document.paths {
        for operation in &item.operations {
            let Some(tag) = operation.primary_tag() else {
                debug!(path = %item.path, method = %operation.method, "Skipping untagged operation");
                continue;
            };
            let Some(method) = operation.method_name() else {
                warn!(path = %item.path, method = %operation.method, "Skipping operation with unsupported method");
                continue;
            };
            groups.entry(tag).or_default().push(ClassifiedOperation {
                path: &item.path,
                method,
                operation,
            });
        }
    }
    groups
        .into_iter()
        .map(|(tag, operations)| TagGroup {
            tag: tag.to_string(),
            operations,
        })
        .collect()
}
