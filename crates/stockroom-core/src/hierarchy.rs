//! Cycle detection for self-referencing hierarchies (categories, locations).

use crate::errors::{DomainError, Result};

/// Upper bound on ancestor walks; deeper trees are treated as corrupt.
pub const MAX_DEPTH: usize = 64;

/// Verify that re-parenting `node` under `new_parent` keeps the tree acyclic.
///
/// `parent_of` returns the parent of a node, or `Ok(None)` at a root.
pub fn ensure_acyclic<Id, F>(
    field: &str,
    node: &Id,
    new_parent: Option<&Id>,
    mut parent_of: F,
) -> Result<()>
where
    Id: PartialEq + Clone,
    F: FnMut(&Id) -> Result<Option<Id>>,
{
    let mut cursor = new_parent.cloned();
    let mut steps = 0;
    while let Some(current) = cursor {
        if &current == node {
            return Err(DomainError::validation(field, "would create a cycle"));
        }
        steps += 1;
        if steps > MAX_DEPTH {
            return Err(DomainError::validation(field, "hierarchy is too deep"));
        }
        cursor = parent_of(&current)?;
    }
    Ok(())
}
