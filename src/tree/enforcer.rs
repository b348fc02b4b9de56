//! Structural validation for every tree mutation. All checks run against a
//! snapshot before anything is written, so a failed mutation leaves no
//! partial state behind.

use uuid::Uuid;

use crate::tree::{Category, TreeError, TreeSnapshot};

/// Validate a node creation request.
///
/// A null parent is only legal for the very first node, which must be the
/// ROOT. Under a BEREICH parent only BEREICH children are allowed, and ROOT
/// is never a legal category below the root.
pub fn validate_create(
    snapshot: &TreeSnapshot,
    parent_id: Option<Uuid>,
    category: Category,
) -> Result<(), TreeError> {
    match parent_id {
        None => {
            if category != Category::Root {
                return Err(TreeError::InvalidCategoryForParent {
                    parent: Category::Root,
                    requested: category,
                });
            }
            if snapshot.root().is_some() {
                return Err(TreeError::RootAlreadyExists);
            }
            Ok(())
        }
        Some(parent_id) => {
            let parent = snapshot
                .get(parent_id)
                .ok_or(TreeError::ParentNotFound(parent_id))?;
            if category == Category::Root {
                return Err(TreeError::InvalidCategoryForParent {
                    parent: parent.category,
                    requested: category,
                });
            }
            if parent.category == Category::Bereich && category != Category::Bereich {
                return Err(TreeError::InvalidCategoryForParent {
                    parent: parent.category,
                    requested: category,
                });
            }
            Ok(())
        }
    }
}

/// Validate a name/category update of an existing node.
///
/// The root keeps category ROOT forever. Changing a node *to* BEREICH
/// requires all current children to already be BEREICH. The reverse
/// direction (away from BEREICH) is deliberately unchecked: BEREICH is a
/// legal child category under every parent, so the subtree stays valid.
///
/// `new_parent_id` is the move target when the same request also reparents
/// the node; the category is judged against the parent the node will have
/// after the request, not the one it is leaving.
pub fn validate_update(
    snapshot: &TreeSnapshot,
    node_id: Uuid,
    new_category: Category,
    new_parent_id: Option<Uuid>,
) -> Result<(), TreeError> {
    let node = snapshot.get(node_id).ok_or(TreeError::NodeNotFound(node_id))?;

    if node.is_root() {
        if new_category != Category::Root {
            return Err(TreeError::RootCategoryImmutable);
        }
        return Ok(());
    }
    if new_category == Category::Root {
        return Err(TreeError::RootCategoryImmutable);
    }

    if new_category == Category::Bereich {
        let incompatible = snapshot
            .children_of(node_id)
            .iter()
            .any(|child| child.category != Category::Bereich);
        if incompatible {
            return Err(TreeError::IncompatibleChildCategories);
        }
    }

    // Re-check against the effective parent so a category edit can never
    // smuggle a non-BEREICH node under a BEREICH parent.
    if let Some(parent_id) = new_parent_id.or(node.parent_id) {
        let parent = match snapshot.get(parent_id) {
            Some(parent) => parent,
            // A missing move target is the caller's mistake; a missing
            // current parent means the stored tree is inconsistent.
            None if new_parent_id.is_some() => return Err(TreeError::ParentNotFound(parent_id)),
            None => return Err(TreeError::CorruptTree(parent_id)),
        };
        if parent.category == Category::Bereich && new_category != Category::Bereich {
            return Err(TreeError::InvalidCategoryForParent {
                parent: parent.category,
                requested: new_category,
            });
        }
    }

    Ok(())
}

/// Validate a reparent. The cycle check walks the current subtree of the
/// node being moved; the original system skipped it and relied on callers
/// behaving, which is not good enough.
pub fn validate_move(
    snapshot: &TreeSnapshot,
    node_id: Uuid,
    new_parent_id: Uuid,
    category: Category,
) -> Result<(), TreeError> {
    let node = snapshot.get(node_id).ok_or(TreeError::NodeNotFound(node_id))?;
    if node.is_root() {
        return Err(TreeError::CannotMoveRoot);
    }
    if new_parent_id == node_id {
        return Err(TreeError::SelfParent);
    }
    let parent = snapshot
        .get(new_parent_id)
        .ok_or(TreeError::ParentNotFound(new_parent_id))?;
    if snapshot.is_descendant_of(new_parent_id, node_id) {
        return Err(TreeError::WouldCreateCycle);
    }
    if parent.category == Category::Bereich && category != Category::Bereich {
        return Err(TreeError::InvalidCategoryForParent {
            parent: parent.category,
            requested: category,
        });
    }
    Ok(())
}

/// Validate a deletion. Leaf-only: a node with children must be emptied
/// first.
pub fn validate_delete(snapshot: &TreeSnapshot, node_id: Uuid) -> Result<(), TreeError> {
    if !snapshot.contains(node_id) {
        return Err(TreeError::NodeNotFound(node_id));
    }
    if !snapshot.children_of(node_id).is_empty() {
        return Err(TreeError::NodeHasChildren);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    struct Fixture {
        snap: TreeSnapshot,
        root: Uuid,
        kunde: Uuid,
        standort: Uuid,
        bereich: Uuid,
    }

    fn fixture() -> Fixture {
        let root = Node::new("Root", Category::Root, None);
        let kunde = Node::new("Acme", Category::Kunde, Some(root.id));
        let standort = Node::new("Berlin", Category::Standort, Some(kunde.id));
        let bereich = Node::new("Lobby", Category::Bereich, Some(standort.id));
        let (r, k, s, b) = (root.id, kunde.id, standort.id, bereich.id);
        Fixture {
            snap: TreeSnapshot::from_nodes(vec![root, kunde, standort, bereich]),
            root: r,
            kunde: k,
            standort: s,
            bereich: b,
        }
    }

    #[test]
    fn create_root_only_when_empty() {
        let empty = TreeSnapshot::from_nodes(vec![]);
        assert!(validate_create(&empty, None, Category::Root).is_ok());

        let f = fixture();
        assert!(matches!(
            validate_create(&f.snap, None, Category::Root),
            Err(TreeError::RootAlreadyExists)
        ));
    }

    #[test]
    fn create_null_parent_requires_root_category() {
        let empty = TreeSnapshot::from_nodes(vec![]);
        assert!(matches!(
            validate_create(&empty, None, Category::Kunde),
            Err(TreeError::InvalidCategoryForParent { .. })
        ));
    }

    #[test]
    fn create_under_missing_parent_fails() {
        let f = fixture();
        assert!(matches!(
            validate_create(&f.snap, Some(Uuid::new_v4()), Category::Kunde),
            Err(TreeError::ParentNotFound(_))
        ));
    }

    #[test]
    fn create_non_bereich_under_bereich_fails() {
        let f = fixture();
        assert!(matches!(
            validate_create(&f.snap, Some(f.bereich), Category::Standort),
            Err(TreeError::InvalidCategoryForParent { .. })
        ));
        assert!(validate_create(&f.snap, Some(f.bereich), Category::Bereich).is_ok());
    }

    #[test]
    fn create_second_root_category_anywhere_fails() {
        let f = fixture();
        assert!(matches!(
            validate_create(&f.snap, Some(f.kunde), Category::Root),
            Err(TreeError::InvalidCategoryForParent { .. })
        ));
    }

    #[test]
    fn update_root_category_is_immutable() {
        let f = fixture();
        assert!(matches!(
            validate_update(&f.snap, f.root, Category::Kunde, None),
            Err(TreeError::RootCategoryImmutable)
        ));
        assert!(validate_update(&f.snap, f.root, Category::Root, None).is_ok());
    }

    #[test]
    fn update_to_bereich_requires_bereich_children() {
        let f = fixture();
        // standort has a BEREICH child, so converting it is fine
        assert!(validate_update(&f.snap, f.standort, Category::Bereich, None).is_ok());
        // kunde has a STANDORT child, so converting it is not
        assert!(matches!(
            validate_update(&f.snap, f.kunde, Category::Bereich, None),
            Err(TreeError::IncompatibleChildCategories)
        ));
    }

    #[test]
    fn update_away_from_bereich_is_allowed_for_leaf_subtrees() {
        // Preserved asymmetry: converting away from BEREICH is not blocked
        // by BEREICH children, but it is blocked by a BEREICH parent.
        let root = Node::new("Root", Category::Root, None);
        let outer = Node::new("outer", Category::Bereich, Some(root.id));
        let inner = Node::new("inner", Category::Bereich, Some(outer.id));
        let (outer_id, inner_id) = (outer.id, inner.id);
        let snap = TreeSnapshot::from_nodes(vec![root, outer, inner]);

        assert!(validate_update(&snap, outer_id, Category::Standort, None).is_ok());
        assert!(matches!(
            validate_update(&snap, inner_id, Category::Standort, None),
            Err(TreeError::InvalidCategoryForParent { .. })
        ));
    }

    #[test]
    fn recategorize_while_moving_is_judged_against_the_destination() {
        // A BEREICH child may leave its BEREICH parent and change category
        // in one request when the destination accepts the new category.
        let root = Node::new("Root", Category::Root, None);
        let standort = Node::new("Berlin", Category::Standort, Some(root.id));
        let outer = Node::new("outer", Category::Bereich, Some(standort.id));
        let inner = Node::new("inner", Category::Bereich, Some(outer.id));
        let (standort_id, inner_id) = (standort.id, inner.id);
        let snap = TreeSnapshot::from_nodes(vec![root, standort, outer, inner]);

        // In place the change stays rejected...
        assert!(matches!(
            validate_update(&snap, inner_id, Category::Standort, None),
            Err(TreeError::InvalidCategoryForParent { .. })
        ));
        // ...but combined with the move both checks pass.
        assert!(validate_update(&snap, inner_id, Category::Standort, Some(standort_id)).is_ok());
        assert!(validate_move(&snap, inner_id, standort_id, Category::Standort).is_ok());
    }

    #[test]
    fn update_toward_missing_move_target_fails() {
        let f = fixture();
        assert!(matches!(
            validate_update(&f.snap, f.kunde, Category::Kunde, Some(Uuid::new_v4())),
            Err(TreeError::ParentNotFound(_))
        ));
    }

    #[test]
    fn move_rejects_self_parent_and_cycles() {
        let f = fixture();
        assert!(matches!(
            validate_move(&f.snap, f.kunde, f.kunde, Category::Kunde),
            Err(TreeError::SelfParent)
        ));
        assert!(matches!(
            validate_move(&f.snap, f.kunde, f.bereich, Category::Kunde),
            Err(TreeError::WouldCreateCycle)
        ));
    }

    #[test]
    fn move_root_is_forbidden() {
        let f = fixture();
        assert!(matches!(
            validate_move(&f.snap, f.root, f.kunde, Category::Root),
            Err(TreeError::CannotMoveRoot)
        ));
    }

    #[test]
    fn move_applies_parent_category_rules() {
        let f = fixture();
        assert!(matches!(
            validate_move(&f.snap, f.standort, f.bereich, Category::Standort),
            Err(TreeError::InvalidCategoryForParent { .. })
        ));
        // a standort may move directly under the root
        assert!(validate_move(&f.snap, f.standort, f.root, Category::Standort).is_ok());
    }

    #[test]
    fn delete_is_leaf_only() {
        let f = fixture();
        assert!(matches!(
            validate_delete(&f.snap, f.standort),
            Err(TreeError::NodeHasChildren)
        ));
        assert!(validate_delete(&f.snap, f.bereich).is_ok());
    }
}
