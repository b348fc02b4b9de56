//! Cascading config resolution. A node's effective config is found by
//! walking its ancestor chain root-to-node and taking the configured node
//! closest to the target; older configs win ties on the same node.
//!
//! The "last of the sorted list wins" rule lives here and nowhere else, so
//! callers cannot re-derive divergent variants of it.

use uuid::Uuid;

use crate::portal::{PortalConfig, PortalError};
use crate::tree::TreeSnapshot;

/// All configs attached to the ancestor chain of `node_id`, stable-sorted
/// by (position of the owning node in the chain, creation time).
pub fn configs_on_path(
    snapshot: &TreeSnapshot,
    configs: Vec<PortalConfig>,
    node_id: Uuid,
) -> Result<Vec<PortalConfig>, PortalError> {
    let path = snapshot.ancestors(node_id)?;
    let position = |id: Uuid| path.iter().position(|n| n.id == id);

    let mut on_path: Vec<(usize, PortalConfig)> = configs
        .into_iter()
        .filter_map(|c| position(c.node_id).map(|idx| (idx, c)))
        .collect();
    on_path.sort_by(|(ia, a), (ib, b)| (ia, a.created_at).cmp(&(ib, b.created_at)));

    Ok(on_path.into_iter().map(|(_, c)| c).collect())
}

/// The single config that applies to `node_id`, or None when no node on
/// the ancestor chain carries one (the caller substitutes defaults).
pub fn effective_config(
    snapshot: &TreeSnapshot,
    configs: Vec<PortalConfig>,
    node_id: Uuid,
) -> Result<Option<PortalConfig>, PortalError> {
    let mut ordered = configs_on_path(snapshot, configs, node_id)?;
    Ok(ordered.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::PortalFields;
    use crate::tree::{Category, Node};

    fn fields(button_text: &str) -> PortalFields {
        PortalFields {
            button_text: Some(button_text.to_string()),
            ..Default::default()
        }
    }

    fn chain() -> (TreeSnapshot, Uuid, Uuid, Uuid, Uuid) {
        let root = Node::new("Root", Category::Root, None);
        let kunde = Node::new("Acme", Category::Kunde, Some(root.id));
        let standort = Node::new("Berlin", Category::Standort, Some(kunde.id));
        let bereich = Node::new("Lobby", Category::Bereich, Some(standort.id));
        let (r, k, s, b) = (root.id, kunde.id, standort.id, bereich.id);
        (
            TreeSnapshot::from_nodes(vec![root, kunde, standort, bereich]),
            r,
            k,
            s,
            b,
        )
    }

    #[test]
    fn config_inherits_across_unconfigured_levels() {
        // Config on the KUNDE level only; the BEREICH two levels below must
        // resolve to it.
        let (snap, _r, k, _s, b) = chain();
        let configs = vec![PortalConfig::new(k, fields("X"))];

        let effective = effective_config(&snap, configs, b).unwrap().unwrap();
        assert_eq!(effective.node_id, k);
        assert_eq!(effective.fields.button_text.as_deref(), Some("X"));
    }

    #[test]
    fn nearest_ancestor_wins() {
        let (snap, r, k, s, b) = chain();
        let configs = vec![
            PortalConfig::new(r, fields("root")),
            PortalConfig::new(k, fields("kunde")),
            PortalConfig::new(s, fields("standort")),
        ];

        let effective = effective_config(&snap, configs.clone(), b).unwrap().unwrap();
        assert_eq!(effective.node_id, s);

        // Resolution for the middle node ignores configs below it.
        let effective = effective_config(&snap, configs, k).unwrap().unwrap();
        assert_eq!(effective.node_id, k);
    }

    #[test]
    fn own_config_beats_ancestors() {
        let (snap, r, _k, _s, b) = chain();
        let configs = vec![
            PortalConfig::new(r, fields("root")),
            PortalConfig::new(b, fields("own")),
        ];
        let effective = effective_config(&snap, configs, b).unwrap().unwrap();
        assert_eq!(effective.node_id, b);
    }

    #[test]
    fn no_config_anywhere_resolves_to_none() {
        let (snap, .., b) = chain();
        assert!(effective_config(&snap, vec![], b).unwrap().is_none());
    }

    #[test]
    fn path_order_is_root_to_node() {
        let (snap, r, k, s, b) = chain();
        let configs = vec![
            PortalConfig::new(s, fields("standort")),
            PortalConfig::new(r, fields("root")),
            PortalConfig::new(k, fields("kunde")),
        ];
        let ordered = configs_on_path(&snap, configs, b).unwrap();
        let owners: Vec<Uuid> = ordered.iter().map(|c| c.node_id).collect();
        assert_eq!(owners, vec![r, k, s]);
    }

    #[test]
    fn same_node_ties_break_by_creation_time() {
        // Duplicate configs on one node should not normally exist. When they
        // do, the sort is created_at ascending and the last element wins, so
        // the newest one on that node is effective.
        let (snap, _r, k, _s, b) = chain();
        let older = PortalConfig::new(k, fields("older"));
        let mut newer = PortalConfig::new(k, fields("newer"));
        newer.created_at = older.created_at + chrono::Duration::seconds(10);

        let effective = effective_config(&snap, vec![newer.clone(), older.clone()], b)
            .unwrap()
            .unwrap();
        assert_eq!(effective.id, newer.id);

        let ordered = configs_on_path(&snap, vec![newer.clone(), older.clone()], b).unwrap();
        assert_eq!(ordered[0].id, older.id);
        assert_eq!(ordered[1].id, newer.id);
    }

    #[test]
    fn configs_outside_the_path_are_ignored() {
        let (snap, r, k, s, _b) = chain();
        // Sibling branch under the root.
        let sibling = Node::new("Other", Category::Kunde, Some(r));
        let sibling_id = sibling.id;
        let mut nodes: Vec<Node> = Vec::new();
        for n in snap.ancestors(s).unwrap() {
            nodes.push(n.clone());
        }
        nodes.push(sibling);
        let snap = TreeSnapshot::from_nodes(nodes);

        let configs = vec![PortalConfig::new(sibling_id, fields("sibling"))];
        assert!(effective_config(&snap, configs, k).unwrap().is_none());
    }
}
