//! The command tree and its indexes.

use std::collections::HashMap;

use log::info;

use crate::error::BotError;
use crate::registry::command::{Cog, CommandSpec, Entry, GroupSpec};

/// Arena index of a node in the registry. Stable for the life of the
/// node; parent and cog back-references are held as ids so the registry
/// stays the sole owner.
pub type NodeId = usize;

/// Index of a registered cog.
pub type CogId = usize;

#[derive(Debug)]
enum NodeKind {
    Command(CommandSpec),
    Group(GroupSpec),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    cog: CogId,
    /// Name segments of the path from the root, joined by single spaces.
    qualified: String,
}

/// The registry of commands, groups and cogs.
///
/// Qualified names are unique; registering a colliding entry fails with
/// [`BotError::DuplicateName`] and leaves the registry untouched. Aliases
/// may collide across commands; such collisions are surfaced as ambiguity
/// at resolution time, never resolved silently.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    nodes: Vec<Option<Node>>,
    roots: Vec<NodeId>,
    cogs: Vec<Cog>,
    by_name: HashMap<String, NodeId>,
    by_alias: HashMap<String, Vec<NodeId>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    /// Adds a cog and returns its id for subsequent registrations.
    pub fn register_cog(&mut self, cog: Cog) -> CogId {
        self.cogs.push(cog);
        self.cogs.len() - 1
    }

    /// Registers a top-level entry (command, or group with children)
    /// under a cog.
    ///
    /// # Errors
    ///
    /// [`BotError::DuplicateName`] when any qualified name in the entry,
    /// children included, is already taken. Nothing is registered in that
    /// case.
    pub fn register(&mut self, cog: CogId, entry: Entry) -> Result<NodeId, BotError> {
        // Validate every name up front so a late collision cannot leave a
        // half-registered subtree behind.
        let mut incoming = Vec::new();
        collect_qualified_names(&entry, None, &mut incoming);
        for name in &incoming {
            if self.by_name.contains_key(name) {
                return Err(BotError::DuplicateName(name.clone()));
            }
        }
        incoming.sort();
        if let Some(pair) = incoming.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(BotError::DuplicateName(pair[0].clone()));
        }

        let id = self.insert(cog, None, entry);
        self.roots.push(id);
        Ok(id)
    }

    /// Removes a group or command and all of its descendants.
    ///
    /// Used by hot reload: unregister the subtree, then register its
    /// replacement. Readers holding the registry concurrently see the old
    /// or the new entries, nothing in between is guaranteed.
    ///
    /// # Errors
    ///
    /// [`BotError::CommandNotFound`] when `name` matches no qualified name.
    pub fn unregister_subtree(&mut self, name: &str) -> Result<(), BotError> {
        let root = *self
            .by_name
            .get(name)
            .ok_or_else(|| BotError::CommandNotFound(name.to_string()))?;

        let parent = self.nodes[root].as_ref().and_then(|n| n.parent);
        let mut stack = vec![root];
        let mut removed = Vec::new();
        while let Some(id) = stack.pop() {
            if let Some(node) = &self.nodes[id] {
                stack.extend(node.children.iter().copied());
                removed.push(id);
            }
        }

        for id in removed {
            let Some(node) = self.nodes[id].take() else {
                continue;
            };
            self.by_name.remove(&node.qualified);
            let aliases = match &node.kind {
                NodeKind::Command(spec) => &spec.aliases,
                NodeKind::Group(spec) => &spec.aliases,
            };
            for alias in aliases {
                if let Some(ids) = self.by_alias.get_mut(alias) {
                    ids.retain(|other| *other != id);
                    if ids.is_empty() {
                        self.by_alias.remove(alias);
                    }
                }
            }
        }

        if let Some(parent) = parent
            && let Some(node) = self.nodes[parent].as_mut()
        {
            node.children.retain(|child| *child != root);
        }
        self.roots.retain(|r| *r != root);

        info!("unregistered command subtree {}", name);
        Ok(())
    }

    /// Exact lookup by qualified name or alias.
    ///
    /// An alias shared by several commands matches none of them here; the
    /// resolver is the place where shared aliases surface as ambiguity.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        if let Some(id) = self.by_name.get(name) {
            return Some(*id);
        }
        match self.by_alias.get(name) {
            Some(ids) if ids.len() == 1 => Some(ids[0]),
            _ => None,
        }
    }

    /// Lazy depth-first traversal of every node, groups included.
    ///
    /// The iterator borrows the registry and can be restarted by calling
    /// `walk` again.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            registry: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Lazy traversal of leaf commands only.
    pub fn commands(&self) -> impl Iterator<Item = (NodeId, &CommandSpec)> {
        self.walk().filter_map(|id| {
            let spec = self.command(id)?;
            Some((id, spec))
        })
    }

    /// The command spec at `id`, or `None` for groups and removed nodes.
    pub fn command(&self, id: NodeId) -> Option<&CommandSpec> {
        match &self.nodes.get(id)?.as_ref()?.kind {
            NodeKind::Command(spec) => Some(spec),
            NodeKind::Group(_) => None,
        }
    }

    /// The group spec at `id`, or `None` for commands and removed nodes.
    pub fn group(&self, id: NodeId) -> Option<&GroupSpec> {
        match &self.nodes.get(id)?.as_ref()?.kind {
            NodeKind::Command(_) => None,
            NodeKind::Group(spec) => Some(spec),
        }
    }

    /// Full qualified name of the node at `id`.
    pub fn qualified_name(&self, id: NodeId) -> &str {
        self.nodes
            .get(id)
            .and_then(|n| n.as_ref())
            .map(|n| n.qualified.as_str())
            .unwrap_or_default()
    }

    /// Children of a group, in registration order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .and_then(|n| n.as_ref())
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Parent group of the node at `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.as_ref()?.parent
    }

    /// The cog owning the node at `id`.
    pub fn cog_of(&self, id: NodeId) -> Option<&Cog> {
        let cog = self.nodes.get(id)?.as_ref()?.cog;
        self.cogs.get(cog)
    }

    /// All registered cogs.
    pub fn cogs(&self) -> &[Cog] {
        &self.cogs
    }

    /// Top-level entries of a cog, in registration order.
    pub fn cog_roots(&self, cog: CogId) -> impl Iterator<Item = NodeId> + '_ {
        self.roots
            .iter()
            .copied()
            .filter(move |id| self.nodes[*id].as_ref().is_some_and(|n| n.cog == cog))
    }

    fn insert(&mut self, cog: CogId, parent: Option<NodeId>, entry: Entry) -> NodeId {
        let (kind, children) = match entry {
            Entry::Command(spec) => (NodeKind::Command(spec), Vec::new()),
            Entry::Group(spec, children) => (NodeKind::Group(spec), children),
        };

        let qualified = {
            let name = match &kind {
                NodeKind::Command(spec) => &spec.name,
                NodeKind::Group(spec) => &spec.name,
            };
            match parent {
                Some(parent_id) => format!("{} {}", self.qualified_name(parent_id), name),
                None => name.clone(),
            }
        };

        let aliases = match &kind {
            NodeKind::Command(spec) => spec.aliases.clone(),
            NodeKind::Group(spec) => spec.aliases.clone(),
        };

        let id = self.nodes.len();
        self.nodes.push(Some(Node {
            kind,
            parent,
            children: Vec::new(),
            cog,
            qualified: qualified.clone(),
        }));
        self.by_name.insert(qualified, id);
        for alias in aliases {
            self.by_alias.entry(alias).or_default().push(id);
        }

        for child in children {
            let child_id = self.insert(cog, Some(id), child);
            if let Some(node) = self.nodes[id].as_mut() {
                node.children.push(child_id);
            }
        }

        id
    }
}

fn collect_qualified_names(entry: &Entry, parent: Option<&str>, out: &mut Vec<String>) {
    let name = match entry {
        Entry::Command(spec) => &spec.name,
        Entry::Group(spec, _) => &spec.name,
    };
    let qualified = match parent {
        Some(parent) => format!("{parent} {name}"),
        None => name.clone(),
    };
    if let Entry::Group(_, children) = entry {
        for child in children {
            collect_qualified_names(child, Some(&qualified), out);
        }
    }
    out.push(qualified);
}

/// Depth-first iterator over registry nodes. See [`CommandRegistry::walk`].
pub struct Walk<'a> {
    registry: &'a CommandRegistry,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let id = self.stack.pop()?;
            let Some(node) = self.registry.nodes.get(id).and_then(|n| n.as_ref()) else {
                continue;
            };
            self.stack.extend(node.children.iter().rev().copied());
            return Some(id);
        }
    }
}
