//! Command, group and cog descriptors.
//!
//! Handlers are not stored in the registry; each command carries a
//! [`Route`] tag and the dispatcher maps routes to handler functions.
//! This keeps the registry a plain data structure and the full command
//! surface visible in one registration list.

/// Handler routing tag carried by every registered command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    ClaimsCreate,
    ClaimsRemove,
    ClaimsList,
    TodoAdd,
    TodoList,
    TodoRemove,
    Help,
    WebSearch,
}

/// A declared command parameter, surfaced by the help command.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub required: bool,
    pub description: String,
}

/// A leaf command.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    /// Last segment of the qualified name.
    pub name: String,
    /// Alternative short names, in declaration order.
    pub aliases: Vec<String>,
    pub description: String,
    pub params: Vec<Parameter>,
    /// Hidden commands stay resolvable but are left out of help listings.
    pub hidden: bool,
    pub route: Route,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, route: Route) -> Self {
        CommandSpec {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            params: Vec::new(),
            hidden: false,
            route,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn param(
        mut self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            required,
            description: description.into(),
        });
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A command group: a named container of subcommands.
#[derive(Clone, Debug)]
pub struct GroupSpec {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub hidden: bool,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        GroupSpec {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            hidden: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// A registration entry: either a leaf command or a group with children.
///
/// Children are attached exactly once, at registration, so the registry
/// is a tree by construction.
#[derive(Clone, Debug)]
pub enum Entry {
    Command(CommandSpec),
    Group(GroupSpec, Vec<Entry>),
}

/// A feature bundle owning a set of top-level commands.
#[derive(Clone, Debug)]
pub struct Cog {
    pub name: String,
    /// Glyph shown next to the cog in help listings.
    pub glyph: String,
    /// Hidden cogs are left out of help listings entirely.
    pub hidden: bool,
    /// Inactive cogs keep their commands registered but flagged off in
    /// help; resolution is unaffected.
    pub active: bool,
}

impl Cog {
    pub fn new(name: impl Into<String>, glyph: impl Into<String>) -> Self {
        Cog {
            name: name.into(),
            glyph: glyph.into(),
            hidden: false,
            active: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}
