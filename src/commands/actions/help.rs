//! Registry-driven help.

use crate::commands::{CommandContext, CommandOutcome};
use crate::error::BotError;
use crate::registry::{CommandRegistry, CommandSpec, GroupSpec, NodeId, Resolution};

/// Similarity floor under which a name is not worth suggesting.
const SUGGESTION_FLOOR: f64 = 0.5;
const MAX_SUGGESTIONS: usize = 3;

/// `help [name]` - cog overview, or detail for a command or group.
pub fn help(ctx: &CommandContext, resolution: &Resolution) -> Result<CommandOutcome, BotError> {
    let name = resolution.rest();
    if name.is_empty() {
        return Ok(CommandOutcome::text(overview(ctx)));
    }

    // Hidden entries read as absent, same as unknown names.
    let found = ctx
        .registry
        .lookup(&name)
        .filter(|id| !is_hidden(&ctx.registry, *id));
    let Some(id) = found else {
        let suggestions = suggest(&ctx.registry, &name);
        if suggestions.is_empty() {
            return Err(BotError::CommandNotFound(name));
        }
        return Ok(CommandOutcome::text(format!(
            "Command `{name}` not found. Did you mean {}?",
            suggestions
                .iter()
                .map(|s| format!("`{s}`"))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    };

    let response = match (ctx.registry.command(id), ctx.registry.group(id)) {
        (Some(spec), _) => command_detail(ctx, id, spec),
        (_, Some(spec)) => group_detail(ctx, id, spec),
        _ => return Err(BotError::CommandNotFound(name)),
    };
    Ok(CommandOutcome::text(response))
}

fn overview(ctx: &CommandContext) -> String {
    let mut lines = vec!["\u{1F4DA} Commands".to_string()];

    for (cog_index, cog) in ctx.registry.cogs().iter().enumerate() {
        if cog.hidden || !cog.active {
            continue;
        }
        lines.push(format!("\n{} **{}**", cog.glyph, cog.name));
        for root in ctx.registry.cog_roots(cog_index) {
            for id in subtree(&ctx.registry, root) {
                if let Some(spec) = ctx.registry.command(id)
                    && !spec.hidden
                {
                    lines.push(format!(
                        "`{}{}` - {}",
                        ctx.prefix,
                        ctx.registry.qualified_name(id),
                        spec.description
                    ));
                }
            }
        }
    }

    lines.push(format!(
        "\nUse `{}help <command>` for details.",
        ctx.prefix
    ));
    lines.join("\n")
}

fn command_detail(ctx: &CommandContext, id: NodeId, spec: &CommandSpec) -> String {
    let qualified = ctx.registry.qualified_name(id);

    let signature = spec
        .params
        .iter()
        .map(|p| {
            if p.required {
                format!("<{}>", p.name)
            } else {
                format!("[{}]", p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![
        format!("Help: `{qualified}`"),
        format!("> *{}*", spec.description),
        format!("Usage: `{}{qualified} {signature}`", ctx.prefix),
    ];
    if !spec.aliases.is_empty() {
        lines.push(format!("Aliases: {}", spec.aliases.join(", ")));
    }
    for param in &spec.params {
        let requirement = if param.required { "required" } else { "optional" };
        lines.push(format!(
            "`{}` ({requirement}) - {}",
            param.name, param.description
        ));
    }
    lines.join("\n")
}

fn group_detail(ctx: &CommandContext, id: NodeId, spec: &GroupSpec) -> String {
    let qualified = ctx.registry.qualified_name(id).to_string();

    let mut lines = vec![format!("Help: `{qualified}`"), format!("> *{}*", spec.description)];
    for child in ctx.registry.children(id) {
        if let Some(child_spec) = ctx.registry.command(*child)
            && !child_spec.hidden
        {
            lines.push(format!(
                "`{}{}` - {}",
                ctx.prefix,
                ctx.registry.qualified_name(*child),
                child_spec.description
            ));
        }
    }
    lines.join("\n")
}

/// Preorder traversal of one registered entry.
fn subtree(registry: &CommandRegistry, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        stack.extend(registry.children(id).iter().rev().copied());
        out.push(id);
    }
    out
}

fn is_hidden(registry: &CommandRegistry, id: NodeId) -> bool {
    let own = registry
        .command(id)
        .map(|spec| spec.hidden)
        .or_else(|| registry.group(id).map(|spec| spec.hidden))
        .unwrap_or(true);
    own || registry.cog_of(id).is_none_or(|cog| cog.hidden)
}

/// Closest visible qualified names to `input`, best first.
fn suggest(registry: &CommandRegistry, input: &str) -> Vec<String> {
    let mut scored: Vec<(f64, String)> = registry
        .walk()
        .filter(|id| !is_hidden(registry, *id))
        .map(|id| {
            let name = registry.qualified_name(id);
            (similarity(name, input), name.to_string())
        })
        .filter(|(score, _)| *score >= SUGGESTION_FLOOR)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name)
        .collect()
}

/// Normalized similarity ratio in `[0, 1]` based on edit distance.
fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64) / (longest as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
