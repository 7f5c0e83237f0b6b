//! Handlers for the claims cog.

use crate::claims::{Claim, ClaimFilter, Dimension};
use crate::commands::{CommandContext, CommandOutcome};
use crate::error::BotError;
use crate::registry::Resolution;
use crate::sessions::{Paginator, SessionOptions};

const CLAIMS_PER_PAGE: usize = 5;

/// `claims create <x> <y> [dimension]`
pub async fn create(
    ctx: &CommandContext,
    resolution: &Resolution,
) -> Result<CommandOutcome, BotError> {
    let (x, y, dimension) = match parse_coordinates(&resolution.args) {
        Ok(parsed) => parsed,
        Err(problem) => return Ok(usage(ctx, "claims create <x> <y> [dimension]", &problem)),
    };

    let claim = ctx.claims.attempt_claim(ctx.user_id, x, y, dimension).await?;
    Ok(CommandOutcome::text(format!(
        "\u{1F5FA} Claimed ({}, {}) in {}.",
        claim.claim_x, claim.claim_y, claim.dimension
    )))
}

/// `claims remove <x> <y> [dimension]`
pub async fn remove(
    ctx: &CommandContext,
    resolution: &Resolution,
) -> Result<CommandOutcome, BotError> {
    let (x, y, dimension) = match parse_coordinates(&resolution.args) {
        Ok(parsed) => parsed,
        Err(problem) => return Ok(usage(ctx, "claims remove <x> <y> [dimension]", &problem)),
    };

    let removed = ctx.claims.remove_claim(x, y, dimension).await?;
    let response = if removed {
        format!("Removed the claim at ({x}, {y}) in {dimension}.")
    } else {
        format!("There is no claim at ({x}, {y}) in {dimension}.")
    };
    Ok(CommandOutcome::text(response))
}

/// `claims list` - paginated listing of the invoker's claims.
pub async fn list(ctx: &CommandContext) -> Result<CommandOutcome, BotError> {
    let claims = ctx
        .claim_store
        .claims(&ClaimFilter::user(ctx.user_id))
        .await?;
    if claims.is_empty() {
        return Ok(CommandOutcome::text("You have no claims."));
    }

    let paginator = Paginator::new(
        claims,
        CLAIMS_PER_PAGE,
        Box::new(|indices, page: &[Claim]| {
            let mut lines = vec!["\u{1F5FA} Your Claims".to_string()];
            for (offset, claim) in page.iter().enumerate() {
                lines.push(format!(
                    "`{}.` ({}, {}) in {} since {}",
                    indices.start + offset + 1,
                    claim.claim_x,
                    claim.claim_y,
                    claim.dimension,
                    claim.claim_time.format("%B %d, %Y")
                ));
            }
            lines.join("\n")
        }),
    );

    Ok(CommandOutcome::session(
        Box::new(paginator),
        SessionOptions::default().invoker_only(ctx.user_id),
    ))
}

fn parse_coordinates(args: &[String]) -> Result<(i64, i64, Dimension), String> {
    let x = args
        .first()
        .ok_or("missing the x coordinate")?
        .parse::<i64>()
        .map_err(|_| "the x coordinate must be an integer".to_string())?;
    let y = args
        .get(1)
        .ok_or("missing the y coordinate")?
        .parse::<i64>()
        .map_err(|_| "the y coordinate must be an integer".to_string())?;
    let dimension = match args.get(2) {
        Some(raw) => raw.parse::<Dimension>()?,
        None => Dimension::Overworld,
    };
    Ok((x, y, dimension))
}

fn usage(ctx: &CommandContext, signature: &str, problem: &str) -> CommandOutcome {
    CommandOutcome::text(format!(
        "Invalid arguments: {problem}.\nUsage: `{}{signature}`",
        ctx.prefix
    ))
}
