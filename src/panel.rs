//! Text rendering of lookup states.

use std::fmt::Write;

use crate::pipeline::{LookupReport, LookupState};
use crate::providers::{SocialIdentity, TokenBalance};

const BAR_WIDTH: usize = 20;

/// Largest scale a 256-bit token amount can meaningfully have.
const MAX_DECIMALS: u32 = 77;

/// Render `state` as a compact multi-line panel.
pub fn render(state: &LookupState) -> String {
    let mut out = String::new();
    match state {
        LookupState::Idle { subject: Some(subject) } => {
            let _ = writeln!(out, "Last lookup: {}", subject);
        }
        LookupState::Idle { subject: None } => {
            out.push_str("Enter an address or name to look up.\n");
        }
        LookupState::Error { ctx, message } => {
            let _ = writeln!(out, "{}", ctx.subject);
            let _ = writeln!(out, "Error: {}", message);
        }
        LookupState::Done { ctx, report } => {
            let _ = writeln!(out, "{}", ctx.subject);
            render_report(&mut out, report);
        }
        loading => {
            if let Some(subject) = loading.subject() {
                let _ = writeln!(out, "{}", subject);
            }
            let _ = writeln!(out, "{}", progress_line(loading));
        }
    }
    out
}

/// `[#####.....]  25% loading balances`
pub fn progress_line(state: &LookupState) -> String {
    let progress = usize::from(state.progress().min(100));
    let filled = progress * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        progress,
        state.label()
    )
}

fn render_report(out: &mut String, report: &LookupReport) {
    let address = &report.address;
    let kind = if address.is_contract { "Contract" } else { "Wallet" };
    let verified = if address.is_contract && address.is_verified { " (verified)" } else { "" };
    let _ = writeln!(out, "Type: {}{}", kind, verified);
    if let Some(name) = &address.display_name {
        let _ = writeln!(out, "Name: {}", name);
    }
    if let Some(creator) = &address.creator_address {
        let _ = writeln!(out, "Creator: {}", creator);
    }
    if let Some(balance) = &address.coin_balance {
        let _ = writeln!(out, "ETH balance: {}", format_units(balance, 18));
    }

    match report.score {
        Some(score) => {
            let _ = writeln!(out, "Builder score: {}", score);
        }
        None if !address.is_contract => {
            let _ = writeln!(out, "Builder score: n/a");
        }
        None => {}
    }

    if report.balances.is_empty() {
        out.push_str("Holdings: none above threshold\n");
    } else {
        out.push_str("Holdings:\n");
        for balance in &report.balances {
            let _ = writeln!(out, "  {}", balance_line(balance));
        }
    }

    if let Some(socials) = &report.socials {
        if !socials.is_empty() {
            out.push_str("Socials:\n");
            for social in socials {
                let _ = writeln!(out, "  {}", social_line(social));
            }
        }
    }

    if let Some(identity) = &report.platform_identity {
        let _ = writeln!(out, "From page: {}", social_line(identity));
    }
}

fn balance_line(balance: &TokenBalance) -> String {
    let symbol = balance.symbol.as_deref().unwrap_or("?");
    let amount = match balance.decimals {
        Some(decimals) => format_units(&balance.amount, decimals),
        None => balance.amount.clone(),
    };
    let mut line = format!(
        "{:<10} {} {} (${:.2})",
        balance.chain,
        amount,
        symbol,
        balance.value_usd.unwrap_or_default()
    );
    if balance.low_liquidity {
        line.push_str(" low liquidity");
    }
    line
}

fn social_line(social: &SocialIdentity) -> String {
    let name = social
        .display_name
        .as_deref()
        .or(social.name.as_deref())
        .unwrap_or("-");
    let mut line = format!("{}: {}", social.source, name);
    if let Some(followers) = social.follower_count {
        let _ = write!(line, ", {} followers", followers);
    }
    if let Some(following) = social.following_count {
        let _ = write!(line, ", {} following", following);
    }
    if let Some(url) = &social.profile_url {
        let _ = write!(line, " <{}>", url);
    }
    line
}

/// Format a base-unit decimal string with `decimals` places, trimming
/// trailing zeros. Non-numeric input, or a scale above 77 places, is returned
/// unchanged.
pub fn format_units(raw: &str, decimals: u32) -> String {
    if decimals > MAX_DECIMALS
        || raw.is_empty()
        || !raw.bytes().all(|b| b.is_ascii_digit())
    {
        return raw.to_string();
    }
    let digits = raw.trim_start_matches('0');
    let decimals = decimals as usize;
    if decimals == 0 {
        return if digits.is_empty() { "0".to_string() } else { digits.to_string() };
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}
