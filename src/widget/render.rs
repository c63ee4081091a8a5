//! Plain-text rendering of turns and banners

use super::state::{Banner, BannerKind, Sender, Turn};

/// "Tools used: a, b" for agent turns that used tools
pub fn tools_annotation(turn: &Turn) -> Option<String> {
    if turn.sender != Sender::Agent || turn.tool_calls.is_empty() {
        return None;
    }
    Some(format!("Tools used: {}", turn.tool_calls.join(", ")))
}

pub fn render_turn(turn: &Turn) -> String {
    let label = match turn.sender {
        Sender::User => "You",
        Sender::Agent => "Agent",
    };

    let mut out = format!("{}: {}", label, turn.content);
    if let Some(annotation) = tools_annotation(turn) {
        out.push_str("\n  ");
        out.push_str(&annotation);
    }
    out
}

pub fn render_banner(banner: &Banner) -> String {
    let tag = match banner.kind {
        BannerKind::Loading => "...",
        BannerKind::Success => "ok",
        BannerKind::Error => "!!",
    };
    format!("[{}] {}", tag, banner.text)
}
