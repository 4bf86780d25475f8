//! PGN export for arena games.

use std::fmt::Write;

use crate::arbiter::Game;
use crate::game_data::{GameStatus, MoveRecord, Side};
use crate::position::STANDARD_START_FEN;

pub const EVENT_NAME: &str = "LLM Chess Arena";
pub const SITE_NAME: &str = "arena-server";

fn write_header(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "[{} \"{}\"]", key, escape_tag(value));
}

/// Tag values may only escape `\` and `"`. Other control characters are
/// not representable, so they become spaces.
fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '"' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_control() => escaped.push(' '),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render a game in progress or finished. Unfinished games carry `*`.
pub fn write_game(game: &Game) -> String {
    let mut out = String::new();
    let initial_fen = game.initial_fen();
    let date = game
        .started_at()
        .map(|t| t.format("%Y.%m.%d").to_string())
        .unwrap_or_else(|| "????.??.??".to_string());
    let result = match (game.status(), game.outcome()) {
        (GameStatus::Finished, Some(outcome)) => outcome.result.as_pgn(),
        _ => "*",
    };

    write_header(&mut out, "Event", EVENT_NAME);
    write_header(&mut out, "Site", SITE_NAME);
    write_header(&mut out, "Date", &date);
    write_header(&mut out, "Round", &game.number().to_string());
    write_header(&mut out, "White", game.name(Side::White));
    write_header(&mut out, "Black", game.name(Side::Black));
    write_header(&mut out, "Result", result);
    if initial_fen != STANDARD_START_FEN {
        write_header(&mut out, "FEN", &initial_fen);
        write_header(&mut out, "SetUp", "1");
    }
    if let Some(outcome) = game.outcome() {
        write_header(&mut out, "Termination", &outcome.reason);
    }
    out.push('\n');

    let mut tokens = movetext(game.moves(Side::White), game.moves(Side::Black));
    tokens.push(result.to_string());
    out.push_str(&tokens.join(" "));
    out.push('\n');
    out
}

/// Numbered SAN tokens, white then black per full move.
fn movetext(white: &[MoveRecord], black: &[MoveRecord]) -> Vec<String> {
    let mut tokens = Vec::new();
    let (mut w, mut b) = (white.iter().peekable(), black.iter().peekable());
    loop {
        let number = match (w.peek(), b.peek()) {
            (Some(wm), Some(bm)) => wm.number.min(bm.number),
            (Some(wm), None) => wm.number,
            (None, Some(bm)) => bm.number,
            (None, None) => break,
        };
        match w.next_if(|m| m.number == number) {
            Some(m) => {
                tokens.push(format!("{number}."));
                push_move(&mut tokens, m);
            }
            None => tokens.push(format!("{number}...")),
        }
        if let Some(m) = b.next_if(|m| m.number == number) {
            push_move(&mut tokens, m);
        }
    }
    tokens
}

fn push_move(tokens: &mut Vec<String>, record: &MoveRecord) {
    tokens.push(record.notation.clone());
    if let Some(secs) = record.time {
        tokens.push(format!(
            "{{[%emt {}:{:02}:{:02}]}}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        ));
    }
}
