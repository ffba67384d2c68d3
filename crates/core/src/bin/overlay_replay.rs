//! Replays a PGN through the overlay, one host update per ply

use lichess_overlay_core::host::{HostColor, MemoryHost};
use lichess_overlay_core::parser::parse_pgn_file;
use lichess_overlay_core::{
    BoardRect, BoardUpdate, OverlayConfig, OverlayRound, RendererKind, Result, RoundController,
};

/// Stand-in for the host's own controller.
#[derive(Default)]
struct ReplayRound {
    updates: usize,
}

impl RoundController for ReplayRound {
    fn boot(&mut self, _options: &serde_json::Value) -> Result<()> {
        Ok(())
    }

    fn app(&mut self, _init: &BoardUpdate) -> Result<()> {
        Ok(())
    }

    fn on_change(&mut self, _update: &BoardUpdate) {
        self.updates += 1;
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| {
        eprintln!("Usage: overlay_replay <game.pgn> [white|black] [vector|raster] [out.svg]");
        std::process::exit(1);
    });
    let player = match args.next().as_deref() {
        None | Some("white") => HostColor::White,
        Some("black") => HostColor::Black,
        Some(other) => {
            eprintln!("Unknown color: {}", other);
            std::process::exit(1);
        }
    };
    let renderer: RendererKind = match args.next().map(|r| r.parse::<RendererKind>()).transpose() {
        Ok(renderer) => renderer.unwrap_or_default(),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let out = args.next();

    let games = match parse_pgn_file(&path) {
        Ok(games) => games,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };
    let Some(game) = games.first() else {
        eprintln!("No games in {}", path);
        std::process::exit(1);
    };
    println!("Replaying {} ({} plies) as {}", game.summary(), game.move_count(), player.as_str());

    let config = OverlayConfig {
        show_own_moves: true,
        show_opponent_moves: true,
        renderer,
        ..OverlayConfig::default()
    };
    let host = MemoryHost::new(BoardRect {
        left: 0.0,
        top: 0.0,
        right: 512.0,
        bottom: 512.0,
    });
    let mut round = OverlayRound::new(ReplayRound::default(), host, config);

    if let Err(e) = round.app(&game.update_at(0, player)) {
        eprintln!("Init failed: {}", e);
        std::process::exit(1);
    }

    for ply in 1..=game.move_count() {
        round.on_change(&game.update_at(ply, player));

        let Some(session) = round.session() else {
            break;
        };
        let labels: Vec<String> = session
            .indicators()
            .iter()
            .map(|i| {
                let who = if i.is_opponent_move { "opp" } else { "own" };
                format!("{}:{}", who, i.uci())
            })
            .collect();
        println!("{:>3}. {:<8} {}", ply, game.moves[ply - 1], labels.join(" "));
    }

    println!("Host saw {} updates", round.inner().updates);

    let Some(svg) = round
        .session()
        .and_then(|s| s.surfaces())
        .map(|s| s.vector.to_svg())
    else {
        return;
    };

    match out {
        Some(out) => {
            if let Err(e) = std::fs::write(&out, svg) {
                eprintln!("Failed to write {}: {}", out, e);
                std::process::exit(1);
            }
            println!("Wrote {}", out);
        }
        None => println!("{}", svg),
    }
}
