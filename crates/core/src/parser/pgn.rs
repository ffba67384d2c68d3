//! PGN input for offline replay
//!
//! Turns recorded games into the step lists the host would have sent, so a
//! game can be pushed through the overlay one ply at a time.

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess, EnPassantMode, Position};
use std::fs;
use std::io::Cursor;
use std::ops::ControlFlow;
use std::path::Path;

use crate::error::{Error, Result};
use crate::host::{BoardUpdate, HostColor, HostGame, HostPlayer, HostStep};

/// A parsed game, reduced to what the overlay replays.
#[derive(Debug, Clone)]
pub struct PgnGame {
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub initial_fen: String,
    pub moves: Vec<String>,
    pub final_fen: String,
}

impl PgnGame {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn summary(&self) -> String {
        let white = self.white.as_deref().unwrap_or("Unknown");
        let black = self.black.as_deref().unwrap_or("Unknown");
        let result = self.result.as_deref().unwrap_or("*");
        format!("{} vs {} - {}", white, black, result)
    }

    /// Host step list after `plies` half-moves: the initial position
    /// followed by one SAN step per ply.
    pub fn steps_through(&self, plies: usize) -> Vec<HostStep> {
        let mut steps = vec![HostStep::fen(0, &self.initial_fen)];
        steps.extend(
            self.moves
                .iter()
                .take(plies)
                .enumerate()
                .map(|(i, san)| HostStep::san(i as u32 + 1, san)),
        );
        steps
    }

    /// The update the host would send after `plies` half-moves.
    pub fn update_at(&self, plies: usize, player: HostColor) -> BoardUpdate {
        BoardUpdate {
            steps: self.steps_through(plies),
            game: HostGame {
                fen: self.initial_fen.clone(),
            },
            player: HostPlayer { color: player },
        }
    }
}

#[derive(Default)]
struct GameTags {
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    fen: Option<String>,
}

struct GameMoves {
    tags: GameTags,
    initial_fen: String,
    moves: Vec<String>,
    current_position: Chess,
    success: bool,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Option<PgnGame>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name_str = String::from_utf8_lossy(name);
        let value_str = value.decode_utf8_lossy().to_string();

        match name_str.as_ref() {
            "White" => tags.white = Some(value_str),
            "Black" => tags.black = Some(value_str),
            "Result" => tags.result = Some(value_str),
            "FEN" => tags.fen = Some(value_str),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let start = match &tags.fen {
            Some(fen) => fen
                .parse::<Fen>()
                .ok()
                .and_then(|f| f.into_position::<Chess>(CastlingMode::Standard).ok()),
            None => Some(Chess::default()),
        };

        let success = start.is_some();
        let current_position = start.unwrap_or_default();
        let initial_fen = Fen::from_position(&current_position, EnPassantMode::Legal).to_string();

        ControlFlow::Continue(GameMoves {
            tags,
            initial_fen,
            moves: Vec::new(),
            current_position,
            success,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if !movetext.success {
            return ControlFlow::Continue(());
        }

        let played = san
            .san
            .to_move(&movetext.current_position)
            .ok()
            .and_then(|m| movetext.current_position.clone().play(m).ok());

        match played {
            Some(next) => {
                movetext.moves.push(san.to_string());
                movetext.current_position = next;
            }
            None => movetext.success = false,
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        if !movetext.success {
            return None;
        }

        Some(PgnGame {
            white: movetext.tags.white,
            black: movetext.tags.black,
            result: movetext.tags.result,
            initial_fen: movetext.initial_fen,
            final_fen: Fen::from_position(&movetext.current_position, EnPassantMode::Legal)
                .to_string(),
            moves: movetext.moves,
        })
    }
}

pub fn parse_pgn_file<P: AsRef<Path>>(path: P) -> Result<Vec<PgnGame>> {
    let contents = fs::read_to_string(path)?;
    parse_pgn_string(&contents)
}

pub fn parse_pgn_string(pgn: &str) -> Result<Vec<PgnGame>> {
    let mut parser = GameParser;
    let mut games: Vec<PgnGame> = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut parser) {
            Ok(Some(maybe_game)) => {
                if let Some(game) = maybe_game {
                    games.push(game);
                }
            }
            Ok(None) => break,
            Err(e) => return Err(Error::Pgn(e.to_string())),
        }
    }

    if games.is_empty() {
        Err(Error::Pgn("No valid games found in PGN".to_string()))
    } else {
        Ok(games)
    }
}
