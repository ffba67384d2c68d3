//! Rules adapter over the shakmaty move generator
//!
//! Holds a disposable working position. Callers reset it from a FEN before
//! every read-only query; nothing in here is the source of truth.

use shakmaty::{
    attacks, fen::Fen, san::SanPlus, Bitboard, Board, CastlingMode, Chess, Color, EnPassantMode,
    File, FromSetup, Move, Piece, Position, PositionError, PositionErrorKinds, Rank, Role, Square,
};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::tracker::Step;

/// A legal move reduced to its origin and destination squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
}

/// Saved adapter state, restored with [`RulesAdapter::restore`].
#[derive(Debug, Clone)]
pub struct Checkpoint {
    position: Chess,
    forced: Option<Color>,
}

#[derive(Debug, Clone, Default)]
pub struct RulesAdapter {
    position: Chess,
    /// Side handed the move in a position shakmaty refuses to represent:
    /// the other side's king is already attacked. Moves are then generated
    /// from the board directly.
    forced: Option<Color>,
}

impl RulesAdapter {
    /// Adapter on the standard starting position.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut adapter = Self::new();
        adapter.load_position(fen)?;
        Ok(adapter)
    }

    /// Replaces the working position with `fen`.
    pub fn load_position(&mut self, fen: &str) -> Result<()> {
        let parsed: Fen = fen.trim().parse().map_err(|e| Error::InvalidPosition {
            fen: fen.to_string(),
            reason: format!("{}", e),
        })?;
        self.position = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| Error::InvalidPosition {
                fen: fen.to_string(),
                reason: format!("{}", e),
            })?;
        self.forced = None;
        Ok(())
    }

    /// Plays a SAN move (check/mate suffixes allowed) for the side to move.
    pub fn apply_move(&mut self, san: &str) -> Result<()> {
        if let Some(side) = self.forced {
            return Err(Error::IllegalMove {
                san: san.to_string(),
                reason: format!("{:?} was handed the move while giving check", side),
            });
        }
        let parsed: SanPlus = san.trim().parse().map_err(|e| Error::IllegalMove {
            san: san.to_string(),
            reason: format!("{}", e),
        })?;
        let mv = parsed.san.to_move(&self.position).map_err(|e| Error::IllegalMove {
            san: san.to_string(),
            reason: format!("{}", e),
        })?;
        self.position = self
            .position
            .clone()
            .play(mv)
            .map_err(|e| Error::IllegalMove {
                san: san.to_string(),
                reason: format!("{}", e),
            })?;
        Ok(())
    }

    /// Routes a host step to [`apply_move`](Self::apply_move) or
    /// [`load_position`](Self::load_position).
    pub fn apply_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Move(san) => self.apply_move(san),
            Step::Position(fen) => self.load_position(fen),
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.forced.unwrap_or_else(|| self.position.turn())
    }

    /// Hands the move to `side` without playing a move.
    ///
    /// The en passant square is dropped since it only exists for the side
    /// that was to move. If the other side's king is already attacked the
    /// move is still handed over and [`legal_moves_from`](Self::legal_moves_from)
    /// works from the board alone.
    pub fn set_side_to_move(&mut self, side: Color) -> Result<()> {
        if self.side_to_move() == side {
            return Ok(());
        }
        if self.position.turn() == side {
            self.forced = None;
            return Ok(());
        }

        let mut setup = self.position.to_setup(EnPassantMode::Legal);
        setup.turn = side;
        setup.ep_square = None;

        match Chess::from_setup(setup, CastlingMode::Standard)
            .or_else(PositionError::ignore_impossible_check)
        {
            Ok(position) => {
                self.position = position;
                self.forced = None;
                Ok(())
            }
            Err(e) if e.kinds().contains(PositionErrorKinds::OPPOSITE_CHECK) => {
                debug!(?side, "Opponent king in check, generating moves from the board");
                self.forced = Some(side);
                Ok(())
            }
            Err(e) => Err(Error::SideToMove {
                side,
                reason: format!("{}", e),
            }),
        }
    }

    /// Runs `f` with `side` to move, then puts the previous position back
    /// whether or not `f` succeeded.
    pub fn with_side_to_move<T>(
        &mut self,
        side: Color,
        f: impl FnOnce(&Self) -> T,
    ) -> Result<T> {
        let saved = self.checkpoint();
        let result = self.set_side_to_move(side).map(|()| f(self));
        self.restore(&saved);
        result
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// Legal moves starting on `square` for the current side to move, one
    /// per destination (promotion choices collapse into one entry).
    ///
    /// Empty when the square is empty or holds a piece of the side not to
    /// move.
    pub fn legal_moves_from(&self, square: Square) -> Vec<LegalMove> {
        let destinations: Vec<Square> = match self.forced {
            Some(side) => forced_destinations(self.position.board(), side, square),
            None => self
                .position
                .legal_moves()
                .iter()
                .filter(|m| m.from() == Some(square))
                .map(destination)
                .collect(),
        };

        let mut moves: Vec<LegalMove> = Vec::with_capacity(destinations.len());
        for to in destinations {
            let m = LegalMove { from: square, to };
            if !moves.contains(&m) {
                moves.push(m);
            }
        }
        trace!(%square, count = moves.len(), "legal moves");
        moves
    }

    pub fn fen(&self) -> String {
        match self.forced {
            Some(side) => {
                let mut setup = self.position.to_setup(EnPassantMode::Legal);
                setup.turn = side;
                setup.ep_square = None;
                Fen::try_from_setup(setup)
                    .unwrap_or_else(shakmaty::fen::LossyFenError::ignore)
                    .to_string()
            }
            None => Fen::from_position(&self.position, EnPassantMode::Legal).to_string(),
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position.clone(),
            forced: self.forced,
        }
    }

    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        self.position = checkpoint.position.clone();
        self.forced = checkpoint.forced;
    }
}

/// Destinations for the piece on `square` with `side` to move, read off the
/// board. Used only when the position cannot be handed to shakmaty; castling
/// and en passant never apply there.
fn forced_destinations(board: &Board, side: Color, square: Square) -> Vec<Square> {
    let piece = match board.piece_at(square) {
        Some(piece) if piece.color == side => piece,
        _ => return Vec::new(),
    };
    let occupied = board.occupied();
    let theirs = board.by_color(side.other());

    let mut targets = if piece.role == Role::Pawn {
        attacks::pawn_attacks(side, square) & theirs
    } else {
        attacks::attacks(square, piece, occupied) & !board.by_color(side)
    };
    if piece.role == Role::Pawn {
        targets |= pawn_pushes(side, square, occupied);
    }

    targets
        .into_iter()
        .filter(|&to| !leaves_king_attacked(board, piece, square, to))
        .collect()
}

fn pawn_pushes(side: Color, square: Square, occupied: Bitboard) -> Bitboard {
    let (step, home) = match side {
        Color::White => (8, Rank::Second),
        Color::Black => (-8, Rank::Seventh),
    };
    let mut pushes = Bitboard::EMPTY;
    if let Some(one) = square.offset(step).filter(|sq| !occupied.contains(*sq)) {
        pushes.add(one);
        if square.rank() == home {
            if let Some(two) = one.offset(step).filter(|sq| !occupied.contains(*sq)) {
                pushes.add(two);
            }
        }
    }
    pushes
}

fn leaves_king_attacked(board: &Board, piece: Piece, from: Square, to: Square) -> bool {
    let mut after = board.clone();
    after.remove_piece_at(from);
    after.set_piece_at(to, piece);
    match after.king_of(piece.color) {
        Some(king) => after
            .attacks_to(king, piece.color.other(), after.occupied())
            .any(),
        None => false,
    }
}

/// Destination square as a player would see it; castling lands on the
/// king's target square rather than the rook.
fn destination(m: &Move) -> Square {
    match m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}
