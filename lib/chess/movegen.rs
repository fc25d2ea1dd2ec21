use crate::chess::{Board, Color, Move, Piece, Position, Role};
use arrayvec::ArrayVec;
use derive_more::{Display, Error};

/// The moves a single piece may make, at most 27 for a queen in the center.
pub type Moves = ArrayVec<Move, 27>;

/// Represents an attempt to move a piece from an empty [`Position`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "there is no piece on `{_0}`")]
pub struct EmptySquare(#[error(not(source))] pub Position);

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ADJACENT: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[rustfmt::skip]
const KNIGHT: [(i8, i8); 8] = [
    (1, 2), (1, -2), (-1, 2), (-1, -2),
    (2, 1), (2, -1), (-2, 1), (-2, -1),
];

/// Generates the [pseudo-legal] moves of the piece on the given [`Position`].
///
/// These respect how pieces move and capture, but not whether the mover's own
/// king is left under attack.
///
/// [pseudo-legal]: https://www.chessprogramming.org/Pseudo-Legal_Move
pub fn pseudo_legal_moves(board: &Board, at: Position) -> Result<Moves, EmptySquare> {
    let piece = board.piece_on(at).ok_or(EmptySquare(at))?;
    let mut moves = Moves::new();

    match piece.role() {
        Role::Rook => slide(board, at, piece, &ORTHOGONAL, &mut moves),
        Role::Bishop => slide(board, at, piece, &DIAGONAL, &mut moves),
        Role::Queen => slide(board, at, piece, &ADJACENT, &mut moves),
        Role::Knight => step(board, at, piece, &KNIGHT, &mut moves),
        Role::King => step(board, at, piece, &ADJACENT, &mut moves),
        Role::Pawn => advance(board, at, piece, &mut moves),
    }

    Ok(moves)
}

/// Every [`Position`] some piece of the given [`Color`] could move into.
///
/// Positions reached by more than one move are repeated.
pub fn reach(board: &Board, side: Color) -> impl Iterator<Item = Position> + '_ {
    board
        .iter()
        .filter(move |(p, _)| p.color() == side)
        .flat_map(move |(_, at)| pseudo_legal_moves(board, at).unwrap_or_default())
        .map(|m| m.whither())
}

fn slide(board: &Board, at: Position, piece: Piece, dirs: &[(i8, i8)], moves: &mut Moves) {
    for &(dr, dc) in dirs {
        let mut next = at.offset(dr, dc);
        while let Some(to) = next {
            match board.piece_on(to) {
                None => moves.push(Move::new(at, to)),
                Some(p) => {
                    if p.color() != piece.color() {
                        moves.push(Move::new(at, to));
                    }

                    break;
                }
            }

            next = to.offset(dr, dc);
        }
    }
}

fn step(board: &Board, at: Position, piece: Piece, offsets: &[(i8, i8)], moves: &mut Moves) {
    for to in offsets.iter().filter_map(|&(dr, dc)| at.offset(dr, dc)) {
        match board.piece_on(to) {
            Some(p) if p.color() == piece.color() => {}
            _ => moves.push(Move::new(at, to)),
        }
    }
}

fn advance(board: &Board, at: Position, piece: Piece, moves: &mut Moves) {
    let color = piece.color();
    let forward = color.forward();
    let start = (color.back_rank() as i8 + forward) as u8;
    let last = (!color).back_rank();

    let mut push = |to: Position| {
        if to.row() == last {
            for r in Role::PROMOTIONS {
                moves.push(Move::promoting(at, to, r));
            }
        } else {
            moves.push(Move::new(at, to));
        }
    };

    if let Some(one) = at.offset(forward, 0).filter(|&to| board.piece_on(to).is_none()) {
        push(one);

        if at.row() == start {
            if let Some(two) = one.offset(forward, 0).filter(|&to| board.piece_on(to).is_none()) {
                push(two);
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(to) = at.offset(forward, dc) {
            if board.piece_on(to).is_some_and(|p| p.color() != color) {
                push(to);
            }
        }
    }
}
