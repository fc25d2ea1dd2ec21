use crate::chess::{movegen::reach, pseudo_legal_moves, Board, Color, Move, Moves, Position, Role};
use std::collections::HashSet;

/// Whether the king of the given [`Color`] is the target of some opposing move.
///
/// A side without a king is never in check.
pub fn is_attacked(board: &Board, side: Color) -> bool {
    match board.king(side) {
        None => false,
        Some(king) => reach(board, !side).any(|p| p == king),
    }
}

/// Whether playing the [`Move`] would leave the mover's own king attacked.
///
/// The move is played on a scratch copy, the given board is left untouched.
pub fn exposes_king(board: &Board, m: Move) -> bool {
    let mut scratch = *board;

    match scratch.remove(m.whence()) {
        None => false,
        Some(piece) => {
            scratch.place(m.whither(), piece);
            is_attacked(&scratch, piece.color())
        }
    }
}

/// The [legal] moves of the piece on the given [`Position`].
///
/// Empty squares have no legal moves.
///
/// [legal]: https://www.chessprogramming.org/Legal_Move
pub fn legal_moves(board: &Board, at: Position) -> Moves {
    let (Some(piece), Ok(moves)) = (board.piece_on(at), pseudo_legal_moves(board, at)) else {
        return Moves::new();
    };

    // The king may not step onto anything the opponent could move into,
    // regardless of what the move itself would reveal.
    let guarded: HashSet<Position> = match piece.role() {
        Role::King => reach(board, !piece.color()).collect(),
        _ => HashSet::new(),
    };

    moves
        .into_iter()
        .filter(|m| !guarded.contains(&m.whither()))
        .filter(|&m| !exposes_king(board, m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Piece;
    use test_strategy::proptest;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn destinations(board: &Board, at: &str) -> HashSet<Position> {
        legal_moves(board, pos(at)).into_iter().map(|m| m.whither()).collect()
    }

    #[proptest]
    fn empty_square_has_no_legal_moves(p: Position) {
        assert!(legal_moves(&Board::empty(), p).is_empty());
    }

    #[proptest]
    fn initial_legal_moves_are_pseudo_legal(at: Position) {
        let board = Board::default();
        if let Ok(pseudo) = pseudo_legal_moves(&board, at) {
            for m in legal_moves(&board, at) {
                assert!(pseudo.contains(&m));
            }
        }
    }

    #[test]
    fn every_initial_move_is_legal() {
        let board = Board::default();
        let total: usize = board.iter().map(|(_, p)| legal_moves(&board, p).len()).sum();
        assert_eq!(total, 40);
    }

    #[test]
    fn pinned_piece_may_only_move_along_the_pin() {
        let b = board("4r3/8/8/8/8/8/4R3/4K3");
        assert_eq!(
            destinations(&b, "e2"),
            HashSet::from(["e3", "e4", "e5", "e6", "e7", "e8"].map(pos))
        );
    }

    #[test]
    fn king_may_not_walk_into_check() {
        let b = board("8/8/8/8/8/8/r7/4K3");
        assert_eq!(destinations(&b, "e1"), HashSet::from(["d1", "f1"].map(pos)));
    }

    #[test]
    fn king_may_not_capture_a_defended_piece() {
        let b = board("8/8/8/8/8/8/3rr3/4K3");
        assert_eq!(destinations(&b, "e1"), HashSet::from(["f1"].map(pos)));
    }

    #[test]
    fn king_may_capture_an_undefended_attacker() {
        let b = board("8/8/8/8/8/8/4q3/4K3");
        assert_eq!(destinations(&b, "e1"), HashSet::from(["e2"].map(pos)));
    }

    #[test]
    fn king_may_not_step_back_along_the_line_of_attack() {
        let b = board("4r3/8/8/8/8/8/4K3/8");
        assert!(!destinations(&b, "e2").contains(&pos("e1")));
        assert!(!destinations(&b, "e2").contains(&pos("e3")));
    }

    #[test]
    fn king_avoids_squares_enemy_pawns_could_advance_into() {
        let b = board("8/8/8/4p3/8/3K4/8/8");
        let king = destinations(&b, "d3");
        assert!(!king.contains(&pos("e4")));
        assert!(!king.contains(&pos("d4")));
        assert!(king.contains(&pos("c4")));
    }

    #[test]
    fn check_must_be_answered() {
        let b = board("4r3/8/8/8/8/8/1B6/4K3");
        assert_eq!(destinations(&b, "b2"), HashSet::from(["e5"].map(pos)));

        let b = board("4r3/8/8/8/8/8/8/R3K3");
        assert!(destinations(&b, "a1").is_empty());
    }

    #[test]
    fn query_leaves_the_board_untouched() {
        let b = board("4r3/8/8/8/8/8/4R3/4K3");
        let copy = b;
        legal_moves(&b, pos("e2"));
        legal_moves(&b, pos("e1"));
        assert_eq!(b, copy);
    }

    #[test]
    fn is_attacked_detects_check() {
        let b = board("4r3/8/8/8/8/8/8/4K3");
        assert!(is_attacked(&b, Color::White));
        assert!(!is_attacked(&b, Color::Black));

        let mut b = Board::empty();
        b.place(pos("a1"), Piece::new(Color::Black, Role::Queen));
        assert!(!is_attacked(&b, Color::White));
    }
}
