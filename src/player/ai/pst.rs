use shakmaty::{Color, Role, Square};

// Piece-square tables in centipawns.
// Row index is the rank from White's point of view: row 0 is the first
// rank, row 7 the eighth. Black reads the mirrored row (7 - row).
// Column index is the file, a..h.

const PAWN: [[i32; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5, 5, 10, 25, 25, 10, 5, 5],
    [0, 0, 0, 20, 20, 0, 0, 0],
    [5, -5, -10, 0, 0, -10, -5, 5],
    [5, 10, 10, -20, -20, 10, 10, 5],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

const KNIGHT: [[i32; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20, 0, 0, 0, 0, -20, -40],
    [-30, 0, 10, 15, 15, 10, 0, -30],
    [-30, 5, 15, 20, 20, 15, 5, -30],
    [-30, 0, 15, 20, 20, 15, 0, -30],
    [-30, 5, 10, 15, 15, 10, 5, -30],
    [-40, -20, 0, 5, 5, 0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

const BISHOP: [[i32; 8]; 8] = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 10, 10, 10, 10, 0, -10],
    [-10, 5, 5, 10, 10, 5, 5, -10],
    [-10, 0, 5, 10, 10, 5, 0, -10],
    [-10, 10, 10, 10, 10, 10, 10, -10],
    [-10, 5, 0, 0, 0, 0, 5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

const ROOK: [[i32; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [5, 10, 10, 10, 10, 10, 10, 5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [0, 0, 0, 5, 5, 0, 0, 0],
];

const QUEEN: [[i32; 8]; 8] = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 5, 5, 5, 0, -10],
    [-5, 0, 5, 5, 5, 5, 0, -5],
    [0, 0, 5, 5, 5, 5, 0, -5],
    [-10, 5, 5, 5, 5, 5, 0, -10],
    [-10, 0, 5, 0, 0, 0, 0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];

// King safety: stay home, prefer the castled corners.
const KING: [[i32; 8]; 8] = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [20, 20, 0, 0, 0, 0, 20, 20],
    [20, 30, 10, 0, 0, 10, 30, 20],
];

fn table(role: Role) -> &'static [[i32; 8]; 8] {
    match role {
        Role::Pawn => &PAWN,
        Role::Knight => &KNIGHT,
        Role::Bishop => &BISHOP,
        Role::Rook => &ROOK,
        Role::Queen => &QUEEN,
        Role::King => &KING,
    }
}

/// Positional bonus of a `color` piece of kind `role` standing on `square`.
pub fn get_pst_value(role: Role, square: Square, color: Color) -> i32 {
    let rank = square.rank() as usize;
    let file = square.file() as usize;
    let row = match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    };
    table(role)[row][file]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_reads_mirrored_row() {
        for role in Role::ALL {
            for square in [Square::A1, Square::D2, Square::E4, Square::G7, Square::H8] {
                let mirrored = square.flip_vertical();
                assert_eq!(
                    get_pst_value(role, square, Color::White),
                    get_pst_value(role, mirrored, Color::Black),
                    "{role:?} on {square}"
                );
            }
        }
    }

    #[test]
    fn test_table_lookup() {
        assert_eq!(get_pst_value(Role::Pawn, Square::A2, Color::White), 50);
        assert_eq!(get_pst_value(Role::Pawn, Square::D7, Color::White), -20);
        assert_eq!(get_pst_value(Role::Pawn, Square::D2, Color::Black), -20);
        assert_eq!(get_pst_value(Role::King, Square::G1, Color::White), -40);
        assert_eq!(get_pst_value(Role::King, Square::G1, Color::Black), 30);
        assert_eq!(get_pst_value(Role::King, Square::G8, Color::White), 30);
        assert_eq!(get_pst_value(Role::Knight, Square::E4, Color::Black), 20);
    }
}
