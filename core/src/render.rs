use crate::*;

/// Full spoiler view: every cell shows its mine or neighbor count.
pub fn render_solution(game: &Game) -> String {
    render_with(game.board(), Cell::solution_glyph)
}

/// Player view: revealed cells show their contents, the rest show their marker.
pub fn render_status(game: &Game) -> String {
    render_with(game.board(), Cell::status_glyph)
}

fn render_with(board: &Board, glyph: impl Fn(Cell) -> Glyph) -> String {
    let mut out = String::new();
    for row in board.rows() {
        for &cell in row {
            out.push_str(&glyph(cell).to_string());
        }
        out.push('\n');
    }
    out
}
