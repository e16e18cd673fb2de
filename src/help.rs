use crate::terminal::Terminal;
use crossterm::style::Color;

pub const MAP_HELP: &str = "\
NETOPS MAP
─────────────────────────
q/Esc      Quit
?          Toggle this help
r          Refresh now
+/-        Zoom in/out
←↑↓→/hjkl  Pan
0          Reset view
a          Cycle axis filter
c          Cardinal/mono colors
b          Toggle beads
Space      Pause beads
[ ]        Fewer/more beads
< >        Shorter/longer window
d          Cycle in/outbound";

/// Render a centered help overlay box with the provided text.
pub fn render_help_overlay(term: &mut Terminal, width: u16, height: u16, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let border = Some(Color::White);
    let text = Some(Color::Grey);

    let top = format!("┌{}┐", "─".repeat(box_width - 2));
    term.set_str(start_x as i32, start_y as i32, &top, border, false);

    for (i, line) in lines.iter().enumerate() {
        let y = (start_y + 1 + i) as i32;
        let padding = max_width.saturating_sub(line.chars().count());
        term.set(start_x as i32, y, '│', border, false);
        term.set_str(start_x as i32 + 1, y, &format!(" {}{} ", line, " ".repeat(padding)), text, false);
        term.set((start_x + box_width - 1) as i32, y, '│', border, false);
    }

    let bottom = format!("└{}┘", "─".repeat(box_width - 2));
    term.set_str(start_x as i32, (start_y + box_height - 1) as i32, &bottom, border, false);
}
