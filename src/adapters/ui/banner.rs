//! Startup banner: "LEAFSCAN" in figlet's standard font, shaded row by row
//! from deep leaf green to sprout green.

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{self, Write, stdout};

const LEAF_DARK: [u8; 3] = [0x1b, 0x5e, 0x20];
const LEAF_LIGHT: [u8; 3] = [0xb2, 0xff, 0x59];

/// Tagline shown under the banner and on the Home screen.
pub const TAGLINE: &str =
    "Helping farmers and plant lovers detect diseases early for healthier crops!";

/// Colour for row `row` of `rows`. The first row is `LEAF_DARK`, the last `LEAF_LIGHT`.
fn shade(row: usize, rows: usize) -> Color {
    let t = if rows < 2 {
        1.0
    } else {
        row as f32 / (rows - 1) as f32
    };
    let mix = |i: usize| {
        let (from, to) = (f32::from(LEAF_DARK[i]), f32::from(LEAF_LIGHT[i]));
        (from + (to - from) * t).round() as u8
    };
    Color::Rgb {
        r: mix(0),
        g: mix(1),
        b: mix(2),
    }
}

fn render(out: &mut impl Write) -> io::Result<()> {
    let art = FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("LEAFSCAN").map(|f| f.to_string()))
        .unwrap_or_else(|| "LEAFSCAN\n".to_string());
    let rows: Vec<&str> = art.lines().filter(|l| !l.trim().is_empty()).collect();

    for (i, row) in rows.iter().enumerate() {
        queue!(out, SetForegroundColor(shade(i, rows.len())), Print(row), Print("\r\n"))?;
    }
    queue!(
        out,
        SetForegroundColor(shade(1, 1)),
        Print(format!("v{}  Plant Disease Classification\r\n", env!("CARGO_PKG_VERSION"))),
        Print(format!("{TAGLINE}\r\n\r\n")),
        ResetColor
    )?;
    out.flush()
}

/// Prints the banner, version and tagline. Terminal write errors are ignored.
pub fn print_welcome() {
    let _ = render(&mut stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_runs_dark_to_light() {
        let [r, g, b] = LEAF_DARK;
        assert_eq!(shade(0, 6), Color::Rgb { r, g, b });
        let [r, g, b] = LEAF_LIGHT;
        assert_eq!(shade(5, 6), Color::Rgb { r, g, b });
        assert_eq!(shade(0, 1), Color::Rgb { r, g, b });
    }

    #[test]
    fn test_render_includes_tagline() {
        let mut buf = Vec::new();
        render(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Plant Disease Classification"));
        assert!(text.contains(TAGLINE));
    }
}
