//! In-place terminal progress, redrawn by the monitor thread.
//!
//! Four lines: a progress bar, the most recent completed step, a test
//! tally and a warning/error tally. Each refresh moves the cursor back up
//! and rewrites all four, so the block stays pinned in place.

use console::Term;

const BAR_WIDTH: usize = 40;

/// Eighth-block glyphs for the fractional cell of the bar.
const PARTIAL_BLOCKS: [&str; 8] = ["", "\u{258f}", "\u{258e}", "\u{258d}", "\u{258c}", "\u{258b}", "\u{258a}", "\u{2589}"];
const FULL_BLOCK: &str = "\u{2588}";

pub struct BuildDisplay {
    term: Term,
    total: usize,
    bar_width: usize,
    unicode: bool,
    lines_drawn: bool,
}

impl BuildDisplay {
    pub fn new(total: usize) -> Self {
        Self::with_options(total, BAR_WIDTH, locale_is_utf8())
    }

    pub fn with_options(total: usize, bar_width: usize, unicode: bool) -> Self {
        Self {
            term: Term::stdout(),
            total,
            bar_width,
            unicode,
            lines_drawn: false,
        }
    }

    /// Redraw the four-line block with fresh values.
    pub fn update(&mut self, current: usize, step: &str, tests: &str, problems: &str) {
        if self.lines_drawn {
            let _ = self.term.move_cursor_up(4);
        } else {
            let _ = self.term.hide_cursor();
            self.lines_drawn = true;
        }
        for line in [self.bar_line(current), step.to_string(), tests.to_string(), problems.to_string()] {
            let _ = self.term.clear_line();
            let _ = self.term.write_line(&line);
        }
    }

    /// Leave the block on screen and restore the cursor.
    pub fn finish(&mut self) {
        if self.lines_drawn {
            let _ = self.term.show_cursor();
            self.lines_drawn = false;
        }
    }

    fn bar_line(&self, current: usize) -> String {
        let total = self.total.max(1);
        let current = current.min(total);
        let fraction = current as f64 / total as f64;
        let percent = (fraction * 100.0).round() as usize;
        let bar = if self.unicode {
            unicode_bar(fraction, self.bar_width)
        } else {
            ascii_bar(fraction, self.bar_width)
        };
        format!("[{current}/{total}] {bar} {percent}%")
    }
}

impl Drop for BuildDisplay {
    fn drop(&mut self) {
        self.finish();
    }
}

fn unicode_bar(fraction: f64, width: usize) -> String {
    let cells = fraction * width as f64;
    let full = cells.floor() as usize;
    let eighths = ((cells - full as f64) * 8.0).floor() as usize;

    let mut bar = FULL_BLOCK.repeat(full);
    if full < width {
        bar.push_str(PARTIAL_BLOCKS[eighths.min(7)]);
    }
    let rendered = full + usize::from(full < width && eighths > 0);
    bar.push_str(&" ".repeat(width - rendered));
    bar
}

fn ascii_bar(fraction: f64, width: usize) -> String {
    let full = (fraction * width as f64).floor() as usize;
    format!("{}{}", "#".repeat(full), " ".repeat(width - full))
}

/// The fractional bar glyphs only render in UTF-8 locales.
fn locale_is_utf8() -> bool {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .is_some_and(|value| value.to_uppercase().contains("UTF-8") || value.to_uppercase().contains("UTF8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bar_fills_proportionally() {
        assert_eq!(ascii_bar(0.0, 10), "          ");
        assert_eq!(ascii_bar(0.5, 10), "#####     ");
        assert_eq!(ascii_bar(1.0, 10), "##########");
    }

    #[test]
    fn unicode_bar_uses_partial_blocks() {
        let bar = unicode_bar(0.55, 10);
        assert_eq!(console::measure_text_width(&bar), 10);
        assert!(bar.starts_with(&FULL_BLOCK.repeat(5)));
        assert!(bar.contains('\u{258c}'));
    }

    #[test]
    fn full_unicode_bar_has_no_padding() {
        assert_eq!(unicode_bar(1.0, 8), FULL_BLOCK.repeat(8));
    }

    #[test]
    fn bar_line_clamps_overshoot() {
        let display = BuildDisplay::with_options(4, 8, false);
        assert_eq!(display.bar_line(9), "[4/4] ######## 100%");
    }
}
