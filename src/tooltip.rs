use serde::Serialize;

/// Pixel offset of a floating label from the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

pub const MAP_TOOLTIP_OFFSET: Offset = Offset { dx: 25.0, dy: -20.0 };
pub const LINE_TOOLTIP_OFFSET: Offset = Offset { dx: -50.0, dy: -70.0 };

/// Floating label positioned in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub lines: Vec<String>,
    /// `lines` escaped and joined with `<br>`, ready for an HTML label.
    pub html: String,
    pub left: f64,
    pub top: f64,
    pub visible: bool,
    pub styles: Vec<(String, String)>,
}

impl Tooltip {
    pub fn hidden(styles: Vec<(String, String)>) -> Self {
        Self {
            lines: Vec::new(),
            html: String::new(),
            left: 0.0,
            top: 0.0,
            visible: false,
            styles,
        }
    }

    pub fn show(&mut self, lines: Vec<String>, page_x: f64, page_y: f64, offset: Offset) {
        self.html = to_html(&lines);
        self.lines = lines;
        self.left = page_x + offset.dx;
        self.top = page_y + offset.dy;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

fn to_html(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            line.replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_applies_offset_and_hide_keeps_content() {
        let mut tip = Tooltip::hidden(Vec::new());
        tip.show(vec!["Country : Chad".into()], 100.0, 50.0, MAP_TOOLTIP_OFFSET);
        assert!(tip.visible);
        assert_eq!((tip.left, tip.top), (125.0, 30.0));

        tip.hide();
        assert!(!tip.visible);
        assert_eq!(tip.lines.len(), 1);
    }

    #[test]
    fn html_escapes_each_line() {
        let mut tip = Tooltip::hidden(Vec::new());
        tip.show(vec!["A<B".into(), "x & y".into()], 0.0, 0.0, LINE_TOOLTIP_OFFSET);
        assert_eq!(tip.html, "A&lt;B<br>x &amp; y");
    }
}
