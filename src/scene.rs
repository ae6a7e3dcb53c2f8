//! In-memory SVG scene with keyed mount slots.
//!
//! Views never append to a surface directly. They build an [`Element`] tree
//! and `mount` it under a slot name; mounting replaces whatever occupied the
//! slot before, so a redraw can never leave stale elements behind.

use crate::tooltip::Tooltip;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn style(mut self, key: &str, value: impl ToString) -> Self {
        self.set_style(key, value);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I: IntoIterator<Item = Element>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    pub fn set_attr(&mut self, key: &str, value: impl ToString) {
        set_pair(&mut self.attrs, key, value.to_string());
    }

    pub fn set_style(&mut self, key: &str, value: impl ToString) {
        set_pair(&mut self.styles, key, value.to_string());
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        get_pair(&self.attrs, key)
    }

    pub fn get_style(&self, key: &str) -> Option<&str> {
        get_pair(&self.styles, key)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map(|c| c.split_whitespace().any(|part| part == class))
            .unwrap_or(false)
    }

    /// This element and all descendants, depth first.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_id_mut(id))
    }

    pub fn write_svg(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, self.tag);
        for (key, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", key, escape(value));
        }
        if !self.styles.is_empty() {
            let style: Vec<String> = self
                .styles
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let _ = write!(out, " style=\"{}\"", escape(&style.join("; ")));
        }

        match (&self.text, self.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{}>", escape(text), self.tag);
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{}  {}", indent, escape(text));
                }
                for child in &self.children {
                    child.write_svg(out, depth + 1);
                }
                let _ = writeln!(out, "{}</{}>", indent, self.tag);
            }
        }
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some(pair) => pair.1 = value,
        None => pairs.push((key.to_string(), value)),
    }
}

fn get_pair<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// A drawing surface: ordered slots of element trees plus one floating label.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    slots: Vec<(String, Element)>,
    tooltip: Option<Tooltip>,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            slots: Vec::new(),
            tooltip: None,
        }
    }

    /// Puts `element` in `slot`, replacing the previous occupant in place.
    pub fn mount(&mut self, slot: &str, element: Element) {
        match self.slots.iter_mut().find(|(name, _)| name == slot) {
            Some(entry) => entry.1 = element,
            None => self.slots.push((slot.to_string(), element)),
        }
    }

    pub fn slot(&self, slot: &str) -> Option<&Element> {
        self.slots
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, el)| el)
    }

    pub fn slot_mut(&mut self, slot: &str) -> Option<&mut Element> {
        self.slots
            .iter_mut()
            .find(|(name, _)| name == slot)
            .map(|(_, el)| el)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.slots.iter().flat_map(|(_, el)| el.descendants())
    }

    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&Element) -> bool,
    {
        self.elements().filter(|el| pred(el)).count()
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.slots
            .iter_mut()
            .find_map(|(_, el)| el.find_by_id_mut(id))
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn tooltip_mut(&mut self) -> Option<&mut Tooltip> {
        self.tooltip.as_mut()
    }

    /// Replaces the floating label; there is never more than one.
    pub fn set_tooltip(&mut self, tooltip: Tooltip) {
        self.tooltip = Some(tooltip);
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            self.width, self.height, self.width, self.height
        );
        for (_, element) in &self.slots {
            element.write_svg(&mut out, 1);
        }
        out.push_str("</svg>\n");
        out
    }
}
