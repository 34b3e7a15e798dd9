//! Named icons.
//!
//! Documents refer to icons by their Material Design name. Backends draw [`DrawOp::Icon`] from
//! the icon font, using the codepoint listed here.
//!
//! [`DrawOp::Icon`]: perch_core::DrawOp::Icon

/// An icon of the built-in set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    pub name: &'static str,
    /// Codepoint in the Material Icons font.
    pub codepoint: char,
}

/// Sorted by name.
const ICONS: &[Icon] = &[
    icon("add", '\u{e145}'),
    icon("arrow_back", '\u{e5c4}'),
    icon("arrow_forward", '\u{e5c8}'),
    icon("check", '\u{e5ca}'),
    icon("close", '\u{e5cd}'),
    icon("delete", '\u{e872}'),
    icon("done", '\u{e876}'),
    icon("edit", '\u{e3c9}'),
    icon("favorite", '\u{e87d}'),
    icon("home", '\u{e88a}'),
    icon("info", '\u{e88e}'),
    icon("menu", '\u{e5d2}'),
    icon("pause", '\u{e034}'),
    icon("play_arrow", '\u{e037}'),
    icon("refresh", '\u{e5d5}'),
    icon("search", '\u{e8b6}'),
    icon("send", '\u{e163}'),
    icon("settings", '\u{e8b8}'),
    icon("stop", '\u{e047}'),
    icon("timer", '\u{e425}'),
    icon("warning", '\u{e002}'),
];

const fn icon(name: &'static str, codepoint: char) -> Icon {
    Icon { name, codepoint }
}

/// Looks up an icon by name.
pub fn find(name: &str) -> Option<Icon> {
    ICONS
        .binary_search_by(|icon| icon.name.cmp(name))
        .ok()
        .map(|i| ICONS[i])
}

/// All icon names, in order.
pub fn names() -> impl Iterator<Item = &'static str> {
    ICONS.iter().map(|icon| icon.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        let names: Vec<_> = names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn lookup() {
        assert_eq!(find("timer").map(|i| i.codepoint), Some('\u{e425}'));
        assert_eq!(find("play_arrow").map(|i| i.name), Some("play_arrow"));
        assert_eq!(find("Timer"), None);
        assert_eq!(find(""), None);
    }
}
