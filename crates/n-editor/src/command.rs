//! Application commands and the menus that offer them.
//!
//! | Menu | Item        | Key    |
//! |------|-------------|--------|
//! | File | New         | Ctrl+N |
//! | File | Open…       | Ctrl+O |
//! | File | Save        | Ctrl+S |
//! | File | Exit        | Ctrl+Q |
//! | Edit | Undo        | Ctrl+Z |
//! | Edit | Redo        | Ctrl+Y |
//! | Edit | Copy        | Ctrl+C |
//! | Edit | Paste       | Ctrl+V |
//! | Edit | Select All  | Ctrl+A |
//! | Edit | Font Size…  |        |
//! | Help | About       | F1     |
//!
//! A command is the same whether it came from a shortcut or a menu click;
//! the application dispatches both through one `match`.

use std::fmt;

use n_term::input::{KeyCode, KeyEvent, Modifiers};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Something the user asked the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    New,
    Open,
    Save,
    Exit,
    Undo,
    Redo,
    Copy,
    Paste,
    SelectAll,
    FontSize,
    About,
}

impl Command {
    pub const ALL: [Self; 11] = [
        Self::New,
        Self::Open,
        Self::Save,
        Self::Exit,
        Self::Undo,
        Self::Redo,
        Self::Copy,
        Self::Paste,
        Self::SelectAll,
        Self::FontSize,
        Self::About,
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Open => "Open…",
            Self::Save => "Save",
            Self::Exit => "Exit",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::Copy => "Copy",
            Self::Paste => "Paste",
            Self::SelectAll => "Select All",
            Self::FontSize => "Font Size…",
            Self::About => "About",
        }
    }

    /// Letter that activates the item inside an open menu. Unique per menu.
    #[must_use]
    pub const fn mnemonic(self) -> char {
        match self {
            Self::New => 'n',
            Self::Open => 'o',
            Self::Save => 's',
            Self::Exit => 'x',
            Self::Undo => 'u',
            Self::Redo => 'r',
            Self::Copy => 'c',
            Self::Paste => 'p',
            Self::SelectAll => 'a',
            Self::FontSize => 'f',
            Self::About => 'a',
        }
    }

    /// The shortcut, if the command has one.
    #[must_use]
    pub const fn shortcut(self) -> Option<KeyEvent> {
        match self {
            Self::New => Some(KeyEvent::ctrl('n')),
            Self::Open => Some(KeyEvent::ctrl('o')),
            Self::Save => Some(KeyEvent::ctrl('s')),
            Self::Exit => Some(KeyEvent::ctrl('q')),
            Self::Undo => Some(KeyEvent::ctrl('z')),
            Self::Redo => Some(KeyEvent::ctrl('y')),
            Self::Copy => Some(KeyEvent::ctrl('c')),
            Self::Paste => Some(KeyEvent::ctrl('v')),
            Self::SelectAll => Some(KeyEvent::ctrl('a')),
            Self::FontSize => None,
            Self::About => Some(KeyEvent::plain(KeyCode::F(1))),
        }
    }

    /// Shortcut text shown beside the menu item, e.g. `"Ctrl+S"`.
    #[must_use]
    pub const fn accelerator(self) -> &'static str {
        match self {
            Self::New => "Ctrl+N",
            Self::Open => "Ctrl+O",
            Self::Save => "Ctrl+S",
            Self::Exit => "Ctrl+Q",
            Self::Undo => "Ctrl+Z",
            Self::Redo => "Ctrl+Y",
            Self::Copy => "Ctrl+C",
            Self::Paste => "Ctrl+V",
            Self::SelectAll => "Ctrl+A",
            Self::FontSize => "",
            Self::About => "F1",
        }
    }

    /// The command bound to `key`. Uppercase letters with Ctrl count too,
    /// since some terminals report Ctrl+Shift+S that way.
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        let key = match key.code {
            KeyCode::Char(c) if key.modifiers.contains(Modifiers::CTRL) => {
                KeyEvent::new(KeyCode::Char(c.to_ascii_lowercase()), key.modifiers - Modifiers::SHIFT)
            }
            _ => *key,
        };
        Self::ALL.into_iter().find(|cmd| cmd.shortcut() == Some(key))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Menus
// ---------------------------------------------------------------------------

/// A row in a drop-down menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Item(Command),
    Separator,
}

impl MenuEntry {
    #[inline]
    #[must_use]
    pub const fn command(self) -> Option<Command> {
        match self {
            Self::Item(cmd) => Some(cmd),
            Self::Separator => None,
        }
    }
}

/// Top-level menus, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Menu {
    File,
    Edit,
    Help,
}

impl Menu {
    pub const ALL: [Self; 3] = [Self::File, Self::Edit, Self::Help];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Edit => "Edit",
            Self::Help => "Help",
        }
    }

    /// Alt+letter that opens the menu.
    #[must_use]
    pub const fn mnemonic(self) -> char {
        match self {
            Self::File => 'f',
            Self::Edit => 'e',
            Self::Help => 'h',
        }
    }

    #[must_use]
    pub const fn entries(self) -> &'static [MenuEntry] {
        use MenuEntry::{Item, Separator};
        match self {
            Self::File => &[
                Item(Command::New),
                Item(Command::Open),
                Item(Command::Save),
                Separator,
                Item(Command::Exit),
            ],
            Self::Edit => &[
                Item(Command::Undo),
                Item(Command::Redo),
                Separator,
                Item(Command::Copy),
                Item(Command::Paste),
                Item(Command::SelectAll),
                Separator,
                Item(Command::FontSize),
            ],
            Self::Help => &[Item(Command::About)],
        }
    }

    /// Position in [`Menu::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::File => 0,
            Self::Edit => 1,
            Self::Help => 2,
        }
    }

    /// Neighbour to the left or right, wrapping around.
    #[must_use]
    pub const fn step(self, forward: bool) -> Self {
        let n = Self::ALL.len();
        let i = if forward {
            (self.index() + 1) % n
        } else {
            (self.index() + n - 1) % n
        };
        Self::ALL[i]
    }

    /// The menu opened by `key` from the editor: Alt+mnemonic, or F10 for
    /// File.
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::F(10) if key.modifiers.is_empty() => Some(Self::File),
            KeyCode::Char(c) if key.modifiers == Modifiers::ALT => {
                Self::ALL.into_iter().find(|m| m.mnemonic() == c.to_ascii_lowercase())
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shortcuts_map_to_commands() {
        let cases = [
            ('n', Command::New),
            ('o', Command::Open),
            ('s', Command::Save),
            ('q', Command::Exit),
            ('z', Command::Undo),
            ('y', Command::Redo),
            ('c', Command::Copy),
            ('v', Command::Paste),
            ('a', Command::SelectAll),
        ];
        for (letter, cmd) in cases {
            assert_eq!(Command::from_key(&KeyEvent::ctrl(letter)), Some(cmd), "Ctrl+{letter}");
        }
        assert_eq!(Command::from_key(&KeyEvent::plain(KeyCode::F(1))), Some(Command::About));
    }

    #[test]
    fn shifted_ctrl_letter_still_matches() {
        let key = KeyEvent::new(KeyCode::Char('S'), Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(Command::from_key(&key), Some(Command::Save));
    }

    #[test]
    fn unbound_keys_are_none() {
        assert_eq!(Command::from_key(&KeyEvent::plain(KeyCode::Char('s'))), None);
        assert_eq!(Command::from_key(&KeyEvent::ctrl('b')), None);
        assert_eq!(Command::from_key(&KeyEvent::alt('s')), None);
    }

    #[test]
    fn every_command_is_in_exactly_one_menu() {
        for cmd in Command::ALL {
            let count = Menu::ALL
                .iter()
                .flat_map(|m| m.entries())
                .filter(|e| e.command() == Some(cmd))
                .count();
            assert_eq!(count, 1, "{cmd}");
        }
    }

    #[test]
    fn mnemonics_are_unique_per_menu() {
        for menu in Menu::ALL {
            let mut seen: Vec<char> = menu.entries().iter().filter_map(|e| e.command()).map(Command::mnemonic).collect();
            let total = seen.len();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), total, "{}", menu.title());
        }
    }

    #[test]
    fn menu_keys() {
        assert_eq!(Menu::from_key(&KeyEvent::plain(KeyCode::F(10))), Some(Menu::File));
        assert_eq!(Menu::from_key(&KeyEvent::alt('e')), Some(Menu::Edit));
        assert_eq!(Menu::from_key(&KeyEvent::alt('H')), Some(Menu::Help));
        assert_eq!(Menu::from_key(&KeyEvent::alt('z')), None);
    }

    #[test]
    fn menu_step_wraps() {
        assert_eq!(Menu::File.step(true), Menu::Edit);
        assert_eq!(Menu::Help.step(true), Menu::File);
        assert_eq!(Menu::File.step(false), Menu::Help);
    }
}
