//! National character set tables and designation state
//!
//! Implements the DEC national replacement character sets plus the Special
//! Character and Line Drawing Set. Each set is a 128-entry substitution
//! table built once per process by overlaying a handful of codepoint
//! replacements onto the US-ASCII baseline.
//!
//! References:
//! - http://vt100.net/docs/vt220-rm/table2-5.html (national sets)
//! - http://vt100.net/docs/vt102-ug/table5-13.html (special graphics)

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// A 128-entry codepoint substitution table
pub type CharsetMap = [char; 128];

/// The G0-G3 designation slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharsetTable {
    G0 = 0,
    G1 = 1,
    G2 = 2,
    G3 = 3,
}

/// Identifiers for the supported character sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharsetId {
    #[default]
    UsAscii,
    British,
    Dutch,
    Finnish,
    French,
    FrenchCanadian,
    German,
    NorwegianDanish,
    Spanish,
    Swedish,
    Swiss,
    /// DEC Special Character and Line Drawing Set
    Special,
}

fn usascii() -> CharsetMap {
    let mut map = [' '; 128];
    for (i, slot) in map.iter_mut().enumerate() {
        *slot = i as u8 as char;
    }
    map
}

fn with_overlay(subs: &[(char, char)]) -> CharsetMap {
    let mut map = usascii();
    for &(from, to) in subs {
        map[from as usize] = to;
    }
    map
}

/// Substitution table for the given charset id.
///
/// Lookup is total: every id has a table. Tables are built on first use and
/// cached for the process lifetime.
pub fn charset_map(id: CharsetId) -> &'static CharsetMap {
    static TABLES: OnceLock<[CharsetMap; 12]> = OnceLock::new();
    let tables = TABLES.get_or_init(|| {
        [
            // UsAscii
            usascii(),
            // British: ESC ( A
            with_overlay(&[('#', '£')]),
            // Dutch: ESC ( 4
            with_overlay(&[
                ('#', '£'),
                ('@', '¾'),
                ('\\', '½'),
                (']', '|'),
                ('{', '¨'),
                ('|', 'f'),
                ('}', '¼'),
                ('~', '´'),
            ]),
            // Finnish: ESC ( C or ESC ( 5
            with_overlay(&[
                ('[', 'Ä'),
                ('\\', 'Ö'),
                (']', 'Å'),
                ('^', 'Ü'),
                ('`', 'é'),
                ('{', 'ä'),
                ('|', 'ö'),
                ('}', 'å'),
                ('~', 'ü'),
            ]),
            // French: ESC ( R
            with_overlay(&[
                ('#', '£'),
                ('@', 'à'),
                ('[', '°'),
                ('\\', 'ç'),
                (']', '§'),
                ('{', 'é'),
                ('|', 'ù'),
                ('}', 'è'),
                ('~', '¨'),
            ]),
            // French Canadian: ESC ( Q
            with_overlay(&[
                ('@', 'à'),
                ('[', 'â'),
                ('\\', 'ç'),
                (']', 'ê'),
                ('^', 'î'),
                ('`', 'ô'),
                ('{', 'é'),
                ('|', 'ù'),
                ('}', 'è'),
                ('~', 'û'),
            ]),
            // German: ESC ( K
            with_overlay(&[
                ('@', '§'),
                ('[', 'Ä'),
                ('\\', 'Ö'),
                (']', 'Ü'),
                ('{', 'ä'),
                ('|', 'ö'),
                ('}', 'ü'),
                ('~', 'ß'),
            ]),
            // Norwegian/Danish: ESC ( E or ESC ( 6
            with_overlay(&[
                ('@', 'Ä'),
                ('[', 'Æ'),
                ('\\', 'Ø'),
                (']', 'Å'),
                ('^', 'Ü'),
                ('`', 'ä'),
                ('{', 'æ'),
                ('|', 'ø'),
                ('}', 'å'),
                ('~', 'ü'),
            ]),
            // Spanish: ESC ( Z
            with_overlay(&[
                ('#', '£'),
                ('@', '§'),
                ('[', '¡'),
                ('\\', 'Ñ'),
                (']', '¿'),
                ('{', '°'),
                ('|', 'ñ'),
                ('}', 'ç'),
            ]),
            // Swedish: ESC ( H or ESC ( 7
            with_overlay(&[
                ('@', 'É'),
                ('[', 'Ä'),
                ('\\', 'Ö'),
                (']', 'Å'),
                ('^', 'Ü'),
                ('`', 'é'),
                ('{', 'ä'),
                ('|', 'ö'),
                ('}', 'å'),
                ('~', 'ü'),
            ]),
            // Swiss: ESC ( =
            with_overlay(&[
                ('#', 'ù'),
                ('@', 'à'),
                ('[', 'é'),
                ('\\', 'ç'),
                (']', 'ê'),
                ('^', 'î'),
                ('_', 'è'),
                ('`', 'ô'),
                ('{', 'ä'),
                ('|', 'ö'),
                ('}', 'ü'),
                ('~', 'û'),
            ]),
            // Special: ESC ( 0
            with_overlay(&[
                ('`', '\u{25c6}'), // ◆
                ('a', '\u{2592}'), // ▒
                ('b', '\u{2409}'), // ␉
                ('c', '\u{240c}'), // ␌
                ('d', '\u{240d}'), // ␍
                ('e', '\u{240a}'), // ␊
                ('f', '°'),
                ('g', '±'),
                ('h', '\u{2424}'), // ␤
                ('i', '\u{240b}'), // ␋
                ('j', '\u{2518}'), // ┘
                ('k', '\u{2510}'), // ┐
                ('l', '\u{250c}'), // ┌
                ('m', '\u{2514}'), // └
                ('n', '\u{253c}'), // ┼
                ('o', '\u{23ba}'), // ⎺
                ('p', '\u{23bb}'), // ⎻
                ('q', '\u{2500}'), // ─
                ('r', '\u{23bc}'), // ⎼
                ('s', '\u{23bd}'), // ⎽
                ('t', '\u{251c}'), // ├
                ('u', '\u{2524}'), // ┤
                ('v', '\u{2534}'), // ┴
                ('w', '\u{252c}'), // ┬
                ('x', '\u{2502}'), // │
                ('y', '\u{2264}'), // ≤
                ('z', '\u{2265}'), // ≥
                ('{', '\u{03c0}'), // π
                ('|', '\u{2260}'), // ≠
                ('}', '£'),
                ('~', '·'),
            ]),
        ]
    });
    &tables[id as usize]
}

/// Translate a single character through the given charset
pub fn translate(id: CharsetId, c: char) -> char {
    if (c as usize) < 128 {
        charset_map(id)[c as usize]
    } else {
        c
    }
}

/// Designation state for the G0-G3 slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharsetState {
    slots: [CharsetId; 4],
    /// Currently active slot (GL)
    active: CharsetTable,
    /// Pending single shift (SS2/SS3), applies to exactly one character
    single_shift: Option<CharsetTable>,
}

impl Default for CharsetState {
    fn default() -> Self {
        Self {
            slots: [CharsetId::UsAscii; 4],
            active: CharsetTable::G0,
            single_shift: None,
        }
    }
}

impl CharsetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Bind a charset to a slot
    pub fn designate(&mut self, table: CharsetTable, id: CharsetId) {
        self.slots[table as usize] = id;
    }

    /// Charset currently bound to the given slot
    pub fn slot(&self, table: CharsetTable) -> CharsetId {
        self.slots[table as usize]
    }

    /// Select a slot into GL (SI selects G0, SO selects G1)
    pub fn invoke(&mut self, table: CharsetTable) {
        self.active = table;
        self.single_shift = None;
    }

    /// Invoke a slot for exactly the next printed character (SS2/SS3)
    pub fn single_shift(&mut self, table: CharsetTable) {
        self.single_shift = Some(table);
    }

    /// Translate a character through the effective charset, consuming a
    /// pending single shift.
    pub fn map(&mut self, c: char) -> char {
        let table = self.single_shift.take().unwrap_or(self.active);
        translate(self.slots[table as usize], c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usascii_is_identity() {
        for c in ' '..='~' {
            assert_eq!(translate(CharsetId::UsAscii, c), c);
        }
    }

    #[test]
    fn test_special_graphics() {
        assert_eq!(translate(CharsetId::Special, 'q'), '─');
        assert_eq!(translate(CharsetId::Special, 'x'), '│');
        assert_eq!(translate(CharsetId::Special, 'l'), '┌');
        assert_eq!(translate(CharsetId::Special, 'k'), '┐');
        assert_eq!(translate(CharsetId::Special, 'm'), '└');
        assert_eq!(translate(CharsetId::Special, 'j'), '┘');
        assert_eq!(translate(CharsetId::Special, 'n'), '┼');
        assert_eq!(translate(CharsetId::Special, 'A'), 'A');
    }

    #[test]
    fn test_national_sets() {
        assert_eq!(translate(CharsetId::British, '#'), '£');
        assert_eq!(translate(CharsetId::German, '['), 'Ä');
        assert_eq!(translate(CharsetId::German, '~'), 'ß');
        assert_eq!(translate(CharsetId::Spanish, '\\'), 'Ñ');
        assert_eq!(translate(CharsetId::Swiss, '_'), 'è');
        assert_eq!(translate(CharsetId::NorwegianDanish, '['), 'Æ');
    }

    #[test]
    fn test_every_id_has_a_table() {
        for id in [
            CharsetId::UsAscii,
            CharsetId::British,
            CharsetId::Dutch,
            CharsetId::Finnish,
            CharsetId::French,
            CharsetId::FrenchCanadian,
            CharsetId::German,
            CharsetId::NorwegianDanish,
            CharsetId::Spanish,
            CharsetId::Swedish,
            CharsetId::Swiss,
            CharsetId::Special,
        ] {
            assert_eq!(charset_map(id).len(), 128);
        }
    }

    #[test]
    fn test_shift_in_out() {
        let mut state = CharsetState::new();
        state.designate(CharsetTable::G1, CharsetId::Special);

        assert_eq!(state.map('q'), 'q');

        state.invoke(CharsetTable::G1);
        assert_eq!(state.map('q'), '─');

        state.invoke(CharsetTable::G0);
        assert_eq!(state.map('q'), 'q');
    }

    #[test]
    fn test_single_shift_applies_once() {
        let mut state = CharsetState::new();
        state.designate(CharsetTable::G2, CharsetId::Special);

        state.single_shift(CharsetTable::G2);
        assert_eq!(state.map('q'), '─');
        assert_eq!(state.map('q'), 'q');
    }
}
