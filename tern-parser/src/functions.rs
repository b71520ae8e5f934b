//! The control function table
//!
//! Every recognized ESC/CSI/DCS/OSC function is one entry: a lookup key
//! (category, leader, intermediate, final byte or OSC code) plus the
//! accepted parameter-count range. Resolution walks the sorted table by
//! binary search; parameter-count validation happens at apply time and
//! turns mismatches into `Invalid` rather than errors.

use crate::sequence::{FunctionCategory, FunctionSelector, MAX_PARAMS};

/// Semantic identity of a control function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionId {
    // ESC
    Decaln,
    Decbi,
    Decfi,
    Deckpam,
    Deckpnm,
    Decrs,
    Decsc,
    Hts,
    Ind,
    Nel,
    Ri,
    Ris,
    Ss2,
    Ss3,
    // CSI
    Cbt,
    Cha,
    Cnl,
    Cpl,
    Cub,
    Cud,
    Cuf,
    Cup,
    Cuu,
    Da1,
    Da2,
    Dch,
    Decdc,
    Decic,
    Decrm,
    Decrqm,
    DecrqmAnsi,
    Decrqpsr,
    Decscusr,
    Decsm,
    Decstbm,
    Decstr,
    Decxcpr,
    Dl,
    Dsr,
    Ech,
    Ed,
    El,
    Hpa,
    Hpr,
    Hvp,
    Ich,
    Il,
    Rm,
    SetMark,
    Sd,
    Sgr,
    /// `CSI s` is SCOSC without parameters and DECSLRM with them
    SlrmOrScosc,
    Sm,
    Su,
    Tbc,
    Vpa,
    WinManip,
    // DCS
    Decrqss,
    // OSC
    Clipboard,
    ColorBg,
    ColorCursor,
    ColorFg,
    ColorMouseBg,
    ColorMouseFg,
    DumpState,
    HyperlinkOsc,
    Notify,
    ResetColorBg,
    ResetColorCursor,
    ResetColorFg,
    ResetColorMouseBg,
    ResetColorMouseFg,
    SetIconTitle,
    SetTitle,
    SetWindowTitle,
}

/// One function-table entry
#[derive(Debug, Clone, Copy)]
pub struct FunctionDefinition {
    pub category: FunctionCategory,
    pub leader: u8,
    pub intermediate: u8,
    pub final_byte: u8,
    pub osc_code: u16,
    pub min_params: usize,
    pub max_params: usize,
    pub id: FunctionId,
}

const fn esc(intermediate: u8, final_byte: u8, id: FunctionId) -> FunctionDefinition {
    FunctionDefinition {
        category: FunctionCategory::Esc,
        leader: 0,
        intermediate,
        final_byte,
        osc_code: 0,
        min_params: 0,
        max_params: 0,
        id,
    }
}

const fn csi(
    leader: u8,
    intermediate: u8,
    final_byte: u8,
    min_params: usize,
    max_params: usize,
    id: FunctionId,
) -> FunctionDefinition {
    FunctionDefinition {
        category: FunctionCategory::Csi,
        leader,
        intermediate,
        final_byte,
        osc_code: 0,
        min_params,
        max_params,
        id,
    }
}

const fn dcs(intermediate: u8, final_byte: u8, id: FunctionId) -> FunctionDefinition {
    FunctionDefinition {
        category: FunctionCategory::Dcs,
        leader: 0,
        intermediate,
        final_byte,
        osc_code: 0,
        min_params: 0,
        max_params: MAX_PARAMS,
        id,
    }
}

const fn osc(code: u16, id: FunctionId) -> FunctionDefinition {
    FunctionDefinition {
        category: FunctionCategory::Osc,
        leader: 0,
        intermediate: 0,
        final_byte: 0,
        osc_code: code,
        min_params: 1,
        max_params: 1,
        id,
    }
}

/// The table, sorted by (category, leader, intermediate, final byte,
/// OSC code); `select` relies on the order.
static FUNCTIONS: &[FunctionDefinition] = &[
    // ESC
    esc(0, b'6', FunctionId::Decbi),
    esc(0, b'7', FunctionId::Decsc),
    esc(0, b'8', FunctionId::Decrs),
    esc(0, b'9', FunctionId::Decfi),
    esc(0, b'=', FunctionId::Deckpam),
    esc(0, b'>', FunctionId::Deckpnm),
    esc(0, b'D', FunctionId::Ind),
    esc(0, b'E', FunctionId::Nel),
    esc(0, b'H', FunctionId::Hts),
    esc(0, b'M', FunctionId::Ri),
    esc(0, b'N', FunctionId::Ss2),
    esc(0, b'O', FunctionId::Ss3),
    esc(0, b'c', FunctionId::Ris),
    esc(b'#', b'8', FunctionId::Decaln),
    // CSI, no leader
    csi(0, 0, b'@', 0, 1, FunctionId::Ich),
    csi(0, 0, b'A', 0, 1, FunctionId::Cuu),
    csi(0, 0, b'B', 0, 1, FunctionId::Cud),
    csi(0, 0, b'C', 0, 1, FunctionId::Cuf),
    csi(0, 0, b'D', 0, 1, FunctionId::Cub),
    csi(0, 0, b'E', 0, 1, FunctionId::Cnl),
    csi(0, 0, b'F', 0, 1, FunctionId::Cpl),
    csi(0, 0, b'G', 0, 1, FunctionId::Cha),
    csi(0, 0, b'H', 0, 2, FunctionId::Cup),
    csi(0, 0, b'J', 0, MAX_PARAMS, FunctionId::Ed),
    csi(0, 0, b'K', 0, 1, FunctionId::El),
    csi(0, 0, b'L', 0, 1, FunctionId::Il),
    csi(0, 0, b'M', 0, 1, FunctionId::Dl),
    csi(0, 0, b'P', 0, 1, FunctionId::Dch),
    csi(0, 0, b'S', 0, 1, FunctionId::Su),
    csi(0, 0, b'T', 0, 1, FunctionId::Sd),
    csi(0, 0, b'X', 0, 1, FunctionId::Ech),
    csi(0, 0, b'Z', 0, 1, FunctionId::Cbt),
    csi(0, 0, b'`', 0, 1, FunctionId::Hpa),
    csi(0, 0, b'a', 0, 1, FunctionId::Hpr),
    csi(0, 0, b'c', 0, 1, FunctionId::Da1),
    csi(0, 0, b'd', 0, 1, FunctionId::Vpa),
    csi(0, 0, b'f', 0, 2, FunctionId::Hvp),
    csi(0, 0, b'g', 0, 1, FunctionId::Tbc),
    csi(0, 0, b'h', 1, MAX_PARAMS, FunctionId::Sm),
    csi(0, 0, b'l', 1, MAX_PARAMS, FunctionId::Rm),
    csi(0, 0, b'm', 0, MAX_PARAMS, FunctionId::Sgr),
    csi(0, 0, b'n', 0, 1, FunctionId::Dsr),
    csi(0, 0, b'r', 0, 2, FunctionId::Decstbm),
    csi(0, 0, b's', 0, 2, FunctionId::SlrmOrScosc),
    csi(0, 0, b't', 1, 3, FunctionId::WinManip),
    csi(0, b' ', b'q', 0, 1, FunctionId::Decscusr),
    csi(0, b'!', b'p', 0, 0, FunctionId::Decstr),
    csi(0, b'$', b'p', 1, 1, FunctionId::DecrqmAnsi),
    csi(0, b'$', b'w', 1, 1, FunctionId::Decrqpsr),
    csi(0, b'\'', b'}', 0, 1, FunctionId::Decic),
    csi(0, b'\'', b'~', 0, 1, FunctionId::Decdc),
    // CSI, leader '>'
    csi(b'>', 0, b'M', 0, 0, FunctionId::SetMark),
    csi(b'>', 0, b'c', 0, 1, FunctionId::Da2),
    // CSI, leader '?'
    csi(b'?', 0, b'h', 1, MAX_PARAMS, FunctionId::Decsm),
    csi(b'?', 0, b'l', 1, MAX_PARAMS, FunctionId::Decrm),
    csi(b'?', 0, b'n', 1, 1, FunctionId::Decxcpr),
    csi(b'?', b'$', b'p', 1, 1, FunctionId::Decrqm),
    // DCS
    dcs(b'$', b'q', FunctionId::Decrqss),
    // OSC
    osc(0, FunctionId::SetTitle),
    osc(1, FunctionId::SetIconTitle),
    osc(2, FunctionId::SetWindowTitle),
    osc(8, FunctionId::HyperlinkOsc),
    osc(10, FunctionId::ColorFg),
    osc(11, FunctionId::ColorBg),
    osc(12, FunctionId::ColorCursor),
    osc(13, FunctionId::ColorMouseFg),
    osc(14, FunctionId::ColorMouseBg),
    osc(52, FunctionId::Clipboard),
    osc(110, FunctionId::ResetColorFg),
    osc(111, FunctionId::ResetColorBg),
    osc(112, FunctionId::ResetColorCursor),
    osc(113, FunctionId::ResetColorMouseFg),
    osc(114, FunctionId::ResetColorMouseBg),
    osc(777, FunctionId::Notify),
    osc(888, FunctionId::DumpState),
];

fn key(def: &FunctionDefinition) -> (u8, u8, u8, u8, u16) {
    (
        def.category as u8,
        def.leader,
        def.intermediate,
        def.final_byte,
        def.osc_code,
    )
}

fn selector_key(selector: &FunctionSelector) -> (u8, u8, u8, u8, u16) {
    (
        selector.category as u8,
        selector.leader,
        selector.intermediate,
        selector.final_byte,
        selector.osc_code,
    )
}

/// Resolve a finished sequence against the function table
pub fn select(selector: &FunctionSelector) -> Option<&'static FunctionDefinition> {
    let target = selector_key(selector);
    FUNCTIONS
        .binary_search_by(|def| key(def).cmp(&target))
        .ok()
        .map(|index| &FUNCTIONS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        for pair in FUNCTIONS.windows(2) {
            assert!(
                key(&pair[0]) < key(&pair[1]),
                "table out of order near {:?} / {:?}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    fn csi_selector(leader: u8, intermediate: u8, final_byte: u8) -> FunctionSelector {
        FunctionSelector {
            category: FunctionCategory::Csi,
            leader,
            intermediate,
            final_byte,
            osc_code: 0,
        }
    }

    #[test]
    fn test_select_plain_csi() {
        assert_eq!(select(&csi_selector(0, 0, b'H')).unwrap().id, FunctionId::Cup);
        assert_eq!(select(&csi_selector(0, 0, b'm')).unwrap().id, FunctionId::Sgr);
    }

    #[test]
    fn test_select_with_leader_and_intermediate() {
        assert_eq!(
            select(&csi_selector(b'?', 0, b'h')).unwrap().id,
            FunctionId::Decsm
        );
        assert_eq!(
            select(&csi_selector(0, b'!', b'p')).unwrap().id,
            FunctionId::Decstr
        );
        assert_eq!(
            select(&csi_selector(b'?', b'$', b'p')).unwrap().id,
            FunctionId::Decrqm
        );
    }

    #[test]
    fn test_select_osc() {
        let selector = FunctionSelector {
            category: FunctionCategory::Osc,
            leader: 0,
            intermediate: 0,
            final_byte: 0,
            osc_code: 52,
        };
        assert_eq!(select(&selector).unwrap().id, FunctionId::Clipboard);
    }

    #[test]
    fn test_select_unknown() {
        assert!(select(&csi_selector(b'=', 0, b'z')).is_none());
    }
}
