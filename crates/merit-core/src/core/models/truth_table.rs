use serde::{Deserialize, Serialize};

/// A packed single-output Boolean function over up to six variables.
///
/// Row `r` of the table is the output for the input assignment whose bits are
/// `r` (variable 0 in the least significant position). Output bits are stored
/// in the same order, row 0 in bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TruthTable {
    num_vars: u8,
    bits: u64,
}

impl TruthTable {
    /// Builds a table from its packed output bits. Bits beyond the table's
    /// `2^num_vars` rows are masked off.
    pub fn from_bits(num_vars: u8, bits: u64) -> Self {
        assert!(num_vars <= 6, "at most six input variables are supported");
        let rows = 1u32 << num_vars;
        let mask = if rows == 64 {
            u64::MAX
        } else {
            (1u64 << rows) - 1
        };
        Self {
            num_vars,
            bits: bits & mask,
        }
    }

    pub fn num_vars(&self) -> u8 {
        self.num_vars
    }

    pub fn num_rows(&self) -> usize {
        1 << self.num_vars
    }

    /// Output value for the given input row.
    pub fn output(&self, row: usize) -> bool {
        debug_assert!(row < self.num_rows());
        (self.bits >> row) & 1 == 1
    }

    /// Number of input rows mapped to a logical 1.
    pub fn ones_count(&self) -> u32 {
        self.bits.count_ones()
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    // Single-output standard functions. The packed literals follow the
    // established row ordering of the gate library this crate evaluates
    // against.

    pub fn id() -> Self {
        Self::from_bits(1, 0x2)
    }
    pub fn not() -> Self {
        Self::from_bits(1, 0x1)
    }
    pub fn and() -> Self {
        Self::from_bits(2, 0x8)
    }
    pub fn or() -> Self {
        Self::from_bits(2, 0xe)
    }
    pub fn nand() -> Self {
        Self::from_bits(2, 0x7)
    }
    pub fn nor() -> Self {
        Self::from_bits(2, 0x1)
    }
    pub fn xor() -> Self {
        Self::from_bits(2, 0x6)
    }
    pub fn xnor() -> Self {
        Self::from_bits(2, 0x9)
    }
    pub fn lt() -> Self {
        Self::from_bits(2, 0x2)
    }
    pub fn gt() -> Self {
        Self::from_bits(2, 0x4)
    }
    pub fn le() -> Self {
        Self::from_bits(2, 0x11)
    }
    pub fn ge() -> Self {
        Self::from_bits(2, 0x13)
    }
    pub fn and3() -> Self {
        Self::from_bits(3, 0x80)
    }
    pub fn xor_and() -> Self {
        Self::from_bits(3, 0x28)
    }
    pub fn or_and() -> Self {
        Self::from_bits(3, 0xa8)
    }
    pub fn onehot() -> Self {
        Self::from_bits(3, 0x16)
    }
    pub fn maj() -> Self {
        Self::from_bits(3, 0xe8)
    }
    pub fn gamble() -> Self {
        Self::from_bits(3, 0x81)
    }
    pub fn dot() -> Self {
        Self::from_bits(3, 0x52)
    }
    pub fn ite() -> Self {
        Self::from_bits(3, 0xd8)
    }
    pub fn and_xor() -> Self {
        Self::from_bits(3, 0x6a)
    }
    pub fn xor3() -> Self {
        Self::from_bits(3, 0x96)
    }
}

/// Duplicates a single-output function across a two-way fan-out.
fn fan_out_pair(table: TruthTable) -> Vec<TruthTable> {
    vec![table, table]
}

/// The named gate functions the evaluation tooling can resolve.
///
/// Multi-output entries produce one table per gate output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateFunction {
    Id,
    Not,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    Lt,
    Gt,
    Le,
    Ge,
    And3,
    XorAnd,
    OrAnd,
    Onehot,
    Maj,
    Gamble,
    Dot,
    Ite,
    AndXor,
    Xor3,
    FanOut,
    DoubleWire,
    CrossingWire,
    HalfAdder,
    ANotA,
    FalseFanOut,
    TrueFanOut,
    NorFanOut,
    NandFanOut,
    AndFanOut,
    OrFanOut,
    XorFanOut,
    XnorFanOut,
    AFanOut,
    BFanOut,
    NotAFanOut,
    NotBFanOut,
    AAndNotBFanOut,
    AOrNotBFanOut,
    NotAAndBFanOut,
    NotAOrBFanOut,
}

impl GateFunction {
    /// Expected behavior of the gate, one truth table per output.
    pub fn truth_tables(self) -> Vec<TruthTable> {
        use GateFunction::*;
        match self {
            Id => vec![TruthTable::id()],
            Not => vec![TruthTable::not()],
            And => vec![TruthTable::and()],
            Or => vec![TruthTable::or()],
            Nand => vec![TruthTable::nand()],
            Nor => vec![TruthTable::nor()],
            Xor => vec![TruthTable::xor()],
            Xnor => vec![TruthTable::xnor()],
            Lt => vec![TruthTable::lt()],
            Gt => vec![TruthTable::gt()],
            Le => vec![TruthTable::le()],
            Ge => vec![TruthTable::ge()],
            And3 => vec![TruthTable::and3()],
            XorAnd => vec![TruthTable::xor_and()],
            OrAnd => vec![TruthTable::or_and()],
            Onehot => vec![TruthTable::onehot()],
            Maj => vec![TruthTable::maj()],
            Gamble => vec![TruthTable::gamble()],
            Dot => vec![TruthTable::dot()],
            Ite => vec![TruthTable::ite()],
            AndXor => vec![TruthTable::and_xor()],
            Xor3 => vec![TruthTable::xor3()],
            FanOut => fan_out_pair(TruthTable::id()),
            DoubleWire => vec![
                TruthTable::from_bits(2, 0xc),
                TruthTable::from_bits(2, 0xa),
            ],
            CrossingWire => vec![
                TruthTable::from_bits(2, 0xa),
                TruthTable::from_bits(2, 0xc),
            ],
            HalfAdder => vec![
                TruthTable::from_bits(2, 0x6),
                TruthTable::from_bits(2, 0x8),
            ],
            ANotA => vec![TruthTable::id(), TruthTable::not()],
            FalseFanOut => fan_out_pair(TruthTable::from_bits(2, 0x0)),
            TrueFanOut => fan_out_pair(TruthTable::from_bits(2, 0xf)),
            NorFanOut => fan_out_pair(TruthTable::nor()),
            NandFanOut => fan_out_pair(TruthTable::nand()),
            AndFanOut => fan_out_pair(TruthTable::and()),
            OrFanOut => fan_out_pair(TruthTable::or()),
            XorFanOut => fan_out_pair(TruthTable::xor()),
            XnorFanOut => fan_out_pair(TruthTable::xnor()),
            AFanOut => fan_out_pair(TruthTable::from_bits(2, 0xc)),
            BFanOut => fan_out_pair(TruthTable::from_bits(2, 0xa)),
            NotAFanOut => fan_out_pair(TruthTable::from_bits(2, 0x3)),
            NotBFanOut => fan_out_pair(TruthTable::from_bits(2, 0x5)),
            AAndNotBFanOut => fan_out_pair(TruthTable::from_bits(2, 0x4)),
            AOrNotBFanOut => fan_out_pair(TruthTable::from_bits(2, 0xd)),
            NotAAndBFanOut => fan_out_pair(TruthTable::from_bits(2, 0x2)),
            NotAOrBFanOut => fan_out_pair(TruthTable::from_bits(2, 0xb)),
        }
    }
}

/// Gate names the batch tooling understands, including common aliases.
static GATE_FUNCTIONS: phf::Map<&'static str, GateFunction> = phf::phf_map! {
    "wire" => GateFunction::Id,
    "wire_diag" => GateFunction::Id,
    "inv" => GateFunction::Not,
    "inv_diag" => GateFunction::Not,
    "not" => GateFunction::Not,
    "and" => GateFunction::And,
    "or" => GateFunction::Or,
    "nand" => GateFunction::Nand,
    "nor" => GateFunction::Nor,
    "xor" => GateFunction::Xor,
    "xnor" => GateFunction::Xnor,
    "lt" => GateFunction::Lt,
    "gt" => GateFunction::Gt,
    "le" => GateFunction::Le,
    "ge" => GateFunction::Ge,
    "and3" => GateFunction::And3,
    "xor_and" => GateFunction::XorAnd,
    "or_and" => GateFunction::OrAnd,
    "onehot" => GateFunction::Onehot,
    "maj" => GateFunction::Maj,
    "majority" => GateFunction::Maj,
    "gamble" => GateFunction::Gamble,
    "dot" => GateFunction::Dot,
    "ite" => GateFunction::Ite,
    "and_xor" => GateFunction::AndXor,
    "xor3" => GateFunction::Xor3,
    "fanout" => GateFunction::FanOut,
    "fo2" => GateFunction::FanOut,
    "double_wire" => GateFunction::DoubleWire,
    "hourglass" => GateFunction::DoubleWire,
    "crossing_wire" => GateFunction::CrossingWire,
    "cx" => GateFunction::CrossingWire,
    "half_adder" => GateFunction::HalfAdder,
    "ha" => GateFunction::HalfAdder,
    "a_not_a" => GateFunction::ANotA,
    "false" => GateFunction::FalseFanOut,
    "false_fanout" => GateFunction::FalseFanOut,
    "true" => GateFunction::TrueFanOut,
    "true_fanout" => GateFunction::TrueFanOut,
    "nor_fanout" => GateFunction::NorFanOut,
    "nand_fanout" => GateFunction::NandFanOut,
    "and_fanout" => GateFunction::AndFanOut,
    "or_fanout" => GateFunction::OrFanOut,
    "xor_fanout" => GateFunction::XorFanOut,
    "xnor_fanout" => GateFunction::XnorFanOut,
    "a_fanout" => GateFunction::AFanOut,
    "b_fanout" => GateFunction::BFanOut,
    "not_a_fanout" => GateFunction::NotAFanOut,
    "not_b_fanout" => GateFunction::NotBFanOut,
    "a_and_not_b_fanout" => GateFunction::AAndNotBFanOut,
    "a_or_not_b_fanout" => GateFunction::AOrNotBFanOut,
    "not_a_and_b_fanout" => GateFunction::NotAAndBFanOut,
    "not_a_or_b_fanout" => GateFunction::NotAOrBFanOut,
};

/// Looks up a gate function by its exact name.
pub fn gate_function_by_name(name: &str) -> Option<GateFunction> {
    GATE_FUNCTIONS.get(name).copied()
}

/// Produces the name candidates for a layout file stem by repeatedly stripping
/// trailing `_<digits>` suffixes, most specific first. `and_fanout_3_0` yields
/// `["and_fanout_3_0", "and_fanout_3", "and_fanout"]`.
pub fn candidate_gate_names(base: &str) -> Vec<String> {
    let mut candidates = vec![base.to_string()];
    let mut current = base;
    while let Some(pos) = current.rfind('_') {
        let suffix = &current[pos + 1..];
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        current = &current[..pos];
        candidates.push(current.to_string());
    }
    candidates
}

/// Resolves the first known gate function among the given name candidates.
pub fn resolve_truth_tables(candidates: &[String]) -> Option<Vec<TruthTable>> {
    for name in candidates {
        if let Some(function) = gate_function_by_name(name) {
            return Some(function.truth_tables());
        }
        for fallback in candidate_gate_names(name) {
            if fallback == *name {
                continue;
            }
            if let Some(function) = gate_function_by_name(&fallback) {
                return Some(function.truth_tables());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_table_is_true_only_when_both_inputs_are_set() {
        let and = TruthTable::and();
        assert_eq!(and.num_rows(), 4);
        assert!(!and.output(0));
        assert!(!and.output(1));
        assert!(!and.output(2));
        assert!(and.output(3));
    }

    #[test]
    fn xor3_has_balanced_output() {
        let xor3 = TruthTable::xor3();
        assert_eq!(xor3.num_rows(), 8);
        assert_eq!(xor3.ones_count(), 4);
    }

    #[test]
    fn from_bits_masks_excess_bits() {
        let table = TruthTable::from_bits(2, 0xff);
        assert_eq!(table.bits(), 0xf);
    }

    #[test]
    fn fan_out_duplicates_the_base_function() {
        let tables = GateFunction::XorFanOut.truth_tables();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0], tables[1]);
        assert_eq!(tables[0], TruthTable::xor());
    }

    #[test]
    fn crossing_wire_swaps_the_double_wire_outputs() {
        let double = GateFunction::DoubleWire.truth_tables();
        let crossing = GateFunction::CrossingWire.truth_tables();
        assert_eq!(double[0], crossing[1]);
        assert_eq!(double[1], crossing[0]);
    }

    #[test]
    fn lookup_resolves_aliases() {
        assert_eq!(gate_function_by_name("ha"), Some(GateFunction::HalfAdder));
        assert_eq!(
            gate_function_by_name("hourglass"),
            Some(GateFunction::DoubleWire)
        );
        assert_eq!(gate_function_by_name("unknown_gate"), None);
    }

    #[test]
    fn candidate_names_strip_numeric_suffixes_repeatedly() {
        assert_eq!(
            candidate_gate_names("and_fanout_3_0"),
            vec!["and_fanout_3_0", "and_fanout_3", "and_fanout"]
        );
    }

    #[test]
    fn candidate_names_stop_at_non_numeric_suffixes() {
        assert_eq!(candidate_gate_names("half_adder"), vec!["half_adder"]);
    }

    #[test]
    fn resolution_falls_back_to_stripped_names() {
        let names = vec!["nand_fanout_4_17".to_string()];
        let tables = resolve_truth_tables(&names).unwrap();
        assert_eq!(tables, GateFunction::NandFanOut.truth_tables());
    }

    #[test]
    fn resolution_fails_for_unknown_names() {
        let names = vec!["mystery_gate".to_string()];
        assert!(resolve_truth_tables(&names).is_none());
    }
}
