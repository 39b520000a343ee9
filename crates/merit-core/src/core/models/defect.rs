use serde::{Deserialize, Serialize};

/// Atomic defect species considered during clearance analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefectKind {
    /// Positively charged arsenic substitution.
    Arsenic,
    /// Negatively charged silicon vacancy.
    SiVacancy,
}

/// A charged lattice defect with its electrostatic screening parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargedDefect {
    pub kind: DefectKind,
    /// Net charge in elementary charges.
    pub charge: i8,
    /// Relative permittivity used when screening this defect.
    pub epsilon_r: f64,
    /// Thomas-Fermi screening length in nm.
    pub lambda_tf: f64,
}

impl ChargedDefect {
    pub const fn new(kind: DefectKind, charge: i8, epsilon_r: f64, lambda_tf: f64) -> Self {
        Self {
            kind,
            charge,
            epsilon_r,
            lambda_tf,
        }
    }

    /// The arsenic defect as characterized for the Si(100) surface.
    pub const fn arsenic() -> Self {
        Self::new(DefectKind::Arsenic, 1, 9.7, 2.1)
    }

    /// The silicon vacancy defect as characterized for the Si(100) surface.
    pub const fn si_vacancy() -> Self {
        Self::new(DefectKind::SiVacancy, -1, 10.6, 5.9)
    }
}
