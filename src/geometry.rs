use std::fmt::{Display, Formatter, Result as FmtResult};

/// Hybridization implied by an atom's electron domain count.
///
/// Every bond counts as one domain whatever its order, and so does every lone pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hybridization {
    None,
    Sp,
    Sp2,
    Sp3,
    Sp3d,
    Sp3d2,
}

impl Hybridization {
    pub fn from_domains(domains: usize) -> Self {
        match domains {
            2 => Hybridization::Sp,
            3 => Hybridization::Sp2,
            4 => Hybridization::Sp3,
            5 => Hybridization::Sp3d,
            6 => Hybridization::Sp3d2,
            _ => Hybridization::None,
        }
    }
}

impl Display for Hybridization {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let name = match self {
            Hybridization::None => "none",
            Hybridization::Sp => "sp",
            Hybridization::Sp2 => "sp2",
            Hybridization::Sp3 => "sp3",
            Hybridization::Sp3d => "sp3d",
            Hybridization::Sp3d2 => "sp3d2",
        };
        write!(f, "{}", name)
    }
}

/// VSEPR molecular shape around a single atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    None,
    Linear,
    TrigonalPlanar,
    Bent,
    Tetrahedral,
    TrigonalPyramidal,
    TrigonalBipyramidal,
    Seesaw,
    TShaped,
    Octahedral,
    SquarePyramidal,
    SquarePlanar,
}

impl Geometry {
    /// Shape from the total domain count and how many of those are lone pairs.
    pub fn from_domains(domains: usize, lone_pairs: usize) -> Self {
        match (domains, lone_pairs) {
            (2, _) => Geometry::Linear,
            (3, 0) => Geometry::TrigonalPlanar,
            (3, _) => Geometry::Bent,
            (4, 1) => Geometry::TrigonalPyramidal,
            (4, 2) => Geometry::Bent,
            // Three or four lone pairs: terminal halogens, lone noble gases.
            (4, _) => Geometry::Tetrahedral,
            (5, 1) => Geometry::Seesaw,
            (5, 2) => Geometry::TShaped,
            (5, 3) => Geometry::Linear,
            (5, _) => Geometry::TrigonalBipyramidal,
            (6, 1) => Geometry::SquarePyramidal,
            (6, 2) => Geometry::SquarePlanar,
            (6, 3) => Geometry::TShaped,
            (6, 4) => Geometry::Linear,
            (6, _) => Geometry::Octahedral,
            _ => Geometry::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Geometry::None => "none",
            Geometry::Linear => "linear",
            Geometry::TrigonalPlanar => "trigonal planar",
            Geometry::Bent => "bent",
            Geometry::Tetrahedral => "tetrahedral",
            Geometry::TrigonalPyramidal => "trigonal pyramidal",
            Geometry::TrigonalBipyramidal => "trigonal bipyramidal",
            Geometry::Seesaw => "seesaw",
            Geometry::TShaped => "T-shaped",
            Geometry::Octahedral => "octahedral",
            Geometry::SquarePyramidal => "square pyramidal",
            Geometry::SquarePlanar => "square planar",
        }
    }

    /// Approximate bond angles in degrees, `<` marking angles compressed by lone pairs.
    pub fn bond_angles(self, domains: usize) -> &'static str {
        match (self, domains) {
            (Geometry::None, _) => "none",
            (Geometry::Linear, _) => "180",
            (Geometry::TrigonalPlanar, _) => "120",
            (Geometry::Bent, 3) => "<120",
            (Geometry::Bent, _) => "<109",
            (Geometry::Tetrahedral, _) => "109",
            (Geometry::TrigonalPyramidal, _) => "<109",
            (Geometry::TrigonalBipyramidal, _) => "120, 90",
            (Geometry::Seesaw, _) => "<120, <90",
            (Geometry::TShaped, _) => "<90",
            (Geometry::Octahedral, _) => "90",
            (Geometry::SquarePyramidal, _) => "<90",
            (Geometry::SquarePlanar, _) => "90",
        }
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hybridization() {
        assert_eq!(Hybridization::from_domains(1), Hybridization::None);
        assert_eq!(Hybridization::from_domains(2), Hybridization::Sp);
        assert_eq!(Hybridization::from_domains(4), Hybridization::Sp3);
        assert_eq!(Hybridization::from_domains(6).to_string(), "sp3d2");
    }

    #[test]
    fn test_water_and_ammonia() {
        let water = Geometry::from_domains(4, 2);
        assert_eq!(water, Geometry::Bent);
        assert_eq!(water.bond_angles(4), "<109");

        let ammonia = Geometry::from_domains(4, 1);
        assert_eq!(ammonia, Geometry::TrigonalPyramidal);
        assert_eq!(ammonia.to_string(), "trigonal pyramidal");
    }

    #[test]
    fn test_expanded_shapes() {
        assert_eq!(Geometry::from_domains(5, 3), Geometry::Linear);
        assert_eq!(Geometry::from_domains(5, 1), Geometry::Seesaw);
        assert_eq!(Geometry::from_domains(6, 0), Geometry::Octahedral);
        assert_eq!(Geometry::from_domains(6, 2).bond_angles(6), "90");
        assert_eq!(Geometry::from_domains(3, 1).bond_angles(3), "<120");
        assert_eq!(Geometry::from_domains(1, 0), Geometry::None);
    }

    #[test]
    fn test_terminal_atoms() {
        // Fluorine in SF4 and a lone neon atom.
        assert_eq!(Geometry::from_domains(4, 3), Geometry::Tetrahedral);
        assert_eq!(Geometry::from_domains(4, 4), Geometry::Tetrahedral);
        assert_eq!(Geometry::from_domains(4, 4).bond_angles(4), "109");
        assert_eq!(Geometry::from_domains(4, 0), Geometry::Tetrahedral);
        assert_eq!(Geometry::from_domains(6, 4), Geometry::Linear);
    }
}
