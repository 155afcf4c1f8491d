use crate::*;
use anyhow::{Context, Result};
use nom::{
    branch::alt,
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{map, map_res, opt, recognize},
    multi::many1,
    sequence::{delimited, pair, preceded},
    IResult,
};
use std::str::FromStr;
use thiserror::Error;

/// Largest net charge accepted on a formula.
pub const MAX_CHARGE: i32 = 8;

/// Most atoms a formula may expand to.
pub const MAX_ATOMS: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Empty formula")]
    Empty,
    #[error("Unexpected input at position {0}: {1:?}")]
    Syntax(usize, String),
    #[error("Unknown element symbol {0}")]
    UnknownElement(String),
    #[error("Count of zero after {0}")]
    ZeroCount(String),
    #[error("Odd electron count {0}, radicals are not supported")]
    OddElectrons(i32),
    #[error("Charge {0} is out of range")]
    ChargeOutOfRange(i32),
    #[error("More than {0} atoms")]
    TooManyAtoms(usize),
}

/// A validated molecular formula: its atoms in written order and its net charge.
///
/// Accepts element symbols with optional counts, parenthesised groups with a
/// multiplier, and a trailing charge such as `^+`, `^-` or `^2-`.
/// For example `CO2`, `NH4^+`, `SO4^2-` and `(NH4)2S`.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    text: String,
    elements: Vec<&'static Element>,
    charge: i32,
}

impl Formula {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn elements(&self) -> &[&'static Element] {
        &self.elements
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Σ valence − charge.
    pub fn electrons(&self) -> i32 {
        electron_count(&self.elements, self.charge)
    }

    pub fn to_molecule(&self, policy: &ExpansionPolicy) -> Molecule {
        Molecule::with_policy(self.elements.clone(), self.charge, policy)
            .with_formula(self.text.clone())
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        if text.is_empty() {
            return Err(FormulaError::Empty);
        }

        let (groups, charge) = match formula(text) {
            Ok(("", parsed)) => parsed,
            Ok((rest, _)) => {
                return Err(FormulaError::Syntax(text.len() - rest.len(), rest.to_string()))
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(FormulaError::Syntax(text.len() - e.input.len(), e.input.to_string()))
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(FormulaError::Syntax(text.len(), String::new()))
            }
        };

        let mut elements = Vec::new();
        for group in &groups {
            group.expand(1, &mut elements)?;
        }

        let charge = charge.map_or(0, |(magnitude, sign)| {
            // Anything past i32 is out of range anyway.
            let magnitude = i32::try_from(magnitude).unwrap_or(i32::MAX);
            if sign == '-' {
                -magnitude
            } else {
                magnitude
            }
        });
        if charge.abs() > MAX_CHARGE {
            return Err(FormulaError::ChargeOutOfRange(charge));
        }
        let electrons = electron_count(&elements, charge);
        if electrons <= 0 {
            return Err(FormulaError::ChargeOutOfRange(charge));
        }
        if electrons % 2 != 0 {
            return Err(FormulaError::OddElectrons(electrons));
        }

        Ok(Self {
            text: text.to_string(),
            elements,
            charge,
        })
    }
}

/// Parse and validate a formula.
pub fn parse_formula(text: &str) -> Result<Formula> {
    text.parse::<Formula>()
        .context(format!("Failed to parse formula {text}"))
}

fn electron_count(elements: &[&'static Element], charge: i32) -> i32 {
    elements.iter().map(|e| e.valence_electrons as i32).sum::<i32>() - charge
}

#[derive(Debug, Clone, PartialEq)]
enum Group {
    Atom(String, usize),
    Nested(Vec<Group>, usize),
}

impl Group {
    fn expand(&self, times: usize, out: &mut Vec<&'static Element>) -> Result<(), FormulaError> {
        match self {
            Group::Atom(symbol, count) => {
                if *count == 0 {
                    return Err(FormulaError::ZeroCount(symbol.clone()));
                }
                let element = Element::lookup(symbol)
                    .ok_or_else(|| FormulaError::UnknownElement(symbol.clone()))?;
                let n = count
                    .checked_mul(times)
                    .filter(|n| *n <= MAX_ATOMS - out.len())
                    .ok_or(FormulaError::TooManyAtoms(MAX_ATOMS))?;
                out.extend(std::iter::repeat(element).take(n));
            }
            Group::Nested(groups, count) => {
                if *count == 0 {
                    return Err(FormulaError::ZeroCount(")".to_string()));
                }
                let times = count
                    .checked_mul(times)
                    .ok_or(FormulaError::TooManyAtoms(MAX_ATOMS))?;
                for group in groups {
                    group.expand(times, out)?;
                }
            }
        }
        Ok(())
    }
}

fn symbol(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_uppercase()),
        opt(satisfy(|c| c.is_ascii_lowercase())),
    ))(input)
}

fn count(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>())(input)
}

fn group(input: &str) -> IResult<&str, Group> {
    alt((
        map(pair(symbol, opt(count)), |(symbol, n)| {
            Group::Atom(symbol.to_string(), n.unwrap_or(1))
        }),
        map(
            pair(delimited(char('('), many1(group), char(')')), opt(count)),
            |(groups, n)| Group::Nested(groups, n.unwrap_or(1)),
        ),
    ))(input)
}

/// Charge magnitude and sign, range-checked by the caller.
fn charge(input: &str) -> IResult<&str, (usize, char)> {
    map(
        preceded(char('^'), pair(opt(count), one_of("+-"))),
        |(n, sign)| (n.unwrap_or(1), sign),
    )(input)
}

fn formula(input: &str) -> IResult<&str, (Vec<Group>, Option<(usize, char)>)> {
    pair(many1(group), opt(charge))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(formula: &Formula) -> Vec<&'static str> {
        formula.elements().iter().map(|e| e.symbol).collect()
    }

    #[test]
    fn test_simple() {
        let co2: Formula = "CO2".parse().unwrap();
        assert_eq!(symbols(&co2), vec!["C", "O", "O"]);
        assert_eq!(co2.charge(), 0);
        assert_eq!(co2.electrons(), 16);
    }

    #[test]
    fn test_charges() {
        let ammonium: Formula = "NH4^+".parse().unwrap();
        assert_eq!(ammonium.charge(), 1);
        assert_eq!(ammonium.electrons(), 8);

        let sulfate: Formula = "SO4^2-".parse().unwrap();
        assert_eq!(sulfate.charge(), -2);
        assert_eq!(sulfate.elements().len(), 5);

        let nitrate: Formula = " NO3^- ".parse().unwrap();
        assert_eq!(nitrate.charge(), -1);
        assert_eq!(nitrate.text(), "NO3^-");
    }

    #[test]
    fn test_groups() {
        let sulfide: Formula = "(NH4)2S".parse().unwrap();
        assert_eq!(sulfide.elements().len(), 11);
        assert_eq!(symbols(&sulfide).iter().filter(|s| **s == "H").count(), 8);

        let chlorine: Formula = "Cl2".parse().unwrap();
        assert_eq!(symbols(&chlorine), vec!["Cl", "Cl"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!("".parse::<Formula>(), Err(FormulaError::Empty));
        assert_eq!("   ".parse::<Formula>(), Err(FormulaError::Empty));
        assert_eq!("Xy".parse::<Formula>(), Err(FormulaError::UnknownElement("Xy".to_string())));
        assert_eq!("O0".parse::<Formula>(), Err(FormulaError::ZeroCount("O".to_string())));
        assert_eq!("N".parse::<Formula>(), Err(FormulaError::OddElectrons(5)));
        assert_eq!("NO2".parse::<Formula>(), Err(FormulaError::OddElectrons(17)));
        assert_eq!("H2^9+".parse::<Formula>(), Err(FormulaError::ChargeOutOfRange(9)));
        assert_eq!("H2^2+".parse::<Formula>(), Err(FormulaError::ChargeOutOfRange(2)));
        assert!(matches!("CO2$".parse::<Formula>(), Err(FormulaError::Syntax(3, _))));
        assert!(matches!("co2".parse::<Formula>(), Err(FormulaError::Syntax(0, _))));
        assert!(matches!("(CO2".parse::<Formula>(), Err(FormulaError::Syntax(_, _))));
    }

    #[test]
    fn test_oversized_numbers() {
        assert_eq!(
            "H2O^4294967298-".parse::<Formula>(),
            Err(FormulaError::ChargeOutOfRange(-i32::MAX))
        );
        assert!(matches!(
            "H2O^99999999999999999999-".parse::<Formula>(),
            Err(FormulaError::Syntax(3, _))
        ));
        assert_eq!(
            "(H4294967296)4294967296".parse::<Formula>(),
            Err(FormulaError::TooManyAtoms(MAX_ATOMS))
        );
        assert_eq!(
            "H9999999999".parse::<Formula>(),
            Err(FormulaError::TooManyAtoms(MAX_ATOMS))
        );
        assert_eq!(
            "(CH2)40".parse::<Formula>(),
            Err(FormulaError::TooManyAtoms(MAX_ATOMS))
        );
        assert_eq!("C20H42".parse::<Formula>().map(|f| f.elements().len()), Ok(62));
    }

    #[test]
    fn test_parse_formula_context() {
        let error = parse_formula("N").unwrap_err();
        assert!(error.to_string().contains("Failed to parse formula N"));
        assert_eq!(
            error.downcast_ref::<FormulaError>(),
            Some(&FormulaError::OddElectrons(5))
        );
    }

    #[test]
    fn test_to_molecule() {
        let water: Formula = "H2O".parse().unwrap();
        let molecule = water.to_molecule(&ExpansionPolicy::default());
        assert_eq!(molecule.formula(), "H2O");
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.num_electrons(), 8);
    }
}
