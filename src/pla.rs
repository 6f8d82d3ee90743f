//! PLA file ingestion (`spec.md` §6.2).
//!
//! A PLA file is a sequence of `.`-prefixed option lines (`.i`, `.o`, `.p`,
//! `.ilb`, `.ob`, `.e`) and product lines: an input cube over
//! `{'0','1','-'}` followed by whitespace and an output vector over
//! `{'0','1','~'}`. `#`-prefixed lines and blank lines are ignored.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeValue {
    Zero,
    One,
    DontCare,
}

impl CubeValue {
    /// Both the cube and output alphabets are `{'0','1','-','~'}`
    /// (`spec.md` §6.2: "`-` and `~` denote 'don't care'"); either
    /// character is accepted in either field.
    fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(CubeValue::Zero),
            '1' => Some(CubeValue::One),
            '-' | '~' => Some(CubeValue::DontCare),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub cube: Vec<CubeValue>,
    pub outputs: Vec<CubeValue>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedPla {
    pub input_count: usize,
    pub output_count: usize,
    pub input_labels: Vec<String>,
    pub output_labels: Vec<String>,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone)]
pub enum PlaParseError {
    MissingOption(&'static str),
    BadProductLength { line: usize, expected: usize, found: usize },
    BadCubeChar { line: usize, ch: char },
    TooManyProducts { line: usize, declared: usize },
}

impl fmt::Display for PlaParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaParseError::MissingOption(opt) => {
                write!(f, "PLA file is missing required option line {opt}")
            }
            PlaParseError::BadProductLength { line, expected, found } => write!(
                f,
                "line {line}: expected {expected} cube+output characters, found {found}"
            ),
            PlaParseError::BadCubeChar { line, ch } => {
                write!(f, "line {line}: unrecognised cube character '{ch}'")
            }
            PlaParseError::TooManyProducts { line, declared } => write!(
                f,
                "line {line}: more product lines than the declared .p count ({declared})"
            ),
        }
    }
}

impl std::error::Error for PlaParseError {}

/// Parses a PLA file's text (`spec.md` §6.2). Returns a `Result`, not an
/// `Option` (`SPEC_FULL.md` §B): malformed input is reported with enough
/// context (line number) to act on, rather than collapsed to `None`.
pub fn parse_pla(text: &str) -> Result<ParsedPla, PlaParseError> {
    let mut input_count: Option<usize> = None;
    let mut output_count: Option<usize> = None;
    let mut declared_products: Option<usize> = None;
    let mut input_labels: Vec<String> = Vec::new();
    let mut output_labels: Vec<String> = Vec::new();
    let mut products = Vec::new();

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        let line_number = line_no + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with(".e") {
            break;
        }
        if let Some(rest) = line.strip_prefix(".i ") {
            input_count = Some(rest.trim().parse().unwrap_or(0));
            continue;
        }
        if let Some(rest) = line.strip_prefix(".o ") {
            output_count = Some(rest.trim().parse().unwrap_or(0));
            continue;
        }
        if let Some(rest) = line.strip_prefix(".p ") {
            declared_products = Some(rest.trim().parse().unwrap_or(0));
            continue;
        }
        if let Some(rest) = line.strip_prefix(".ilb ") {
            input_labels = rest.split_whitespace().map(str::to_string).collect();
            continue;
        }
        if let Some(rest) = line.strip_prefix(".ob ") {
            output_labels = rest.split_whitespace().map(str::to_string).collect();
            continue;
        }
        if line.starts_with('.') {
            // Unrecognised option line; tolerated and skipped.
            continue;
        }

        let i = input_count.ok_or(PlaParseError::MissingOption(".i"))?;
        let o = output_count.ok_or(PlaParseError::MissingOption(".o"))?;
        if let Some(declared) = declared_products {
            if products.len() >= declared {
                return Err(PlaParseError::TooManyProducts {
                    line: line_number,
                    declared,
                });
            }
        }

        let mut fields = line.split_whitespace();
        let cube_field = fields.next().unwrap_or("");
        let output_field = fields.next().unwrap_or("");
        if cube_field.chars().count() != i || output_field.chars().count() != o {
            return Err(PlaParseError::BadProductLength {
                line: line_number,
                expected: i + o,
                found: cube_field.chars().count() + output_field.chars().count(),
            });
        }

        let mut cube = Vec::with_capacity(i);
        for ch in cube_field.chars() {
            cube.push(CubeValue::from_char(ch).ok_or(PlaParseError::BadCubeChar {
                line: line_number,
                ch,
            })?);
        }
        let mut outputs = Vec::with_capacity(o);
        for ch in output_field.chars() {
            outputs.push(CubeValue::from_char(ch).ok_or(PlaParseError::BadCubeChar {
                line: line_number,
                ch,
            })?);
        }
        products.push(Product { cube, outputs });
    }

    let input_count = input_count.ok_or(PlaParseError::MissingOption(".i"))?;
    let output_count = output_count.ok_or(PlaParseError::MissingOption(".o"))?;

    Ok(ParsedPla {
        input_count,
        output_count,
        input_labels,
        output_labels,
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sample PLA
.i 3
.o 1
.p 2
1-0 1
-11 1
.e
";

    #[test]
    fn parses_sample() {
        let pla = parse_pla(SAMPLE).unwrap();
        assert_eq!(pla.input_count, 3);
        assert_eq!(pla.output_count, 1);
        assert_eq!(pla.products.len(), 2);
        assert_eq!(
            pla.products[0].cube,
            vec![CubeValue::One, CubeValue::DontCare, CubeValue::Zero]
        );
        assert_eq!(pla.products[0].outputs, vec![CubeValue::One]);
    }

    #[test]
    fn accepts_either_dont_care_character_in_either_field() {
        let pla = parse_pla(".i 2\n.o 2\n1~ -1\n.e\n").unwrap();
        assert_eq!(
            pla.products[0].cube,
            vec![CubeValue::One, CubeValue::DontCare]
        );
        assert_eq!(
            pla.products[0].outputs,
            vec![CubeValue::DontCare, CubeValue::One]
        );
    }

    #[test]
    fn rejects_bad_cube_char() {
        let bad = ".i 1\n.o 1\nx 1\n";
        assert!(matches!(
            parse_pla(bad),
            Err(PlaParseError::BadCubeChar { .. })
        ));
    }

    #[test]
    fn rejects_missing_option() {
        let bad = "10 1\n";
        assert!(matches!(
            parse_pla(bad),
            Err(PlaParseError::MissingOption(".i"))
        ));
    }
}
