//! Control data section parser
//!
//! Collects every `key = value` found between the `CONTROL  DATA  FOR  THE
//! RUN` header and the next numbered section header into a flat mapping.
//! Later assignments of the same key overwrite earlier ones.

use super::inference::TypeInferencer;
use super::lines::{LineClassifier, LineKind, LineReader};
use super::pairs::parse_assignment_line;
use crate::error::Result;
use crate::models::Value;
use indexmap::IndexMap;
use std::io::BufRead;
use tracing::debug;

/// How the parameter section scan finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEnd {
    /// Stopped at the next section header, which is left unconsumed
    NextSection,
    /// Ran out of input first
    EndOfInput,
}

/// Parse the section whose header is the reader's current line
pub fn parse_parameters<R: BufRead>(
    lines: &mut LineReader<R>,
    classifier: &LineClassifier,
    inferencer: &TypeInferencer,
) -> Result<(IndexMap<String, Value>, SectionEnd)> {
    let mut parameters = IndexMap::new();

    // Step past the section header itself
    lines.advance()?;

    while let Some(line) = lines.current() {
        match classifier.classify(line) {
            LineKind::SectionHeader => {
                debug!(
                    "Control data section ended at line {} with {} parameters",
                    lines.line_number(),
                    parameters.len()
                );
                return Ok((parameters, SectionEnd::NextSection));
            }
            LineKind::BlockStart | LineKind::Assignment => {
                let pairs = match parse_assignment_line(line, lines.line_number()) {
                    Ok(pairs) => pairs,
                    // Last line cut off mid-write
                    Err(error) if !lines.is_terminated() => {
                        debug!("Malformed last line of input treated as truncation: {}", error);
                        lines.advance()?;
                        break;
                    }
                    Err(error) => return Err(error),
                };
                for pair in pairs {
                    if TypeInferencer::is_reserved(&pair.key) {
                        continue;
                    }
                    let value = inferencer.infer(&pair.key, &pair.raw_value);
                    parameters.insert(pair.key, value);
                }
            }
            LineKind::Noise => {}
        }

        lines.advance()?;
    }

    debug!(
        "Input ended inside control data section with {} parameters",
        parameters.len()
    );
    Ok((parameters, SectionEnd::EndOfInput))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MdoutError;
    use std::io::Cursor;

    const CONTROL_DATA: &str = "   2.  CONTROL  DATA  FOR  THE  RUN
--------------------------------------------------------------------------------

default_name

General flags:
     imin    =       0, nmropt  =       1

Nature and format of input:
     ntx     =       5, irest   =       1, ntrx    =       1

Molecular dynamics:
     nstlim  =    500000, nscm    =      1000, nrespa  =         1
     t       =   0.00000, dt      =   0.00200, vlimit  =  20.00000

Langevin dynamics temperature regulation:
     ig      =  631601
     temp0   = 293.00000, tempi   =   0.00000, gamma_ln=   1.00000

--------------------------------------------------------------------------------
   3.  ATOMIC COORDINATES AND VELOCITIES
";

    fn reader(text: &str) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(text.as_bytes().to_vec())).unwrap()
    }

    fn classifier() -> LineClassifier {
        LineClassifier::new(" NSTEP")
    }

    #[test]
    fn test_parse_control_data() {
        let mut lines = reader(CONTROL_DATA);
        let (parameters, end) =
            parse_parameters(&mut lines, &classifier(), &TypeInferencer::new()).unwrap();

        assert_eq!(end, SectionEnd::NextSection);
        assert_eq!(parameters.len(), 15);
        assert_eq!(parameters.get("imin"), Some(&Value::Integer(0)));
        assert_eq!(parameters.get("nstlim"), Some(&Value::Integer(500000)));
        assert_eq!(parameters.get("dt"), Some(&Value::Float(0.002)));
        assert_eq!(parameters.get("temp0"), Some(&Value::Float(293.0)));
        assert_eq!(parameters.get("gamma_ln"), Some(&Value::Float(1.0)));

        // First key in file order comes first
        assert_eq!(parameters.get_index(0).map(|(k, _)| k.as_str()), Some("imin"));

        // Next header is left for the caller
        assert_eq!(
            lines.current(),
            Some("   3.  ATOMIC COORDINATES AND VELOCITIES")
        );
    }

    #[test]
    fn test_later_assignment_overwrites() {
        let text = "   2.  CONTROL  DATA  FOR  THE  RUN
     ntrx    =       1, ntwr = 500
     ntrx    =       2
   3.  ATOMIC
";
        let mut lines = reader(text);
        let (parameters, _) =
            parse_parameters(&mut lines, &classifier(), &TypeInferencer::new()).unwrap();

        assert_eq!(parameters.get("ntrx"), Some(&Value::Integer(2)));
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters.get_index(0).map(|(k, _)| k.as_str()), Some("ntrx"));
    }

    #[test]
    fn test_reserved_keys_are_dropped() {
        let text = "   2.  CONTROL  DATA  FOR  THE  RUN
     |flag = 1, cut = 8.0
";
        let mut lines = reader(text);
        let (parameters, end) =
            parse_parameters(&mut lines, &classifier(), &TypeInferencer::new()).unwrap();

        assert_eq!(end, SectionEnd::EndOfInput);
        assert!(!parameters.contains_key("|flag"));
        assert_eq!(parameters.get("cut"), Some(&Value::Float(8.0)));
    }

    #[test]
    fn test_malformed_line_aborts() {
        let text = "   2.  CONTROL  DATA  FOR  THE  RUN
     imin    =       0
     ntx     =
   3.  ATOMIC
";
        let mut lines = reader(text);
        let result = parse_parameters(&mut lines, &classifier(), &TypeInferencer::new());

        match result {
            Err(MdoutError::MalformedPair {
                line_number, key, ..
            }) => {
                assert_eq!(line_number, 3);
                assert_eq!(key, "ntx");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_cut_off_last_line_ends_section() {
        let text = "   2.  CONTROL  DATA  FOR  THE  RUN
     imin    =       0, nmropt  =       1
     ntx     =       5, irest   =";
        let mut lines = reader(text);
        let (parameters, end) =
            parse_parameters(&mut lines, &classifier(), &TypeInferencer::new()).unwrap();

        assert_eq!(end, SectionEnd::EndOfInput);
        assert_eq!(parameters.len(), 2);
        assert!(!parameters.contains_key("ntx"));
        assert!(lines.is_eof());
    }
}
