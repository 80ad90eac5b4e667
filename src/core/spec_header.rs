//! Scan-point header of .vert spectroscopy files
//!
//! The line carries free text mixed with integers; only the integers matter:
//! sample count, probe X, probe Y, channel-select code, and optionally (7th)
//! the output-channel variant.

use crate::constants::FormatConstants;
use crate::types::{CreatecError, CreatecResult, FileVersion};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Variant tag used when the header has no 7th integer
pub const DEFAULT_OUTPUT_VARIANT: &str = "v2";

/// Decoded scan-point header and the column layout it implies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecHeader {
    /// Declared number of samples
    pub total_points: usize,
    /// Probe X position in pixels
    pub pos_x: u64,
    /// Probe Y position in pixels
    pub pos_y: u64,
    pub channel_code: u64,
    /// Output-channel variant tag, e.g. `v2`
    pub output_variant: String,
    /// Index column followed by value and selected channel columns
    pub columns: Vec<String>,
}

impl SpecHeader {
    /// Parse the header line and derive the column list for `version`
    pub fn decode(
        line: &str,
        version: FileVersion,
        constants: &FormatConstants,
    ) -> CreatecResult<Self> {
        let runs = digit_runs(line)?;
        if runs.len() < 4 {
            return Err(CreatecError::MalformedSpecHeader(format!(
                "expected at least 4 integers, found {} in '{}'",
                runs.len(),
                line.trim_end()
            )));
        }

        let total_points = usize::try_from(parse_run(runs[0])?).map_err(|_| {
            CreatecError::MalformedSpecHeader(format!("sample count {} out of range", runs[0]))
        })?;
        let pos_x = parse_run(runs[1])?;
        let pos_y = parse_run(runs[2])?;
        let channel_code = parse_run(runs[3])?;
        // only the 7th run matters beyond the first four
        let output_variant = match runs.get(6) {
            Some(run) => format!("v{}", parse_run(run)?),
            None => DEFAULT_OUTPUT_VARIANT.to_string(),
        };

        let mut columns = vec![constants.spec_index_header.clone()];
        columns.extend(
            constants
                .spec_value_names(version, &output_variant)?
                .iter()
                .cloned(),
        );
        columns.extend(select_channels(
            constants.spec_channel_names(version)?,
            channel_code,
        ));

        log::debug!(
            "Spectroscopy header: {} points at ({}, {}), code {:#b}, variant {}, columns {:?}",
            total_points,
            pos_x,
            pos_y,
            channel_code,
            output_variant,
            columns
        );

        Ok(Self {
            total_points,
            pos_x,
            pos_y,
            channel_code,
            output_variant,
            columns,
        })
    }
}

/// Every maximal run of decimal digits, in order of appearance
pub fn digit_runs(line: &str) -> CreatecResult<Vec<&str>> {
    let re = Regex::new(r"[0-9]+")
        .map_err(|e| CreatecError::MalformedSpecHeader(format!("Regex error: {}", e)))?;
    Ok(re.find_iter(line).map(|m| m.as_str()).collect())
}

fn parse_run(run: &str) -> CreatecResult<u64> {
    run.parse::<u64>()
        .map_err(|_| CreatecError::MalformedSpecHeader(format!("integer '{}' out of range", run)))
}

/// One flag per name: bit `i` of `code` (least significant first) selects name `i`.
/// Names beyond the code's bit width are unselected; code bits beyond the names are ignored.
pub fn channel_mask(code: u64, len: usize) -> Vec<bool> {
    (0..len)
        .map(|i| i < 64 && (code >> i) & 1 == 1)
        .collect()
}

/// Names whose mask bit is set, in list order
pub fn select_channels(names: &[String], code: u64) -> Vec<String> {
    names
        .iter()
        .zip(channel_mask(code, names.len()))
        .filter(|(_, selected)| *selected)
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mask_lsb_first() {
        let list = names(&["C0", "C1", "C2"]);
        assert_eq!(channel_mask(0b101, 3), vec![true, false, true]);
        assert_eq!(select_channels(&list, 0b101), names(&["C0", "C2"]));
    }

    #[test]
    fn test_mask_padding_and_overflow() {
        assert_eq!(channel_mask(0b1, 4), vec![true, false, false, false]);
        assert_eq!(channel_mask(0b1110, 2), vec![false, true]);
        assert_eq!(channel_mask(u64::MAX, 66).iter().filter(|b| **b).count(), 64);
    }

    #[test]
    fn test_digit_runs() {
        let runs = digit_runs("512 pts at X=10, Y=-20 code 7").unwrap();
        assert_eq!(runs, vec!["512", "10", "20", "7"]);
    }

    #[test]
    fn test_unused_overflowing_run_ignored() {
        let constants = FormatConstants::embedded().unwrap();
        let header = SpecHeader::decode(
            "3 12 34 1 99999999999999999999999 0",
            FileVersion::ParVert32,
            &constants,
        )
        .unwrap();
        assert_eq!(header.total_points, 3);
        assert_eq!(header.output_variant, "v2");

        let header = SpecHeader::decode(
            "3 12 34 1 0 0 6 99999999999999999999999",
            FileVersion::ParVert32,
            &constants,
        )
        .unwrap();
        assert_eq!(header.output_variant, "v6");
    }

    #[test]
    fn test_overflowing_used_run_rejected() {
        let constants = FormatConstants::embedded().unwrap();
        let result = SpecHeader::decode(
            "3 99999999999999999999999 34 1",
            FileVersion::ParVert32,
            &constants,
        );
        assert!(matches!(result, Err(CreatecError::MalformedSpecHeader(_))));
    }

    #[test]
    fn test_decode_default_variant() {
        let constants = FormatConstants::embedded().unwrap();
        let header = SpecHeader::decode(
            "DATA 100 12 34 5 0 0",
            FileVersion::ParVert32,
            &constants,
        )
        .unwrap();
        assert_eq!(header.total_points, 100);
        assert_eq!((header.pos_x, header.pos_y), (12, 34));
        assert_eq!(header.output_variant, "v2");
        assert_eq!(header.columns, names(&["idx", "V", "Z", "I", "dI_q"]));
    }

    #[test]
    fn test_decode_seventh_integer_variant() {
        let constants = FormatConstants::embedded().unwrap();
        let header = SpecHeader::decode(
            "    2048    64    64    1    0    0    6",
            FileVersion::ParVert32,
            &constants,
        )
        .unwrap();
        assert_eq!(header.output_variant, "v6");
        assert_eq!(
            header.columns,
            names(&["idx", "V", "Z", "X", "Y", "DAC4", "DAC5", "I"])
        );
    }

    #[test]
    fn test_decode_too_few_integers() {
        let constants = FormatConstants::embedded().unwrap();
        let result = SpecHeader::decode("1 2 3", FileVersion::ParVert32, &constants);
        assert!(matches!(result, Err(CreatecError::MalformedSpecHeader(_))));
    }

    #[test]
    fn test_decode_unknown_variant() {
        let constants = FormatConstants::embedded().unwrap();
        let result = SpecHeader::decode("1 2 3 0 0 0 9", FileVersion::ParVert30, &constants);
        assert!(matches!(
            result,
            Err(CreatecError::UnsupportedOutputVariant { variant, .. }) if variant == "v9"
        ));
    }
}
