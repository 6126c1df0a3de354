//! Interactive collection of process inputs on a terminal.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};

use crate::config::ProcessInputs;

/// Zones asked for when no feed rates were supplied.
const PROMPTED_ZONES: usize = 3;

/// Ask until the answer parses as a number.
pub fn ask_f64<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<f64> {
    let mut line = String::new();
    loop {
        write!(output, "{text}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            bail!("input ended while waiting for: {}", text.trim_end_matches([':', ' ']));
        }
        match line.trim().parse::<f64>() {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(output, "'{}' is not a number, try again.", line.trim())?,
        }
    }
}

/// Prompt for every unset input, in the order an operator fills a run sheet.
pub fn fill_missing<R: BufRead, W: Write>(
    mut inputs: ProcessInputs,
    input: &mut R,
    output: &mut W,
) -> Result<ProcessInputs> {
    if inputs.deltax.is_none() {
        inputs.deltax = Some(ask_f64(input, output, "Enter the value of deltax (in mm): ")?);
    }
    if inputs.deltay.is_none() {
        inputs.deltay = Some(ask_f64(input, output, "Enter the value of deltay (in mm): ")?);
    }
    if inputs.feed_rates.is_none() {
        let mut rates = Vec::with_capacity(PROMPTED_ZONES);
        for zone in 1..=PROMPTED_ZONES {
            let text = format!("Enter the nozzle speed (mm/min) for zone {zone}: ");
            rates.push(ask_f64(input, output, &text)?);
        }
        inputs.feed_rates = Some(rates);
    }
    if inputs.nozzle_diameter.is_none() {
        inputs.nozzle_diameter = Some(ask_f64(input, output, "Enter the nozzle diameter (mm): ")?);
    }
    if inputs.shear_rate.is_none() {
        inputs.shear_rate = Some(ask_f64(input, output, "Enter the shear rate (1/s): ")?);
    }
    if inputs.power_law_index.is_none() {
        inputs.power_law_index =
            Some(ask_f64(input, output, "Enter the power law index (n): ")?);
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_fill_all() {
        let mut input = Cursor::new("5\n5\n600\n700\n800\n0.4\n50\n1\n");
        let mut output = Vec::new();
        let inputs = fill_missing(ProcessInputs::default(), &mut input, &mut output).unwrap();

        assert!(inputs.is_complete());
        assert_eq!(inputs.feed_rates, Some(vec![600.0, 700.0, 800.0]));
        assert_eq!(inputs.power_law_index, Some(1.0));

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.starts_with("Enter the value of deltax (in mm): "));
        assert!(shown.contains("for zone 3: "));
    }

    #[test]
    fn test_only_missing_are_asked() {
        let given = ProcessInputs {
            shear_rate: Some(50.0),
            ..ProcessInputs::reference()
        };
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let inputs = fill_missing(given.clone(), &mut input, &mut output).unwrap();
        assert_eq!(inputs, given);
        assert!(output.is_empty());
    }

    #[test]
    fn test_retry_on_garbage() {
        let mut input = Cursor::new("abc\n\n2.5\n");
        let mut output = Vec::new();
        let value = ask_f64(&mut input, &mut output, "Enter the value of deltay (in mm): ").unwrap();
        assert_eq!(value, 2.5);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Enter the value of deltay").count(), 3);
        assert!(shown.contains("'abc' is not a number"));
    }

    #[test]
    fn test_eof() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let err = ask_f64(&mut input, &mut output, "Enter the shear rate (1/s): ").unwrap_err();
        assert!(err.to_string().contains("Enter the shear rate (1/s)"));
    }
}
