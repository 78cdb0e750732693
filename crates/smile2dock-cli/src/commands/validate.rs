use super::report;
use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};
use smile2dock::core::smiles::{self, SmilesError};

pub fn run(args: ValidateArgs) -> Result<()> {
    let results = check(&args.smiles);
    print!("{}", report::validation(&results));

    let invalid = results.iter().filter(|(_, r)| r.is_err()).count();
    if invalid > 0 {
        return Err(CliError::Argument(format!(
            "{} of {} SMILES failed to parse",
            invalid,
            results.len()
        )));
    }
    Ok(())
}

fn check(inputs: &[String]) -> Vec<(String, std::result::Result<String, SmilesError>)> {
    inputs
        .iter()
        .map(|s| (s.clone(), smiles::canonicalize(s)))
        .collect()
}
