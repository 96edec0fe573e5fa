use std::env;

mod args;
mod cli_model;
mod init_log;
mod log_level;

pub use args::CliArgs;
use log_level::LogLevel;

/// Handle command line options and set up logging.
///
/// Returns None if no arguments at all were given, in which case the help
/// message has been printed.
pub fn handle_cli() -> anyhow::Result<Option<CliArgs>> {
    let mut c = cli_model::cli_model();
    if env::args_os().len() < 2 {
        c.print_help()?;
        return Ok(None);
    }
    let m = c.get_matches();
    init_log::init_log(&m)?;
    debug!("Processing command line options");
    Ok(Some(CliArgs::from_matches(&m)))
}

/// Parse an argument list (without the program name) as the command line would be
#[cfg(test)]
pub fn parse_args(argv: &[&str]) -> CliArgs {
    let m = cli_model::cli_model()
        .try_get_matches_from(std::iter::once("peaclock").chain(argv.iter().copied()))
        .expect("Invalid test arguments");
    CliArgs::from_matches(&m)
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;
    use crate::config::*;

    #[test]
    fn only_supplied_values_are_applied() {
        let mut base = get_defaults();
        base.set(BARCODE_KIT, "pcr");
        base.set(REPORT, true);
        let cfg = parse_args(&["-s", "mouse"]).apply_to(base.clone());
        assert_eq!(cfg.species().unwrap(), Some("mouse"));
        assert_eq!(cfg.barcode_kit().unwrap(), "pcr");
        // Absent flag does not reset the config file value
        assert!(cfg.report().unwrap());
        assert_eq!(cfg.len(), base.len());
    }

    #[test]
    fn cli_overrides_config() {
        let mut base = get_defaults();
        base.set(BARCODE_KIT, "pcr");
        base.set(THREADS, 8);
        let cfg = parse_args(&[
            "-k", "RAPID", "-t", "3", "--outdir", "out", "--demultiplex", "--verbose",
        ])
        .apply_to(base);
        assert_eq!(cfg.barcode_kit().unwrap(), "rapid");
        assert_eq!(cfg.get(THREADS), Some(&Value::from("3")));
        assert_eq!(cfg.outdir().unwrap().as_deref(), Some(std::path::Path::new("out")));
        assert!(cfg.demultiplex().unwrap());
        assert!(cfg.verbose().unwrap());
    }

    #[test]
    fn configfile_is_not_a_config_key() {
        let args = parse_args(&["-c", "run.yaml"]);
        assert_eq!(args.configfile(), Some(std::path::Path::new("run.yaml")));
        assert_eq!(args.apply_to(get_defaults()), get_defaults());
    }
}
