use std::path::PathBuf;

use clap::{builder::PossibleValuesParser, command, value_parser, Arg, ArgAction, Command};

use super::LogLevel;

pub(super) fn cli_model() -> Command {
    command!()
        .about("peaclock: Predicted Epigenetic Age Clock")
        .override_usage("peaclock -i <path/to/reads> -s <species> [options]")
        .disable_version_flag(true)
        .next_help_heading("Input")
        .arg(
            Arg::new("read_path")
                .short('i')
                .long("read-path")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Input the path to the reads"),
        )
        .arg(
            Arg::new("configfile")
                .short('c')
                .long("configfile")
                .value_parser(value_parser!(PathBuf))
                .value_name("FILE")
                .help("Config file with peaclock run settings"),
        )
        .arg(
            Arg::new("barcodes_csv")
                .short('b')
                .long("barcodes-csv")
                .value_parser(value_parser!(PathBuf))
                .value_name("FILE")
                .help("CSV file describing which barcodes were used on which sample"),
        )
        .arg(
            Arg::new("barcode_kit")
                .short('k')
                .long("barcode-kit")
                .value_parser(PossibleValuesParser::new(["native", "rapid", "pcr", "all"]))
                .ignore_case(true)
                .value_name("KIT")
                .help("Indicates which barcode kit was used [default: native]"),
        )
        .next_help_heading("Demultiplexing")
        .arg(
            Arg::new("demultiplex")
                .action(ArgAction::SetTrue)
                .long("demultiplex")
                .help("Reads have not been demultiplexed: run guppy_barcoder on the read directory"),
        )
        .arg(
            Arg::new("path_to_guppy")
                .long("path-to-guppy")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Path to guppy_barcoder executable [default: search PATH]"),
        )
        .next_help_heading("Analysis")
        .arg(
            Arg::new("species")
                .short('s')
                .long("species")
                .value_parser(value_parser!(String))
                .value_name("SPECIES")
                .help("Indicate which species is being sequenced"),
        )
        .arg(
            Arg::new("report")
                .action(ArgAction::SetTrue)
                .short('r')
                .long("report")
                .help("Generate markdown report of estimated age"),
        )
        .next_help_heading("Output")
        .arg(
            Arg::new("output_prefix")
                .short('o')
                .long("output-prefix")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .help("Output prefix [default: peaclock]"),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Output directory [default: <prefix>_<species>_<date> in current directory]"),
        )
        .arg(
            Arg::new("tempdir")
                .long("tempdir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Specify where you want the temporary files to go [default: $TMPDIR]"),
        )
        .arg(
            Arg::new("no_temp")
                .action(ArgAction::SetTrue)
                .long("no-temp")
                .help("Output all intermediate files to the output directory"),
        )
        .next_help_heading("Misc")
        .arg(
            Arg::new("dry_run")
                .action(ArgAction::SetTrue)
                .short('n')
                .long("dry-run")
                .help("Go through the motions but don't actually run"),
        )
        .arg(
            // Kept as a string so that it can be checked after merging with the config file
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(String))
                .value_name("INT")
                .help("Number of threads [default: 1]"),
        )
        .arg(
            Arg::new("verbose")
                .action(ArgAction::SetTrue)
                .long("verbose")
                .help("Print lots of stuff to screen"),
        )
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("info")
                .help("Set log level"),
        )
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Print version"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_is_consistent() {
        cli_model().debug_assert();
    }

    #[test]
    fn version_flag() {
        let e = cli_model()
            .try_get_matches_from(["peaclock", "-v"])
            .unwrap_err();
        assert_eq!(e.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn barcode_kit_choices() {
        assert!(cli_model()
            .try_get_matches_from(["peaclock", "-k", "Rapid"])
            .is_ok());
        assert!(cli_model()
            .try_get_matches_from(["peaclock", "-k", "ligation"])
            .is_err());
    }

    #[test]
    fn threads_not_validated_here() {
        let m = cli_model()
            .try_get_matches_from(["peaclock", "-t", "four"])
            .unwrap();
        assert_eq!(m.get_one::<String>("threads").map(|s| s.as_str()), Some("four"));
    }
}
