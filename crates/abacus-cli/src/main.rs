use clap::{value_parser, Arg, ArgAction, Command, ValueHint};
use abacus_cli::input::Input;
use abacus_cli::runner::Runner;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("ABACUS_LOG", "error,abacus=info"))
        .init();

    let switch = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .long(name)
            .action(ArgAction::SetTrue)
            .help(help)
    };

    let matches = Command::new("abacus")
        .version(clap::crate_version!())
        .author("Michael Lazear <michaellazear92@gmail.com>")
        .about("Combined protein and peptide reports across proteomics experiments")
        .arg(
            Arg::new("parameters")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to configuration parameters (JSON file)")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("experiments")
                .num_args(1..)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Experiment directories to combine. Overrides the experiments \
                     listed in the configuration file.",
                )
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("fasta")
                .short('f')
                .long("fasta")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to FASTA database. Overrides the FASTA file \
                     specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_directory")
                .short('o')
                .long("output_directory")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path where combined reports will be copied. \
                     Overrides the directory specified in the configuration file.",
                )
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("tag")
                .long("tag")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Decoy tag (default = rev_)"),
        )
        .arg(
            Arg::new("plex")
                .long("plex")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Number of isobaric channels: 10, 11, 16 or 18 (default = 10)"),
        )
        .arg(
            Arg::new("prtProb")
                .long("prtProb")
                .value_parser(value_parser!(f64))
                .help("Minimum protein probability (default = 0.9)"),
        )
        .arg(
            Arg::new("pepProb")
                .long("pepProb")
                .value_parser(value_parser!(f64))
                .help("Minimum peptide probability (default = 0.5)"),
        )
        .arg(switch("protein", "Write the combined protein report"))
        .arg(switch("peptide", "Write the combined peptide report"))
        .arg(switch("razor", "Use razor peptides for protein FDR scoring"))
        .arg(switch(
            "picked",
            "Apply the picked FDR algorithm before protein scoring",
        ))
        .arg(switch(
            "uniqueonly",
            "Report isobaric quantification from unique peptides only",
        ))
        .arg(switch("labels", "Write isobaric label columns"))
        .arg(switch("reprint", "Also write reports in the Reprint format"))
        .arg(switch(
            "full",
            "Write unique and total columns next to the razor ones",
        ))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let input = Input::from_arguments(matches)?;

    let runner = input.build().and_then(Runner::new)?;
    runner.run()?;

    Ok(())
}
