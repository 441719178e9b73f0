use clap::Parser;

/// This is a terminal survey program. It asks the questions of a survey, checks that
/// everything is answered and stores the answers as one JSON document.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the survey in JSON format: question sources,
    /// demographic fields and storage location. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The file containing the questions. Setting this option overrides the
    /// question sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub questions: Option<String>,

    /// (xlsx, csv or json) The type of the question file. By default it is inferred from the
    /// file extension, and xlsx is assumed otherwise.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, optional) A JSON object mapping field ids to answers. If provided, the answers
    /// are applied and submitted without prompting.
    #[clap(short, long, value_parser)]
    pub answers: Option<String>,

    /// (directory path or 'stdout') Where the completed survey is stored. Setting this option
    /// overrides the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected answers in JSON format. If provided,
    /// tsurvey checks that the submitted answers match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
