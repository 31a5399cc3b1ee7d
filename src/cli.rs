use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wobotc",
    about = "Compiles Wobot block projects (project.json) into C source for the board runtime."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Print the generated C source to stdout instead of writing a file."
    )]
    pub emit_stdout: bool,

    #[arg(
        long,
        help = "Treat INPUT as a message-definition source and write its translations as JSON."
    )]
    pub extract_messages: bool,
}
