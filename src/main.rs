use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, WrapErr};
use std::{fs, io::{self, Write}};
use std::path::PathBuf;
use tokcalc::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Show evaluation errors as annotated reports
    #[arg(long, global = true)]
    fancy: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the given text as one input line
    Eval { expression: String },
    /// Print the tokens of a file
    Tokenize { filename: PathBuf },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            print!("{BANNER}");
            io::stdout().flush().into_diagnostic()?;

            let mut input = String::new();
            io::stdin()
                .read_line(&mut input)
                .into_diagnostic()
                .wrap_err("reading input failed")?;
            let input = input.trim_end_matches(['\n', '\r']);

            calculate(input, cli.fancy)?;
        }
        Some(Commands::Eval { expression }) => calculate(&expression, cli.fancy)?,
        Some(Commands::Tokenize { filename }) => {
            let file_contents = fs::read_to_string(&filename)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading '{}' failed", filename.display()))?;

            for token in TokenStream::new(&file_contents) {
                let token = token
                    .map_err(|err| miette::Report::new(err).with_source_code(file_contents.clone()))?;
                println!("{token:?}");
            }
        }
    }

    Ok(())
}

fn calculate(input: &str, fancy: bool) -> miette::Result<()> {
    let mut session = Session::new(io::stdout().lock(), io::stderr().lock()).fancy(fancy);
    session.run(input)?;
    Ok(())
}
