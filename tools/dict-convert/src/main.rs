use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use clap::{Arg, Command};
use opencc_chain::dictionary_lib::{reverse_mapping, write_lexicon, Lexicon, TextDict, TrieDict};

const BLUE: &str = "\x1B[1;34m"; // Bold Blue
const RESET: &str = "\x1B[0m"; // Reset color

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Trie,
}

impl Format {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Format::Text),
            "trie" => Some(Format::Trie),
            _ => None,
        }
    }

    /// `.trie` files are tries; anything else is read as text.
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("trie") => Format::Trie,
            _ => Format::Text,
        }
    }
}

fn read_lexicon(path: &Path, format: Format) -> Result<Lexicon, Box<dyn Error>> {
    Ok(match format {
        Format::Text => TextDict::load(path)?.into_lexicon(),
        Format::Trie => TrieDict::load(path)?.to_lexicon()?,
    })
}

fn write_dictionary(lexicon: &Lexicon, path: &Path, format: Format) -> Result<(), Box<dyn Error>> {
    match format {
        Format::Text => write_lexicon(lexicon, BufWriter::new(File::create(path)?))?,
        Format::Trie => TrieDict::from_lexicon(lexicon)?.save(path)?,
    }
    Ok(())
}

/// Converts `input` to `output`, returning the number of entries written.
fn convert_file(
    input: &Path,
    from: Format,
    output: &Path,
    to: Format,
) -> Result<usize, Box<dyn Error>> {
    let lexicon = read_lexicon(input, from)?;
    log::debug!(
        "read {} entries from {} ({:?})",
        lexicon.len(),
        input.display(),
        from
    );
    write_dictionary(&lexicon, output, to)?;
    Ok(lexicon.len())
}

fn reverse_file(input: &Path, output: &Path) -> Result<(), Box<dyn Error>> {
    let content = fs::read_to_string(input)?;
    fs::write(output, reverse_mapping(&content)?)?;
    Ok(())
}

fn format_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .value_name("format")
        .value_parser(["text", "trie"])
        .help(help)
}

fn io_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("input")
            .short('i')
            .long("input")
            .value_name("file")
            .required(true)
            .help("Source dictionary file"),
    )
    .arg(
        Arg::new("output")
            .short('o')
            .long("output")
            .value_name("file")
            .required(true)
            .help("Destination file"),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = Command::new("dict-convert")
        .about(format!(
            "{BLUE}dict-convert: convert dictionaries between text and trie form{RESET}"
        ))
        .after_help(
            "Examples:\n\
         \n\
         dict-convert convert -i STCharacters.txt -o STCharacters.trie\n\
         dict-convert convert --from trie --to text -i STCharacters.trie -o STCharacters.txt\n\
         dict-convert reverse -i TWPhrases.txt -o TWPhrasesRev.txt\n",
        )
        .subcommand_required(true)
        .subcommand(io_args(
            Command::new("convert")
                .about("Convert a dictionary between formats")
                .arg(format_arg("from", "from", "Input format (default: by extension)"))
                .arg(format_arg("to", "to", "Output format (default: by extension)")),
        ))
        .subcommand(io_args(
            Command::new("reverse").about("Swap keys and values of a text dictionary"),
        ))
        .get_matches();

    match matches.subcommand() {
        Some(("convert", args)) => {
            let input = Path::new(args.get_one::<String>("input").ok_or("missing --input")?);
            let output = Path::new(args.get_one::<String>("output").ok_or("missing --output")?);
            let from = args
                .get_one::<String>("from")
                .and_then(|s| Format::parse(s))
                .unwrap_or_else(|| Format::from_path(input));
            let to = args
                .get_one::<String>("to")
                .and_then(|s| Format::parse(s))
                .unwrap_or_else(|| Format::from_path(output));

            let count = convert_file(input, from, output, to)?;
            eprintln!(
                "{BLUE}{count} entries written to {} ({to:?}){RESET}",
                output.display()
            );
        }
        Some(("reverse", args)) => {
            let input = Path::new(args.get_one::<String>("input").ok_or("missing --input")?);
            let output = Path::new(args.get_one::<String>("output").ok_or("missing --output")?);
            reverse_file(input, output)?;
            eprintln!("{BLUE}Reverse mapping saved at: {}{RESET}", output.display());
        }
        other => return Err(format!("unknown subcommand: {other:?}").into()),
    }

    Ok(())
}
