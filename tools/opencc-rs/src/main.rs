use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};

use clap::{Arg, ArgAction, Command};
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;

use opencc_chain::{default_loader, ProfileLoader, PROFILE_IDS};

const BLUE: &str = "\x1B[1;34m";
const RESET: &str = "\x1B[0m";

fn read_input(input: &mut dyn Read, is_console: bool) -> Result<Vec<u8>, io::Error> {
    let mut buffer = Vec::new();

    if is_console {
        // Console input arrives in pieces until EOF
        let mut chunk = [0; 1024];
        loop {
            let bytes_read = input.read(&mut chunk)?;
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);
        }
    } else {
        input.read_to_end(&mut buffer)?;
    }

    Ok(buffer)
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("UTF-8") || label.eq_ignore_ascii_case("UTF8")
}

fn decode_input(buffer: &[u8], in_enc: &str) -> Result<String, io::Error> {
    let encoding = Encoding::for_label(in_enc.as_bytes()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported input encoding: {}", in_enc),
        )
    })?;
    let mut decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(buffer);
    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded)?;
    Ok(decoded)
}

fn encode_and_write_output(
    output_str: &str,
    out_enc: &str,
    output: &mut dyn Write,
) -> Result<(), io::Error> {
    if is_utf8_label(out_enc) {
        return output.write_all(output_str.as_bytes());
    }
    let encoding = Encoding::for_label(out_enc.as_bytes()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported output encoding: {}", out_enc),
        )
    })?;
    let (encoded_bytes, _, had_unmappable) = encoding.encode(output_str);
    if had_unmappable {
        log::warn!("some characters are not representable in {out_enc}");
    }
    output.write_all(&encoded_bytes)
}

fn remove_utf8_bom(input: &mut Vec<u8>) {
    // UTF-8 BOM: EF BB BF
    if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
        input.drain(0..3);
    }
}

/// `--data-dir` entries first, then the default search paths.
fn build_loader<'a>(data_dirs: impl Iterator<Item = &'a String>) -> ProfileLoader {
    let loader = data_dirs.fold(ProfileLoader::new(), |l, dir| l.with_search_path(dir));
    default_loader()
        .search_paths()
        .iter()
        .fold(loader, |l, dir| l.with_search_path(dir.clone()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = Command::new("opencc-rs")
        .about(format!(
            "{BLUE}opencc-rs: convert Chinese text through an opencc-chain profile{RESET}"
        ))
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read original text from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write converted text to <file>."),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("profile")
                .help("Profile id (s2t, s2twp, ...) or path to a profile JSON file")
                .required_unless_present("list"),
        )
        .arg(
            Arg::new("data_dir")
                .short('d')
                .long("data-dir")
                .value_name("dir")
                .action(ArgAction::Append)
                .help("Extra directory searched for profiles and dictionaries (repeatable)"),
        )
        .arg(
            Arg::new("in_enc")
                .long("in-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for input: UTF-8|GB2312|GBK|gb18030|BIG5"),
        )
        .arg(
            Arg::new("out_enc")
                .long("out-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for output: UTF-8|GB2312|GBK|gb18030|BIG5"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List built-in profile ids and exit"),
        )
        .get_matches();

    if matches.get_flag("list") {
        for id in PROFILE_IDS {
            println!("{id}");
        }
        return Ok(());
    }

    let input_file = matches.get_one::<String>("input");
    let output_file = matches.get_one::<String>("output");
    let config = matches
        .get_one::<String>("config")
        .ok_or("missing --config")?;
    let in_enc = matches
        .get_one::<String>("in_enc")
        .map(String::as_str)
        .unwrap_or("UTF-8");
    let out_enc = matches
        .get_one::<String>("out_enc")
        .map(String::as_str)
        .unwrap_or("UTF-8");

    let loader = build_loader(matches.get_many::<String>("data_dir").into_iter().flatten());
    let converter = loader.open(config)?;

    let mut input: Box<dyn Read> = match input_file {
        Some(file_name) => Box::new(BufReader::new(File::open(file_name)?)),
        None => {
            if io::stdin().is_terminal() {
                eprintln!("{BLUE}Input text to convert, <ctrl-z> or <ctrl-d> to submit:{RESET}");
            }
            Box::new(io::stdin())
        }
    };

    let is_console = input_file.is_none();
    let mut buffer = read_input(&mut *input, is_console)?;

    if is_utf8_label(in_enc) && !is_utf8_label(out_enc) {
        remove_utf8_bom(&mut buffer);
    }

    let output_str = if is_utf8_label(in_enc) {
        converter.convert_bytes(&buffer)?
    } else {
        converter.convert(&decode_input(&buffer, in_enc)?)
    };

    let mut output = BufWriter::new(match output_file {
        Some(file_name) => Box::new(File::create(file_name)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    });
    encode_and_write_output(&output_str, out_enc, &mut output)?;
    output.flush()?;

    eprintln!(
        "{BLUE}Conversion completed ({}): {} -> {}{RESET}",
        converter.name(),
        input_file.map_or("<stdin>", String::as_str),
        output_file.map_or("stdout", String::as_str)
    );
    converter.close();

    Ok(())
}
