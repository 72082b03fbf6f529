use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use bmf_codec::{Font, Format};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the descriptor to convert (text, XML or binary, detected automatically)
    input: String,
    /// Path to where the converted descriptor should be written
    output: String,
    /// Output format; deduced from the output extension if omitted
    #[arg(short, long, value_enum)]
    to: Option<Target>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    Text,
    Xml,
    Binary,
    Json,
    Ron,
}

impl Target {
    fn from_path(path: &Path) -> Target {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("xml") => Target::Xml,
            Some("bin") => Target::Binary,
            Some("json") => Target::Json,
            Some("ron") => Target::Ron,
            _ => Target::Text,
        }
    }
}

fn encode(font: &Font, target: Target) -> Result<Vec<u8>, String> {
    match target {
        Target::Text => bmf_codec::serialize(font, Format::Text).map_err(|err| err.to_string()),
        Target::Xml => bmf_codec::serialize(font, Format::Xml).map_err(|err| err.to_string()),
        Target::Binary => bmf_codec::serialize(font, Format::Binary).map_err(|err| err.to_string()),
        Target::Json => serde_json::to_string_pretty(font)
            .map(String::into_bytes)
            .map_err(|err| err.to_string()),
        Target::Ron => ron::ser::to_string_pretty(font, ron::ser::PrettyConfig::default())
            .map(String::into_bytes)
            .map_err(|err| err.to_string()),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let data = match std::fs::read(&args.input) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", args.input);
            return ExitCode::FAILURE;
        }
    };

    let font = match bmf_codec::parse(&data) {
        Ok(font) => font,
        Err(err) => {
            eprintln!("Failed to parse {}: {err}", args.input);
            return ExitCode::FAILURE;
        }
    };

    let target = args.to.unwrap_or_else(|| Target::from_path(Path::new(&args.output)));
    log::info!(
        "converting {} ({} chars, {} kerning pairs) to {target:?}",
        args.input,
        font.chars.len(),
        font.kernings.len(),
    );

    let encoded = match encode(&font, target) {
        Ok(encoded) => encoded,
        Err(err) => {
            eprintln!("Failed to serialize output: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = std::fs::write(&args.output, encoded) {
        eprintln!("Unable to write {}: {err}", args.output);
        return ExitCode::FAILURE;
    }

    println!("Ok.");
    ExitCode::SUCCESS
}
