//! generate a typed graphql client from a schema and documents
//!
//! this binary produces a module set (optionally a standalone crate) with:
//! - typed `types`, `inputs`, and `fragments`
//! - per-operation response types and executable documents
//! - an async `generated()` client surface
//!
//! command help reference (kept in sync with `querygen --help`):
#[doc = concat!("```text\n", include_str!("querygen-help.txt"), "\n```")]
pub const CLI_HELP: &str = include_str!("querygen-help.txt");

use querygen::{generate_from_glob, GeneratorConfig};
use reqwest::blocking::Client as BlockingClient;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
struct Args {
    url: Option<String>,
    token: Option<String>,
    schema_path: Option<PathBuf>,
    documents: Option<String>,
    out_dir: PathBuf,
    crate_name: Option<String>,
    runtime_path: Option<String>,
    config_path: Option<PathBuf>,
    no_collapse: bool,
}

enum ParseArgsError {
    Help,
    Message(String),
}

fn main() {
    env_logger::init();

    let args = match parse_args(std::env::args().collect()) {
        Ok(args) => args,
        Err(ParseArgsError::Help) => {
            print!("{CLI_HELP}");
            return;
        }
        Err(ParseArgsError::Message(err)) => {
            eprintln!("{err}\n\n{CLI_HELP}");
            std::process::exit(1);
        }
    };

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let schema = match load_schema(&args) {
        Ok(schema) => schema,
        Err(err) => {
            eprintln!("failed to load schema: {err}");
            std::process::exit(1);
        }
    };

    let files = match generate_from_glob(&config, &schema) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("codegen failed: {err}");
            std::process::exit(1);
        }
    };

    if files.is_empty() {
        println!("nothing to generate");
        return;
    }

    if let Err(err) = files.write_to(&args.out_dir) {
        eprintln!("failed to write output: {err}");
        std::process::exit(1);
    }

    println!(
        "generated {} files in {}",
        files.files().len(),
        args.out_dir.display()
    );
}

fn parse_args(args: Vec<String>) -> Result<Args, ParseArgsError> {
    let mut url = None;
    let mut token = None;
    let mut schema_path = None;
    let mut documents = None;
    let mut out_dir = None;
    let mut crate_name = None;
    let mut runtime_path = None;
    let mut config_path = None;
    let mut no_collapse = false;

    let mut iter = args.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--url" => url = iter.next(),
            "--token" => token = iter.next(),
            "--schema" => schema_path = iter.next().map(PathBuf::from),
            "--documents" => documents = iter.next(),
            "--out" => out_dir = iter.next().map(PathBuf::from),
            "--crate-name" => crate_name = iter.next(),
            "--runtime-path" => runtime_path = iter.next(),
            "--config" => config_path = iter.next().map(PathBuf::from),
            "--no-collapse" => no_collapse = true,
            "--help" | "-h" => return Err(ParseArgsError::Help),
            _ => return Err(ParseArgsError::Message(format!("unknown argument: {arg}"))),
        }
    }

    let out_dir =
        out_dir.ok_or_else(|| ParseArgsError::Message("--out is required".to_string()))?;

    if url.is_none() && schema_path.is_none() {
        return Err(ParseArgsError::Message(
            "--url or --schema is required".to_string(),
        ));
    }

    Ok(Args {
        url,
        token,
        schema_path,
        documents,
        out_dir,
        crate_name,
        runtime_path,
        config_path,
        no_collapse,
    })
}

fn build_config(args: &Args) -> Result<GeneratorConfig, String> {
    let mut config = match &args.config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
            GeneratorConfig::from_json(&text).map_err(|err| err.to_string())?
        }
        None => GeneratorConfig::new(),
    };

    if let Some(documents) = &args.documents {
        config = config.with_documents(documents.clone());
    }
    if let Some(crate_name) = &args.crate_name {
        config = config.with_crate_name(crate_name.clone());
    }
    if let Some(runtime_path) = &args.runtime_path {
        config = config.with_runtime_path(runtime_path.clone());
    }
    if args.no_collapse {
        config = config.with_collapse_lonely(false);
    }

    Ok(config)
}

fn load_schema(args: &Args) -> Result<String, String> {
    if let Some(schema_path) = &args.schema_path {
        return fs::read_to_string(schema_path)
            .map_err(|err| format!("failed to read {}: {err}", schema_path.display()));
    }

    let url = args
        .url
        .as_ref()
        .ok_or_else(|| "--url is required when --schema not provided".to_string())?;

    let mut headers = HeaderMap::new();
    if let Some(token) = &args.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| err.to_string())?,
        );
    }

    let client = BlockingClient::new();
    let response = client
        .get(url)
        .headers(headers)
        .send()
        .map_err(|err| err.to_string())?;

    if !response.status().is_success() {
        return Err(format!("schema fetch returned {}", response.status()));
    }

    response
        .text()
        .map_err(|err| format!("failed to read schema response: {err}"))
}
