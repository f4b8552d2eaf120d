//! Print the OpenAPI document as JSON.

use std::process::ExitCode;

use clap::Parser;
use leafline::doc::ApiDoc;
use utoipa::OpenApi;

/// Print the LeafLine OpenAPI document to stdout.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump")]
struct Args {
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let doc = ApiDoc::openapi();
    let rendered = if args.pretty {
        doc.to_pretty_json()
    } else {
        doc.to_json()
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to render OpenAPI document: {err}");
            ExitCode::FAILURE
        }
    }
}
