use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Stencil — template syntax tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the highlight tokens of a template as JSON
    Tokens {
        /// Input template file
        path: String,
    },

    /// Print the variables a template references as JSON
    Vars {
        /// Input template file
        path: String,
    },

    /// Render a template against a JSON data file
    Render {
        /// Input template file
        path: String,

        /// JSON file with the template data
        #[arg(long)]
        data: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Tokens { path } => cmd_tokens(&path),
        Command::Vars { path } => cmd_vars(&path),
        Command::Render { path, data } => cmd_render(&path, data.as_deref()),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tokens(path: &str) {
    let source = read_source(path);
    let tokens = stencil_highlight::tokenize(&source);
    print_json(&tokens);
}

fn cmd_vars(path: &str) {
    let source = read_source(path);
    let extraction = stencil_extract::extract(&source);
    print_json(&extraction);
}

fn cmd_render(path: &str, data_path: Option<&str>) {
    let source = read_source(path);

    let data = data_path.map(|p| {
        let text = read_source(p);
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Error parsing {p}: {e}");
                std::process::exit(1);
            }
        }
    });

    match stencil_render::interpolate(&source, data.as_ref(), None) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
