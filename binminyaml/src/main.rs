//! minyaml command-line tool for checking, querying, and re-emitting documents.
//!
//! Usage: minyaml [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   --check                Check if input is valid (exit 0 if valid, 1 if invalid)
//!   -g, --get <PATH>       Print the node at PATH (e.g. server.ports[0])
//!   --type                 With --get, print the inferred scalar type instead
//!   --outline              Print an indented outline instead of re-emitting
//!   -i, --indent <N>       Spaces per level when emitting [default: 2, or $MINYAML_INDENT]
//!   -o, --output <FILE>    Write output to specified file
//!   -h, --help             Print help
//!   -V, --version          Print version

use libminyaml::{
    outline, parse_with_filename, to_yaml_string_with, Document, EmitOptions, Node,
};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

/// Environment variable holding the default emit indent.
const INDENT_ENV: &str = "MINYAML_INDENT";

struct Options<'a> {
    check_only: bool,
    get_path: Option<&'a str>,
    show_type: bool,
    show_outline: bool,
    emit: EmitOptions,
    output_file: Option<&'a str>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut options = Options {
        check_only: false,
        get_path: None,
        show_type: false,
        show_outline: false,
        emit: EmitOptions::default(),
        output_file: None,
    };
    let mut indent: Option<&str> = None;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("minyaml {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "--check" => {
                options.check_only = true;
            }
            "-g" | "--get" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --get requires a path argument");
                    process::exit(1);
                }
                options.get_path = Some(&args[i]);
            }
            "--type" => {
                options.show_type = true;
            }
            "--outline" => {
                options.show_outline = true;
            }
            "-i" | "--indent" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --indent requires a number");
                    process::exit(1);
                }
                indent = Some(&args[i]);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                options.output_file = Some(&args[i]);
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    if options.show_type && options.get_path.is_none() {
        eprintln!("Error: --type requires --get");
        process::exit(1);
    }

    let env_indent = std::env::var(INDENT_ENV).ok();
    if let Some(value) = indent.or(env_indent.as_deref()) {
        match value.parse::<usize>() {
            Ok(n) if n > 0 => options.emit.indent = n,
            _ => {
                eprintln!("Error: Invalid indent: {}", value);
                process::exit(1);
            }
        }
    }

    if let Some(path) = input_path {
        if Path::new(path).is_dir() {
            if !options.check_only {
                eprintln!("Error: directory input requires --check");
                process::exit(1);
            }
            let ok = check_directory(path);
            process::exit(if ok { 0 } else { 1 });
        }
    }

    let input = match input_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    let exit_code = process_input(&input, input_path, &options);
    process::exit(exit_code);
}

fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

fn parse_input(input: &str, input_file: Option<&str>) -> Option<Document> {
    let filename = input_file.map(display_name);
    match parse_with_filename(input, filename.as_deref()) {
        Ok(doc) => Some(doc),
        Err(e) => {
            if let Some(path) = input_file {
                eprintln!("{}: {}", path, e);
            } else {
                eprintln!("Parse error: {}", e);
            }
            None
        }
    }
}

fn process_input(input: &str, input_file: Option<&str>, options: &Options<'_>) -> i32 {
    let Some(doc) = parse_input(input, input_file) else {
        return 1;
    };

    if options.check_only {
        if let Some(path) = input_file {
            println!("{}: ok", path);
        }
        return 0;
    }

    let output = match options.get_path {
        Some(path) => {
            let view = doc.view().at_path(path);
            let Some(node) = view.node() else {
                eprintln!("Error: no node at {}", path);
                return 1;
            };
            if options.show_type {
                format!("{}\n", node_type(node))
            } else {
                render_node(node, options)
            }
        }
        None => render_node(doc.root(), options),
    };

    write_text_output(&output, options.output_file);
    0
}

/// Scalars print as their raw text; collections are emitted.
fn render_node(node: &Node, options: &Options<'_>) -> String {
    if options.show_outline {
        return outline(node);
    }
    match node.as_str() {
        Some(text) => format!("{}\n", text),
        None => to_yaml_string_with(node, &options.emit),
    }
}

fn node_type(node: &Node) -> &'static str {
    match node.classify() {
        Some(value) => value.type_name(),
        None if node.is_sequence() => "sequence",
        None => "mapping",
    }
}

fn check_directory(dir_path: &str) -> bool {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            process::exit(1);
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e == "yml" || e == "yaml")
        })
        .collect();
    paths.sort();

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy();
        let input = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                had_errors = true;
                continue;
            }
        };
        match parse_input(&input, Some(&path_str)) {
            Some(_) => println!("{}: ok", path_str),
            None => had_errors = true,
        }
    }
    !had_errors
}

fn write_text_output(output: &str, output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        print!("{}", output);
    }
}

fn print_help() {
    println!(
        "minyaml - check, query, and re-emit minyaml documents

USAGE:
    minyaml [OPTIONS] [FILE|DIR]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided)
                  A directory is only valid with --check, which then checks
                  every .yml and .yaml file in it

OPTIONS:
    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    -g, --get <PATH>       Print the node at PATH instead of the whole document.
                           Scalars print as raw text, collections are emitted.
                           Exits 1 if nothing is at PATH.

    --type                 With --get, print the inferred type of the node:
                           null, bool, int, float, string, sequence, or mapping

    --outline              Print an indented outline instead of re-emitting

    -i, --indent <N>       Spaces per nesting level when emitting
                           [default: 2, or ${}]

    -o, --output <FILE>    Write output to specified file

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Re-emit a document with sorted keys
    minyaml config.yml

    # Validate every document in a directory
    minyaml --check ./configs/

    # Read one value
    minyaml --get server.ports[0] config.yml

    # Ask what a value classifies as
    minyaml --get server.debug --type config.yml

    # Re-emit from stdin with four-space indentation
    cat config.yml | minyaml -i 4
",
        INDENT_ENV
    );
}
