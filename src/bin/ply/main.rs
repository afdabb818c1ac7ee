//! PLY CLI - Tool for inspecting PLY files.

use plyfile::codec::encode_text;
use plyfile::{Element, EmptyLinePolicy, ListCountMode, Ply, Property, ReadOptions, Value};
use std::env;
use std::path::Path;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut opts = ReadOptions::default();
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "off",
            "--no-mmap" => opts.use_mmap = false,
            "--fixed-counts" => opts.list_counts = ListCountMode::Fixed32,
            "--skip-empty" => opts.empty_lines = EmptyLinePolicy::Skip,
            "-V" | "--version" => {
                print_version();
                return;
            }
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
    filtered_args.retain(|&s| s != "--json" && s != "-j");

    match filtered_args[0] {
        "info" | "i" => {
            let path = require_file(&filtered_args, "info <file.ply>");
            cmd_info(&load(path, &opts));
        }
        "header" | "hd" => {
            let path = require_file(&filtered_args, "header <file.ply>");
            print!("{}", load(path, &opts));
        }
        "dump" | "d" => {
            let path = require_file(&filtered_args, "dump <file.ply> [element] [--json]");
            let ply = load(path, &opts);
            cmd_dump(&ply, filtered_args.get(2).copied(), json_mode);
        }
        "verts" | "vx" => {
            let path = require_file(&filtered_args, "verts <file.ply> [--json]");
            cmd_verts(&load(path, &opts), json_mode);
        }
        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(&load(filtered_args[0], &opts));
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env("PLY_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_version() {
    println!(
        "ply-cli {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("PLY_BUILD_DATE"),
        env!("PLY_BUILD_TIME")
    );
}

fn print_help() {
    println!("ply-cli - PLY file toolkit");
    println!();
    println!("USAGE:");
    println!("    ply-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>               Show encoding, elements and metadata");
    println!("    hd, header <file>              Print the parsed header");
    println!("    d, dump   <file> [element]     Dump decoded rows (all elements by default)");
    println!("    vx, verts <file>               Print vertex positions");
    println!("    h, help                        Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress log output");
    println!("    -j, --json       JSON output for dump/verts");
    println!("    --no-mmap        Read through a buffered file instead of a memory map");
    println!("    --fixed-counts   Read binary list counts as 4-byte unsigned integers");
    println!("    --skip-empty     Leave rows unset for empty ASCII lines instead of failing");
    println!("    -V, --version    Show version and build date");
    println!();
    println!("ENVIRONMENT:");
    println!("    PLY_LOG          Log filter, overrides -v/-vv/-q (e.g. PLY_LOG=plyfile=trace)");
    println!();
    println!("EXAMPLES:");
    println!("    ply-cli info bunny.ply             # Quick overview");
    println!("    ply-cli dump cube.ply face         # Rows of the face element");
    println!("    ply-cli verts scan.ply --json      # Positions as JSON");
}

fn require_file<'a>(args: &[&'a str], usage: &str) -> &'a str {
    match args.get(1) {
        Some(&path) => path,
        None => {
            eprintln!("Error: missing file argument");
            eprintln!("Usage: ply-cli {}", usage);
            std::process::exit(1);
        }
    }
}

fn load(path: &str, opts: &ReadOptions) -> Ply {
    match Ply::open_opts(path, opts) {
        Ok(ply) => {
            debug!("Loaded {}", path);
            ply
        }
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn cmd_info(ply: &Ply) {
    println!("File:     {}", ply.source());
    println!("Format:   {} {}", ply.encoding(), ply.version());
    if let Some(order) = ply.byte_order() {
        println!("Order:    {}", order);
    }
    println!();

    println!("Elements:");
    for element in ply.elements() {
        println!("  {} ({} rows)", element.name(), element.count());
        for property in element.properties() {
            println!("    {}", property);
        }
    }

    if !ply.obj_info().is_empty() {
        println!();
        println!("Object info:");
        for (key, value) in ply.obj_info().iter() {
            println!("  {} = {}", key, value);
        }
    }
    if !ply.comments().is_empty() {
        println!();
        println!("Comments:");
        for comment in ply.comments() {
            println!("  {}", comment);
        }
    }
}

fn cmd_dump(ply: &Ply, element: Option<&str>, json_mode: bool) {
    let elements: Vec<&Element> = match element {
        Some(name) => match ply.element(name) {
            Some(e) => vec![e],
            None => {
                eprintln!("No element named `{}` in {}", name, ply.source());
                std::process::exit(1);
            }
        },
        None => ply.elements().iter().collect(),
    };

    if json_mode {
        let mut out = serde_json::Map::new();
        for e in &elements {
            let rows: Vec<serde_json::Value> = (0..e.count()).map(|row| row_json(e, row)).collect();
            out.insert(e.name().to_string(), serde_json::Value::Array(rows));
        }
        print_json(&serde_json::Value::Object(out));
        return;
    }

    for e in elements {
        info!("Dumping {} rows of {}", e.count(), e.name());
        println!("{}", e);
        for row in 0..e.count() {
            let fields: Vec<String> = e.properties().iter().map(|p| row_text(p, row)).collect();
            println!("{}", fields.join(" "));
        }
    }
}

fn cmd_verts(ply: &Ply, json_mode: bool) {
    let Some(positions) = ply.vertex_positions() else {
        eprintln!("No x/y/z vertex positions in {}", ply.source());
        std::process::exit(1);
    };

    if json_mode {
        let points: Vec<serde_json::Value> = positions
            .iter()
            .map(|p| serde_json::json!([p.x, p.y, p.z]))
            .collect();
        print_json(&serde_json::Value::Array(points));
        return;
    }

    for (i, p) in positions.iter().enumerate() {
        println!("{:>8}: {:>12.6} {:>12.6} {:>12.6}", i, p.x, p.y, p.z);
    }
}

/// A property's row formatted the way an ASCII body writes it.
fn row_text(property: &Property, row: usize) -> String {
    if property.is_list() {
        let items = property.list(row);
        let mut parts = vec![items.len().to_string()];
        parts.extend(items.iter().map(encode_text));
        parts.join(" ")
    } else {
        property.value(row).map_or_else(|| "-".to_string(), |v| encode_text(&v))
    }
}

fn row_json(element: &Element, row: usize) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    for p in element.properties() {
        let value = if p.is_list() {
            serde_json::Value::Array(p.list(row).iter().map(value_json).collect())
        } else {
            p.value(row).as_ref().map_or(serde_json::Value::Null, value_json)
        };
        obj.insert(p.name().to_string(), value);
    }
    serde_json::Value::Object(obj)
}

fn value_json(value: &Value) -> serde_json::Value {
    match *value {
        Value::Int8(v) => v.into(),
        Value::Int16(v) => v.into(),
        Value::Int32(v) => v.into(),
        Value::Uint8(v) => v.into(),
        Value::Uint16(v) => v.into(),
        Value::Uint32(v) => v.into(),
        Value::Float32(v) => serde_json::json!(v),
        Value::Float64(v) => serde_json::json!(v),
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}
