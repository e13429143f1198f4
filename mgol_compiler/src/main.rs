use mgol_compiler::config::RuntimeConfig;
use mgol_compiler::grammar::DecisionTables;
use mgol_compiler::logging::codes;
use mgol_compiler::utils::SourceMap;
use mgol_compiler::{lexical, logging, pipeline};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct CliOptions {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    show_tokens: bool,
    show_symbols: bool,
    tables_dir: Option<PathBuf>,
    export_tables: Option<PathBuf>,
    config_file: Option<PathBuf>,
    diagnostics: bool,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("mgolc");

    let options = match parse_options(args.get(1..).unwrap_or(&[])) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <input.mgol> [options]", program_name);
            eprintln!("       {} --help", program_name);
            std::process::exit(2);
        }
    };

    if options.help {
        print_help(program_name);
        return Ok(());
    }

    let config = match &options.config_file {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    // Preferences must be in place before the logger reads them
    if let Err(message) = logging::config::init_runtime_preferences(config.logging.clone())
        .and_then(|_| logging::init_global_logging())
    {
        eprintln!("[{}] {}", codes::system::INITIALIZATION_FAILURE, message);
        std::process::exit(1);
    }
    pipeline::validate_pipeline()?;

    let tables = match &options.tables_dir {
        Some(dir) => DecisionTables::load_dir(dir)?,
        None => DecisionTables::mgol()?,
    };

    if let Some(dir) = &options.export_tables {
        tables.export_dir(dir)?;
        println!("Decision tables written to {}", dir.display());
        if options.input.is_none() {
            return Ok(());
        }
    }

    let Some(input) = options.input.clone() else {
        eprintln!("Error: no input file given");
        eprintln!("Usage: {} <input.mgol> [options]", program_name);
        std::process::exit(2);
    };

    if options.show_tokens {
        print_tokens(&input)?;
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.codegen.default_output));
    let compiler = pipeline::Compiler::with_tables(tables, config);

    println!("Compiling: {}", input.display());

    let result = match compiler.compile_file(&input) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("\nFAILED [{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    };

    let source_map = std::fs::read(&input)
        .ok()
        .map(|bytes| SourceMap::new(String::from_utf8_lossy(&bytes).into_owned()));
    for diagnostic in &result.diagnostics {
        match &source_map {
            Some(map) => eprint!(
                "{}",
                map.format_error(
                    diagnostic.position,
                    &format!("{} [{}] {}", diagnostic.kind, diagnostic.code, diagnostic.message)
                )
            ),
            None => eprintln!("{}", diagnostic),
        }
    }

    if options.show_symbols {
        println!("\nSymbol registry:\n{}", result.symbols);
    }

    if result.program.is_some() {
        pipeline::write_output_file(&result, &output)?;
        println!("Generated {}", output.display());
    }

    logging::print_cargo_style_summary();

    if options.diagnostics {
        println!("\n{}", logging::get_system_diagnostics());
    }

    if result.success {
        println!("\nSUCCESS: {} compiled without errors", input.display());
        Ok(())
    } else {
        eprintln!(
            "\nFAILED: {} lexical, {} syntax, {} semantic error(s)",
            result.lexical_errors().count(),
            result.syntax_errors().count(),
            result.semantic_errors().count()
        );
        std::process::exit(1);
    }
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--tokens" => options.show_tokens = true,
            "--symbols" => options.show_symbols = true,
            "--diagnostics" => options.diagnostics = true,
            "-o" | "--output" => options.output = Some(value_for(arg, iter.next())?),
            "--tables" => options.tables_dir = Some(value_for(arg, iter.next())?),
            "--export-tables" => options.export_tables = Some(value_for(arg, iter.next())?),
            "--config" => options.config_file = Some(value_for(arg, iter.next())?),
            other if other.starts_with('-') => {
                return Err(format!("unknown option '{}'", other));
            }
            other => {
                if options.input.is_some() {
                    return Err(format!("unexpected argument '{}'", other));
                }
                options.input = Some(PathBuf::from(other));
            }
        }
    }

    Ok(options)
}

fn value_for(flag: &str, value: Option<&String>) -> Result<PathBuf, String> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| format!("{} requires a path", flag))
}

fn print_tokens(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = mgol_compiler::file_processor::process_file(input)?;
    let text = String::from_utf8_lossy(&file.contents);

    println!("Tokens:");
    for token in lexical::tokenize(&text)? {
        println!("  {:>5}  {}", token.span.start, token.value);
    }
    println!();
    Ok(())
}

fn print_help(program_name: &str) {
    println!("MGol Compiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Translates MGol programs into C");
    println!();
    println!("USAGE:");
    println!("    {} <input.mgol> [options]", program_name);
    println!("    {} --export-tables <dir>", program_name);
    println!();
    println!("OPTIONS:");
    println!("    -o, --output <file>       Write C code here (default: output.c)");
    println!("    --tokens                  Print every token before compiling");
    println!("    --symbols                 Print the symbol registry after compiling");
    println!("    --tables <dir>            Load decision tables from <dir>");
    println!("    --export-tables <dir>     Write the built-in decision tables to <dir>");
    println!("    --config <file>           Read runtime preferences from a TOML file");
    println!("    --diagnostics             Print logging system diagnostics at the end");
    println!("    -h, --help                Show this help message");
    println!();
    println!("EXIT STATUS:");
    println!("    0  compiled without errors");
    println!("    1  errors were reported");
    println!("    2  invalid command line");
    println!();

    match pipeline::get_pipeline_info() {
        Ok(info) => {
            for line in info.report().lines() {
                println!("    {}", line);
            }
        }
        Err(error) => eprintln!("Pipeline unavailable: {}", error),
    }
}
