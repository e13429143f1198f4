// build.rs - compile-time limits from config/<profile>.toml
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct Limits {
    file_processing: FileProcessing,
    lexical: Lexical,
    syntax: Syntax,
    semantic: Semantic,
    logging: Logging,
}

#[derive(serde::Deserialize)]
struct FileProcessing {
    max_file_size: u64,
    max_line_count: usize,
}

#[derive(serde::Deserialize)]
struct Lexical {
    max_lexeme_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct Syntax {
    max_stack_depth: usize,
    max_error_history: usize,
    max_recovery_scans: usize,
}

#[derive(serde::Deserialize)]
struct Semantic {
    max_temporaries: usize,
    max_semantic_errors: usize,
    literal_buffer_size: usize,
}

#[derive(serde::Deserialize)]
struct Logging {
    log_buffer_size: usize,
    max_log_events_per_file: usize,
    security_min_log_level: u8,
}

const FILE_SIZE_CEILING: u64 = 1_000_000_000;
const PRODUCTION_FILE_SIZE_CEILING: u64 = 50_000_000;
const STACK_DEPTH_CEILING: usize = 10_000_000;

fn main() {
    for var in ["MGOL_BUILD_PROFILE", "MGOL_CONFIG_DIR"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }
    println!("cargo:rerun-if-changed=build.rs");

    let profile = env::var("MGOL_BUILD_PROFILE").unwrap_or_else(|_| "development".into());
    let path = profile_path(&profile);
    println!("cargo:rerun-if-changed={}", path.display());

    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read limits profile {}: {}", path.display(), e));
    let limits: Limits = toml::from_str(&text)
        .unwrap_or_else(|e| panic!("invalid limits profile {}: {}", path.display(), e));

    let problems = check(&limits, &profile);
    if !problems.is_empty() {
        panic!("limits profile {} rejected:\n  {}", path.display(), problems.join("\n  "));
    }

    let out = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    fs::write(out.join("constants.rs"), render(&limits, &profile))
        .expect("cannot write generated constants");
}

/// `<workspace>/<MGOL_CONFIG_DIR or config>/<profile>.toml`
fn profile_path(profile: &str) -> PathBuf {
    let manifest = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let dir = env::var("MGOL_CONFIG_DIR").unwrap_or_else(|_| "config".into());
    Path::new(&manifest)
        .parent()
        .unwrap_or_else(|| Path::new(&manifest))
        .join(dir)
        .join(format!("{}.toml", profile))
}

fn check(limits: &Limits, profile: &str) -> Vec<String> {
    let file_size = limits.file_processing.max_file_size;
    let depth = limits.syntax.max_stack_depth;
    let log = &limits.logging;

    [
        (file_size > FILE_SIZE_CEILING, format!("max_file_size above {}", FILE_SIZE_CEILING)),
        (
            profile == "production" && file_size > PRODUCTION_FILE_SIZE_CEILING,
            format!("max_file_size above {} in production", PRODUCTION_FILE_SIZE_CEILING),
        ),
        (
            depth == 0 || depth > STACK_DEPTH_CEILING,
            format!("max_stack_depth outside 1..={}", STACK_DEPTH_CEILING),
        ),
        (
            limits.semantic.literal_buffer_size < 2,
            "literal_buffer_size cannot hold one character plus quotes".to_string(),
        ),
        (log.security_min_log_level > 2, "security_min_log_level above 2".to_string()),
        (
            log.max_log_events_per_file > log.log_buffer_size,
            "max_log_events_per_file above log_buffer_size".to_string(),
        ),
    ]
    .into_iter()
    .filter_map(|(failed, problem)| failed.then_some(problem))
    .collect()
}

fn render(limits: &Limits, profile: &str) -> String {
    let sections: [(&str, Vec<(&str, &str, String)>); 5] = [
        (
            "file_processing",
            vec![
                ("MAX_FILE_SIZE", "u64", limits.file_processing.max_file_size.to_string()),
                ("MAX_LINE_COUNT", "usize", limits.file_processing.max_line_count.to_string()),
            ],
        ),
        (
            "lexical",
            vec![
                ("MAX_LEXEME_LENGTH", "usize", limits.lexical.max_lexeme_length.to_string()),
                ("MAX_TOKEN_COUNT", "usize", limits.lexical.max_token_count.to_string()),
            ],
        ),
        (
            "syntax",
            vec![
                ("MAX_STACK_DEPTH", "usize", limits.syntax.max_stack_depth.to_string()),
                ("MAX_ERROR_HISTORY", "usize", limits.syntax.max_error_history.to_string()),
                ("MAX_RECOVERY_SCANS", "usize", limits.syntax.max_recovery_scans.to_string()),
            ],
        ),
        (
            "semantic",
            vec![
                ("MAX_TEMPORARIES", "usize", limits.semantic.max_temporaries.to_string()),
                ("MAX_SEMANTIC_ERRORS", "usize", limits.semantic.max_semantic_errors.to_string()),
                ("LITERAL_BUFFER_SIZE", "usize", limits.semantic.literal_buffer_size.to_string()),
            ],
        ),
        (
            "logging",
            vec![
                ("LOG_BUFFER_SIZE", "usize", limits.logging.log_buffer_size.to_string()),
                (
                    "MAX_LOG_EVENTS_PER_FILE",
                    "usize",
                    limits.logging.max_log_events_per_file.to_string(),
                ),
                (
                    "SECURITY_MIN_LOG_LEVEL",
                    "u8",
                    limits.logging.security_min_log_level.to_string(),
                ),
            ],
        ),
    ];

    let mut code = format!("// Generated by build.rs from the '{}' profile\n\npub mod compile_time {{\n", profile);
    for (module, constants) in sections {
        let _ = writeln!(code, "    pub mod {} {{", module);
        for (name, ty, value) in constants {
            let _ = writeln!(code, "        pub const {}: {} = {};", name, ty, value);
        }
        code.push_str("    }\n");
    }
    code.push_str("}\n");
    code
}
