use std::path::PathBuf;

use extlint::{Engine, ValidationResult};

pub(crate) fn run(
    engine: &Engine,
    paths: &[PathBuf],
    kind: Option<super::KindArg>,
    format: super::Format,
) {
    let inputs = super::resolve_inputs(paths, kind);
    let results: Vec<ValidationResult> = inputs
        .iter()
        .map(|(path, kind)| engine.validate(path, *kind))
        .collect();

    let has_errors = results.iter().any(|r| !r.is_valid());

    match format {
        super::Format::Text => print_text(&results),
        super::Format::Json => super::print_json(&results),
    }

    if has_errors {
        std::process::exit(1);
    }
}

fn print_text(results: &[ValidationResult]) {
    let multi = results.len() > 1;
    for result in results {
        let diags: Vec<_> = result.errors.iter().chain(&result.warnings).collect();
        if multi && !diags.is_empty() {
            eprintln!("{} ({}):", result.path.display(), result.kind);
        }
        for d in diags {
            if multi {
                eprintln!("  {d}");
            } else {
                eprintln!("{d}");
            }
        }
    }

    if multi {
        let total = results.len();
        let errors = results.iter().filter(|r| !r.is_valid()).count();
        let warnings = results
            .iter()
            .filter(|r| r.is_valid() && !r.warnings.is_empty())
            .count();
        let ok = total - errors - warnings;
        eprintln!("\n{total} extensions: {ok} ok, {errors} errors, {warnings} warnings only");
    } else if results
        .iter()
        .all(|r| r.errors.is_empty() && r.warnings.is_empty())
    {
        eprintln!("ok");
    }
}
