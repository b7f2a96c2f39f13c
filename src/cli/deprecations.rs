use std::path::PathBuf;

use extlint::{DetectionResult, Engine, Severity};

pub(crate) fn run(
    engine: &Engine,
    paths: &[PathBuf],
    severity: Option<super::SeverityArg>,
    format: super::Format,
) {
    super::require_existing(paths);
    if engine.rules().is_empty() {
        eprintln!("No deprecation patterns loaded. Check the version manifest.");
        return;
    }

    let mut results: Vec<DetectionResult> = Vec::new();
    for path in paths {
        if path.is_dir() {
            // Directories need a kind to locate their documents.
            for (dir, kind) in super::resolve_inputs(std::slice::from_ref(path), None) {
                results.extend(engine.scan_path(&dir, kind).deprecations);
            }
        } else {
            results.push(engine.rules().scan_file(path));
        }
    }

    let has_errors = results.iter().any(DetectionResult::has_errors);

    let filter: Option<Severity> = severity.map(Severity::from);
    let shown: Vec<DetectionResult> = results
        .into_iter()
        .map(|mut r| {
            if let Some(sev) = filter {
                r.matches.retain(|m| m.severity == sev);
            }
            r
        })
        .filter(|r| !r.matches.is_empty())
        .collect();

    match format {
        super::Format::Text => print_text(&shown),
        super::Format::Json => super::print_json(&shown),
    }

    if has_errors {
        std::process::exit(1);
    }
}

fn print_text(results: &[DetectionResult]) {
    if results.is_empty() {
        eprintln!("No deprecated patterns found.");
        return;
    }

    for result in results {
        eprintln!("\n{}", result.path.display());
        for m in &result.matches {
            let marker = match m.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARN",
            };
            eprintln!("  [{marker}] Line {}: {}", m.line, m.pattern);
            eprintln!("    Found: {}", m.excerpt);
            eprintln!("    Replace with: {}", m.replacement);
            eprintln!("    Deprecated since: v{}", m.since);
        }
    }

    let count = |sev: Severity| {
        results
            .iter()
            .flat_map(|r| &r.matches)
            .filter(|m| m.severity == sev)
            .count()
    };
    eprintln!(
        "\nFound {} errors and {} warnings",
        count(Severity::Error),
        count(Severity::Warning)
    );
}
