use std::path::PathBuf;

use extlint::{DocumentReport, Engine, ScanReport};

pub(crate) fn run(
    engine: &Engine,
    paths: &[PathBuf],
    kind: Option<super::KindArg>,
    format: super::Format,
) {
    let inputs = super::resolve_inputs(paths, kind);
    let report = engine.scan(&inputs);
    let verdict = report.verdict();

    match format {
        super::Format::Text => print_text(&report),
        super::Format::Json => super::print_json(&serde_json::json!({
            "verdict": verdict,
            "validation_passed": report.validation_passed(),
            "links_passed": report.links_passed(),
            "deprecations_passed": report.deprecations_passed(),
            "documents": report.documents,
        })),
    }

    if !verdict.is_pass() {
        std::process::exit(1);
    }
}

fn print_document(doc: &DocumentReport) {
    eprintln!("\n{}: {}", doc.kind.as_str().to_uppercase(), doc.path.display());

    let v = &doc.validation;
    if v.errors.is_empty() && v.warnings.is_empty() {
        eprintln!("  validation: ok");
    } else {
        eprintln!(
            "  validation: {} errors, {} warnings",
            v.errors.len(),
            v.warnings.len()
        );
        for d in v.errors.iter().chain(&v.warnings) {
            eprintln!("    {d}");
        }
    }

    let links: usize = doc.links.iter().map(|r| r.links.len()).sum();
    eprintln!("  links: {links} checked, {} broken", doc.broken_links());
    for link in doc.links.iter().flat_map(|r| r.broken()) {
        eprintln!(
            "    {}:{}: {}",
            link.source.display(),
            link.line,
            link.reason.as_deref().unwrap_or("broken link")
        );
    }

    let matches: Vec<_> = doc.deprecations.iter().flat_map(|r| &r.matches).collect();
    if !matches.is_empty() {
        eprintln!("  deprecations: {}", matches.len());
        for m in matches {
            eprintln!(
                "    [{}] {}:{}: {} -> {}",
                m.severity,
                m.file.display(),
                m.line,
                m.pattern,
                m.replacement
            );
        }
    }

    if let Some(tokens) = &doc.tokens {
        eprintln!(
            "  tokens: {} ({})",
            tokens.total_tokens, tokens.recommendation
        );
    }
}

fn print_text(report: &ScanReport) {
    for doc in &report.documents {
        print_document(doc);
    }
    eprintln!(
        "\n{} extensions, {} errors, {} warnings",
        report.documents.len(),
        report.error_count(),
        report.warning_count()
    );
    eprintln!("Verdict: {}", report.verdict());
}
