use std::path::PathBuf;

use extlint::links::{lint_plugin, LinkValidity};
use extlint::{lint_file, lint_skill, Kind, LinkReport};

pub(crate) fn run(paths: &[PathBuf], verbose: bool, format: super::Format) {
    super::require_existing(paths);

    let reports: Vec<LinkReport> = paths
        .iter()
        .flat_map(|path| {
            if path.is_dir() {
                match Kind::infer(path) {
                    Some(Kind::Plugin) => lint_plugin(path),
                    _ => lint_skill(path),
                }
            } else {
                vec![lint_file(path)]
            }
        })
        .collect();

    let broken: usize = reports.iter().map(LinkReport::broken_count).sum();

    match format {
        super::Format::Text => print_text(&reports, verbose, broken),
        super::Format::Json => super::print_json(&reports),
    }

    if broken > 0 {
        std::process::exit(1);
    }
}

fn status(validity: LinkValidity) -> &'static str {
    match validity {
        LinkValidity::External => "external",
        LinkValidity::AnchorOnly => "anchor",
        LinkValidity::ValidInternal => "ok",
        LinkValidity::Broken => "BROKEN",
    }
}

fn print_text(reports: &[LinkReport], verbose: bool, broken: usize) {
    for report in reports {
        let shown: Vec<_> = if verbose {
            report.links.iter().collect()
        } else {
            report.broken().collect()
        };
        if shown.is_empty() {
            continue;
        }
        eprintln!("\n{}", report.path.display());
        for link in shown {
            eprintln!(
                "  [{}] Line {}: {}",
                status(link.validity),
                link.line,
                link.target
            );
            if let Some(reason) = &link.reason {
                eprintln!("    {reason}");
            }
            if let Some(suggestion) = &link.suggestion {
                eprintln!("    Try: {suggestion}");
            }
        }
    }

    let total: usize = reports.iter().map(|r| r.links.len()).sum();
    eprintln!(
        "\n{} files, {total} links checked, {broken} broken",
        reports.len()
    );
}
