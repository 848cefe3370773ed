//! CLI output formatting for every command.
//!
//! # Variant-First Display
//!
//! Each original is a header line; its variants are indented beneath it by
//! catalog name, with dimensions, size and storage key as context. Failed
//! variants stay in the listing so a partial set is visible at a glance.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! page-12.png (PNG 1600x1200, native)
//!     thumbnail: 400x300 → page-12-thumbnail.png (48.2 KB)
//!     avatar: failed (failed to publish page-12-avatar.png: ...)
//! ```
//!
//! ## Regenerate
//!
//! ```text
//! 42 page-12.png: 7 variants
//! 43 (no filename): skipped
//!
//! Total:      2
//! Successful: 1
//! Errors:     0
//! Skipped:    1
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure and do no I/O.

use crate::catalog::CATALOG;
use crate::cleanup::CleanupReport;
use crate::generate::GenerateEvent;
use crate::imaging::Capabilities;
use crate::regenerate::{RegenerateEvent, RegenerationSummary, SkipReason};
use crate::types::VariantMetadataMap;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format a single generation progress event as display lines.
pub fn format_generate_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::Started {
            filename,
            format,
            width,
            height,
            backend,
        } => vec![format!("{filename} ({format} {width}x{height}, {backend})")],
        GenerateEvent::VariantPublished {
            name,
            filename,
            width,
            height,
            file_size,
        } => vec![format!(
            "{}{name}: {width}x{height} → {filename} ({})",
            indent(1),
            human_size(*file_size)
        )],
        GenerateEvent::VariantFailed { name, reason } => {
            vec![format!("{}{name}: failed ({reason})", indent(1))]
        }
    }
}

pub fn print_generate_event(event: &GenerateEvent) {
    for line in format_generate_event(event) {
        println!("{line}");
    }
}

/// Format a metadata map in catalog order. Catalog names absent from the map
/// are listed as missing; names outside the catalog follow at the end.
pub fn format_metadata_map(sizes: &VariantMetadataMap) -> Vec<String> {
    let mut lines = Vec::new();
    for spec in CATALOG {
        match sizes.get(spec.name) {
            Some(meta) => lines.push(format!(
                "{}{}: {}x{} {} {} {}",
                indent(1),
                spec.name,
                meta.width,
                meta.height,
                meta.mime_type,
                human_size(meta.file_size),
                meta.url
            )),
            None => lines.push(format!("{}{}: missing", indent(1), spec.name)),
        }
    }
    for (name, meta) in sizes {
        if CATALOG.iter().all(|s| s.name != name.as_str()) {
            lines.push(format!(
                "{}{}: {}x{} {} {} {}",
                indent(1),
                name,
                meta.width,
                meta.height,
                meta.mime_type,
                human_size(meta.file_size),
                meta.url
            ));
        }
    }
    lines.push(format!(
        "Generated {} of {} variants",
        sizes.len(),
        CATALOG.len()
    ));
    lines
}

pub fn print_metadata_map(sizes: &VariantMetadataMap) {
    for line in format_metadata_map(sizes) {
        println!("{line}");
    }
}

// ============================================================================
// Regenerate
// ============================================================================

pub fn format_regenerate_event(event: &RegenerateEvent) -> Vec<String> {
    match event {
        RegenerateEvent::Skipped {
            id,
            filename,
            reason,
        } => {
            let name = filename.as_deref().unwrap_or("(no filename)");
            let why = match reason {
                SkipReason::AlreadyGenerated => "skipped (already has variants)",
                SkipReason::NoFilename => "skipped",
            };
            vec![format!("{id} {name}: {why}")]
        }
        RegenerateEvent::Regenerated {
            id,
            filename,
            variants,
        } => vec![format!("{id} {filename}: {variants} variants")],
        RegenerateEvent::Failed {
            id,
            filename,
            reason,
        } => vec![format!("{id} {filename}: error ({reason})")],
    }
}

pub fn print_regenerate_event(event: &RegenerateEvent) {
    for line in format_regenerate_event(event) {
        println!("{line}");
    }
}

pub fn format_summary(summary: &RegenerationSummary) -> Vec<String> {
    vec![
        format!("Total:      {}", summary.total),
        format!("Successful: {}", summary.successful),
        format!("Errors:     {}", summary.errors),
        format!("Skipped:    {}", summary.skipped),
    ]
}

pub fn print_summary(summary: &RegenerationSummary) {
    println!();
    for line in format_summary(summary) {
        println!("{line}");
    }
}

// ============================================================================
// Delete / probe
// ============================================================================

pub fn format_cleanup_report(id: &str, report: &CleanupReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Deleted record {id} ({} of {} variants removed)",
        report.deleted.len(),
        report.attempted()
    )];
    for (key, err) in &report.failed {
        lines.push(format!("{}{key}: {err}", indent(1)));
    }
    lines
}

pub fn print_cleanup_report(id: &str, report: &CleanupReport) {
    for line in format_cleanup_report(id, report) {
        println!("{line}");
    }
}

pub fn format_capabilities(caps: &Capabilities, selected: &str) -> Vec<String> {
    vec![
        format!(
            "native:   {}",
            if caps.native { "available" } else { "unavailable" }
        ),
        "portable: available".to_string(),
        format!("selected: {selected}"),
    ]
}

pub fn print_capabilities(caps: &Capabilities, selected: &str) {
    for line in format_capabilities(caps, selected) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ImageFormat;
    use crate::store::StoreError;
    use crate::types::VariantMetadata;

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn started_event_header() {
        let lines = format_generate_event(&GenerateEvent::Started {
            filename: "page-12.png".into(),
            format: ImageFormat::Png,
            width: 1600,
            height: 1200,
            backend: "native",
        });
        assert_eq!(lines, vec!["page-12.png (PNG 1600x1200, native)"]);
    }

    #[test]
    fn published_and_failed_variants_are_indented() {
        let published = format_generate_event(&GenerateEvent::VariantPublished {
            name: "thumbnail".into(),
            filename: "page-12-thumbnail.png".into(),
            width: 400,
            height: 300,
            file_size: 100,
        });
        assert_eq!(
            published,
            vec!["    thumbnail: 400x300 → page-12-thumbnail.png (100 B)"]
        );

        let failed = format_generate_event(&GenerateEvent::VariantFailed {
            name: "avatar".into(),
            reason: "boom".into(),
        });
        assert_eq!(failed, vec!["    avatar: failed (boom)"]);
    }

    #[test]
    fn metadata_map_lists_missing_catalog_names() {
        let sizes = VariantMetadataMap::from([(
            "avatar".to_string(),
            VariantMetadata {
                url: "/m/p-avatar.jpg".into(),
                width: 200,
                height: 200,
                mime_type: "image/jpeg".into(),
                file_size: 2048,
                filename: "p-avatar.jpg".into(),
            },
        )]);
        let lines = format_metadata_map(&sizes);

        assert_eq!(lines[0], "    thumbnail: missing");
        assert!(lines.contains(&"    avatar: 200x200 image/jpeg 2.0 KB /m/p-avatar.jpg".to_string()));
        assert_eq!(lines.last().unwrap(), "Generated 1 of 7 variants");
    }

    #[test]
    fn regenerate_events() {
        let skipped = format_regenerate_event(&RegenerateEvent::Skipped {
            id: "3".into(),
            filename: None,
            reason: SkipReason::NoFilename,
        });
        assert_eq!(skipped, vec!["3 (no filename): skipped"]);

        let done = format_regenerate_event(&RegenerateEvent::Regenerated {
            id: "1".into(),
            filename: "a.png".into(),
            variants: 7,
        });
        assert_eq!(done, vec!["1 a.png: 7 variants"]);
    }

    #[test]
    fn summary_lines() {
        let lines = format_summary(&RegenerationSummary {
            total: 4,
            successful: 2,
            errors: 1,
            skipped: 1,
        });
        assert_eq!(lines[0], "Total:      4");
        assert_eq!(lines[2], "Errors:     1");
    }

    #[test]
    fn cleanup_report_shows_failures() {
        let report = CleanupReport {
            deleted: vec!["a.png".into()],
            failed: vec![(
                "b.png".into(),
                StoreError::Rejected {
                    key: "b.png".into(),
                    reason: "denied".into(),
                },
            )],
        };
        let lines = format_cleanup_report("9", &report);
        assert_eq!(lines[0], "Deleted record 9 (1 of 2 variants removed)");
        assert_eq!(lines[1], "    b.png: store rejected b.png: denied");
    }

    #[test]
    fn capabilities_lines() {
        let lines = format_capabilities(&Capabilities { native: false }, "portable");
        assert_eq!(lines[0], "native:   unavailable");
        assert_eq!(lines[2], "selected: portable");
    }
}
