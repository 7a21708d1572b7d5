//! Integration tests for per-object processing and batch runs.

use std::sync::Arc;
use std::time::Duration;

use simbad_report::{
    CatalogError, PipelineError, PipelineOptions, RateGate, ReportPipeline, input_lines,
};
use tempfile::TempDir;

mod support;
use support::fake_catalog::FakeCatalog;

fn options(dir: &TempDir) -> PipelineOptions {
    PipelineOptions {
        output_dir: dir.path().to_path_buf(),
        ..PipelineOptions::default()
    }
}

#[tokio::test]
async fn test_process_writes_named_report() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(FakeCatalog::orion());
    let pipeline = ReportPipeline::new(
        catalog.clone(),
        Arc::new(RateGate::disabled()),
        options(&dir),
    );

    let path = pipeline.process("05 35 24.550 -05 06 59.00").await.unwrap();
    assert_eq!(path, dir.path().join("J053524.550-050659.000.txt"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Identifier: [RRC99] VLA 7\n"));
    assert!(text.contains("Reipurth99 [1999AJ....118..983R]"));
    assert!(text.contains("\nAll types: Rad ([RRC99])\n"));
    assert_eq!(catalog.region_calls(), 1);
    assert_eq!(catalog.page_calls(), 1);
}

#[tokio::test]
async fn test_batch_continues_after_failures() {
    let dir = TempDir::new().unwrap();
    let pipeline = ReportPipeline::new(
        Arc::new(FakeCatalog::orion()),
        Arc::new(RateGate::disabled()),
        options(&dir),
    );

    let input = "\
# Orion sources
05 35 24.550 -05 06 59.00
not a coordinate
21 39 00.0 +57 29 24

05 35 27.63370 -05 09 34.3737
";
    let summary = pipeline.run_batch(input_lines(input)).await;

    assert_eq!(summary.total(), 4);
    assert_eq!(summary.completed(), 2);
    assert_eq!(summary.failed(), 2);
    assert_eq!(
        summary.written,
        vec![
            dir.path().join("J053524.550-050659.000.txt"),
            dir.path().join("J053527.634-050934.374.txt"),
        ]
    );

    assert_eq!(summary.failures[0].index, 2);
    assert_eq!(summary.failures[0].line, "not a coordinate");
    assert!(matches!(
        summary.failures[0].error,
        PipelineError::Coordinates(_)
    ));

    assert_eq!(summary.failures[1].index, 3);
    assert!(matches!(
        summary.failures[1].error,
        PipelineError::Region(CatalogError::NoMatch { .. })
    ));
    assert!(
        !dir.path().join("J213900.000+572924.000.txt").exists(),
        "failed objects must not leave a report behind"
    );
}

#[tokio::test]
async fn test_missing_detail_page_fails_object() {
    let dir = TempDir::new().unwrap();
    let catalog = FakeCatalog::new()
        .with_region(
            "05 35 24.550 -05 06 59.00",
            support::fake_catalog::vla7_region(),
        )
        .with_reference(
            "1999AJ....118..983R",
            "Astron. J., 118, 983-989 (1999)",
            "REIPURTH B.",
        );
    let pipeline = ReportPipeline::new(
        Arc::new(catalog),
        Arc::new(RateGate::disabled()),
        options(&dir),
    );

    let err = pipeline
        .process("05 35 24.550 -05 06 59.00")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Taxonomy(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unwritable_output_dir_is_write_error() {
    let dir = TempDir::new().unwrap();
    let pipeline = ReportPipeline::new(
        Arc::new(FakeCatalog::orion()),
        Arc::new(RateGate::disabled()),
        PipelineOptions {
            output_dir: dir.path().join("does-not-exist"),
            ..PipelineOptions::default()
        },
    );

    let err = pipeline
        .process("05 35 24.550 -05 06 59.00")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Write { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_cache_setting_controls_reference_traffic() {
    let line = "05 35 27.63370 -05 09 34.3737";

    let dir = TempDir::new().unwrap();
    let cached = Arc::new(FakeCatalog::orion());
    ReportPipeline::new(cached.clone(), Arc::new(RateGate::disabled()), options(&dir))
        .process(line)
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let uncached = Arc::new(FakeCatalog::orion());
    ReportPipeline::new(
        uncached.clone(),
        Arc::new(RateGate::disabled()),
        PipelineOptions {
            cache_citations: false,
            ..options(&dir)
        },
    )
    .process(line)
    .await
    .unwrap();

    assert_eq!(cached.reference_calls(), 3);
    assert_eq!(uncached.reference_calls(), 9);
}

#[tokio::test(start_paused = true)]
async fn test_every_catalog_call_is_spaced_by_the_gate() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(FakeCatalog::orion());
    let interval = Duration::from_millis(250);
    let pipeline = ReportPipeline::new(
        catalog.clone(),
        Arc::new(RateGate::new(interval)),
        options(&dir),
    );

    let start = tokio::time::Instant::now();
    pipeline.process("05 35 24.550 -05 06 59.00").await.unwrap();
    let elapsed = start.elapsed();

    // region, detail page, one citation: the first call is free
    assert_eq!(catalog.total_calls(), 3);
    let gaps = u32::try_from(catalog.total_calls() - 1).unwrap();
    assert!(
        elapsed >= interval * gaps,
        "expected at least {:?}, got {elapsed:?}",
        interval * gaps
    );
}
