//! End-to-end naming + resolution scenarios against real and simulated
//! filesystems.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use artifact_paths::core::paths::basename_len;
use artifact_paths::logger::{MemorySink, ResolutionEvent};
use artifact_paths::platform::{ArtifactFs, LocalFs, MemoryFs};
use artifact_paths::resolver::ProbeOutcome;
use artifact_paths::{ArtifactRequest, ArtifactWriter, NameBuilder, SafeLengthBudget, SafePathResolver};

fn failed_test_request(root: &Path) -> ArtifactRequest {
    let mut request = ArtifactRequest::from_titles("spec1.cy.js", ["spec1", "testCase1"]);
    request.failed = true;
    request.output_root = Some(root.to_path_buf());
    request
}

fn local_writer(budget: SafeLengthBudget) -> ArtifactWriter {
    ArtifactWriter::new(Arc::new(LocalFs), budget, "unused-root", "png")
}

#[test]
fn failed_test_resolves_to_canonical_screenshot_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = local_writer(SafeLengthBudget::default())
        .reserve(&failed_test_request(dir.path()))
        .expect("reserve");
    assert_eq!(
        path,
        dir.path()
            .join("spec1.cy.js")
            .join("spec1 -- testCase1 (failed).png")
    );
    assert_eq!(fs::metadata(&path).expect("placeholder").len(), 0);
}

#[test]
fn second_run_gets_duplicate_suffix_and_first_file_is_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = local_writer(SafeLengthBudget::default());
    let request = failed_test_request(dir.path());

    let first = writer.save(&request, b"first run").expect("first");
    let second = writer.reserve(&request).expect("second");
    assert_eq!(
        second,
        dir.path()
            .join("spec1.cy.js")
            .join("spec1 -- testCase1 (failed) (1).png")
    );
    assert_eq!(fs::read(&first.path).expect("first file"), b"first run");
}

#[test]
fn n_prior_artifacts_yield_suffix_n() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = local_writer(SafeLengthBudget::default());
    let request = failed_test_request(dir.path());
    let seen: BTreeSet<PathBuf> = (0..5)
        .map(|_| writer.reserve(&request).expect("reserve"))
        .collect();

    let spec_dir = dir.path().join("spec1.cy.js");
    let expected: BTreeSet<PathBuf> = std::iter::once("spec1 -- testCase1 (failed).png".to_string())
        .chain((1..=4).map(|n| format!("spec1 -- testCase1 (failed) ({n}).png")))
        .map(|name| spec_dir.join(name))
        .collect();
    assert_eq!(seen, expected);
    assert!(expected.iter().all(|path| path.is_file()));
}

#[test]
fn overwrite_returns_the_same_unsuffixed_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = local_writer(SafeLengthBudget::default());
    let mut request = failed_test_request(dir.path());
    request.overwrite = true;

    let first = writer.save(&request, b"old").expect("first");
    let second = writer.reserve(&request).expect("second");
    assert_eq!(first.path, second);
    assert!(second.to_string_lossy().ends_with("spec1 -- testCase1 (failed).png"));
    assert!(!dir.path().join("spec1.cy.js").join("spec1 -- testCase1 (failed) (1).png").exists());
}

#[test]
fn resolution_is_deterministic_on_fresh_filesystems() {
    let request = failed_test_request(Path::new("/out"));
    let plan = NameBuilder::build(&request).without_ext(Path::new("/out"));
    let resolve_once = || {
        let fs: Arc<dyn ArtifactFs> = Arc::new(MemoryFs::new());
        SafePathResolver::new(fs, SafeLengthBudget::default())
            .resolve(&plan, "png", false)
            .expect("resolve")
    };
    assert_eq!(resolve_once(), resolve_once());
}

#[test]
fn overlong_title_is_cut_to_exact_prefix_allowance() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = local_writer(SafeLengthBudget::new(254, 64));
    let request = ArtifactRequest {
        titles: vec!["a".repeat(180).into(), "b".repeat(180).into()],
        output_root: Some(dir.path().to_path_buf()),
        ..ArtifactRequest::default()
    };

    let first = writer.reserve(&request).expect("first");
    assert_eq!(basename_len(&first), 254);
    assert!(first.to_string_lossy().ends_with("b.png"));

    let second = writer.reserve(&request).expect("second");
    assert_eq!(basename_len(&second), 254);
    assert!(second.to_string_lossy().ends_with(" (1).png"));
}

#[cfg(unix)]
#[test]
fn multibyte_names_are_cut_on_byte_boundaries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let resolver = SafePathResolver::new(Arc::new(LocalFs), SafeLengthBudget::new(101, 64));
    // 50 three-byte characters = 150 bytes; prefix allowance is 97 bytes.
    let without_ext = dir.path().join("日".repeat(50));
    let path = resolver.resolve(&without_ext, "png", false).expect("resolve");
    assert_eq!(basename_len(&path), 101);
    assert!(path.file_name().expect("name").to_str().is_none());
    assert!(path.exists());
}

#[test]
fn name_too_long_once_shrinks_budget_by_one_byte() {
    let fs = Arc::new(MemoryFs::new().with_name_max(253));
    let budget = SafeLengthBudget::new(254, 64);
    let events = Arc::new(MemorySink::new());
    let resolver = SafePathResolver::new(fs.clone(), budget.clone()).with_events(events.clone());

    let without_ext = PathBuf::from("/out").join("t".repeat(260));
    let resolution = resolver
        .resolve_traced(&without_ext, "png", false)
        .expect("resolve");

    assert_eq!(budget.current(), 253);
    assert_eq!(basename_len(&resolution.path), 253);
    let outcomes: Vec<_> = resolution.attempts.iter().map(|a| a.outcome).collect();
    assert_eq!(outcomes, vec![ProbeOutcome::NameTooLong, ProbeOutcome::Created]);
    assert_eq!(
        resolution.attempts[1].max_prefix_bytes,
        resolution.attempts[0].max_prefix_bytes - 1
    );
    assert_eq!(fs.file_paths(), vec![resolution.path.clone()]);
    assert!(matches!(
        events.events().as_slice(),
        [
            ResolutionEvent::BudgetShrunk { .. },
            ResolutionEvent::Resolved { truncated: true, .. }
        ]
    ));
}

#[test]
fn budget_is_shared_across_writers_and_never_grows() {
    let fs: Arc<dyn ArtifactFs> = Arc::new(MemoryFs::new().with_name_max(150));
    let budget = SafeLengthBudget::new(254, 64);
    let writer_a = ArtifactWriter::new(Arc::clone(&fs), budget.clone(), "/a", "png");
    let writer_b = ArtifactWriter::new(Arc::clone(&fs), budget.clone(), "/b", "mp4");

    let long_titles = ArtifactRequest::from_titles("spec.cy.js", ["x".repeat(300)]);
    writer_a.reserve(&long_titles).expect("a");
    assert_eq!(budget.current(), 150);

    let trace_before = budget.current();
    let path = writer_b.reserve(&long_titles).expect("b");
    assert_eq!(basename_len(&path), 150);
    assert!(budget.current() <= trace_before);
}

#[test]
fn floor_stops_shrinking_and_fails() {
    let fs = Arc::new(MemoryFs::new().with_name_max(20));
    let budget = SafeLengthBudget::new(80, 64);
    let resolver = SafePathResolver::new(fs.clone(), budget.clone());
    let err = resolver
        .resolve(&PathBuf::from("/out").join("f".repeat(100)), "png", false)
        .unwrap_err();
    assert_eq!(err.code(), "ART-2001");
    assert!(!err.is_retryable());
    assert!(fs.file_paths().is_empty());
    // Prefix allowance 76, 75 ... 64 all shrink; 63 is below the floor.
    assert_eq!(budget.current(), 67);
    assert_eq!(fs.create_attempts().len(), 14);
}

#[test]
fn permission_errors_are_not_retried() {
    let fs = Arc::new(MemoryFs::new().read_only());
    let budget = SafeLengthBudget::default();
    let writer = ArtifactWriter::new(fs.clone(), budget.clone(), "/out", "png");
    let err = writer
        .reserve(&ArtifactRequest::from_titles("s.cy.js", ["t"]))
        .unwrap_err();
    assert_eq!(err.code(), "ART-3002");
    assert_eq!(budget.current(), 254);
    assert!(fs.create_attempts().is_empty());
}

#[test]
fn copying_an_artifact_onto_itself_keeps_its_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let shot = dir.path().join("shot.png");
    fs::write(&shot, b"pixels").expect("seed artifact");

    let copied = local_writer(SafeLengthBudget::default())
        .copy_artifact(&shot, dir.path(), true)
        .expect("copy");
    assert_eq!(copied, shot);
    assert_eq!(fs::read(&shot).expect("artifact"), b"pixels");
}
