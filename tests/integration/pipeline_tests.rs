//! Integration tests for the end-to-end snapshot diff pipeline

use crate::common::{assertions, sample_data, FailingDiff, KeyValueDiff, TestFixture};
use snapdiff::{PairingMode, Pipeline, PipelineConfig, RunManifest, SnapshotPair};

fn quiet_config(pairing: PairingMode) -> PipelineConfig {
    PipelineConfig {
        pairing,
        jobs: 2,
        show_progress: false,
        ..Default::default()
    }
}

fn three_snapshots(fixture: &TestFixture) {
    // a.yaml only changes between s2 and s3
    fixture.create_tar("s1.tar", &[("a.yaml", sample_data::deployment_v2())]).unwrap();
    fixture.create_tar("s2.tar", &[("a.yaml", sample_data::deployment_v2())]).unwrap();
    fixture.create_tar("s3.tar", &[("a.yaml", sample_data::deployment_v3())]).unwrap();
}

#[test]
fn test_only_changed_pair_produces_records() {
    let fixture = TestFixture::new().unwrap();
    three_snapshots(&fixture);

    let run = fixture.new_run().unwrap();
    let output = fixture.workspace.output_path();
    let manifest = Pipeline::with_differ(quiet_config(PairingMode::Linear), KeyValueDiff)
        .run(&fixture.archives_dir(), &run, &output)
        .unwrap();

    assert_eq!(manifest.pairs.len(), 2);
    assert_eq!(manifest.report.identical, 1);

    let records = fixture.output_records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.snapshot == "s3.tar" && r.file == "a.yaml"));

    let image = records.iter().find(|r| r.field.as_deref() == Some("image")).unwrap();
    assert_eq!(image.operation.as_deref(), Some("± value change"));
    assert_eq!(image.diff, "    - api:1.0\n    + api:1.1");

    let tier = records.iter().find(|r| r.field.as_deref() == Some("tier")).unwrap();
    assert_eq!(tier.operation.as_deref(), Some("+ one map entry added"));
    assert_eq!(tier.diff, "");
}

#[test]
fn test_cyclic_wraparound_reports_against_first_snapshot() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_tar("s1.tar", &[("a.yaml", sample_data::deployment_v1())]).unwrap();
    fixture.create_tar("s2.tar", &[("a.yaml", sample_data::deployment_v2())]).unwrap();

    let run = fixture.new_run().unwrap();
    let manifest = Pipeline::with_differ(quiet_config(PairingMode::Cyclic), KeyValueDiff)
        .run(&fixture.archives_dir(), &run, &fixture.workspace.output_path())
        .unwrap();

    assert_eq!(
        manifest.pairs,
        vec![SnapshotPair::new("s1.tar", "s2.tar"), SnapshotPair::new("s2.tar", "s1.tar")]
    );
    let snapshots: Vec<String> = fixture.output_records().into_iter().map(|r| r.snapshot).collect();
    assert_eq!(snapshots, vec!["s2.tar", "s1.tar"]);
}

#[test]
fn test_linear_pairing_is_default() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_tar("s1.tar", &[("a.yaml", sample_data::deployment_v1())]).unwrap();
    fixture.create_tar("s2.tar", &[("a.yaml", sample_data::deployment_v2())]).unwrap();
    fixture.create_tar("s3.tar", &[("a.yaml", sample_data::deployment_v3())]).unwrap();

    let run = fixture.new_run().unwrap();
    let config = PipelineConfig {
        show_progress: false,
        ..Default::default()
    };
    let manifest = Pipeline::with_differ(config, KeyValueDiff)
        .run(&fixture.archives_dir(), &run, &fixture.workspace.output_path())
        .unwrap();

    assert_eq!(manifest.pairing, PairingMode::Linear);
    assert_eq!(manifest.pairs.len(), 2);
    let records = fixture.output_records();
    assert_eq!(records.iter().filter(|r| r.snapshot == "s2.tar").count(), 1);
    assert_eq!(records.iter().filter(|r| r.snapshot == "s3.tar").count(), 2);
}

#[test]
fn test_paths_missing_from_a_snapshot_are_skipped() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .create_tar("s1.tar", &[("a.yaml", "x: 1\n"), ("gone.yaml", "y: 1\n"), ("notes.txt", "hi")])
        .unwrap();
    fixture.create_tar("s2.tar", &[("a.yaml", "x: 1\n"), ("new/b.json", "z: 1\n")]).unwrap();

    let run = fixture.new_run().unwrap();
    let manifest = Pipeline::with_differ(quiet_config(PairingMode::Linear), KeyValueDiff)
        .run(&fixture.archives_dir(), &run, &fixture.workspace.output_path())
        .unwrap();

    assert_eq!(manifest.member_paths, 4);
    assert_eq!(manifest.tracked_paths, 3);
    assert_eq!(manifest.report.skipped_missing, 2);
    assert_eq!(manifest.report.identical, 1);
    assert_eq!(manifest.report.invocations, 0);
    assert!(fixture.output_records().is_empty());
}

#[test]
fn test_output_is_appended_across_runs() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_tar("s1.tar", &[("a.yaml", sample_data::deployment_v1())]).unwrap();
    fixture.create_tar_zst("s2.tar.zst", &[("a.yaml", sample_data::deployment_v2())]).unwrap();

    for _ in 0..2 {
        let run = fixture.new_run().unwrap();
        Pipeline::with_differ(quiet_config(PairingMode::Linear), KeyValueDiff)
            .run(&fixture.archives_dir(), &run, &fixture.workspace.output_path())
            .unwrap();
    }

    assertions::assert_valid_json_lines(&fixture.workspace.output_path());
    let records = fixture.output_records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.snapshot == "s2.tar.zst"));
}

#[test]
fn test_failures_are_reported_not_fatal() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_tar("s1.tar", &[("a.yaml", "x: 1\n"), ("b.json", "y: 1\n")]).unwrap();
    fixture.create_tar("s2.tar", &[("a.yaml", "x: 2\n"), ("b.json", "y: 2\n")]).unwrap();

    let run = fixture.new_run().unwrap();
    let manifest = Pipeline::with_differ(quiet_config(PairingMode::Linear), FailingDiff)
        .run(&fixture.archives_dir(), &run, &fixture.workspace.output_path())
        .unwrap();

    assert_eq!(manifest.report.failures.len(), 2);
    assert_eq!(manifest.tool, "failing");

    let saved = RunManifest::load(&run.manifest_path).unwrap();
    assert_eq!(saved.report.failures, manifest.report.failures);
    assert!(manifest.report.into_result().is_err());
}

#[test]
fn test_manifest_and_snapshot_layout() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_tar("s1.tar", &[("conf/a.yaml", "x: 1\n")]).unwrap();
    fixture.create_tar("s2.tar", &[("conf/a.yaml", "x: 2\n")]).unwrap();

    let run = fixture.new_run().unwrap();
    let manifest = Pipeline::with_differ(quiet_config(PairingMode::Linear), KeyValueDiff)
        .run(&fixture.archives_dir(), &run, &fixture.workspace.output_path())
        .unwrap();

    assert_eq!(manifest.snapshots, vec!["s1.tar", "s2.tar"]);
    assert_eq!(manifest.run_id, run.id);
    assert!(run.manifest_path.exists());
    assert!(run.snapshots_dir.join("s1.tar").join("conf/a.yaml").is_file());
    assert!(manifest.finished >= manifest.started);

    let records = fixture.output_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file, "conf/a.yaml");
}
