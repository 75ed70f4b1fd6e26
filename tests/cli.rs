use assert_cmd::Command;

mod common;
use common::{write_bmp, write_label_map, write_labels};

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("yolt2tfrecord 0.3.0\n");
}

#[test]
fn no_subcommand_prints_help_hint() {
    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("--help"));
}

#[test]
fn convert_directory_end_to_end() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_bmp(&temp.path().join("images/train/scene.bmp"), 16, 16);
    write_labels(
        &temp.path().join("labels/train/scene.txt"),
        "0 0.5 0.5 0.5 0.5\n",
    );
    write_label_map(&temp.path().join("classes.pbtxt"));

    let output = temp.path().join("train.tfrecord");
    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("convert")
        .arg(temp.path())
        .arg("--label-map")
        .arg(temp.path().join("classes.pbtxt"))
        .arg("--output")
        .arg(&output)
        .args(["--remap-shift", "1"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("1 record(s) written"));

    assert!(output.is_file());
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn convert_list_with_seeded_split() {
    let temp = tempfile::tempdir().expect("create temp dir");
    for name in ["a", "b", "c", "d"] {
        write_bmp(&temp.path().join(format!("images/{name}.bmp")), 8, 8);
        write_labels(
            &temp.path().join(format!("labels/{name}.txt")),
            "1 0.5 0.5 0.2 0.2\n",
        );
    }
    write_label_map(&temp.path().join("classes.pbtxt"));

    let mut list = String::new();
    for name in ["a", "b", "c", "d"] {
        list.push_str(
            temp.path()
                .join(format!("images/{name}.bmp"))
                .to_str()
                .unwrap(),
        );
        list.push('\n');
    }
    let list_path = temp.path().join("images.txt");
    std::fs::write(&list_path, list).expect("write list");

    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("convert")
        .arg(&list_path)
        .arg("--label-map")
        .arg(temp.path().join("classes.pbtxt"))
        .arg("--output")
        .arg(temp.path().join("train.tfrecord"))
        .arg("--output-val")
        .arg(temp.path().join("val.tfrecord"))
        .args(["--val-frac", "0.25", "--seed", "11", "--remap-shift", "1"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("3 train, 1 validation"));

    assert!(temp.path().join("val.tfrecord").is_file());
}

#[test]
fn images_subcommand_writes_unlabeled_records() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_bmp(&temp.path().join("frames/t.bmp"), 8, 8);

    let list_path = temp.path().join("test.txt");
    std::fs::write(
        &list_path,
        format!("{}\n", temp.path().join("frames/t.bmp").display()),
    )
    .expect("write list");

    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("images")
        .arg(&list_path)
        .arg("--output")
        .arg(temp.path().join("test.tfrecord"));
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("1 record(s) written"));
}

#[test]
fn missing_label_map_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let list_path = temp.path().join("images.txt");
    std::fs::write(&list_path, "a.bmp\n").expect("write list");

    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("convert")
        .arg(&list_path)
        .arg("--label-map")
        .arg(temp.path().join("absent.pbtxt"))
        .arg("--output")
        .arg(temp.path().join("out.tfrecord"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("error"));
}

#[test]
fn label_map_not_starting_at_one_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    std::fs::write(
        temp.path().join("classes.pbtxt"),
        "item {\n  id: 0\n  name: 'bg'\n}\n",
    )
    .expect("write label map");
    let list_path = temp.path().join("images.txt");
    std::fs::write(&list_path, "a.bmp\n").expect("write list");

    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("convert")
        .arg(&list_path)
        .arg("--label-map")
        .arg(temp.path().join("classes.pbtxt"))
        .arg("--output")
        .arg(temp.path().join("out.tfrecord"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("class ids must start with 1"));
}

#[test]
fn val_frac_requires_output_val() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let list_path = temp.path().join("images.txt");
    std::fs::write(&list_path, "a.bmp\n").expect("write list");

    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("convert")
        .arg(&list_path)
        .arg("--label-map")
        .arg(temp.path().join("classes.pbtxt"))
        .arg("--output")
        .arg(temp.path().join("out.tfrecord"))
        .args(["--val-frac", "0.2"]);
    cmd.assert().failure();
}

#[test]
fn remap_flags_are_mutually_exclusive() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let list_path = temp.path().join("images.txt");
    std::fs::write(&list_path, "a.bmp\n").expect("write list");

    let mut cmd = Command::cargo_bin("yolt2tfrecord").unwrap();
    cmd.arg("convert")
        .arg(&list_path)
        .arg("--label-map")
        .arg(temp.path().join("classes.pbtxt"))
        .arg("--output")
        .arg(temp.path().join("out.tfrecord"))
        .args(["--remap", "remap.json", "--remap-shift", "1"]);
    cmd.assert().failure();
}
