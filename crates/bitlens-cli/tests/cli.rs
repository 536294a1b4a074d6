use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn mk_temp_dir(name: &str) -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push(format!("bitlens-test-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents.as_bytes()).unwrap();
}

fn bitlens() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bitlens"));
    cmd.env_remove("BITLENS_FIELDS").env_remove("RUST_LOG");
    cmd
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8(out.stderr.clone()).unwrap()
}

#[test]
fn literal_is_rendered_with_breakdown() {
    let out = bitlens().arg("16'h12_34").output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "[Result] Input mode = hex, Output = hex, Alignment = byte_align\n\
         16'h12_34\n\
         byte1 [15:8]: 8'h12\n\
         byte0 [7:0]: 8'h34\n\
         --- Total 2 bytes ---\n"
    );
}

#[test]
fn options_select_modes() {
    let out = bitlens()
        .args(["--input", "dec", "--output", "dec", "26"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let header = "[Result] Input mode = dec, Output = dec, Alignment = byte_align";
    assert!(stdout(&out).starts_with(&format!("{header}\n26\n")));
}

#[test]
fn range_and_field_extraction() {
    let out = bitlens()
        .args(["8'hA3", "r4-7", "r7-4", "valid"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = stdout(&out);
    assert_eq!(text.matches("bit 4-7 = 0b1010 (dec = 10)\n").count(), 2);
    assert!(text.ends_with("bit 0-3 [valid] = 0b0011 (dec = 3)\n"));
}

#[test]
fn compare_two_literals() {
    let out = bitlens().arg("cmp 0x1234 0x1274").output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "Value 1: 16'h12_34\n\
         Value 2: 16'h12_74\n\
         Values differ\n\
         Differing bits: bit 6\n\
         Differing fields:\n\
         \x20 flag [7:4]: 4'h03 -> 4'h07\n"
    );
}

#[test]
fn fields_file_with_comments() {
    let dir = mk_temp_dir("fields_file");
    let file = dir.join("fields.jsonc");
    let fields = r#"{
  // control register
  "fields": [
    { "name": "mode", "low": 0, "high": 1 },
    { "name": "enable", "bit": 7 }, /* top bit */
  ]
}"#;
    write_file(&file, fields);

    let out = bitlens()
        .arg("--fields")
        .arg(&file)
        .args(["8'h83", "mode", "enable", "list"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("bit 0-1 [mode] = 0b11 (dec = 3)\n"));
    assert!(text.contains("bit 7-7 [enable] = 0b1 (dec = 1)\n"));
    assert!(text.contains("Last parsed value per field:\n"));
    assert!(text.contains("\n  mode: 0b11 (dec = 3)\n"));
    assert!(text.ends_with("\n  enable: 0b1 (dec = 1)\n"));
}

#[test]
fn invalid_fields_file_keeps_current_map() {
    let dir = mk_temp_dir("bad_fields");
    let file = dir.join("fields.jsonc");
    write_file(&file, r#"[{ "name": "bad", "low": 5, "high": 2 }]"#);

    let load = format!("fields {}", file.display());
    let out = bitlens()
        .args([load.as_str(), "8'hA3", "valid"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("error: "));

    let text = stdout(&out);
    assert!(text.ends_with("bit 0-3 [valid] = 0b0011 (dec = 3)\n"));
}

#[test]
fn errors_do_not_stop_later_commands() {
    let out = bitlens()
        .args(["8'hZZ", "r0-3", "8'h0F", "r0-3"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let errors = stderr(&out);
    assert_eq!(errors.lines().count(), 2);
    assert!(errors.lines().all(|line| line.starts_with("error: ")));
    assert!(stdout(&out).ends_with("bit 0-3 = 0b1111 (dec = 15)\n"));
}

#[test]
fn interactive_session_reads_stdin() {
    let mut child = bitlens()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"to_dec\n1234\nq\n").unwrap();
    drop(stdin);

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Output format changed to: dec"));
    assert!(text.contains("\n4660\n"));
    assert!(text.trim_end().ends_with("Exiting."));
}

#[test]
fn interactive_session_ends_on_eof() {
    let mut child = bitlens()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdin.take());

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert!(!stdout(&out).contains("Exiting."));
}
