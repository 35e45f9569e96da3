use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn guardgen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_guardgen"));
    cmd.env("GUARDGEN_LOG", "off");
    cmd
}

#[test]
fn emit_writes_the_requested_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested/validators.ts");
    let status = guardgen()
        .arg("emit")
        .arg("--graph")
        .arg(fixture("recursive.json"))
        .args(["--source-module", "./model", "--dialect", "zod", "--types", "A", "--header", "generated"])
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("// generated\n\n"));
    assert!(text.contains("import { A as _A } from './model';"));
    assert!(text.contains("export const A: ZodType<_A> = lazy(() => object({ recurse: string().or(A), }));"));
}

#[test]
fn emit_prints_to_stdout_without_out() {
    let output = guardgen()
        .arg("emit")
        .arg("--graph")
        .arg(fixture("primitive.json"))
        .args(["--source-module", "./types", "--dialect", "io-ts", "--types", "A", "--lazy", "A"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("export const A: Type<boolean> = recursion('A', () => boolean);"), "{text}");
}

#[test]
fn emit_to_stdout_names_the_graph_in_warnings() {
    let graph = fixture("circular.json");
    let output = guardgen()
        .arg("emit")
        .arg("--graph")
        .arg(&graph)
        .args(["--source-module", "./school", "--types", "User"])
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    let expected = format!("circular reference warning(s) in {}", graph.display());
    assert!(stderr.contains(&expected), "{stderr}");
}

#[test]
fn emit_fails_on_unknown_export() {
    let output = guardgen()
        .arg("emit")
        .arg("--graph")
        .arg(fixture("primitive.json"))
        .args(["--source-module", "./types", "--types", "Nope"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("no exported type named `Nope`"), "{stderr}");
}

#[test]
fn build_generates_every_target() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = serde_json::json!({
        "dialect": "runtypes",
        "targets": [
            {
                "targetFile": "out/circular.ts",
                "graph": fixture("circular.json"),
                "sourceModule": "../school",
                "types": ["User"]
            },
            {
                "targetFile": "out/tuples.ts",
                "graph": fixture("tuples.json"),
                "sourceModule": "../tuples",
                "types": ["Spread"],
                "dialect": "zod"
            }
        ]
    });
    let manifest_path = dir.path().join("guardgen.json");
    std::fs::write(&manifest_path, manifest.to_string()).unwrap();

    let status = guardgen().arg("build").arg("--manifest").arg(&manifest_path).status().unwrap();
    assert!(status.success());

    let circular = std::fs::read_to_string(dir.path().join("out/circular.ts")).unwrap();
    assert!(circular.contains("export const User = Student.Or(Teacher);"));
    assert!(circular.contains("import { Student as _Student, Teacher as _Teacher } from '../school';"));

    let tuples = std::fs::read_to_string(dir.path().join("out/tuples.ts")).unwrap();
    assert!(tuples.contains("export const Spread = array(Any()).min(2).superRefine("));
}
