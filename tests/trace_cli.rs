use itest_common::ClassFileBuilder;
use serde_json::{json, Value};
use std::process::Command;

fn greeter(test_name: &str) -> std::path::PathBuf {
    let mut builder = ClassFileBuilder::new("com/example/Greeter");
    let println = builder.method_ref("java/io/PrintStream", "println", "(Ljava/lang/String;)V");
    let out = builder.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
    let [p_hi, p_lo] = println.to_be_bytes();
    let [o_hi, o_lo] = out.to_be_bytes();
    builder
        .method(
            "greet",
            "(Ljava/lang/String;)V",
            Some(vec![0xb2, o_hi, o_lo, 0x2b, 0xb6, p_hi, p_lo, 0xb1]),
        )
        .write_temp(test_name)
}

fn run(args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_class-trace"))
        .args(args)
        .output()
        .expect("couldn't run class-trace");
    assert!(
        output.status.success(),
        "class-trace failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("output should be json")
}

#[test]
fn trace_to_stdout() {
    let path = greeter("trace_to_stdout");
    let document = run(&[path.to_str().unwrap()]);
    assert_eq!(
        document,
        json!({
            "kind": "Controller",
            "clazz": "com.example.Greeter",
            "method": [{
                "method": "greet",
                "signature": "(Ljava/lang/String;)V",
                "input": ["Ljava/lang/String;"],
                "output": "V",
                "ops": [
                    {
                        "op": "getstatic",
                        "var": "java/lang/System.out",
                        "type": "Ljava/io/PrintStream;"
                    },
                    {
                        "op": "invokevirtual",
                        "var": "java/io/PrintStream.println",
                        "type": "(Ljava/lang/String;)V"
                    },
                    {"op": "return"}
                ]
            }]
        })
    );
}

#[test]
fn trace_to_file_with_options() {
    let path = greeter("trace_to_file_with_options");
    let output = std::env::temp_dir().join(format!(
        "class-trace-{}-trace_to_file_with_options.json",
        std::process::id()
    ));
    let status = Command::new(env!("CARGO_BIN_EXE_class-trace"))
        .arg(&path)
        .args(["--kind", "Service", "--keep-all", "-o"])
        .arg(&output)
        .status()
        .expect("couldn't run class-trace");
    assert!(status.success());

    let document: Value =
        serde_json::from_slice(&std::fs::read(&output).expect("output should exist")).unwrap();
    assert_eq!(document["kind"], "Service");
    let ops = document["method"][0]["ops"].as_array().unwrap();
    assert_eq!(ops.len(), 4);
    assert_eq!(ops[1], json!({"op": "aload_1"}));
}

#[test]
fn limit_applies_before_filter() {
    let path = greeter("limit_applies_before_filter");
    let document = run(&[path.to_str().unwrap(), "--limit", "2"]);
    assert_eq!(
        document["method"][0]["ops"],
        json!([{"op": "getstatic", "var": "java/lang/System.out", "type": "Ljava/io/PrintStream;"}])
    );
}

#[test]
fn invalid_class_fails() {
    let path =
        std::env::temp_dir().join(format!("class-trace-{}-invalid.class", std::process::id()));
    std::fs::write(&path, [0xde, 0xad, 0xbe, 0xef]).unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_class-trace"))
        .arg(&path)
        .output()
        .expect("couldn't run class-trace");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
