use std::path::PathBuf;
use std::process::Command;

use bminor_lang::project::compile_source;

fn assembly(text: &str) -> String {
    match compile_source(text) {
        Ok(compiler) => compiler.to_string(),
        Err(errs) => panic!("Expected {} to compile: {}", text, errs.join("; ")),
    }
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bminor-{}-{}", std::process::id(), name))
}

/// Assembles and links `asm` with the system C compiler and runs the
/// result.  Returns `None` when there is no C compiler to build with.
fn run(name: &str, asm: &str) -> Option<(i32, String)> {
    let src = scratch_file(&format!("{}.s", name));
    let exe = scratch_file(name);
    std::fs::write(&src, asm).expect("Failed to write assembly");

    let built = Command::new("gcc").arg(&src).arg("-o").arg(&exe).status();
    let result = match built {
        Ok(status) if status.success() => {
            let out = Command::new(&exe).output().expect("Failed to run program");
            Some((
                out.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&out.stdout).into_owned(),
            ))
        }
        Ok(status) => panic!("gcc failed to build {}: {}", name, status),
        Err(_) => None,
    };

    let _ = std::fs::remove_file(&src);
    let _ = std::fs::remove_file(&exe);
    result
}

#[test]
fn main_returns_arithmetic() {
    let asm = assembly("main: function integer () = { return 1 + 2 * 3; }");
    assert!(asm.contains(".globl main"));
    assert!(asm.contains("jmp .main_epilogue"));

    if let Some((status, _)) = run("arith", &asm) {
        assert_eq!(status, 7);
    }
}

#[test]
fn prints_every_type() {
    let asm = assembly(
        r#"
        greeting: string = "hello";
        main: function integer () = {
            print greeting, " ", 42, ' ', true, '\n';
            return 0;
        }
        "#,
    );

    if let Some((status, out)) = run("print", &asm) {
        assert_eq!(status, 0);
        assert_eq!(out, "hello 42 true\n");
    }
}

#[test]
fn loops_calls_and_arrays() {
    let asm = assembly(
        r#"
        squares: array [5] integer;

        square: function integer (n: integer);

        main: function integer () = {
            i: integer;
            total: integer = 0;
            for (i = 0; i < 5; i++) {
                squares[i] = square(i);
            }
            while (i > 0) {
                i--;
                total = total + squares[i];
            }
            print total, '\n';
            return total % 256;
        }

        square: function integer (n: integer) = {
            return n ^ 2;
        }
        "#,
    );
    assert!(asm.contains("\nsquares:\n    .zero 40\n"));
    assert!(asm.contains("call square"));
    assert!(asm.contains("call integer_power"));

    if let Some((status, out)) = run("loops", &asm) {
        assert_eq!(out, "30\n");
        assert_eq!(status, 30);
    }
}

#[test]
fn recursion_and_conditionals() {
    let asm = assembly(
        r#"
        fib: function integer (n: integer) = {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }

        main: function integer () = {
            x: integer = fib(10);
            if (x == 55 && !(x != 55)) {
                print "ok";
            } else {
                print "bad";
            }
            return x / 5 - 1;
        }
        "#,
    );

    if let Some((status, out)) = run("fib", &asm) {
        assert_eq!(out, "ok");
        assert_eq!(status, 10);
    }
}

#[test]
fn string_indexing() {
    let asm = assembly(
        r#"
        word: string = "bminor";
        main: function integer () = {
            c: char = word[2];
            print word[1], word[0], c;
            return 0;
        }
        "#,
    );
    assert!(asm.contains("movzbq"));

    if let Some((status, out)) = run("strings", &asm) {
        assert_eq!(out, "mbi");
        assert_eq!(status, 0);
    }
}

#[test]
fn resolve_errors_stop_the_pipeline() {
    let errs = match compile_source("main: function integer () = { return x + y; }") {
        Ok(_) => panic!("Expected resolve errors"),
        Err(errs) => errs,
    };
    assert_eq!(errs.len(), 2);
    assert!(errs.iter().all(|e| e.starts_with("L1: ")));
}

#[test]
fn type_errors_are_all_reported() {
    let errs = match compile_source(
        "f: function void () = { return 5; }\n\
         g: function integer (x: integer) = { return g(1, 2); }\n\
         a: array [3] integer = {1, 2};",
    ) {
        Ok(_) => panic!("Expected type errors"),
        Err(errs) => errs,
    };
    assert_eq!(errs.len(), 3);
    assert!(errs[0].starts_with("L1: "));
    assert!(errs[1].starts_with("L2: "));
    assert!(errs[2].starts_with("L3: "));
}

#[test]
fn codegen_errors_are_reported() {
    let errs = match compile_source(
        "names: array [2] string;\n\
         main: function integer () = { return 0; }",
    ) {
        Ok(_) => panic!("Expected code generation errors"),
        Err(errs) => errs,
    };
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("names"));
}

#[test]
fn every_codegen_error_in_a_function_is_reported() {
    let errs = match compile_source(
        "main: function integer () = {\n\
             a: array [2] integer;\n\
             b: array [2] integer;\n\
             return 0;\n\
         }\n\
         print_string: function void (s: string) = { }",
    ) {
        Ok(_) => panic!("Expected code generation errors"),
        Err(errs) => errs,
    };
    assert_eq!(
        errs,
        vec![
            "L2: Array a must be declared at global scope",
            "L3: Array b must be declared at global scope",
            "L6: print_string is reserved for the runtime and cannot be declared",
        ]
    );
}
