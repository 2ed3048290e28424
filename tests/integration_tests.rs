use minics::analyzer::{LiteralValue, StringTable, SymbolKind, SymbolTable, ValueType, TABLE_SIZE};
use minics::codegen::{BinOp, Instr, Operand};
use minics::error::CompileError;
use minics::lexer::{Lexer, TokenKind};
use minics::{compile, Compilation};

fn compile_ok(source: &str) -> Compilation {
    match compile(source, "test.cs") {
        Ok(c) => c,
        Err(e) => panic!("compilation failed: {}", e),
    }
}

fn compile_err(source: &str) -> CompileError {
    match compile(source, "test.cs") {
        Ok(c) => panic!("expected an error, got:\n{}", c.tac),
        Err(e) => e,
    }
}

/// Wraps statements in `class T { static void Main() { ... } }`.
fn in_main(body: &str) -> String {
    format!("class T {{\n    static void Main() {{\n{}\n    }}\n}}\n", body)
}

/// TAC lines between `PROC T.Main` and `ENDP T.Main`.
fn main_body(c: &Compilation) -> Vec<String> {
    let lines = c.tac.lines();
    let start = lines.iter().position(|l| l == "PROC T.Main").unwrap();
    let end = lines.iter().position(|l| l == "ENDP T.Main").unwrap();
    lines[start + 1..end].to_vec()
}

#[test]
fn tokenize() {
    let tokens = Lexer::tokenize("x += 3.5; // done\nclass Foo", "t.cs").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::AssignOp,
            TokenKind::NumFloat,
            TokenKind::SemiColon,
            TokenKind::Comment,
            TokenKind::Class,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[2].float_value, 3.5);
    assert_eq!(tokens[5].line, 2);
}

#[test]
fn tokenize_literal_and_operators() {
    let tokens = Lexer::tokenize("write(\"hi there\") && b || c", "t.cs").unwrap();
    assert_eq!(tokens[2].kind, TokenKind::Literal);
    assert_eq!(tokens[2].lexeme, "\"hi there\"");
    assert_eq!(tokens[2].literal, "hi there");
    assert_eq!(tokens[4].kind, TokenKind::AndOp);
    assert_eq!(tokens[6].kind, TokenKind::OrOp);
}

#[test]
fn malformed_number() {
    assert!(matches!(
        Lexer::tokenize("1.2.3", "t.cs"),
        Err(CompileError::MalformedNumber { ref lexeme, .. }) if lexeme == "1.2.3"
    ));

    let err = compile_err(&in_main("int a;\na = 1.2.3;"));
    assert!(matches!(err, CompileError::MalformedNumber { line: 4, .. }));
}

#[test]
fn hash_stays_in_table() {
    for name in ["x", "Main", "a_very_long_identifier_name_indeed", ""] {
        assert!(SymbolTable::hash(name) < TABLE_SIZE);
    }
}

#[test]
fn shadowing_and_delete_depth() {
    let mut table = SymbolTable::new();
    let outer = table.insert("x", SymbolKind::variable(ValueType::Int), 1);
    let inner = table.insert("x", SymbolKind::variable(ValueType::Float), 3);
    table[inner].offset = -2;

    assert_eq!(table.lookup("x"), Some(inner));
    assert_eq!(table.lookup_symbol("x").unwrap().size, 4);

    table.delete_depth(3);
    assert_eq!(table.lookup("x"), Some(outer));
    assert_eq!(table[outer].offset, 0);
    assert!(!table.is_live(inner));
    assert!(table.get(inner).is_none());

    // nothing left at 3, and depths 0/1 are kept
    table.delete_depth(3);
    table.delete_depth(1);
    assert_eq!(table.lookup("x"), Some(outer));
    assert_eq!(table.len(), 1);
}

#[test]
fn delete_depth_only_touches_that_depth() {
    let mut table = SymbolTable::new();
    table.insert("a", SymbolKind::variable(ValueType::Int), 2);
    table.insert("b", SymbolKind::class(), 1);
    table.insert("c", SymbolKind::variable(ValueType::Int), 2);

    table.delete_depth(2);
    assert!(table.lookup("a").is_none());
    assert!(table.lookup("c").is_none());
    assert!(table.lookup("b").is_some());
}

#[test]
fn min_offset_and_depth_size() {
    let mut table = SymbolTable::new();
    assert_eq!(table.min_offset(), 0);

    let x = table.insert("x", SymbolKind::variable(ValueType::Int), 2);
    table[x].offset = -2;
    let y = table.insert("y", SymbolKind::variable(ValueType::Float), 2);
    table[y].offset = -4;
    table.insert("k", SymbolKind::class(), 1);

    assert_eq!(table.min_offset(), -4);
    assert_eq!(table.depth_size(2), 6);
    assert_eq!(table.depth_size(1), 0);
}

#[test]
fn string_pool_dedupes() {
    let mut strings = StringTable::new();
    assert_eq!(strings.intern("\"hi\""), "_S0");
    assert_eq!(strings.intern("\"bye\""), "_S1");
    assert_eq!(strings.intern("\"hi\""), "_S0");
    assert_eq!(strings.intern("\"\""), "_S2");
    assert_eq!(strings.len(), 3);
    assert_eq!(strings.lookup("_S2").unwrap().text, "\" \"");
}

#[test]
fn end_to_end_main() {
    let c = compile_ok(
        "class Foo {
    public static int Main() {
        int a;
        a = 3 + 4;
        write(a);
    }
}
",
    );

    assert_eq!(
        c.tac.lines(),
        vec![
            "PROC Foo.Main",
            "_BP-4 = 3 + 4",
            "_BP-2 = _BP-4",
            "WRI _BP-2",
            "ENDP Foo.Main",
            "START Foo.Main",
        ]
    );
    assert_eq!(c.entry, "Foo.Main");
    assert!(c.warnings.is_empty());

    let foo = c.symbols.lookup("Foo").unwrap();
    let main = c.symbols.lookup("Main").unwrap();
    assert_eq!(c.symbols[foo].depth, 1);
    assert_eq!(c.symbols[main].depth, 1);
    assert_eq!(c.symbols[main].owner, Some(foo));
    assert_eq!(c.symbols[main].size_of_locals(), 4);
    // the method's locals are gone once its body closed
    assert!(c.symbols.lookup("a").is_none());
    assert!(c.symbols[main].children.contains("int a"));
}

#[test]
fn tac_text_layout() {
    let c = compile_ok(&in_main("int a;\nwrite(a);"));
    assert_eq!(
        c.tac.to_string(),
        "PROC T.Main\n  WRI _BP-2\nENDP T.Main\nSTART T.Main\n"
    );
}

#[test]
fn parameter_offsets() {
    let c = compile_ok(
        "class P {
    static void Show(int a, float b, char c) {
        write(a, b, c);
    }
    static void Main() { }
}
",
    );

    assert_eq!(
        c.tac.lines()[..5],
        ["PROC P.Show", "WRI _BP+4", "WRI _BP+6", "WRI _BP+10", "ENDP P.Show"]
    );
    let show = c.symbols.find_method("P", "Show").unwrap();
    assert_eq!(show.num_params(), 3);
    assert_eq!(show.size_of_params(), 7);
    assert_eq!(show.size_of_locals(), 0);
    assert!(show.children.contains("int a"));
    assert!(show.children.contains("char c"));
}

#[test]
fn ref_and_out_parameters() {
    let c = compile_ok(
        "class P {
    static void Swap(ref int a, out int b) {
        b = a;
    }
    static void Main() { }
}
",
    );

    assert!(c.tac.lines().contains(&"_BP+6 = _BP+4".to_string()));
    let swap = c.symbols.find_method("P", "Swap").unwrap();
    assert!(swap.children.contains("ref int a"));
    assert!(swap.children.contains("out int b"));
}

#[test]
fn local_offsets_and_temporaries() {
    let c = compile_ok(&in_main("int x;\nfloat y;\nx = y * 3;"));
    assert_eq!(main_body(&c), vec!["_BP-6 = _BP-4 * 3", "_BP-2 = _BP-6"]);
}

#[test]
fn identities_emit_nothing() {
    let c = compile_ok(&in_main(
        "int a, b;
a = b + 0;
a = 0 + b;
a = b * 1;
a = 1 * b;
a = b / 1;
a = b - 0;",
    ));

    let body = main_body(&c);
    assert_eq!(body.len(), 6);
    assert!(body.iter().all(|l| l == "_BP-2 = _BP-4"));
}

#[test]
fn add_one_takes_increment_path() {
    let c = compile_ok(&in_main("int a, b;\na = b + 1;\nb = b - 1;\na = a * 2;"));

    let binaries: Vec<&Instr> = c
        .tac
        .instrs()
        .iter()
        .filter(|i| matches!(i, Instr::Binary { .. }))
        .collect();
    assert_eq!(binaries.len(), 3);
    assert!(binaries[0].is_increment());
    assert!(binaries[1].is_decrement());
    assert!(!binaries[2].is_increment());
    assert!(!binaries[2].is_decrement());
}

#[test]
fn folding_is_left_associative() {
    let c = compile_ok(&in_main("int a, b, c, d;\na = b - c - d;"));
    assert_eq!(
        main_body(&c),
        vec![
            "_BP-10 = _BP-4 - _BP-6",
            "_BP-12 = _BP-10 - _BP-8",
            "_BP-2 = _BP-12",
        ]
    );
}

#[test]
fn multiplication_binds_tighter() {
    let c = compile_ok(&in_main("int a, b, c, d;\na = (b + c * d) || a && 2;"));
    assert_eq!(
        main_body(&c),
        vec![
            "_BP-10 = _BP-6 * _BP-8",
            "_BP-12 = _BP-4 + _BP-10",
            "_BP-14 = _BP-2 & 2",
            "_BP-16 = _BP-12 | _BP-14",
            "_BP-2 = _BP-16",
        ]
    );
}

#[test]
fn negation() {
    let c = compile_ok(&in_main("int a, b;\na = -b;\na = -5;\na = - -5;"));
    assert_eq!(
        main_body(&c),
        vec!["_BP-6 = -_BP-4", "_BP-2 = _BP-6", "_BP-2 = -5", "_BP-2 = 5"]
    );
}

#[test]
fn compound_assignment() {
    let c = compile_ok(&in_main("int a, b;\na += 1;\na -= b;\na *= 1;"));
    assert_eq!(
        main_body(&c),
        vec!["_BP-2 = _BP-2 + 1", "_BP-2 = _BP-2 - _BP-4", "_BP-2 = _BP-2"]
    );
    assert!(c.tac.instrs()[1].is_increment());
}

#[test]
fn constants_render_as_values() {
    let c = compile_ok(&in_main(
        "const int K = 5, M = -2;\nconst char C = 'A';\nint a;\na = K + M;\nwrite(C);",
    ));
    assert_eq!(
        main_body(&c),
        vec!["_BP-4 = 5 + -2", "_BP-2 = _BP-4", "WRI 65"]
    );
}

#[test]
fn class_constants_and_fields() {
    let c = compile_ok(
        "class G {
    const float Rate = 1.5;
    int count, total;
    static void Main() {
        count = total + 2;
    }
}
",
    );

    assert_eq!(main_body_of(&c, "G"), vec!["_BP-2 = total + 2", "count = _BP-2"]);
    let g = c.symbols.lookup_symbol("G").unwrap();
    assert_eq!(g.size_of_locals(), 4);
    let rate = c.symbols.lookup_symbol("Rate").unwrap();
    assert_eq!(rate.constant_value(), Some(LiteralValue::Float(1.5)));
    assert_eq!(rate.offset, 0);
}

fn main_body_of(c: &Compilation, class: &str) -> Vec<String> {
    let lines = c.tac.lines();
    let proc = format!("PROC {}.Main", class);
    let endp = format!("ENDP {}.Main", class);
    let start = lines.iter().position(|l| *l == proc).unwrap();
    let end = lines.iter().position(|l| *l == endp).unwrap();
    lines[start + 1..end].to_vec()
}

#[test]
fn calls_constructor_and_return() {
    let c = compile_ok(
        "class Calc {
    int total;
    Calc() {
        int k;
        k = 1;
        total = k;
    }
    static int Add(int x, int y) {
        return x + y;
    }
    static void Main() {
        int r;
        r = Add(r, 5);
        Calc.Add(1, 2);
    }
}
",
    );

    assert_eq!(
        c.tac.lines(),
        vec![
            "PROC Calc.Calc",
            "_BP-2 = 1",
            "total = _BP-2",
            "ENDP Calc.Calc",
            "PROC Calc.Add",
            "_BP-2 = _BP+4 + _BP+6",
            "_AX = _BP-2",
            "ENDP Calc.Add",
            "PROC Calc.Main",
            "PUSH 5",
            "PUSH _BP-2",
            "CALL Calc.Add",
            "_BP-2 = _AX",
            "PUSH 2",
            "PUSH 1",
            "CALL Calc.Add",
            "ENDP Calc.Main",
            "START Calc.Main",
        ]
    );

    let ctor = c.symbols.find_method("Calc", "Calc").unwrap();
    assert_eq!(ctor.size_of_locals(), 2);
    // the constructor shadows the class name
    assert!(c.symbols.lookup_symbol("Calc").unwrap().is_method());
    let (_, class) = c.symbols.iter().find(|(_, s)| s.is_class()).unwrap();
    assert_eq!(class.name, "Calc");
    assert_eq!(class.size_of_locals(), 2);
}

#[test]
fn main_return_sets_no_accumulator() {
    let c = compile_ok(&in_main("int a;\nreturn a + 2;"));
    assert_eq!(main_body(&c), vec!["_BP-4 = _BP-2 + 2"]);
    assert!(!c
        .tac
        .instrs()
        .iter()
        .any(|i| matches!(i, Instr::Assign { dest: Operand::Accumulator, .. })));
}

#[test]
fn call_arguments_are_expressions() {
    let c = compile_ok(
        "class T {
    static void Put(int v) { write(v); }
    static void Main() {
        int a;
        Put(a * 2);
    }
}
",
    );
    assert_eq!(
        main_body(&c),
        vec!["_BP-4 = _BP-2 * 2", "PUSH _BP-4", "CALL T.Put"]
    );
    assert!(matches!(
        c.tac.instrs()[4],
        Instr::Binary { op: BinOp::Mul, .. }
    ));
}

#[test]
fn namespace_and_using() {
    let c = compile_ok(
        "using System;
using System.Text;
// entry point
namespace Demo.App {
    public class Prog {
        public static void Main() {
            writeln();
        }
    }
}
",
    );

    assert_eq!(
        c.tac.lines(),
        vec!["PROC Prog.Main", "WRLN", "ENDP Prog.Main", "START Prog.Main"]
    );
    let ns = c.symbols.lookup("Demo.App").unwrap();
    assert_eq!(c.symbols[ns].depth, 0);
    assert_eq!(c.symbols[ns].kind, SymbolKind::Namespace);
    assert_eq!(c.symbols.lookup_symbol("Prog").unwrap().owner, Some(ns));
}

#[test]
fn strings_are_pooled() {
    let c = compile_ok(&in_main("write(\"hi\");\nwriteln(\"hi\", 42, \"bye\");"));
    assert_eq!(
        main_body(&c),
        vec!["WRS _S0", "WRS _S0", "WRI 42", "WRS _S1", "WRLN"]
    );
    assert_eq!(c.strings.len(), 2);
}

#[test]
fn read_targets() {
    let c = compile_ok(&in_main("int a, b;\nread(a, b);"));
    assert_eq!(main_body(&c), vec!["RDI _BP-2", "RDI _BP-4"]);
}

#[test]
fn undeclared_read_is_a_warning() {
    let c = compile_ok(&in_main("int a;\na = ghost + 1;"));
    assert_eq!(c.warnings.len(), 1);
    assert!(c.warnings[0].contains("ghost"));
    assert_eq!(main_body(&c), vec!["_BP-6 = _BP-4 + 1", "_BP-2 = _BP-6"]);
}

#[test]
fn undeclared_io_target_is_fatal() {
    let err = compile_err(&in_main("write(ghost);"));
    assert!(matches!(
        err,
        CompileError::UndeclaredTarget { access: "write", ref name, .. } if name == "ghost"
    ));

    let err = compile_err(&in_main("read(ghost);"));
    assert!(matches!(
        err,
        CompileError::UndeclaredTarget { access: "read", .. }
    ));
}

#[test]
fn duplicates_are_fatal() {
    let err = compile_err(&in_main("int a;\nint a;"));
    assert!(matches!(err, CompileError::Duplicate { ref name, line: 4, .. } if name == "a"));

    let err = compile_err(
        "class T {
    static void Main() { }
    static void Main() { }
}
",
    );
    assert!(matches!(err, CompileError::Duplicate { .. }));
}

#[test]
fn same_name_in_different_scopes() {
    let c = compile_ok(
        "class A {
    int x;
    static void F(int x) { write(x); }
}
class B {
    int x;
    static void Main() { int x; write(x); }
}
",
    );
    assert!(c.tac.lines().contains(&"WRI _BP+4".to_string()));
    assert!(c.tac.lines().contains(&"WRI _BP-2".to_string()));
}

#[test]
fn assigning_a_constant_is_fatal() {
    let err = compile_err(&in_main("const int K = 1;\nK = 3;"));
    assert!(matches!(err, CompileError::AssignToConstant { ref name, .. } if name == "K"));
}

#[test]
fn mismatch_reports_location() {
    let err = compile_err(&in_main("int a\na = 1;"));
    assert_eq!(
        err.to_string(),
        "test.cs:4: expecting semicolon but found identifier"
    );
    assert_eq!(err.line(), Some(4));
}

#[test]
fn missing_main_is_reported_after_the_parse() {
    let err = compile_err("class NoMain {\n    static void Helper() { }\n}\n");
    assert!(matches!(err, CompileError::MissingMain { .. }));
    assert_eq!(err.to_string(), "Main() not found in test.cs");

    // a later syntax error wins: Main is only checked once the file is consumed
    let err = compile_err("class A { static void Helper() { } }\nclass B { int x }\n");
    assert!(matches!(err, CompileError::Mismatch { line: 2, .. }));
}

#[test]
fn truncated_input() {
    let err = compile_err("class T {\n    static void Main() {\n");
    assert!(err.to_string().ends_with("but found end of file"));
}

#[test]
fn assembly_for_main() {
    let c = compile_ok(
        "class Foo {
    int seen;
    public static int Main() {
        int a;
        a = 3 + 4;
        a += 1;
        write(a, \"done\");
        seen = a;
    }
}
",
    );

    let asm = c.assembly("foo.cs");
    let lines: Vec<&str> = asm.lines().collect();
    assert_eq!(lines[0], "; foo.cs");
    assert!(lines.contains(&"_S0 DB \"done\", '$'"));
    assert!(lines.contains(&"seen dw ?"));
    assert!(lines.contains(&"Foo_Main proc"));
    assert!(lines.contains(&"    sub sp, 4"));
    assert!(lines.contains(&"    inc word ptr [bp-2]"));
    assert!(lines.contains(&"    mov dx, OFFSET _S0"));
    assert!(lines.contains(&"    mov seen, ax"));
    assert!(lines.contains(&"    call Foo_Main"));
    assert_eq!(lines.last(), Some(&"    end start"));
}

#[test]
fn assembly_procedure_frames() {
    let c = compile_ok(
        "class M {
    static int Twice(int v) {
        return v * 2;
    }
    static void Main() {
        int r;
        r = Twice(7);
        r = r / 3;
    }
}
",
    );

    let asm = c.assembly("m.cs");
    let expected_twice = "M_Twice proc
    push bp
    mov bp, sp
    sub sp, 2
    push bx
    mov ax, [bp+4]
    mov bx, 2
    imul bx
    mov [bp-2], ax
    pop bx
    mov ax, [bp-2]
    add sp, 2
    pop bp
    ret 2
M_Twice endp
";
    assert!(asm.contains(expected_twice), "{}", asm);
    assert!(asm.contains("    push 7\n    call M_Twice\n    mov [bp-2], ax\n"));
    assert!(asm.contains("    cwd\n    idiv bx\n"));
}

#[test]
fn embedded_quotes_in_data_segment() {
    let c = compile_ok(&in_main("write('say \"hi\"');"));
    let asm = c.assembly("q.cs");
    assert!(asm.contains("_S0 DB \"say \", 34, \"hi\", 34, \"\", '$'"));
}

#[test]
fn compound_assignment_from_call() {
    let c = compile_ok(
        "class T {
    static int Five() {
        return 5;
    }
    static void Main() {
        int x;
        x = 2;
        x += Five();
        x *= Five();
    }
}
",
    );
    assert_eq!(
        main_body(&c),
        vec![
            "_BP-2 = 2",
            "CALL T.Five",
            "_BP-4 = _AX",
            "_BP-2 = _BP-2 + _BP-4",
            "CALL T.Five",
            "_BP-6 = _AX",
            "_BP-2 = _BP-2 * _BP-6",
        ]
    );

    let asm = c.assembly("t.cs");
    assert!(asm.contains(
        "    call T_Five
    mov [bp-4], ax
    mov ax, [bp-2]
    add ax, [bp-4]
    mov [bp-2], ax
"
    ));
    assert!(asm.contains(
        "    call T_Five
    mov [bp-6], ax
    push bx
    mov ax, [bp-2]
    mov bx, [bp-6]
    imul bx
    mov [bp-2], ax
    pop bx
"
    ));
    assert!(asm.contains("T_Main proc\n    push bp\n    mov bp, sp\n    sub sp, 6\n"));
}

#[test]
fn undeclared_placeholders_get_their_own_slots() {
    let c = compile_ok(&in_main("int a;\na = y + z;"));
    assert_eq!(c.warnings.len(), 2);
    assert_eq!(main_body(&c), vec!["_BP-8 = _BP-4 + _BP-6", "_BP-2 = _BP-8"]);

    let asm = c.assembly("t.cs");
    assert!(asm.contains("T_Main proc\n    push bp\n    mov bp, sp\n    sub sp, 8\n"));
}

#[test]
fn float_literals_are_truncated_in_assembly() {
    let c = compile_ok(&in_main("int a;\na = 2.5 + a;\nwrite(3.75);"));
    assert_eq!(main_body(&c)[0], "_BP-4 = 2.5 + _BP-2");

    let asm = c.assembly("t.cs");
    assert!(asm.contains("    mov ax, 2\n    add ax, [bp-2]\n"));
    assert!(asm.contains("    mov ax, 3\n    call writeint\n"));
    assert!(!asm.contains("2.5"));
    assert!(!asm.contains("3.75"));
}
