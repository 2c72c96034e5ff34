// Integration tests for the P-Logo interpreter
//
// These tests run complete programs through `compile_and_run` and check the
// resulting machine state. Tests cover:
// - Turtle movement and drawing history
// - Operator precedence and comparisons
// - Loops, conditionals and user functions
// - Built-in argument checking and error kinds
// - Slider variables, the value stack and machine resets

use plogo::builtins::approx_eq;
use plogo::compile_and_run;
use plogo::errors::{ErrorKind, LogoError};
use plogo::interpreter::Value;
use plogo::lexer::{tokenize, LexemeKind};
use plogo::vm::{FixedViewport, Machine, Point, Pose};
use pretty_assertions::assert_eq;

fn new_machine() -> Machine {
    Machine::with_origin(Box::new(FixedViewport::new(800.0, 600.0)), Pose::default())
}

fn run_code(code: &str) -> Machine {
    let mut machine = new_machine();
    if let Err(err) = compile_and_run(code, &mut machine) {
        panic!("{:?} failed: {}", code, err.message);
    }
    machine
}

fn run_err(code: &str) -> LogoError {
    let mut machine = new_machine();
    match compile_and_run(code, &mut machine) {
        Ok(()) => panic!("{:?} should have failed", code),
        Err(err) => err,
    }
}

fn assert_pose(machine: &Machine, x: f64, y: f64, angle: f64) {
    let pose = machine.pose();
    assert!(
        approx_eq(pose.x, x) && approx_eq(pose.y, y) && approx_eq(pose.angle, angle),
        "expected ({}, {}, {}), got {:?}",
        x,
        y,
        angle,
        pose
    );
}

#[test]
fn test_token_stream_for_function_definition() {
    let tokens = tokenize("fn circle(iter, size) { f(size) r(360 / iter) }").unwrap();
    let kinds: Vec<(LexemeKind, &str)> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
    assert_eq!(
        kinds,
        vec![
            (LexemeKind::Keyword, "fn"),
            (LexemeKind::Name, "circle"),
            (LexemeKind::ParenOpen, ""),
            (LexemeKind::Name, "iter"),
            (LexemeKind::Comma, ""),
            (LexemeKind::Name, "size"),
            (LexemeKind::ParenClose, ""),
            (LexemeKind::BraceOpen, ""),
            (LexemeKind::Name, "f"),
            (LexemeKind::ParenOpen, ""),
            (LexemeKind::Name, "size"),
            (LexemeKind::ParenClose, ""),
            (LexemeKind::Name, "r"),
            (LexemeKind::ParenOpen, ""),
            (LexemeKind::Number, "360"),
            (LexemeKind::Op, "/"),
            (LexemeKind::Name, "iter"),
            (LexemeKind::ParenClose, ""),
            (LexemeKind::BraceClose, ""),
        ]
    );
}

#[test]
fn test_forward_moves_up_the_screen() {
    let machine = run_code("forward(10)");
    assert_pose(&machine, 0.0, -10.0, 0.0);
    assert_eq!(machine.history().len(), 1);
    assert_eq!(machine.history()[0].from, Point::new(0.0, 0.0));
    assert_eq!(machine.history()[0].to, machine.position());
}

#[test]
fn test_right_turns_in_place() {
    let machine = run_code("right(90)");
    assert_pose(&machine, 0.0, 0.0, 90.0);
    assert!(machine.history().is_empty());
}

#[test]
fn test_loop_draws_three_sides() {
    let machine = run_code("loop(3) { f(100) r(90) }");
    assert_pose(&machine, 100.0, 0.0, 270.0);
    assert_eq!(machine.history().len(), 3);
}

#[test]
fn test_backward_is_negated_forward() {
    let back = run_code("r(30) backward(25)");
    let forward = run_code("r(30) forward(-25)");
    assert_eq!(back.pose(), forward.pose());
    assert_eq!(back.history(), forward.history());
}

#[test]
fn test_right_then_left_restores_heading() {
    let machine = run_code("r(123.5) l(123.5)");
    assert_pose(&machine, 0.0, 0.0, 0.0);

    let machine = run_code("l(30)");
    assert_pose(&machine, 0.0, 0.0, 330.0);

    let machine = run_code("r(720)");
    assert!(machine.angle() >= 0.0 && machine.angle() < 360.0);
}

#[test]
fn test_loop_count_edge_cases() {
    assert!(run_code("loop(0) { f(1) }").history().is_empty());
    assert_eq!(run_code("loop(7) { f(1) }").history().len(), 7);
    assert_eq!(run_code("loop(2.9) { f(1) }").history().len(), 2);
    assert!(run_code("loop(-3) { f(1) }").history().is_empty());
    assert!(run_code("loop(3) { }").history().is_empty());
}

#[test]
fn test_operator_precedence() {
    assert_pose(&run_code("forward(10 + 20)"), 0.0, -30.0, 0.0);
    assert_pose(&run_code("forward(20 - 5)"), 0.0, -15.0, 0.0);
    assert_pose(&run_code("f(10 * 10 + 10)"), 0.0, -110.0, 0.0);
    assert_pose(&run_code("f(10 + 10 * 10)"), 0.0, -110.0, 0.0);
    assert_pose(&run_code("f(5 + 10 * 10 + 10 - 5)"), 0.0, -110.0, 0.0);
}

#[test]
fn test_equal_precedence_reduces_left_to_right() {
    assert_pose(&run_code("f(10 - 5 + 2)"), 0.0, -7.0, 0.0);
    assert_pose(&run_code("f(100 / 10 / 2)"), 0.0, -5.0, 0.0);
    assert_pose(&run_code("f(20 - 10 - 5)"), 0.0, -5.0, 0.0);
}

#[test]
fn test_negative_literals() {
    assert_pose(&run_code("f(-10)"), 0.0, 10.0, 0.0);
    assert_pose(&run_code("a = 3 f(a - -5)"), 0.0, -8.0, 0.0);
    assert_pose(&run_code("f(20-5)"), 0.0, -15.0, 0.0);
}

#[test]
fn test_if_else_branches() {
    assert_pose(&run_code("if (1.5 < 3.0) { f(10) } else { f(20) }"), 0.0, -10.0, 0.0);
    assert_pose(&run_code("if (1.5 > 3.0) { f(10) } else { f(20) }"), 0.0, -20.0, 0.0);
    assert_pose(&run_code("if (2 == 2.001) { f(1) }"), 0.0, -1.0, 0.0);
    assert_pose(&run_code("if (\"a\" == \"b\") { f(1) }"), 0.0, 0.0, 0.0);
    assert_pose(&run_code("if (3 >= 3) { f(4) } else { f(8) }"), 0.0, -4.0, 0.0);
}

#[test]
fn test_user_function_walks() {
    assert_pose(&run_code("fn walk(x) { f(x) } walk(10)"), 0.0, -10.0, 0.0);
}

#[test]
fn test_user_function_redefinition_replaces() {
    let machine = run_code("fn go() { f(1) } fn go() { f(5) } go()");
    assert_pose(&machine, 0.0, -5.0, 0.0);
    assert_eq!(machine.function_names(), vec!["go".to_string()]);
}

#[test]
fn test_function_assignment_does_not_leak_to_caller() {
    let machine = run_code("a = 1 fn set() { a = 99 } set() f(a)");
    assert_pose(&machine, 0.0, -1.0, 0.0);
}

#[test]
fn test_arguments_evaluate_in_caller_frame() {
    let machine = run_code("n = 4 fn step(len) { f(len) } step(n * 2)");
    assert_pose(&machine, 0.0, -8.0, 0.0);
}

#[test]
fn test_recursive_function_with_guard() {
    let machine = run_code(
        "fn spiral(len) { if (len > 0) { f(len) r(90) spiral(len - 10) } } spiral(40)",
    );
    assert_eq!(machine.history().len(), 4);
    assert_eq!(machine.frame_depth(), 1);
}

#[test]
fn test_assignment_and_rand() {
    assert_pose(&run_code("a = 123 f(a)"), 0.0, -123.0, 0.0);

    for _ in 0..50 {
        let machine = run_code("a = rand(3, 4) f(a)");
        let y = machine.position().y;
        assert!((-4.0..=-3.0).contains(&y), "y = {}", y);

        let machine = run_code("f(rand(10, -10))");
        let y = machine.position().y;
        assert!((-10.0..=10.0).contains(&y), "y = {}", y);
    }
}

#[test]
fn test_invalid_programs_fail() {
    assert_eq!(run_err("forward").kind, ErrorKind::ParseError);
    assert_eq!(run_err("forward()").kind, ErrorKind::ArityError);
    assert_eq!(run_err("forward(\"fsd\")").kind, ErrorKind::TypeError);
    assert_eq!(run_err("forward(1, 2)").kind, ErrorKind::ArityError);
    assert_eq!(run_err("forward(1 < 2)").kind, ErrorKind::TypeError);
    assert_eq!(run_err("forward(2 + \"few\")").kind, ErrorKind::TypeError);
    assert_eq!(run_err("walk(10)").kind, ErrorKind::NameError);
    assert_eq!(run_err("f(missing)").kind, ErrorKind::NameError);
    assert_eq!(run_err("pop()").kind, ErrorKind::StackUnderflow);
    assert_eq!(run_err("f(1) $").kind, ErrorKind::LexError);
    assert_eq!(run_err("debug(\"open").kind, ErrorKind::LexError);
}

#[test]
fn test_error_location_points_at_call() {
    let err = run_err("f(1)\n  forward(\"x\")");
    assert_eq!(err.location.line, 2);
    assert_eq!(err.location.column, 3);
    assert!(err.message.contains("forward"));
}

#[test]
fn test_failed_run_keeps_partial_state() {
    let mut machine = new_machine();
    let err = compile_and_run("f(10) r(90) f(\"x\") f(10)", &mut machine).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_pose(&machine, 0.0, -10.0, 90.0);
    assert_eq!(machine.history().len(), 1);

    compile_and_run("f(5)", &mut machine).unwrap();
    assert_pose(&machine, 5.0, -10.0, 90.0);
}

#[test]
fn test_pen_and_pose_builtins() {
    let machine = run_code("u() f(10) d() pos(50, 60) angle(-90) t(4) f(10)");
    assert_pose(&machine, 40.0, 60.0, 270.0);
    assert_eq!(machine.history().len(), 1);
    assert_eq!(machine.history()[0].thickness, 4.0);
    assert_eq!(machine.history()[0].from, Point::new(50.0, 60.0));
}

#[test]
fn test_pose_readers() {
    let machine = run_code("pos(12, 34) r(45) x = getx() y = gety() a = getangle()");
    assert_eq!(machine.root_variable("x"), Some(&Value::Number(12.0)));
    assert_eq!(machine.root_variable("y"), Some(&Value::Number(34.0)));
    assert_eq!(machine.root_variable("a"), Some(&Value::Number(45.0)));
}

#[test]
fn test_viewport_builtins() {
    let machine = run_code("w = winw() h = winh() mx = midx() my = midy()");
    assert_eq!(machine.root_variable("w"), Some(&Value::Number(800.0)));
    assert_eq!(machine.root_variable("h"), Some(&Value::Number(600.0)));
    assert_eq!(machine.root_variable("mx"), Some(&Value::Number(400.0)));
    assert_eq!(machine.root_variable("my"), Some(&Value::Number(300.0)));
}

#[test]
fn test_explicit_line_ignores_pose() {
    let machine = run_code("line(1, 2, 3, 4)");
    assert_pose(&machine, 0.0, 0.0, 0.0);
    assert_eq!(machine.history()[0].from, Point::new(1.0, 2.0));
    assert_eq!(machine.history()[0].to, Point::new(3.0, 4.0));
}

#[test]
fn test_push_pop_stack() {
    let machine = run_code("push(1, 2, 3) a = pop() b = pop()");
    assert_eq!(machine.root_variable("a"), Some(&Value::Number(3.0)));
    assert_eq!(machine.root_variable("b"), Some(&Value::Number(2.0)));
    assert_eq!(machine.stack(), &[Value::Number(1.0)]);
}

#[test]
fn test_debug_messages() {
    let machine = run_code("n = 3 debug(\"n is\", n, n > 2)");
    assert_eq!(machine.messages(), &["n is 3 true".to_string()]);
}

#[test]
fn test_clear_resets_drawing_mid_run() {
    let machine = run_code("fn sq() { f(1) } f(10) x = 5 clear() f(2) y = x");
    assert_pose(&machine, 0.0, -2.0, 0.0);
    assert_eq!(machine.history().len(), 1);
    assert!(machine.function_names().is_empty());
    assert_eq!(machine.root_variable("y"), Some(&Value::Number(5.0)));
}

#[test]
fn test_slider_variables_survive_soft_reset() {
    let source = "intvar(\"sides\", 3, 12, 4) floatvar(\"len\", 1, 100, 10) loop(sides) { f(len) r(360 / sides) }";

    let mut machine = new_machine();
    compile_and_run(source, &mut machine).unwrap();
    assert_eq!(machine.history().len(), 4);

    let ints = machine.int_var_bindings();
    assert_eq!(ints.len(), 1);
    assert_eq!(ints[0].name, "sides");
    assert_eq!((ints[0].range.min, ints[0].range.max), (3, 12));
    assert_eq!(ints[0].value, Value::Number(4.0));

    assert!(machine.set_root_variable("sides", 6.0));
    assert!(machine.set_root_variable("len", 500.0));
    assert_eq!(machine.root_variable("len"), Some(&Value::Number(100.0)));

    machine.soft_reset();
    compile_and_run(source, &mut machine).unwrap();
    assert_eq!(machine.history().len(), 6);
    assert_pose(&machine, 0.0, 0.0, 0.0);

    machine.hard_reset();
    assert!(machine.root_variables().is_empty());
    compile_and_run(source, &mut machine).unwrap();
    assert_eq!(machine.history().len(), 4);
}

#[test]
fn test_full_reset_clears_everything() {
    let mut machine = new_machine();
    compile_and_run("fn go() { f(1) } intvar(\"k\", 0, 5, 1) push(7) go()", &mut machine).unwrap();

    machine.reset(true, false);
    assert!(machine.history().is_empty());
    assert!(machine.function_names().is_empty());
    assert!(machine.int_var_bindings().is_empty());
    assert!(machine.stack().is_empty());
    assert_eq!(machine.root_variable("k"), None);
    assert_eq!(machine.frame_depth(), 1);
}

#[test]
fn test_comments_and_multiline_source() {
    let source = "# square\nloop(4) {\n  f(10) # side\n  r(90)\n}\n";
    let machine = run_code(source);
    assert_eq!(machine.history().len(), 4);
    assert_pose(&machine, 0.0, 0.0, 0.0);
}

#[test]
fn test_snapshot_json_shape() {
    let machine = run_code("intvar(\"n\", 1, 3, 2) f(n)");
    let json = serde_json::to_value(machine.snapshot()).unwrap();
    assert_eq!(json["lines"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["int_vars"][0]["name"], "n");
    assert_eq!(json["root_variables"]["n"]["kind"], "Number");
}

#[test]
fn test_rand_with_extreme_bounds() {
    let big = format!("1{}", "0".repeat(308));
    let machine = run_code(&format!("a = rand(-{big}, {big}) b = rand({big}, 0)"));
    for name in ["a", "b"] {
        let value = machine.root_variable(name).and_then(Value::as_number);
        assert!(value.is_some_and(f64::is_finite), "{} = {:?}", name, value);
    }
}

#[test]
fn test_slider_bounds_given_backwards() {
    let mut machine = run_code("intvar(\"n\", 10, 1, 5) floatvar(\"k\", 2, 0.5, 1)");
    assert_eq!(machine.root_variable("n"), Some(&Value::Number(5.0)));

    assert!(machine.set_root_variable("n", 3.0));
    assert_eq!(machine.root_variable("n"), Some(&Value::Number(3.0)));
    assert!(machine.set_root_variable("k", 9.0));
    assert_eq!(machine.root_variable("k"), Some(&Value::Number(2.0)));
}

#[test]
fn test_slider_with_nan_bound_is_rejected() {
    let err = run_err("z = 0 floatvar(\"k\", z / z, 1, 0.5)");
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn test_deep_recursion_on_small_thread() {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let err = run_err(
                "fn spin(n) { if (n > -1) { loop(1) { if (1 < 2) { spin(n + 1) } } } } spin(0)",
            );
            err.kind
        })
        .unwrap();
    assert_eq!(handle.join().unwrap(), ErrorKind::RecursionLimit);
}

#[test]
fn test_unknown_function_message_suggests_once() {
    let rendered = run_err("forwad(10)").to_string();
    assert!(rendered.contains("Did you mean 'forward'?"), "{}", rendered);
    assert!(!rendered.contains("Did you mean 'Did you mean"), "{}", rendered);
}
