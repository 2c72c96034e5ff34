// File: src/interpreter/native_functions/turtle.rs
//
// Turtle movement, pen and pose built-ins

use super::{expect_arity, expect_numbers};
use crate::ast::Builtin;
use crate::errors::{LogoError, SourceLocation};
use crate::interpreter::Value;
use crate::vm::{Machine, Point};

/// Handle turtle built-ins.
/// Returns None when `builtin` belongs to another category.
pub fn handle(
    machine: &mut Machine,
    builtin: Builtin,
    args: &[Value],
    location: SourceLocation,
) -> Option<Result<Value, LogoError>> {
    let result = match builtin {
        Builtin::Forward
        | Builtin::Backward
        | Builtin::Left
        | Builtin::Right
        | Builtin::Angle
        | Builtin::Thickness => single_number(machine, builtin, args, location),

        Builtin::Up | Builtin::Down => expect_arity(builtin, args, 0, location).map(|_| {
            machine.set_pen_down(builtin == Builtin::Down);
            Value::Undefined
        }),

        Builtin::Pos => expect_numbers(builtin, args, 2, location).map(|n| {
            machine.set_pos(n[0], n[1]);
            Value::Undefined
        }),

        Builtin::Line => expect_numbers(builtin, args, 4, location).map(|n| {
            machine.push_line(Point::new(n[0], n[1]), Point::new(n[2], n[3]));
            Value::Undefined
        }),

        Builtin::GetX | Builtin::GetY | Builtin::GetAngle => {
            expect_arity(builtin, args, 0, location).map(|_| {
                let pose = machine.pose();
                let n = match builtin {
                    Builtin::GetX => pose.x,
                    Builtin::GetY => pose.y,
                    _ => pose.angle,
                };
                Value::Number(n)
            })
        }

        _ => return None,
    };
    Some(result)
}

fn single_number(
    machine: &mut Machine,
    builtin: Builtin,
    args: &[Value],
    location: SourceLocation,
) -> Result<Value, LogoError> {
    let n = expect_numbers(builtin, args, 1, location)?[0];
    match builtin {
        Builtin::Forward => machine.forward(n),
        Builtin::Backward => machine.backward(n),
        Builtin::Left => machine.left(n),
        Builtin::Right => machine.right(n),
        Builtin::Angle => machine.set_angle(n),
        Builtin::Thickness => machine.set_thickness(n),
        _ => {}
    }
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::approx_eq;
    use crate::vm::{FixedViewport, Pose};

    fn machine() -> Machine {
        Machine::with_origin(Box::new(FixedViewport::new(100.0, 100.0)), Pose::default())
    }

    fn run(machine: &mut Machine, builtin: Builtin, args: &[f64]) -> Value {
        let args: Vec<Value> = args.iter().map(|n| Value::Number(*n)).collect();
        handle(machine, builtin, &args, SourceLocation::unknown())
            .expect("turtle builtin")
            .expect("call should succeed")
    }

    #[test]
    fn test_square_returns_to_start() {
        let mut m = machine();
        for _ in 0..4 {
            run(&mut m, Builtin::Forward, &[50.0]);
            run(&mut m, Builtin::Right, &[90.0]);
        }
        assert!(approx_eq(m.position().x, 0.0));
        assert!(approx_eq(m.position().y, 0.0));
        assert!(approx_eq(m.angle(), 0.0));
        assert_eq!(m.history().len(), 4);
    }

    #[test]
    fn test_pen_up_suppresses_segments() {
        let mut m = machine();
        run(&mut m, Builtin::Up, &[]);
        run(&mut m, Builtin::Backward, &[10.0]);
        assert!(approx_eq(m.position().y, 10.0));
        assert!(m.history().is_empty());
        run(&mut m, Builtin::Down, &[]);
        assert!(m.is_pen_down());
    }

    #[test]
    fn test_pos_and_line_do_not_move_through_history() {
        let mut m = machine();
        run(&mut m, Builtin::Thickness, &[3.0]);
        run(&mut m, Builtin::Pos, &[20.0, 30.0]);
        assert!(m.history().is_empty());
        run(&mut m, Builtin::Line, &[0.0, 0.0, 5.0, 5.0]);
        assert_eq!(m.history().len(), 1);
        assert_eq!(m.history()[0].thickness, 3.0);
        assert_eq!(run(&mut m, Builtin::GetX, &[]), Value::Number(20.0));
        assert_eq!(run(&mut m, Builtin::GetY, &[]), Value::Number(30.0));
    }

    #[test]
    fn test_angle_is_normalized() {
        let mut m = machine();
        run(&mut m, Builtin::Angle, &[-90.0]);
        assert_eq!(run(&mut m, Builtin::GetAngle, &[]), Value::Number(270.0));
    }

    #[test]
    fn test_other_categories_are_not_handled() {
        let mut m = machine();
        assert!(handle(&mut m, Builtin::Rand, &[], SourceLocation::unknown()).is_none());
    }
}
