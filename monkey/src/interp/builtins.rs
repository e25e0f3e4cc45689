//! Native functions visible from every scope

use super::error::{InterpResult, RuntimeError};
use super::value::{Builtin, NULL, Object};
use std::io::Write;
use tracing::debug;

/// Builtin table, searched after the environment chain
pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
];

fn check_arity(args: &[Object], want: usize) -> InterpResult<()> {
    if args.len() != want {
        return Err(RuntimeError::wrong_arguments(args.len(), want));
    }
    Ok(())
}

fn builtin_len(args: &[Object]) -> InterpResult<Object> {
    check_arity(args, 1)?;
    match &args[0] {
        Object::String(s) => Ok(Object::Integer(s.len() as i64)),
        Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
        other => Err(RuntimeError::UnsupportedArgument {
            builtin: "len",
            got: other.type_tag(),
        }),
    }
}

fn builtin_first(args: &[Object]) -> InterpResult<Object> {
    check_arity(args, 1)?;
    match &args[0] {
        Object::Array(elements) => Ok(elements.first().cloned().unwrap_or(NULL)),
        other => Err(RuntimeError::expected_array("first", other)),
    }
}

fn builtin_last(args: &[Object]) -> InterpResult<Object> {
    check_arity(args, 1)?;
    match &args[0] {
        Object::Array(elements) => Ok(elements.last().cloned().unwrap_or(NULL)),
        other => Err(RuntimeError::expected_array("last", other)),
    }
}

fn builtin_rest(args: &[Object]) -> InterpResult<Object> {
    check_arity(args, 1)?;
    match &args[0] {
        Object::Array(elements) if elements.is_empty() => Ok(NULL),
        Object::Array(elements) => Ok(Object::array(elements[1..].to_vec())),
        other => Err(RuntimeError::expected_array("rest", other)),
    }
}

fn builtin_push(args: &[Object]) -> InterpResult<Object> {
    check_arity(args, 2)?;
    match &args[0] {
        Object::Array(elements) => {
            let mut pushed = Vec::with_capacity(elements.len() + 1);
            pushed.extend(elements.iter().cloned());
            pushed.push(args[1].clone());
            Ok(Object::array(pushed))
        }
        other => Err(RuntimeError::expected_array("push", other)),
    }
}

fn builtin_puts(args: &[Object]) -> InterpResult<Object> {
    puts_to(&mut std::io::stdout().lock(), args);
    Ok(NULL)
}

/// A failed write is logged; it is not a language-level error
fn puts_to(out: &mut impl Write, args: &[Object]) {
    for arg in args {
        if let Err(err) = writeln!(out, "{arg}") {
            debug!(error = %err, "puts: write failed");
            return;
        }
    }
}
