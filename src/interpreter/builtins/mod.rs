//! Host functions pre-populated into the root environment.
//!
//! - **IO**: `print`, `mirror`, `input`
//! - **Types**: `type`, `str`, `int`, `float`, `bool`
//! - **Misc**: `len`, `null`, `whoami`, `symbols`, `exit`, `help`

mod io;
mod misc;
mod types;

pub use io::*;
pub use misc::*;
pub use types::*;

use super::environment::Environment;
use crate::value::{Builtin, NativeFn, Value};

macro_rules! require_args {
    ($args:expr, $n:expr, $name:expr) => {
        if $args.len() < $n {
            return Err(RuntimeError::type_error(format!(
                "{}() requires {} argument(s), got {}",
                $name,
                $n,
                $args.len()
            )));
        }
    };
}

pub(crate) use require_args;

/// Every builtin, in the order `help()` lists them.
pub const BUILTINS: &[(&str, NativeFn)] = &[
    ("print", builtin_print),
    ("mirror", builtin_mirror),
    ("input", builtin_input),
    ("len", builtin_len),
    ("type", builtin_type),
    ("str", builtin_str),
    ("int", builtin_int),
    ("float", builtin_float),
    ("bool", builtin_bool),
    ("null", builtin_null),
    ("whoami", builtin_whoami),
    ("symbols", builtin_symbols),
    ("exit", builtin_exit),
    ("help", builtin_help),
];

pub fn install(env: &Environment) {
    for (name, func) in BUILTINS {
        env.define(*name, Value::Builtin(Builtin { name: *name, func: *func }));
    }
    log::debug!("installed {} builtins", BUILTINS.len());
}
