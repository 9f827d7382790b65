#![allow(dead_code)]

use aks::{parse_and_run, Error, Interpreter, Value};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Writer that keeps everything the interpreter prints.
#[derive(Clone, Default)]
pub struct Captured(Rc<RefCell<Vec<u8>>>);

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn run(source: &str) -> Value {
    parse_and_run(source).unwrap()
}

pub fn run_err(source: &str) -> Error {
    parse_and_run(source).unwrap_err()
}

/// Runs `source` and returns what it printed, panicking on error.
pub fn output_of(source: &str) -> String {
    let (result, output) = run_capturing(source, "");
    result.unwrap();
    output
}

pub fn run_capturing(source: &str, stdin: &str) -> (Result<Value, Error>, String) {
    let captured = Captured::default();
    let mut interpreter = Interpreter::new()
        .with_output(captured.clone())
        .with_input(io::Cursor::new(stdin.to_string()));
    let result = interpreter.run_source(source);
    (result, captured.text())
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn string(s: &str) -> Value {
    Value::string(s)
}
