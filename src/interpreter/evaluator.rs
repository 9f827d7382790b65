use super::builtins;
use super::control_flow::ControlFlow;
use super::environment::Environment;
use super::error::RuntimeError;
use super::parser;
use crate::ast::{BinaryOp, Block, Expr, ExprKind, Program, Stmt, UnaryOp};
use crate::diagnostic::Diagnostic;
use crate::error::Error;
use crate::format;
use crate::lexer::tokenize;
use crate::value::{Function, Value};
use indexmap::IndexMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Tree-walking evaluator. One instance keeps its global scope alive across
/// runs, which is what the REPL relies on.
pub struct Interpreter {
    globals: Rc<Environment>,
    env: Rc<Environment>,
    out: Box<dyn Write>,
    input: Box<dyn BufRead>,
    depth: usize,
    max_depth: usize,
    exit_status: Option<i32>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        builtins::install(&globals);
        Self::with_environment(globals)
    }

    /// Runs against an existing root scope. Nothing is installed into it.
    pub fn with_environment(globals: Rc<Environment>) -> Self {
        Self {
            env: Rc::clone(&globals),
            globals,
            out: Box::new(io::stdout()),
            input: Box::new(io::BufReader::new(io::stdin())),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            exit_status: None,
        }
    }

    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn with_input(mut self, input: impl BufRead + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn globals(&self) -> &Rc<Environment> {
        &self.globals
    }

    /// The scope statements are currently executing in.
    pub fn current_env(&self) -> &Rc<Environment> {
        &self.env
    }

    pub fn write_line(&mut self, text: &str) -> Result<(), RuntimeError> {
        writeln!(self.out, "{}", text).map_err(RuntimeError::io)?;
        self.out.flush().map_err(RuntimeError::io)
    }

    pub fn write(&mut self, text: &str) -> Result<(), RuntimeError> {
        write!(self.out, "{}", text).map_err(RuntimeError::io)?;
        self.out.flush().map_err(RuntimeError::io)
    }

    /// Reads one line without its terminator, or `None` at end of input.
    pub fn read_line(&mut self) -> Result<Option<String>, RuntimeError> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(RuntimeError::io)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Status passed to `exit()`, once a program has called it.
    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }

    /// Executes a program in the global scope. A top-level `return` ends it early.
    /// `exit()` also ends it, yielding null and recording `exit_status`.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        log::debug!("running {} top-level statements", program.statements.len());
        match self.execute_statements(&program.statements) {
            Ok(flow) => Ok(flow.into_value()),
            Err(RuntimeError::Exit { code, .. }) => {
                log::debug!("program called exit({})", code);
                self.exit_status = Some(code);
                Ok(Value::Null)
            }
            Err(err) => Err(err),
        }
    }

    /// Tokenizes, parses and runs `source` against this interpreter's state.
    pub fn run_source(&mut self, source: &str) -> Result<Value, Error> {
        let tokens = tokenize(source)?;
        let program = parser::parse(tokens)?;
        Ok(self.run(&program)?)
    }

    fn with_env<T>(
        &mut self,
        env: Rc<Environment>,
        body: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let saved = std::mem::replace(&mut self.env, env);
        let result = body(self);
        self.env = saved;
        result
    }

    fn execute_statements(&mut self, statements: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        let mut last = Value::Null;
        for statement in statements {
            match self.execute(statement)? {
                ControlFlow::Return(value) => return Ok(ControlFlow::Return(value)),
                ControlFlow::Value(value) => last = value,
            }
        }
        Ok(ControlFlow::Value(last))
    }

    /// Runs a block in a fresh child of the current scope.
    fn execute_block(&mut self, block: &Block) -> Result<ControlFlow, RuntimeError> {
        let scope = self.env.child();
        self.with_env(scope, |interp| interp.execute_statements(&block.statements))
    }

    pub fn execute(&mut self, statement: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match statement {
            Stmt::Bind { name, value, .. } => {
                let value = self.evaluate(value)?;
                self.env.define(name.to_string(), value.clone());
                Ok(ControlFlow::Value(value))
            }
            Stmt::Assign { name, value, span } => {
                let value = self.evaluate(value)?;
                self.env
                    .assign(name, value.clone())
                    .map_err(|err| err.at(*span))?;
                Ok(ControlFlow::Value(value))
            }
            Stmt::Function { name, params, body, .. } => {
                let function = Function {
                    name: Rc::clone(name),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.env),
                };
                self.env
                    .define(name.to_string(), Value::Function(Rc::new(function)));
                Ok(ControlFlow::Value(Value::Null))
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(ControlFlow::Value(Value::Null))
                }
            }
            Stmt::While { condition, body } => {
                let mut last = Value::Null;
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute_block(body)? {
                        ControlFlow::Return(value) => return Ok(ControlFlow::Return(value)),
                        ControlFlow::Value(value) => last = value,
                    }
                }
                Ok(ControlFlow::Value(last))
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(value))
            }
            Stmt::Mirror(expr) => {
                let value = self.evaluate(expr)?;
                self.write_line(&format::display(&value))
                    .map_err(|err| err.at(expr.span))?;
                Ok(ControlFlow::Value(value))
            }
            Stmt::Expr(expr) => Ok(ControlFlow::Value(self.evaluate(expr)?)),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Identifier(name) => self.env.lookup(name).map_err(|err| err.at(expr.span)),
            ExprKind::Grouped(inner) => self.evaluate(inner),
            ExprKind::List { elements } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element)?);
                }
                Ok(Value::list(items))
            }
            ExprKind::Mapping { entries } => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, value_expr) in entries {
                    let value = self.evaluate(value_expr)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::mapping(map))
            }
            ExprKind::Unary { op, expr: operand } => {
                let value = self.evaluate(operand)?;
                self.eval_unary_op(*op, &value)
                    .map_err(|err| err.at(expr.span))
            }
            ExprKind::Binary { left, op, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.eval_binary_op(&left_val, *op, &right_val)
                    .map_err(|err| err.at(expr.span))
            }
            ExprKind::Call { callee, args } => {
                let callee_val = self.evaluate(callee)?;
                let mut arg_vals = Vec::with_capacity(args.len());
                for arg in args {
                    arg_vals.push(self.evaluate(arg)?);
                }
                self.call(&callee_val, arg_vals)
                    .map_err(|err| err.at(expr.span))
            }
            ExprKind::Index { target, index } => {
                let target_val = self.evaluate(target)?;
                let index_val = self.evaluate(index)?;
                get_index(&target_val, &index_val).map_err(|err| err.at(expr.span))
            }
        }
    }

    /// Invokes a function or builtin with already evaluated arguments.
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match callee {
            Value::Builtin(builtin) => {
                log::trace!("calling builtin {} with {} argument(s)", builtin.name, args.len());
                (builtin.func)(self, &args)
            }
            Value::Function(function) => self.call_user_function(function, args),
            other => Err(RuntimeError::not_callable(format!(
                "{} `{}`",
                other.type_name(),
                format::repr(other)
            ))),
        }
    }

    fn call_user_function(
        &mut self,
        function: &Rc<Function>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if self.depth >= self.max_depth {
            return Err(RuntimeError::recursion_limit(self.max_depth));
        }
        log::trace!(
            "calling {} with {} argument(s) at depth {}",
            function.name,
            args.len(),
            self.depth + 1
        );

        // Missing arguments are null, extras are dropped.
        let frame = function.closure.child();
        let mut args = args.into_iter();
        for param in &function.params {
            frame.define(param.to_string(), args.next().unwrap_or(Value::Null));
        }

        self.depth += 1;
        let result = self.with_env(frame, |interp| {
            interp.execute_statements(&function.body.statements)
        });
        self.depth -= 1;
        Ok(result?.into_value())
    }

    fn eval_binary_op(
        &self,
        left: &Value,
        op: BinaryOp,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        match (left, op, right) {
            (Value::Number(left_num), BinaryOp::Add, Value::Number(right_num)) => {
                Ok(Value::Number(left_num + right_num))
            }
            (Value::Number(left_num), BinaryOp::Sub, Value::Number(right_num)) => {
                Ok(Value::Number(left_num - right_num))
            }
            (Value::Number(left_num), BinaryOp::Mul, Value::Number(right_num)) => {
                Ok(Value::Number(left_num * right_num))
            }
            (Value::Number(left_num), BinaryOp::Div, Value::Number(right_num)) => {
                if *right_num == 0.0 {
                    Err(RuntimeError::division_by_zero())
                } else {
                    Ok(Value::Number(left_num / right_num))
                }
            }
            (left_val, BinaryOp::Eq, right_val) => Ok(Value::Bool(left_val == right_val)),
            (left_val, BinaryOp::NotEq, right_val) => Ok(Value::Bool(left_val != right_val)),
            (Value::Number(left_num), BinaryOp::Less, Value::Number(right_num)) => {
                Ok(Value::Bool(left_num < right_num))
            }
            (Value::Number(left_num), BinaryOp::Greater, Value::Number(right_num)) => {
                Ok(Value::Bool(left_num > right_num))
            }
            (Value::Number(left_num), BinaryOp::LessEq, Value::Number(right_num)) => {
                Ok(Value::Bool(left_num <= right_num))
            }
            (Value::Number(left_num), BinaryOp::GreaterEq, Value::Number(right_num)) => {
                Ok(Value::Bool(left_num >= right_num))
            }
            (Value::String(left_str), BinaryOp::Less, Value::String(right_str)) => {
                Ok(Value::Bool(left_str < right_str))
            }
            (Value::String(left_str), BinaryOp::Greater, Value::String(right_str)) => {
                Ok(Value::Bool(left_str > right_str))
            }
            (Value::String(left_str), BinaryOp::LessEq, Value::String(right_str)) => {
                Ok(Value::Bool(left_str <= right_str))
            }
            (Value::String(left_str), BinaryOp::GreaterEq, Value::String(right_str)) => {
                Ok(Value::Bool(left_str >= right_str))
            }
            (left_val, BinaryOp::And, right_val) => Ok(if left_val.is_truthy() {
                right_val.clone()
            } else {
                left_val.clone()
            }),
            (left_val, BinaryOp::Or, right_val) => Ok(if left_val.is_truthy() {
                left_val.clone()
            } else {
                right_val.clone()
            }),
            _ => Err(RuntimeError::type_error(format!(
                "unsupported operand types for {}: {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    fn eval_unary_op(&self, op: UnaryOp, value: &Value) -> Result<Value, RuntimeError> {
        match (op, value) {
            (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
            (UnaryOp::Neg, other) => Err(RuntimeError::type_error(format!(
                "bad operand type for unary -: {}",
                other.type_name()
            ))),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn get_index(target: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (target, index) {
        (Value::List(items), Value::Number(n)) => {
            let items = items.borrow();
            let position = integral_index(*n, items.len())?;
            Ok(items[position].clone())
        }
        (Value::String(s), Value::Number(n)) => {
            let length = s.chars().count();
            let position = integral_index(*n, length)?;
            Ok(s.chars()
                .nth(position)
                .map_or(Value::Null, |ch| Value::string(ch.to_string())))
        }
        (Value::Mapping(map), Value::String(key)) => map
            .borrow()
            .get(key.as_ref())
            .cloned()
            .ok_or_else(|| RuntimeError::key_not_found(key.as_ref())),
        (Value::List(_) | Value::String(_), other) => Err(RuntimeError::type_error(format!(
            "indices must be numbers, not {}",
            other.type_name()
        ))),
        (Value::Mapping(_), other) => Err(RuntimeError::type_error(format!(
            "mapping keys must be strings, not {}",
            other.type_name()
        ))),
        (other, _) => Err(RuntimeError::type_error(format!(
            "{} is not indexable",
            other.type_name()
        ))),
    }
}

fn integral_index(n: f64, length: usize) -> Result<usize, RuntimeError> {
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(RuntimeError::type_error(format!(
            "index must be a whole number, got {}",
            format::format_number(n)
        )));
    }
    if n < 0.0 || n >= length as f64 {
        return Err(RuntimeError::index_out_of_bounds(n as i64, length));
    }
    Ok(n as usize)
}

/// Fail-fast entry point: the first error of any phase is returned.
pub fn parse_and_run(source: &str) -> Result<Value, Error> {
    Interpreter::new().run_source(source)
}

pub fn parse_and_run_with_diagnostics(source: &str) -> Result<Value, Vec<Diagnostic>> {
    parse_and_run(source).map_err(|err| vec![err.to_diagnostic()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Span;
    use std::cell::RefCell;

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    fn run_capturing(source: &str) -> (Result<Value, Error>, String) {
        let captured = Captured::default();
        let mut interp = Interpreter::new().with_output(captured.clone());
        let result = interp.run_source(source);
        (result, captured.text())
    }

    fn literal(n: f64) -> Expr {
        Expr::synthetic(ExprKind::Literal(Value::Number(n)))
    }

    fn identifier(name: &str) -> Expr {
        Expr::synthetic(ExprKind::Identifier(Rc::from(name)))
    }

    #[test]
    fn test_bind_then_lookup() {
        let mut interp = Interpreter::new();
        interp.run_source("bind x to 7; bind y to x * 2").unwrap();
        assert_eq!(interp.globals().lookup("y").unwrap(), Value::Number(14.0));
        assert_eq!(interp.globals().lookup("x").unwrap(), Value::Number(7.0));
    }

    #[test]
    fn test_program_value_is_last_statement() {
        assert_eq!(
            parse_and_run("bind a to 10; bind b to 5; bind c to a + b * 2").unwrap(),
            Value::Number(20.0)
        );
        assert_eq!(parse_and_run("").unwrap(), Value::Null);
    }

    #[test]
    fn test_mirror_writes_and_yields() {
        let (result, output) = run_capturing("mirror \"Akshaya\"\nmirror [1, \"two\"]");
        assert_eq!(output, "Akshaya\n[1, \"two\"]\n");
        assert_eq!(
            result.unwrap(),
            Value::list(vec![Value::Number(1.0), Value::string("two")])
        );
    }

    #[test]
    fn test_top_level_return_stops_program() {
        let (result, output) = run_capturing("mirror 1\nreturn 5\nmirror 2");
        assert_eq!(result.unwrap(), Value::Number(5.0));
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_same_ast_same_result() {
        let program = Program::new(vec![
            Stmt::Bind {
                name: Rc::from("a"),
                value: literal(6.0),
                span: Span::dummy(),
            },
            Stmt::Bind {
                name: Rc::from("b"),
                value: Expr::synthetic(ExprKind::Binary {
                    left: Box::new(identifier("a")),
                    op: BinaryOp::Mul,
                    right: Box::new(literal(7.0)),
                }),
                span: Span::dummy(),
            },
            Stmt::Expr(identifier("b")),
        ]);

        let mut first = Interpreter::with_environment(Environment::new());
        let mut second = Interpreter::with_environment(Environment::new());
        let first_result = first.run(&program).unwrap();
        let second_result = second.run(&program).unwrap();

        assert_eq!(first_result, Value::Number(42.0));
        assert_eq!(first_result, second_result);
        assert_eq!(
            first.globals().local_bindings(),
            second.globals().local_bindings()
        );
    }

    #[test]
    fn test_error_keeps_earlier_effects() {
        let mut interp = Interpreter::new();
        let err = interp.run_source("bind x to 1\nbind y to x / 0\nbind z to 3");
        assert!(matches!(
            err,
            Err(Error::Runtime(RuntimeError::DivisionByZero { .. }))
        ));
        assert_eq!(interp.globals().lookup("x").unwrap(), Value::Number(1.0));
        assert!(!interp.globals().contains("y"));
        assert!(!interp.globals().contains("z"));
    }

    #[test]
    fn test_runtime_error_carries_span() {
        let source = "bind x to 1\nmirror missing";
        let err = parse_and_run(source).unwrap_err();
        match err {
            Error::Runtime(RuntimeError::UndefinedVariable { name, span }) => {
                assert_eq!(name, "missing");
                assert_eq!(&source[span.start..span.end], "missing");
            }
            other => panic!("expected undefined variable, got {:?}", other),
        }
    }

    #[test]
    fn test_recursion_limit() {
        let mut interp = Interpreter::new().with_max_depth(16);
        let err = interp
            .run_source("fn forever(n) { return forever(n + 1) }\nforever(0)")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(RuntimeError::RecursionLimit { limit: 16, .. })
        ));
        // The interpreter is usable again afterwards.
        assert_eq!(
            interp.run_source("fn one() { return 1 }\none()").unwrap(),
            Value::Number(1.0)
        );
    }

    #[test]
    fn test_exit_stops_program() {
        let captured = Captured::default();
        let mut interp = Interpreter::new().with_output(captured.clone());
        let source = "fn quit() { exit(4)\nmirror \"unreachable\" }\nmirror 1\nquit()\nmirror 2";
        assert_eq!(interp.run_source(source).unwrap(), Value::Null);
        assert_eq!(interp.exit_status(), Some(4));
        assert_eq!(captured.text(), "1\n");
        assert_eq!(interp.current_env().local_bindings(), interp.globals().local_bindings());
    }

    #[test]
    fn test_diagnostics_entry_point() {
        let diagnostics = parse_and_run_with_diagnostics("bind x to 1 / 0").unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some("E0203"));
    }
}
