use std::collections::HashMap;

use crate::document::{MAP_HEXES, MAP_ROOT, MapRoot};
use crate::error::RuntimeError;
use crate::runtime::builtins::{Builtins, HostIo};
use crate::runtime::value::Value;
use crate::syntax::ast::{CallExpr, Expr, LValue, LValueStep, Literal, Program, Stmt};
use crate::syntax::token::Pos;

/// Tree-walking interpreter. Executes a program against a borrowed document
/// and stops at the first fault; statements already executed keep their
/// effects (there is no rollback).
///
/// The variable environment is flat and survives across executions, which
/// is what lets a REPL accumulate state turn by turn. A `for` loop's
/// variable stays bound after the loop ends.
pub struct Vm {
    vars: HashMap<String, Value>,
    builtins: Builtins,
    output: Vec<String>,
    filename: Option<String>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
            builtins: Builtins::standard(),
            output: Vec::new(),
            filename: None,
        }
    }

    pub fn with_filename(filename: impl Into<String>) -> Self {
        let mut vm = Self::new();
        vm.filename = Some(filename.into());
        vm
    }

    /// The registry, for hosts that want to expose extra builtins.
    pub fn builtins_mut(&mut self) -> &mut Builtins {
        &mut self.builtins
    }

    pub fn vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    /// Drains everything `print` and `save` emitted since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn execute(&mut self, program: &Program, doc: &mut MapRoot) -> Result<(), RuntimeError> {
        for stmt in &program.statements {
            self.exec_stmt(stmt, doc)?;
        }
        Ok(())
    }

    fn fault(&self, msg: impl Into<String>, pos: Pos) -> RuntimeError {
        RuntimeError::new(msg, pos, self.filename.clone())
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn exec_stmt(&mut self, stmt: &Stmt, doc: &mut MapRoot) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let val = self.eval_expr(value, doc)?;
                self.assign(target, val, doc)
            }
            Stmt::Call { call, .. } => {
                self.eval_call(call, doc)?;
                Ok(())
            }
            Stmt::If { condition, then_branch, else_branch, pos } => {
                let cond = self.eval_expr(condition, doc)?;
                let Value::Bool(truthy) = cond else {
                    return Err(self.fault("if condition must be true or false", *pos));
                };
                let branch = if truthy { then_branch } else { else_branch };
                for stmt in branch {
                    self.exec_stmt(stmt, doc)?;
                }
                Ok(())
            }
            Stmt::For { var_name, iterator, body, pos } => {
                let iter = self.eval_expr(iterator, doc)?;
                let Value::List(items) = iter else {
                    return Err(self.fault(
                        "cannot iterate over this value - use something like 'map.hexes'",
                        *pos,
                    ));
                };
                log::trace!("for {var_name}: iterating {} item(s)", items.len());
                for item in items {
                    // Flat environment: the binding deliberately outlives
                    // the loop.
                    self.vars.insert(var_name.clone(), item);
                    for stmt in body {
                        self.exec_stmt(stmt, doc)?;
                    }
                }
                Ok(())
            }
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    fn eval_expr(&mut self, expr: &Expr, doc: &mut MapRoot) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                Literal::Int(i) => Value::Int(*i),
                Literal::Float(f) => Value::Float(*f),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
            }),
            Expr::Ident { name, pos } => {
                if name == MAP_HEXES {
                    // The document path materializes as a list of hex
                    // references into the current document.
                    return Ok(Value::List((0..doc.hexes.len()).map(Value::HexRef).collect()));
                }
                match self.vars.get(name) {
                    Some(val) => Ok(val.clone()),
                    None => Err(self.fault(format!("variable '{name}' is not defined"), *pos)),
                }
            }
            Expr::Binary { left, op, right, pos } => {
                let lhs = self.eval_expr(left, doc)?;
                let rhs = self.eval_expr(right, doc)?;
                match op.as_str() {
                    "=" => Ok(Value::Bool(lhs == rhs)),
                    "+" => {
                        let mut text = lhs.to_text(doc);
                        text.push_str(&rhs.to_text(doc));
                        Ok(Value::Str(text))
                    }
                    _ => Err(self.fault(format!("unsupported binary operator: {op}"), *pos)),
                }
            }
            Expr::Call(call) => self.eval_call(call, doc),
        }
    }

    fn eval_call(&mut self, call: &CallExpr, doc: &mut MapRoot) -> Result<Value, RuntimeError> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expr(arg, doc)?);
        }
        log::debug!("call {}({} arg(s))", call.name, args.len());
        let mut io = HostIo { doc, out: &mut self.output };
        match self.builtins.invoke(&call.name, &mut io, &args) {
            None => Err(self.fault(format!("function '{}' does not exist", call.name), call.pos)),
            Some(Ok(value)) => Ok(value),
            Some(Err(msg)) => Err(self.fault(msg, call.pos)),
        }
    }

    // ─── Assignment ──────────────────────────────────────────────────────────

    /// Two target shapes are assignable, both writing hex terrain:
    /// a loop variable property (`h.terrain`) and a direct document path
    /// (`map.hexes[i].terrain`). Everything else is a fault.
    fn assign(&mut self, lvalue: &LValue, val: Value, doc: &mut MapRoot) -> Result<(), RuntimeError> {
        // h.terrain := ... where h is bound to a hex reference.
        if let [LValueStep::Prop { name, pos }] = lvalue.steps.as_slice() {
            if name == "terrain" {
                if let Some(Value::HexRef(i)) = self.vars.get(&lvalue.root) {
                    let i = *i;
                    let Value::Str(s) = val else {
                        return Err(self.fault("terrain must be a text value", *pos));
                    };
                    let len = doc.hexes.len();
                    let Some(hex) = doc.hexes.get_mut(i) else {
                        // Stale reference into a replaced document.
                        return Err(self.fault(
                            format!("index {i} is out of range (valid: 0 to {})", len as i64 - 1),
                            *pos,
                        ));
                    };
                    hex.terrain = s;
                    return Ok(());
                }
            }
        }

        // map.hexes[i].terrain := ... The index is evaluated and
        // bounds-checked even when the trailing .terrain step is missing;
        // only the write itself requires it.
        if lvalue.root == MAP_ROOT && lvalue.steps.len() >= 2 {
            if let (
                LValueStep::Prop { name: first, .. },
                LValueStep::Index { index, pos: index_pos },
            ) = (&lvalue.steps[0], &lvalue.steps[1])
            {
                if first == "hexes" {
                    let index_val = self.eval_expr(index, doc)?;
                    let Some(i) = index_val.as_index() else {
                        return Err(self.fault("index must be a number", *index_pos));
                    };
                    let len = doc.hexes.len() as i64;
                    if i < 0 || i >= len {
                        return Err(self.fault(
                            format!("index {i} is out of range (valid: 0 to {})", len - 1),
                            *index_pos,
                        ));
                    }
                    if lvalue.steps.len() == 3 {
                        if let LValueStep::Prop { name: last, pos: last_pos } = &lvalue.steps[2] {
                            if last == "terrain" {
                                let Value::Str(s) = val else {
                                    return Err(self.fault("terrain must be a text value", *last_pos));
                                };
                                doc.hexes[i as usize].terrain = s;
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }

        Err(self.fault(
            "cannot assign to this - try 'map.hexes[index].terrain := \"value\"'",
            lvalue.pos,
        ))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;
    use crate::syntax::parser::Parser;

    fn program(source: &str) -> Program {
        let tokens = Lexer::new(source).tokenize().expect("lexing should succeed");
        Parser::new(tokens).parse().expect("parsing should succeed")
    }

    fn run(source: &str) -> (Vm, MapRoot) {
        let mut vm = Vm::new();
        let mut doc = MapRoot::mock();
        vm.execute(&program(source), &mut doc).expect("execution should succeed");
        (vm, doc)
    }

    fn run_err(source: &str) -> (RuntimeError, Vm, MapRoot) {
        let mut vm = Vm::new();
        let mut doc = MapRoot::mock();
        let err = vm.execute(&program(source), &mut doc).unwrap_err();
        (err, vm, doc)
    }

    #[test]
    fn direct_hex_assignment_mutates_the_document() {
        let (_, doc) = run("map.hexes[0].terrain := \"swamp\";");
        assert_eq!(doc.hexes[0].terrain, "swamp");
        assert_eq!(doc.hexes[1].terrain, "plains");
    }

    #[test]
    fn loop_assignment_mutates_every_hex() {
        let (_, doc) = run("for h in map.hexes do h.terrain := \"swamp\"; end");
        assert!(doc.hexes.iter().all(|h| h.terrain == "swamp"));
    }

    #[test]
    fn loop_variable_persists_after_the_loop() {
        let (vm, _) = run("for h in map.hexes do end");
        assert_eq!(vm.vars().get("h"), Some(&Value::HexRef(1)));
    }

    #[test]
    fn out_of_range_index_names_the_valid_range() {
        let (err, _, doc) = run_err("map.hexes[5].terrain := \"swamp\";");
        assert_eq!(err.msg, "index 5 is out of range (valid: 0 to 1)");
        assert_eq!(doc.hexes[0].terrain, "forest");
    }

    #[test]
    fn index_is_bounds_checked_without_a_terrain_step() {
        let (err, _, _) = run_err("map.hexes[5] := \"x\";");
        assert_eq!(err.msg, "index 5 is out of range (valid: 0 to 1)");
    }

    #[test]
    fn in_range_index_without_a_terrain_step_is_still_unassignable() {
        let (err, _, doc) = run_err("map.hexes[0] := \"x\";");
        assert_eq!(err.msg, "cannot assign to this - try 'map.hexes[index].terrain := \"value\"'");
        assert_eq!(doc.hexes[0].terrain, "forest");
    }

    #[test]
    fn non_numeric_index_is_a_fault() {
        let (err, _, _) = run_err("map.hexes[\"zero\"].terrain := \"swamp\";");
        assert_eq!(err.msg, "index must be a number");
    }

    #[test]
    fn whole_float_index_is_accepted() {
        let (_, doc) = run("map.hexes[1.0].terrain := \"swamp\";");
        assert_eq!(doc.hexes[1].terrain, "swamp");
    }

    #[test]
    fn non_text_terrain_is_a_fault() {
        let (err, _, _) = run_err("map.hexes[0].terrain := 7;");
        assert_eq!(err.msg, "terrain must be a text value");
    }

    #[test]
    fn unassignable_target_suggests_the_supported_shape() {
        // Only the two hex terrain shapes are assignable; a bare variable
        // or an unknown property hits the generic fault.
        let (err, _, _) = run_err("x.weather := \"rain\";");
        assert_eq!(err.msg, "cannot assign to this - try 'map.hexes[index].terrain := \"value\"'");
        let (err, _, _) = run_err("x := 1;");
        assert_eq!(err.msg, "cannot assign to this - try 'map.hexes[index].terrain := \"value\"'");
    }

    #[test]
    fn undefined_variable_is_a_fault() {
        let (err, _, _) = run_err("if x then end");
        assert_eq!(err.msg, "variable 'x' is not defined");
    }

    #[test]
    fn if_condition_must_be_boolean() {
        let (err, _, _) = run_err("if \"yes\" then end");
        assert_eq!(err.msg, "if condition must be true or false");
    }

    #[test]
    fn if_selects_the_right_branch() {
        let (mut vm, _) = run("if true then print(\"t\"); else print(\"f\"); end");
        assert_eq!(vm.take_output(), vec!["t"]);
        let (mut vm, _) = run("if false then print(\"t\"); else print(\"f\"); end");
        assert_eq!(vm.take_output(), vec!["f"]);
    }

    #[test]
    fn iterating_a_non_list_is_a_fault() {
        let (err, _, _) = run_err("for h in true do end");
        assert_eq!(err.msg, "cannot iterate over this value - use something like 'map.hexes'");
    }

    #[test]
    fn unknown_function_is_a_fault() {
        let (err, _, _) = run_err("frobnicate();");
        assert_eq!(err.msg, "function 'frobnicate' does not exist");
    }

    #[test]
    fn faults_stop_execution_immediately() {
        let (_, mut vm, doc) = run_err("map.hexes[0].terrain := \"swamp\";\nfrobnicate();\nprint(\"after\");");
        // The first statement ran; the statement after the fault did not.
        assert_eq!(doc.hexes[0].terrain, "swamp");
        assert!(vm.take_output().is_empty());
    }

    #[test]
    fn equality_and_concatenation() {
        let (mut vm, _) = run("print(\"a\" + \"b\");\nif 1 = 1 then print(\"eq\"); end");
        assert_eq!(vm.take_output(), vec!["ab", "eq"]);
    }

    #[test]
    fn int_and_float_are_not_structurally_equal() {
        let (mut vm, _) = run("if 1 = 1.0 then print(\"eq\"); else print(\"ne\"); end");
        assert_eq!(vm.take_output(), vec!["ne"]);
    }

    #[test]
    fn unsupported_operator_is_a_fault() {
        let (err, _, _) = run_err("print(1 - 1);");
        assert_eq!(err.msg, "unsupported binary operator: -");
    }

    #[test]
    fn errors_carry_positions() {
        let (err, _, _) = run_err("print(\"ok\");\nfrobnicate();");
        assert_eq!(err.pos.line, 2);
    }

    #[test]
    fn output_is_buffered_until_taken() {
        let (mut vm, _) = run("print(\"one\");\nprint(\"two\");");
        assert_eq!(vm.take_output(), vec!["one", "two"]);
        assert!(vm.take_output().is_empty());
    }
}
