use std::collections::HashSet;

use crate::document::{MAP_HEXES, MAP_ROOT};
use crate::error::CheckError;
use crate::runtime::builtins::{Arity, Builtins};
use crate::syntax::ast::{CallExpr, Expr, LValue, LValueStep, Program, Stmt};

/// Static validation over a parsed program. Unlike the lexer and parser,
/// the checker never aborts: it walks the whole tree and collects every
/// diagnostic it finds.
///
/// The variable environment is flat. A `for` binds its loop variable for
/// the duration of the body and unbinds it afterwards; shadowing an outer
/// binding of the same name is not restored.
pub struct Checker<'a> {
    errors: Vec<CheckError>,
    builtins: &'a Builtins,
    vars: HashSet<String>,
}

/// Checks against the stock builtin registry. An empty result means the
/// program is clean.
pub fn check(program: &Program) -> Vec<CheckError> {
    check_with(program, &Builtins::standard())
}

/// Checks against a host-extended registry.
pub fn check_with(program: &Program, builtins: &Builtins) -> Vec<CheckError> {
    let mut checker = Checker { errors: Vec::new(), builtins, vars: HashSet::new() };
    for stmt in &program.statements {
        checker.check_stmt(stmt);
    }
    log::trace!("check found {} diagnostic(s)", checker.errors.len());
    checker.errors
}

impl Checker<'_> {
    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                self.check_lvalue(target);
                self.check_expr(value);
            }
            Stmt::Call { call, .. } => self.check_call(call),
            Stmt::If { condition, then_branch, else_branch, .. } => {
                self.check_expr(condition);
                for stmt in then_branch {
                    self.check_stmt(stmt);
                }
                for stmt in else_branch {
                    self.check_stmt(stmt);
                }
            }
            Stmt::For { var_name, iterator, body, .. } => {
                self.check_expr(iterator);
                self.vars.insert(var_name.clone());
                for stmt in body {
                    self.check_stmt(stmt);
                }
                self.vars.remove(var_name);
            }
        }
    }

    fn check_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Ident { name, pos } => {
                // The flattened document path is the one name that resolves
                // without a binding.
                if name != MAP_HEXES && !self.vars.contains(name) {
                    self.error(format!("undefined variable: {name}"), pos.line, pos.column);
                }
            }
            Expr::Binary { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }
            Expr::Call(call) => self.check_call(call),
        }
    }

    fn check_lvalue(&mut self, lvalue: &LValue) {
        if lvalue.root != MAP_ROOT && !self.vars.contains(&lvalue.root) {
            self.error(
                format!("undefined variable: {}", lvalue.root),
                lvalue.pos.line,
                lvalue.pos.column,
            );
        }
        for step in &lvalue.steps {
            if let LValueStep::Index { index, .. } = step {
                self.check_expr(index);
            }
        }
    }

    fn check_call(&mut self, call: &CallExpr) {
        match self.builtins.arity(&call.name) {
            None => {
                self.error(
                    format!("unknown function: {}", call.name),
                    call.pos.line,
                    call.pos.column,
                );
            }
            Some(Arity::Exact(n)) if call.args.len() != n => {
                self.error(
                    format!(
                        "function {} expects {} argument(s), got {}",
                        call.name,
                        n,
                        call.args.len()
                    ),
                    call.pos.line,
                    call.pos.column,
                );
            }
            Some(_) => {}
        }
        for arg in &call.args {
            self.check_expr(arg);
        }
    }

    fn error(&mut self, msg: String, line: usize, col: usize) {
        self.errors.push(CheckError { msg, line, col });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;
    use crate::syntax::parser::Parser;

    fn diagnostics(source: &str) -> Vec<CheckError> {
        let tokens = Lexer::new(source).tokenize().expect("lexing should succeed");
        let program = Parser::new(tokens).parse().expect("parsing should succeed");
        check(&program)
    }

    fn messages(source: &str) -> Vec<String> {
        diagnostics(source).into_iter().map(|e| e.msg).collect()
    }

    #[test]
    fn clean_program_has_no_diagnostics() {
        let source = "for h in map.hexes do h.terrain := \"swamp\"; end\nsave(\"out.wxx\");";
        assert!(diagnostics(source).is_empty());
    }

    #[test]
    fn undefined_lvalue_root_is_flagged() {
        assert_eq!(messages("y.terrain := \"swamp\";"), vec!["undefined variable: y"]);
    }

    #[test]
    fn map_root_needs_no_binding() {
        assert!(diagnostics("map.hexes[0].terrain := \"swamp\";").is_empty());
    }

    #[test]
    fn flattened_document_path_needs_no_binding() {
        assert!(diagnostics("for h in map.hexes do end").is_empty());
    }

    #[test]
    fn undefined_expression_variable_is_flagged() {
        assert_eq!(messages("print(x);"), vec!["undefined variable: x"]);
    }

    #[test]
    fn loop_variable_is_bound_inside_the_body_only() {
        assert!(diagnostics("for h in map.hexes do print(h); end").is_empty());
        assert_eq!(messages("for h in map.hexes do end\nprint(h);"), vec!["undefined variable: h"]);
    }

    #[test]
    fn nested_same_name_loop_does_not_restore_the_outer_binding() {
        // The environment is flat: the inner loop unbinds the name even
        // though the outer loop is still open.
        let source = "for h in map.hexes do\n  for h in map.hexes do end\n  print(h);\nend";
        assert_eq!(messages(source), vec!["undefined variable: h"]);
    }

    #[test]
    fn unknown_function_is_flagged() {
        assert_eq!(messages("frobnicate();"), vec!["unknown function: frobnicate"]);
    }

    #[test]
    fn save_arity_is_enforced() {
        assert!(diagnostics("save(\"a.wxx\");").is_empty());
        assert_eq!(
            messages("save(\"a.wxx\", \"b.wxx\");"),
            vec!["function save expects 1 argument(s), got 2"]
        );
    }

    #[test]
    fn print_is_variadic() {
        assert!(diagnostics("print(\"a\", \"b\", \"c\");").is_empty());
    }

    #[test]
    fn all_diagnostics_are_collected() {
        let msgs = messages("y.terrain := \"swamp\";\nfrobnicate();");
        assert_eq!(msgs.len(), 2);
    }

    #[test]
    fn diagnostics_carry_positions() {
        let errs = diagnostics("print(x);");
        assert_eq!(errs[0].line, 1);
        assert_eq!(errs[0].col, 6);
    }
}
